// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the hierarchy of error types for the rendering hardware interface.

use crate::rhi::api::resource::ShaderStage;
use crate::rhi::api::util::GraphicsBackendType;
use std::fmt;

/// An error related to the creation of a shader or a graphics program.
#[derive(Debug)]
pub enum ShaderError {
    /// The requested shader language is not offered by the device.
    UnknownLanguage(String),
    /// The device does not support the shader stage.
    UnsupportedStage(ShaderStage),
    /// Neither source code nor bytecode was given.
    EmptySource {
        /// A descriptive label for the shader, if available.
        label: String,
    },
    /// The shader language failed to compile the code.
    CompilationError {
        /// A descriptive label for the shader, if available.
        label: String,
        /// Detailed error messages from the shader compiler.
        details: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::UnknownLanguage(name) => write!(f, "Unknown shader language '{name}'"),
            ShaderError::UnsupportedStage(stage) => {
                write!(f, "The device does not support {stage:?} shaders")
            }
            ShaderError::EmptySource { label } => {
                write!(f, "Shader '{label}' has neither source code nor bytecode")
            }
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource.
///
/// Factories, `map`/`unmap` and query result retrieval report failures with
/// this type; none of them leave the device or the resource half-modified.
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// The descriptor breaks a structural rule.
    InvalidDescriptor(String),
    /// The backend does not implement the requested feature.
    Unsupported(String),
    /// The descriptor asks for more than the device's capabilities allow.
    CapabilityExceeded {
        /// The exceeded limit.
        what: &'static str,
        /// The requested value.
        requested: u32,
        /// The device's maximum.
        maximum: u32,
    },
    /// The device ran out of memory.
    OutOfMemory,
    /// The handle or id used to reference a resource is invalid or dead.
    InvalidHandle,
    /// The resource was created by another device.
    ForeignResource,
    /// The subresource is already mapped.
    AlreadyMapped,
    /// The subresource is not mapped.
    NotMapped,
    /// An attempt was made to access a resource out of its bounds.
    OutOfBounds,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::InvalidDescriptor(msg) => write!(f, "Invalid descriptor: {msg}"),
            ResourceError::Unsupported(msg) => write!(f, "Unsupported: {msg}"),
            ResourceError::CapabilityExceeded {
                what,
                requested,
                maximum,
            } => write!(
                f,
                "Requested {requested} {what} but the device supports at most {maximum}"
            ),
            ResourceError::OutOfMemory => write!(f, "Out of device memory."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::ForeignResource => {
                write!(f, "The resource belongs to another device.")
            }
            ResourceError::AlreadyMapped => write!(f, "The subresource is already mapped."),
            ResourceError::NotMapped => write!(f, "The subresource is not mapped."),
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// A high-level error of a graphics device.
#[derive(Debug)]
pub enum RenderError {
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// The requested backend is not available in this build.
    UnsupportedBackend(GraphicsBackendType),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::UnsupportedBackend(backend) => {
                write!(f, "The {} backend is not available", backend.name())
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn capability_error_display() {
        let err = ResourceError::CapabilityExceeded {
            what: "multisamples",
            requested: 16,
            maximum: 8,
        };
        assert_eq!(
            format!("{err}"),
            "Requested 16 multisamples but the device supports at most 8"
        );
    }

    #[test]
    fn render_error_wraps_shader_error() {
        let shader_err = ShaderError::UnsupportedStage(ShaderStage::Mesh);
        let res_err: ResourceError = shader_err.into();
        let render_err: RenderError = res_err.into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Shader resource error: The device does not support Mesh shaders"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().unwrap().source().is_some());
    }

    #[test]
    fn unsupported_backend_names_the_backend() {
        let err = RenderError::UnsupportedBackend(GraphicsBackendType::Vulkan);
        assert_eq!(err.to_string(), "The Vulkan backend is not available");
    }
}
