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

//! Shaders and graphics programs.

use super::{Resource, ResourceType};
use crate::rhi::api::core::{Capabilities, Ref};
use crate::rhi::error::{ResourceError, ShaderError};
use std::borrow::Cow;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Tessellation control (hull) shader.
    TessellationControl,
    /// Tessellation evaluation (domain) shader.
    TessellationEvaluation,
    /// Geometry shader.
    Geometry,
    /// Fragment (pixel) shader.
    Fragment,
    /// Task (amplification) shader.
    Task,
    /// Mesh shader.
    Mesh,
    /// Compute shader.
    Compute,
}

impl ShaderStage {
    /// The resource kind of a shader of this stage.
    pub const fn resource_type(self) -> ResourceType {
        match self {
            Self::Vertex => ResourceType::VertexShader,
            Self::TessellationControl => ResourceType::TessellationControlShader,
            Self::TessellationEvaluation => ResourceType::TessellationEvaluationShader,
            Self::Geometry => ResourceType::GeometryShader,
            Self::Fragment => ResourceType::FragmentShader,
            Self::Task => ResourceType::TaskShader,
            Self::Mesh => ResourceType::MeshShader,
            Self::Compute => ResourceType::ComputeShader,
        }
    }

    /// Returns `true` if the device supports the stage.
    pub fn is_supported(self, capabilities: &Capabilities) -> bool {
        match self {
            Self::Vertex => capabilities.vertex_shader,
            Self::TessellationControl | Self::TessellationEvaluation => {
                capabilities.tessellation_shaders()
            }
            Self::Geometry => capabilities.geometry_shader(),
            Self::Fragment => capabilities.fragment_shader,
            Self::Task | Self::Mesh => capabilities.mesh_shader,
            Self::Compute => capabilities.compute_shader,
        }
    }
}

/// The code of a shader, as handed to a shader language.
#[derive(Debug, Clone)]
pub enum ShaderSource<'a> {
    /// Source code in the shader language's text form.
    Source(Cow<'a, str>),
    /// Precompiled bytecode.
    Bytecode(Cow<'a, [u8]>),
}

impl ShaderSource<'_> {
    /// Returns `true` if there is no code at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Source(source) => source.trim().is_empty(),
            Self::Bytecode(bytecode) => bytecode.is_empty(),
        }
    }
}

/// A descriptor used to create a shader through a shader language.
#[derive(Debug, Clone)]
pub struct ShaderDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The stage the shader runs at.
    pub stage: ShaderStage,
    /// The shader code.
    pub source: ShaderSource<'a>,
}

impl<'a> ShaderDescriptor<'a> {
    /// Describes a shader compiled from source code.
    pub fn from_source(stage: ShaderStage, source: impl Into<Cow<'a, str>>) -> Self {
        Self {
            label: None,
            stage,
            source: ShaderSource::Source(source.into()),
        }
    }

    /// Describes a shader created from precompiled bytecode.
    pub fn from_bytecode(stage: ShaderStage, bytecode: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            label: None,
            stage,
            source: ShaderSource::Bytecode(bytecode.into()),
        }
    }

    /// Sets the debug label.
    pub fn label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The debug label, or an empty string.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Checks the code is present and the device supports the stage and the
    /// code form.
    pub fn validate(&self, capabilities: &Capabilities) -> Result<(), ResourceError> {
        if !self.stage.is_supported(capabilities) {
            return Err(ShaderError::UnsupportedStage(self.stage).into());
        }
        if self.source.is_empty() {
            return Err(ShaderError::EmptySource {
                label: self.label_str().to_owned(),
            }
            .into());
        }
        if matches!(self.source, ShaderSource::Bytecode(_)) && !capabilities.shader_bytecode {
            return Err(ResourceError::Unsupported(
                "the device does not accept shader bytecode".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A shader of one stage, created by a shader language.
pub trait Shader: Resource {
    /// The stage the shader runs at.
    fn stage(&self) -> ShaderStage;

    /// Name of the shader language that created the shader.
    fn shader_language_name(&self) -> &str;
}

/// A descriptor used to link shaders into a graphics program.
///
/// A program is either a vertex pipeline (vertex shader, optional
/// tessellation and geometry shaders) or a mesh pipeline (mesh shader and
/// optional task shader). Both may have a fragment shader.
#[derive(Debug, Clone, Default)]
pub struct GraphicsProgramDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Vertex shader of a vertex pipeline.
    pub vertex_shader: Option<&'a Ref<dyn Shader>>,
    /// Optional tessellation control shader.
    pub tessellation_control_shader: Option<&'a Ref<dyn Shader>>,
    /// Optional tessellation evaluation shader.
    pub tessellation_evaluation_shader: Option<&'a Ref<dyn Shader>>,
    /// Optional geometry shader.
    pub geometry_shader: Option<&'a Ref<dyn Shader>>,
    /// Optional fragment shader.
    pub fragment_shader: Option<&'a Ref<dyn Shader>>,
    /// Optional task shader of a mesh pipeline.
    pub task_shader: Option<&'a Ref<dyn Shader>>,
    /// Mesh shader of a mesh pipeline.
    pub mesh_shader: Option<&'a Ref<dyn Shader>>,
}

impl<'a> GraphicsProgramDescriptor<'a> {
    /// Describes a vertex pipeline with a vertex and a fragment shader.
    pub fn vertex_fragment(vertex: &'a Ref<dyn Shader>, fragment: &'a Ref<dyn Shader>) -> Self {
        Self {
            vertex_shader: Some(vertex),
            fragment_shader: Some(fragment),
            ..Self::default()
        }
    }

    /// Describes a mesh pipeline with an optional task shader.
    pub fn mesh(
        task: Option<&'a Ref<dyn Shader>>,
        mesh: &'a Ref<dyn Shader>,
        fragment: Option<&'a Ref<dyn Shader>>,
    ) -> Self {
        Self {
            task_shader: task,
            mesh_shader: Some(mesh),
            fragment_shader: fragment,
            ..Self::default()
        }
    }

    /// Every given shader together with the stage its slot expects.
    pub fn slots(&self) -> impl Iterator<Item = (ShaderStage, &'a Ref<dyn Shader>)> {
        [
            (ShaderStage::Vertex, self.vertex_shader),
            (ShaderStage::TessellationControl, self.tessellation_control_shader),
            (ShaderStage::TessellationEvaluation, self.tessellation_evaluation_shader),
            (ShaderStage::Geometry, self.geometry_shader),
            (ShaderStage::Fragment, self.fragment_shader),
            (ShaderStage::Task, self.task_shader),
            (ShaderStage::Mesh, self.mesh_shader),
        ]
        .into_iter()
        .filter_map(|(stage, shader)| shader.map(|shader| (stage, shader)))
    }

    /// Returns `true` for a mesh pipeline.
    pub fn is_mesh_pipeline(&self) -> bool {
        self.mesh_shader.is_some()
    }

    /// Checks the shader combination and that every shader sits in the slot
    /// of its stage.
    pub fn validate(&self) -> Result<(), ResourceError> {
        for (stage, shader) in self.slots() {
            if shader.stage() != stage {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "a {:?} shader was given as the {stage:?} shader",
                    shader.stage()
                )));
            }
        }
        let has_vertex_stages = self.vertex_shader.is_some()
            || self.tessellation_control_shader.is_some()
            || self.tessellation_evaluation_shader.is_some()
            || self.geometry_shader.is_some();
        if self.is_mesh_pipeline() {
            if has_vertex_stages {
                return Err(ResourceError::InvalidDescriptor(
                    "a mesh pipeline cannot have vertex pipeline shaders".to_owned(),
                ));
            }
        } else if self.task_shader.is_some() {
            return Err(ResourceError::InvalidDescriptor(
                "a task shader requires a mesh shader".to_owned(),
            ));
        } else if self.vertex_shader.is_none() {
            return Err(ResourceError::InvalidDescriptor(
                "a graphics program needs a vertex or a mesh shader".to_owned(),
            ));
        }
        if self.tessellation_control_shader.is_some() != self.tessellation_evaluation_shader.is_some()
        {
            return Err(ResourceError::InvalidDescriptor(
                "tessellation needs both a control and an evaluation shader".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Linked shaders forming a graphics program.
pub trait GraphicsProgram: Resource {
    /// Returns `true` if the program is a mesh pipeline.
    fn is_mesh_program(&self) -> bool;

    /// Returns the handle of an individual uniform, used by `SetUniform`
    /// commands. `None` if the program has no uniform of that name.
    fn uniform_handle(&self, name: &str) -> Option<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_descriptor_validation() {
        let capabilities = Capabilities::default();
        let descriptor = ShaderDescriptor::from_source(ShaderStage::Vertex, "void main() {}")
            .label("fullscreen vs");
        assert!(descriptor.validate(&capabilities).is_ok());

        let empty = ShaderDescriptor::from_source(ShaderStage::Fragment, "  \n").label("empty");
        assert!(matches!(
            empty.validate(&capabilities),
            Err(ResourceError::Shader(ShaderError::EmptySource { label })) if label == "empty"
        ));

        let no_mesh = Capabilities {
            mesh_shader: false,
            ..Capabilities::default()
        };
        let mesh = ShaderDescriptor::from_bytecode(ShaderStage::Mesh, vec![0x03, 0x02, 0x23, 0x07]);
        assert!(matches!(
            mesh.validate(&no_mesh),
            Err(ResourceError::Shader(ShaderError::UnsupportedStage(ShaderStage::Mesh)))
        ));
    }

    #[test]
    fn stage_support_follows_capabilities() {
        let capabilities = Capabilities {
            maximum_number_of_patch_vertices: 0,
            ..Capabilities::default()
        };
        assert!(!ShaderStage::TessellationControl.is_supported(&capabilities));
        assert!(ShaderStage::Geometry.is_supported(&capabilities));
        assert_eq!(
            ShaderStage::Compute.resource_type(),
            ResourceType::ComputeShader
        );
    }
}
