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

//! Buffer resources and their descriptors.

use super::Resource;
use crate::rhi::api::util::IndexBufferFormat;
use crate::rhi::error::ResourceError;
use crate::vesta_bitflags;
use std::borrow::Cow;

vesta_bitflags! {
    /// Additional ways a buffer may be bound.
    pub struct BufferFlags: u32 {
        /// The buffer can be bound for unordered (read/write) shader access.
        const UNORDERED_ACCESS = 1 << 0;
        /// The buffer can be bound as a shader resource.
        const SHADER_RESOURCE = 1 << 1;
        /// The buffer holds `DrawArguments` for indirect draws.
        const DRAW_ARGUMENTS = 1 << 2;
        /// The buffer holds `DrawIndexedArguments` for indirect indexed draws.
        const DRAW_INDEXED_ARGUMENTS = 1 << 3;
    }
}

/// How often a buffer's contents change and who reads them.
///
/// The names follow the classic "frequency × access" scheme. Backends use the
/// hint to pick a memory heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, used a few times by the GPU.
    StreamDraw,
    /// Written once by the GPU, read a few times by the CPU.
    StreamRead,
    /// Written once by the GPU, used a few times by the GPU.
    StreamCopy,
    /// Written once, used many times by the GPU.
    #[default]
    StaticDraw,
    /// Written once by the GPU, read many times by the CPU.
    StaticRead,
    /// Written once by the GPU, used many times by the GPU.
    StaticCopy,
    /// Rewritten often, used many times by the GPU.
    DynamicDraw,
    /// Rewritten often by the GPU, read many times by the CPU.
    DynamicRead,
    /// Rewritten often by the GPU, used many times by the GPU.
    DynamicCopy,
}

impl BufferUsage {
    /// Returns `true` if the CPU is expected to write the buffer repeatedly.
    pub const fn is_dynamic(self) -> bool {
        matches!(self, Self::DynamicDraw | Self::DynamicRead | Self::DynamicCopy)
    }
}

/// A descriptor used to create any kind of buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The size of the buffer in bytes.
    pub number_of_bytes: u32,
    /// Initial contents. When set, its length must equal `number_of_bytes`;
    /// otherwise the buffer starts zeroed.
    pub data: Option<&'a [u8]>,
    /// Additional binding flags.
    pub flags: BufferFlags,
    /// Update frequency hint.
    pub usage: BufferUsage,
}

impl<'a> BufferDescriptor<'a> {
    /// Describes a buffer initialized with `data`.
    pub fn with_data(data: &'a [u8]) -> Self {
        Self {
            number_of_bytes: data.len() as u32,
            data: Some(data),
            ..Self::default()
        }
    }

    /// Describes a zeroed buffer of `number_of_bytes` bytes.
    pub fn zeroed(number_of_bytes: u32) -> Self {
        Self {
            number_of_bytes,
            ..Self::default()
        }
    }

    /// Sets the debug label.
    pub fn label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the usage hint.
    pub fn usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Sets the binding flags.
    pub fn flags(mut self, flags: BufferFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The label, or an empty string.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Checks the structural rules every backend shares.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.number_of_bytes == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "buffer size must not be zero".to_owned(),
            ));
        }
        if let Some(data) = self.data {
            if data.len() != self.number_of_bytes as usize {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "initial data is {} bytes but the buffer is {} bytes",
                    data.len(),
                    self.number_of_bytes
                )));
            }
        }
        Ok(())
    }
}

/// A GPU buffer of any kind.
pub trait Buffer: Resource {
    /// The size of the buffer in bytes.
    fn number_of_bytes(&self) -> u32;

    /// The binding flags the buffer was created with.
    fn flags(&self) -> BufferFlags;

    /// The usage hint the buffer was created with.
    fn usage(&self) -> BufferUsage;
}

/// A buffer of vertex indices.
pub trait IndexBuffer: Buffer {
    /// The element type of the indices.
    fn format(&self) -> IndexBufferFormat;

    /// The number of indices the buffer holds.
    fn number_of_indices(&self) -> u32 {
        self.number_of_bytes() / self.format().number_of_bytes_per_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_size_from_data() {
        let vertices = [0u8; 48];
        let descriptor = BufferDescriptor::with_data(&vertices)
            .label("triangle")
            .usage(BufferUsage::DynamicDraw);
        assert_eq!(descriptor.number_of_bytes, 48);
        assert_eq!(descriptor.label_str(), "triangle");
        assert!(descriptor.usage.is_dynamic());
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn validation_rejects_inconsistent_sizes() {
        assert!(matches!(
            BufferDescriptor::zeroed(0).validate(),
            Err(ResourceError::InvalidDescriptor(_))
        ));

        let data = [1u8; 8];
        let descriptor = BufferDescriptor {
            number_of_bytes: 16,
            data: Some(&data),
            ..BufferDescriptor::default()
        };
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn flags_combine() {
        let flags = BufferFlags::SHADER_RESOURCE | BufferFlags::DRAW_ARGUMENTS;
        assert!(flags.contains(BufferFlags::DRAW_ARGUMENTS));
        assert!(!flags.contains(BufferFlags::UNORDERED_ACCESS));
    }
}
