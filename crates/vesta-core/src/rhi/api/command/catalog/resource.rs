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

//! Resource operations: mipmaps, resolves, copies and uniform uploads.

use super::impl_command;
use crate::rhi::api::command::{CommandBuffer, Packet};
use crate::rhi::api::resource::{
    Buffer, Framebuffer, GraphicsProgram, Resource, ResourceId, Texture,
};
use bytemuck::{Pod, Zeroable};

/// Restricts the mipmap levels a texture exposes to shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetTextureMinimumMaximumMipmapIndex {
    /// The texture.
    pub texture: ResourceId,
    /// Most detailed accessible mipmap.
    pub minimum_mipmap_index: u32,
    /// Least detailed accessible mipmap.
    pub maximum_mipmap_index: u32,
}

impl SetTextureMinimumMaximumMipmapIndex {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        texture: &dyn Texture,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) {
        debug_assert!(
            minimum_mipmap_index <= maximum_mipmap_index,
            "minimum mipmap index {minimum_mipmap_index} above maximum {maximum_mipmap_index}"
        );
        command_buffer.add_command(Self {
            texture: texture.id(),
            minimum_mipmap_index,
            maximum_mipmap_index,
        });
    }
}

/// Resolves a multisampled framebuffer into a single-sampled render target.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ResolveMultisampleFramebuffer {
    /// The single-sampled destination.
    pub destination_render_target: ResourceId,
    /// The multisampled source.
    pub source_multisample_framebuffer: ResourceId,
}

impl ResolveMultisampleFramebuffer {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        destination_render_target: &dyn Framebuffer,
        source_multisample_framebuffer: &dyn Framebuffer,
    ) {
        command_buffer.add_command(Self {
            destination_render_target: destination_render_target.id(),
            source_multisample_framebuffer: source_multisample_framebuffer.id(),
        });
    }
}

/// Copies the whole contents of one resource into another of the same shape.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CopyResource {
    /// Copy destination.
    pub destination_resource: ResourceId,
    /// Copy source.
    pub source_resource: ResourceId,
}

impl CopyResource {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        destination_resource: &dyn Resource,
        source_resource: &dyn Resource,
    ) {
        command_buffer.add_command(Self {
            destination_resource: destination_resource.id(),
            source_resource: source_resource.id(),
        });
    }
}

/// Generates the mipmap chain of a texture from its top level.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct GenerateMipmaps {
    /// The texture.
    pub texture: ResourceId,
}

impl GenerateMipmaps {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer, texture: &dyn Texture) {
        command_buffer.add_command(Self {
            texture: texture.id(),
        });
    }
}

/// Uploads bytes to the start of a uniform buffer. The bytes travel in
/// auxiliary memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CopyUniformBufferData {
    /// The destination uniform buffer.
    pub uniform_buffer: ResourceId,
    /// Number of bytes in auxiliary memory.
    pub number_of_bytes: u32,
    #[doc(hidden)]
    pub _padding: u32,
}

impl CopyUniformBufferData {
    /// Records the upload of `data`, which must not be empty.
    pub fn create(command_buffer: &mut CommandBuffer, uniform_buffer: &dyn Buffer, data: &[u8]) {
        debug_assert!(!data.is_empty(), "uploading zero bytes");
        let (_, auxiliary) = command_buffer.add_command_with_auxiliary(
            Self {
                uniform_buffer: uniform_buffer.id(),
                number_of_bytes: data.len() as u32,
                _padding: 0,
            },
            data.len() as u32,
        );
        auxiliary.copy_from_slice(data);
    }

    /// The uploaded bytes of a recorded packet.
    pub fn data<'a>(packet: &Packet<'a>) -> &'a [u8] {
        let command = packet.command::<Self>();
        &packet.auxiliary_bytes::<Self>()[..command.number_of_bytes as usize]
    }
}

/// The value layout of a [`SetUniform`] command.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// One `i32`.
    Int1,
    /// One `f32`.
    Float1,
    /// Two `f32`s.
    Float2,
    /// Three `f32`s.
    Float3,
    /// Four `f32`s.
    Float4,
    /// A column-major 3x3 `f32` matrix.
    Matrix3x3,
    /// A column-major 4x4 `f32` matrix.
    Matrix4x4,
}

impl UniformKind {
    /// Number of 32-bit components of the value.
    pub const fn number_of_components(self) -> usize {
        match self {
            Self::Int1 | Self::Float1 => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
            Self::Matrix3x3 => 9,
            Self::Matrix4x4 => 16,
        }
    }

    /// Converts a raw [`SetUniform::kind`] value.
    pub const fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Int1,
            1 => Self::Float1,
            2 => Self::Float2,
            3 => Self::Float3,
            4 => Self::Float4,
            5 => Self::Matrix3x3,
            6 => Self::Matrix4x4,
            _ => return None,
        })
    }
}

/// Sets an individual uniform of a graphics program, for backends without
/// uniform buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetUniform {
    /// The program owning the uniform.
    pub graphics_program: ResourceId,
    /// Handle returned by [`GraphicsProgram::uniform_handle`].
    pub uniform_handle: u32,
    /// Raw [`UniformKind`].
    pub kind: u32,
    /// Components as raw bits; only the first
    /// [`UniformKind::number_of_components`] are meaningful.
    pub value: [u32; 16],
}

impl SetUniform {
    fn record(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        kind: UniformKind,
        components: &[u32],
    ) {
        debug_assert_eq!(components.len(), kind.number_of_components());
        let mut value = [0u32; 16];
        value[..components.len()].copy_from_slice(components);
        command_buffer.add_command(Self {
            graphics_program: graphics_program.id(),
            uniform_handle,
            kind: kind as u32,
            value,
        });
    }

    fn record_floats(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        kind: UniformKind,
        values: &[f32],
    ) {
        let bits = Self::float_bits(values);
        Self::record(
            command_buffer,
            graphics_program,
            uniform_handle,
            kind,
            &bits[..values.len()],
        );
    }

    /// Packs up to 16 floats into the command's component array.
    fn float_bits(values: &[f32]) -> [u32; 16] {
        let mut bits = [0u32; 16];
        for (component, value) in bits.iter_mut().zip(values) {
            *component = value.to_bits();
        }
        bits
    }

    /// Records the command into `command_buffer`.
    pub fn create_1i(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        value: i32,
    ) {
        Self::record(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformKind::Int1,
            &[value as u32],
        );
    }

    /// Records the command into `command_buffer`.
    pub fn create_1f(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        value: f32,
    ) {
        Self::record_floats(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformKind::Float1,
            &[value],
        );
    }

    /// Records the command into `command_buffer`.
    pub fn create_2fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        value: [f32; 2],
    ) {
        Self::record_floats(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformKind::Float2,
            &value,
        );
    }

    /// Records the command into `command_buffer`.
    pub fn create_3fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        value: [f32; 3],
    ) {
        Self::record_floats(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformKind::Float3,
            &value,
        );
    }

    /// Records the command into `command_buffer`.
    pub fn create_4fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        value: [f32; 4],
    ) {
        Self::record_floats(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformKind::Float4,
            &value,
        );
    }

    /// Records the command into `command_buffer`.
    pub fn create_matrix_3fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        value: [f32; 9],
    ) {
        Self::record_floats(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformKind::Matrix3x3,
            &value,
        );
    }

    /// Records the command into `command_buffer`.
    pub fn create_matrix_4fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &dyn GraphicsProgram,
        uniform_handle: u32,
        value: [f32; 16],
    ) {
        Self::record_floats(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformKind::Matrix4x4,
            &value,
        );
    }

    /// The recorded value layout, `None` if corrupt.
    pub fn uniform_kind(&self) -> Option<UniformKind> {
        UniformKind::from_u32(self.kind)
    }

    /// The meaningful components reinterpreted as `f32`s.
    pub fn float_values(&self) -> Vec<f32> {
        let count = self.uniform_kind().map_or(0, UniformKind::number_of_components);
        self.value[..count].iter().map(|bits| f32::from_bits(*bits)).collect()
    }

    /// The first component reinterpreted as an `i32`.
    pub fn int_value(&self) -> i32 {
        self.value[0] as i32
    }
}

impl_command!(
    SetTextureMinimumMaximumMipmapIndex => SetTextureMinimumMaximumMipmapIndex,
    ResolveMultisampleFramebuffer => ResolveMultisampleFramebuffer,
    CopyResource => CopyResource,
    GenerateMipmaps => GenerateMipmaps,
    CopyUniformBufferData => CopyUniformBufferData,
    SetUniform => SetUniform,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_kinds_round_trip_their_raw_value() {
        for kind in [
            UniformKind::Int1,
            UniformKind::Float1,
            UniformKind::Float2,
            UniformKind::Float3,
            UniformKind::Float4,
            UniformKind::Matrix3x3,
            UniformKind::Matrix4x4,
        ] {
            assert_eq!(UniformKind::from_u32(kind as u32), Some(kind));
        }
        assert_eq!(UniformKind::from_u32(7), None);
        assert_eq!(UniformKind::Matrix3x3.number_of_components(), 9);
    }

    #[test]
    fn set_uniform_value_bits() {
        let command = SetUniform {
            graphics_program: ResourceId(1),
            uniform_handle: 0,
            kind: UniformKind::Float2 as u32,
            value: {
                let mut value = [0; 16];
                value[0] = 1.5f32.to_bits();
                value[1] = (-2.0f32).to_bits();
                value
            },
        };
        assert_eq!(command.float_values(), [1.5, -2.0]);
        let negative = SetUniform {
            kind: UniformKind::Int1 as u32,
            value: [(-7i32) as u32; 16],
            ..command
        };
        assert_eq!(negative.int_value(), -7);
    }

    #[test]
    fn float_components_fill_the_value_array() {
        let matrix: [f32; 16] = std::array::from_fn(|index| index as f32 * 0.5);
        let bits = SetUniform::float_bits(&matrix);
        assert!(bits
            .iter()
            .zip(matrix)
            .all(|(bits, value)| f32::from_bits(*bits) == value));

        let bits = SetUniform::float_bits(&[1.0, -1.0, 0.25]);
        assert_eq!(bits[2], 0.25f32.to_bits());
        assert!(bits[3..].iter().all(|bits| *bits == 0));
    }
}
