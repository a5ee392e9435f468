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

//! The closed set of resource kinds a device can create.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a GPU-side resource.
///
/// The discriminant doubles as the index into per-kind statistics counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResourceType {
    /// Binding layout of shader-visible resources.
    RootSignature,
    /// A bound set of resources matching one root signature slot.
    ResourceGroup,
    /// Linked set of shaders forming a graphics program.
    GraphicsProgram,
    /// Vertex buffers, attribute layout and optional index buffer.
    VertexArray,
    /// Attachment formats of a render target.
    RenderPass,
    /// Pool of GPU queries.
    QueryPool,
    /// Offscreen render target built from textures.
    Framebuffer,
    /// Index buffer.
    IndexBuffer,
    /// Vertex buffer.
    VertexBuffer,
    /// Formatted buffer readable as a texture.
    TextureBuffer,
    /// Buffer of fixed-stride structures.
    StructuredBuffer,
    /// Buffer holding indirect draw or dispatch arguments.
    IndirectBuffer,
    /// Uniform (constant) buffer.
    UniformBuffer,
    /// One-dimensional texture.
    Texture1D,
    /// Array of one-dimensional textures.
    Texture1DArray,
    /// Two-dimensional texture.
    Texture2D,
    /// Array of two-dimensional textures.
    Texture2DArray,
    /// Volume texture.
    Texture3D,
    /// Cube map.
    TextureCube,
    /// Array of cube maps.
    TextureCubeArray,
    /// Graphics pipeline state object.
    GraphicsPipelineState,
    /// Compute pipeline state object.
    ComputePipelineState,
    /// Sampler state object.
    SamplerState,
    /// Vertex shader.
    VertexShader,
    /// Tessellation control (hull) shader.
    TessellationControlShader,
    /// Tessellation evaluation (domain) shader.
    TessellationEvaluationShader,
    /// Geometry shader.
    GeometryShader,
    /// Fragment (pixel) shader.
    FragmentShader,
    /// Task (amplification) shader.
    TaskShader,
    /// Mesh shader.
    MeshShader,
    /// Compute shader.
    ComputeShader,
}

impl ResourceType {
    /// Number of resource kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Every resource kind, in discriminant order.
    pub const ALL: [ResourceType; 31] = [
        Self::RootSignature,
        Self::ResourceGroup,
        Self::GraphicsProgram,
        Self::VertexArray,
        Self::RenderPass,
        Self::QueryPool,
        Self::Framebuffer,
        Self::IndexBuffer,
        Self::VertexBuffer,
        Self::TextureBuffer,
        Self::StructuredBuffer,
        Self::IndirectBuffer,
        Self::UniformBuffer,
        Self::Texture1D,
        Self::Texture1DArray,
        Self::Texture2D,
        Self::Texture2DArray,
        Self::Texture3D,
        Self::TextureCube,
        Self::TextureCubeArray,
        Self::GraphicsPipelineState,
        Self::ComputePipelineState,
        Self::SamplerState,
        Self::VertexShader,
        Self::TessellationControlShader,
        Self::TessellationEvaluationShader,
        Self::GeometryShader,
        Self::FragmentShader,
        Self::TaskShader,
        Self::MeshShader,
        Self::ComputeShader,
    ];

    /// Returns the counter index of this kind.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns a stable, human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::RootSignature => "root signature",
            Self::ResourceGroup => "resource group",
            Self::GraphicsProgram => "graphics program",
            Self::VertexArray => "vertex array",
            Self::RenderPass => "render pass",
            Self::QueryPool => "query pool",
            Self::Framebuffer => "framebuffer",
            Self::IndexBuffer => "index buffer",
            Self::VertexBuffer => "vertex buffer",
            Self::TextureBuffer => "texture buffer",
            Self::StructuredBuffer => "structured buffer",
            Self::IndirectBuffer => "indirect buffer",
            Self::UniformBuffer => "uniform buffer",
            Self::Texture1D => "1D texture",
            Self::Texture1DArray => "1D texture array",
            Self::Texture2D => "2D texture",
            Self::Texture2DArray => "2D texture array",
            Self::Texture3D => "3D texture",
            Self::TextureCube => "cube texture",
            Self::TextureCubeArray => "cube texture array",
            Self::GraphicsPipelineState => "graphics pipeline state",
            Self::ComputePipelineState => "compute pipeline state",
            Self::SamplerState => "sampler state",
            Self::VertexShader => "vertex shader",
            Self::TessellationControlShader => "tessellation control shader",
            Self::TessellationEvaluationShader => "tessellation evaluation shader",
            Self::GeometryShader => "geometry shader",
            Self::FragmentShader => "fragment shader",
            Self::TaskShader => "task shader",
            Self::MeshShader => "mesh shader",
            Self::ComputeShader => "compute shader",
        }
    }

    /// Returns `true` for every buffer kind, index buffers included.
    pub const fn is_buffer(self) -> bool {
        matches!(
            self,
            Self::IndexBuffer
                | Self::VertexBuffer
                | Self::TextureBuffer
                | Self::StructuredBuffer
                | Self::IndirectBuffer
                | Self::UniformBuffer
        )
    }

    /// Returns `true` for every texture kind.
    pub const fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture1D
                | Self::Texture1DArray
                | Self::Texture2D
                | Self::Texture2DArray
                | Self::Texture3D
                | Self::TextureCube
                | Self::TextureCubeArray
        )
    }

    /// Returns `true` for every shader kind.
    pub const fn is_shader(self) -> bool {
        matches!(
            self,
            Self::VertexShader
                | Self::TessellationControlShader
                | Self::TessellationEvaluationShader
                | Self::GeometryShader
                | Self::FragmentShader
                | Self::TaskShader
                | Self::MeshShader
                | Self::ComputeShader
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_discriminant_order() {
        for (index, resource_type) in ResourceType::ALL.iter().enumerate() {
            assert_eq!(resource_type.index(), index, "{resource_type} out of order");
        }
        assert_eq!(ResourceType::COUNT, 31);
    }

    #[test]
    fn categories_do_not_overlap() {
        for resource_type in ResourceType::ALL {
            let categories = [
                resource_type.is_buffer(),
                resource_type.is_texture(),
                resource_type.is_shader(),
            ];
            assert!(categories.iter().filter(|c| **c).count() <= 1);
        }
        assert!(ResourceType::IndirectBuffer.is_buffer());
        assert!(ResourceType::TextureCubeArray.is_texture());
        assert!(ResourceType::MeshShader.is_shader());
        assert!(!ResourceType::SamplerState.is_buffer());
    }
}
