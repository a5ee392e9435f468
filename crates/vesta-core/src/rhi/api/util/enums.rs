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

//! Generic rendering enums shared by descriptors, commands and backends.

use serde::{Deserialize, Serialize};

/// A backend-agnostic representation of a graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// Vulkan API.
    Vulkan,
    /// Microsoft's Direct3D 12 API.
    Direct3D12,
    /// Microsoft's Direct3D 11 API.
    Direct3D11,
    /// OpenGL API.
    OpenGL,
    /// OpenGL ES 3 API.
    OpenGLES3,
    /// The null backend: validates and tracks everything, renders nothing.
    #[default]
    Null,
}

impl GraphicsBackendType {
    /// Returns the backend's display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vulkan => "Vulkan",
            Self::Direct3D12 => "Direct3D12",
            Self::Direct3D11 => "Direct3D11",
            Self::OpenGL => "OpenGL",
            Self::OpenGLES3 => "OpenGLES3",
            Self::Null => "Null",
        }
    }
}

/// The memory format of texels in a texture or texture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureFormat {
    /// One 8-bit unsigned normalized component.
    R8,
    /// Three 8-bit unsigned normalized components.
    R8G8B8,
    /// Four 8-bit unsigned normalized components.
    R8G8B8A8,
    /// Four 8-bit unsigned normalized components in the sRGB color space.
    R8G8B8A8Srgb,
    /// Four 8-bit unsigned normalized components, blue first.
    B8G8R8A8,
    /// Packed 11/11/10-bit float components.
    R11G11B10F,
    /// Four 16-bit float components.
    R16G16B16A16F,
    /// Four 32-bit float components.
    R32G32B32A32F,
    /// DXT1 block compression, 8 bytes per 4x4 block.
    Bc1,
    /// DXT1 block compression in the sRGB color space.
    Bc1Srgb,
    /// DXT3 block compression, 16 bytes per 4x4 block.
    Bc2,
    /// DXT3 block compression in the sRGB color space.
    Bc2Srgb,
    /// DXT5 block compression, 16 bytes per 4x4 block.
    Bc3,
    /// DXT5 block compression in the sRGB color space.
    Bc3Srgb,
    /// Single channel block compression, 8 bytes per 4x4 block.
    Bc4,
    /// Two channel block compression, 16 bytes per 4x4 block.
    Bc5,
    /// ETC1 block compression, 8 bytes per 4x4 block.
    Etc1,
    /// One 16-bit unsigned normalized component.
    R16Unorm,
    /// One 32-bit unsigned integer component.
    R32Uint,
    /// One 32-bit float component.
    R32Float,
    /// 32-bit float depth.
    D32Float,
    /// Two 16-bit signed normalized components.
    R16G16Snorm,
    /// Two 16-bit float components.
    R16G16Float,
    /// No format; used for "no attachment" slots.
    #[default]
    Unknown,
}

impl TextureFormat {
    /// Returns `true` for block-compressed formats.
    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            Self::Bc1
                | Self::Bc1Srgb
                | Self::Bc2
                | Self::Bc2Srgb
                | Self::Bc3
                | Self::Bc3Srgb
                | Self::Bc4
                | Self::Bc5
                | Self::Etc1
        )
    }

    /// Returns `true` for depth formats.
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::D32Float)
    }

    /// Number of bytes of one element: one texel, or one 4x4 block for
    /// compressed formats.
    pub const fn number_of_bytes_per_element(self) -> u32 {
        match self {
            Self::R8 => 1,
            Self::R8G8B8 => 3,
            Self::R8G8B8A8 | Self::R8G8B8A8Srgb | Self::B8G8R8A8 | Self::R11G11B10F => 4,
            Self::R16G16B16A16F => 8,
            Self::R32G32B32A32F => 16,
            Self::Bc1 | Self::Bc1Srgb | Self::Bc4 | Self::Etc1 => 8,
            Self::Bc2 | Self::Bc2Srgb | Self::Bc3 | Self::Bc3Srgb | Self::Bc5 => 16,
            Self::R16Unorm => 2,
            Self::R32Uint | Self::R32Float | Self::D32Float => 4,
            Self::R16G16Snorm | Self::R16G16Float => 4,
            Self::Unknown => 0,
        }
    }

    /// Number of bytes of one row of `width` texels. For compressed formats a
    /// row is a row of 4x4 blocks.
    pub const fn number_of_bytes_per_row(self, width: u32) -> u32 {
        if self.is_compressed() {
            width.div_ceil(4) * self.number_of_bytes_per_element()
        } else {
            width * self.number_of_bytes_per_element()
        }
    }

    /// Number of bytes of one `width` x `height` slice.
    pub const fn number_of_bytes_per_slice(self, width: u32, height: u32) -> u32 {
        let rows = if self.is_compressed() {
            height.div_ceil(4)
        } else {
            height
        };
        self.number_of_bytes_per_row(width) * rows
    }
}

/// The element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexBufferFormat {
    /// 8-bit indices. Not supported by every backend.
    UnsignedChar,
    /// 16-bit indices.
    #[default]
    UnsignedShort,
    /// 32-bit indices.
    UnsignedInt,
}

impl IndexBufferFormat {
    /// Size of one index in bytes.
    pub const fn number_of_bytes_per_element(self) -> u32 {
        match self {
            Self::UnsignedChar => 1,
            Self::UnsignedShort => 2,
            Self::UnsignedInt => 4,
        }
    }
}

/// A comparison used by depth tests, stencil tests and comparison samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComparisonFunc {
    /// Never passes.
    Never,
    /// Passes if the source is less than the destination.
    #[default]
    Less,
    /// Passes if both are equal.
    Equal,
    /// Passes if the source is less than or equal to the destination.
    LessEqual,
    /// Passes if the source is greater than the destination.
    Greater,
    /// Passes if both differ.
    NotEqual,
    /// Passes if the source is greater than or equal to the destination.
    GreaterEqual,
    /// Always passes.
    Always,
}

/// The pipeline stages a root parameter or descriptor range is visible to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderVisibility {
    /// Every stage.
    #[default]
    All,
    /// Vertex shader only.
    Vertex,
    /// Tessellation control shader only.
    TessellationControl,
    /// Tessellation evaluation shader only.
    TessellationEvaluation,
    /// Geometry shader only.
    Geometry,
    /// Fragment shader only.
    Fragment,
    /// Task shader only.
    Task,
    /// Mesh shader only.
    Mesh,
    /// Every graphics stage.
    AllGraphics,
    /// Compute shader only.
    Compute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_row_and_slice_sizes() {
        assert_eq!(TextureFormat::R8G8B8A8.number_of_bytes_per_row(64), 256);
        assert_eq!(
            TextureFormat::R32G32B32A32F.number_of_bytes_per_slice(4, 4),
            256
        );
        assert_eq!(TextureFormat::R8G8B8.number_of_bytes_per_slice(3, 2), 18);
        assert_eq!(TextureFormat::Unknown.number_of_bytes_per_row(100), 0);
    }

    #[test]
    fn compressed_sizes_round_up_to_whole_blocks() {
        assert!(TextureFormat::Bc1.is_compressed());
        assert_eq!(TextureFormat::Bc1.number_of_bytes_per_row(1), 8);
        assert_eq!(TextureFormat::Bc1.number_of_bytes_per_row(5), 16);
        assert_eq!(TextureFormat::Bc3.number_of_bytes_per_slice(8, 8), 64);
        assert_eq!(TextureFormat::Bc5.number_of_bytes_per_slice(6, 1), 32);
    }

    #[test]
    fn depth_and_index_formats() {
        assert!(TextureFormat::D32Float.is_depth());
        assert!(!TextureFormat::R32Float.is_depth());
        assert_eq!(IndexBufferFormat::UnsignedInt.number_of_bytes_per_element(), 4);
        assert_eq!(IndexBufferFormat::default(), IndexBufferFormat::UnsignedShort);
    }

    #[test]
    fn backend_names() {
        assert_eq!(GraphicsBackendType::default(), GraphicsBackendType::Null);
        assert_eq!(GraphicsBackendType::Direct3D12.name(), "Direct3D12");
    }
}
