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

//! Texture resources and their descriptors.

use super::{Resource, ResourceType};
use crate::rhi::api::util::TextureFormat;
use crate::rhi::error::ResourceError;
use crate::vesta_bitflags;
use std::borrow::Cow;

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1,
    /// An array of one-dimensional textures.
    D1Array,
    /// A two-dimensional texture.
    #[default]
    D2,
    /// An array of two-dimensional textures.
    D2Array,
    /// A three-dimensional (volumetric) texture.
    D3,
    /// A cube map (six square two-dimensional faces).
    Cube,
    /// An array of cube maps.
    CubeArray,
}

impl TextureDimension {
    /// The resource kind of a texture with this dimension.
    pub const fn resource_type(self) -> ResourceType {
        match self {
            Self::D1 => ResourceType::Texture1D,
            Self::D1Array => ResourceType::Texture1DArray,
            Self::D2 => ResourceType::Texture2D,
            Self::D2Array => ResourceType::Texture2DArray,
            Self::D3 => ResourceType::Texture3D,
            Self::Cube => ResourceType::TextureCube,
            Self::CubeArray => ResourceType::TextureCubeArray,
        }
    }

    /// Returns `true` for array dimensions.
    pub const fn is_array(self) -> bool {
        matches!(self, Self::D1Array | Self::D2Array | Self::CubeArray)
    }

    /// Returns `true` for cube dimensions.
    pub const fn is_cube(self) -> bool {
        matches!(self, Self::Cube | Self::CubeArray)
    }
}

vesta_bitflags! {
    /// How a texture may be used besides being sampled.
    pub struct TextureFlags: u32 {
        /// The texture can be bound as a shader resource.
        const SHADER_RESOURCE = 1 << 0;
        /// The texture can be bound for unordered (read/write) shader access.
        const UNORDERED_ACCESS = 1 << 1;
        /// The texture can be a framebuffer attachment.
        const RENDER_TARGET = 1 << 2;
        /// The full mipmap chain is allocated and generated from level 0.
        const GENERATE_MIPMAPS = 1 << 3;
        /// The initial data holds every mipmap level, largest first.
        const DATA_CONTAINS_MIPMAPS = 1 << 4;
    }
}

/// Expected CPU and GPU access pattern of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureUsage {
    /// Read and written by the GPU.
    #[default]
    Default,
    /// Initialized at creation and only read by the GPU afterwards.
    Immutable,
    /// Written by the CPU every frame, read by the GPU.
    Dynamic,
    /// Used to transfer data between the GPU and the CPU.
    Staging,
}

/// The clear value a backend may optimize render target clears for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizedTextureClearValue {
    /// RGBA clear color of a color attachment.
    Color([f32; 4]),
    /// Depth and stencil clear values of a depth attachment.
    DepthStencil {
        /// Depth clear value.
        depth: f32,
        /// Stencil clear value.
        stencil: u32,
    },
}

/// Returns the number of mipmap levels of a full chain for the given extent.
pub fn number_of_mipmaps(width: u32, height: u32, depth: u32) -> u32 {
    let largest = width.max(height).max(depth).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Returns the size of one axis at the given mipmap level, never below one.
pub fn mipmap_size(size: u32, mipmap_index: u32) -> u32 {
    size.checked_shr(mipmap_index).unwrap_or(0).max(1)
}

/// A descriptor used to create a texture.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// Width in texels.
    pub width: u32,
    /// Height in texels. Must be 1 for 1D textures.
    pub height: u32,
    /// Depth in texels. Must be 1 for everything but 3D textures.
    pub depth: u32,
    /// Number of array slices; number of cubes for cube arrays. Must be 1 for
    /// non-array textures.
    pub number_of_slices: u32,
    /// The texel format.
    pub format: TextureFormat,
    /// Initial contents, slice after slice. With
    /// [`TextureFlags::DATA_CONTAINS_MIPMAPS`] each slice holds its full
    /// mipmap chain.
    pub data: Option<&'a [u8]>,
    /// Additional usages.
    pub flags: TextureFlags,
    /// Access pattern hint.
    pub usage: TextureUsage,
    /// Number of samples per texel. Only 2D textures may be multisampled.
    pub number_of_multisamples: u32,
    /// The clear value render target clears are optimized for.
    pub optimized_clear_value: Option<OptimizedTextureClearValue>,
}

impl Default for TextureDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            dimension: TextureDimension::D2,
            width: 1,
            height: 1,
            depth: 1,
            number_of_slices: 1,
            format: TextureFormat::R8G8B8A8,
            data: None,
            flags: TextureFlags::SHADER_RESOURCE,
            usage: TextureUsage::Default,
            number_of_multisamples: 1,
            optimized_clear_value: None,
        }
    }
}

impl<'a> TextureDescriptor<'a> {
    /// Describes a 2D texture.
    pub fn texture_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            ..Self::default()
        }
    }

    /// Describes a cube map with square faces of `width` texels.
    pub fn texture_cube(width: u32, format: TextureFormat) -> Self {
        Self {
            dimension: TextureDimension::Cube,
            width,
            height: width,
            format,
            ..Self::default()
        }
    }

    /// Sets the debug label.
    pub fn label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, or an empty string.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Number of faces per slice: six for cube dimensions, one otherwise.
    pub fn number_of_faces(&self) -> u32 {
        if self.dimension.is_cube() {
            6
        } else {
            1
        }
    }

    /// Number of mipmap levels the texture gets.
    pub fn number_of_mipmaps(&self) -> u32 {
        if self
            .flags
            .intersects(TextureFlags::GENERATE_MIPMAPS | TextureFlags::DATA_CONTAINS_MIPMAPS)
        {
            number_of_mipmaps(self.width, self.height, self.depth)
        } else {
            1
        }
    }

    /// Total number of bytes of every slice, face and mipmap level.
    pub fn number_of_bytes(&self) -> u64 {
        let per_face: u64 = (0..self.number_of_mipmaps())
            .map(|mipmap| {
                let width = mipmap_size(self.width, mipmap);
                let height = mipmap_size(self.height, mipmap);
                let depth = mipmap_size(self.depth, mipmap);
                u64::from(self.format.number_of_bytes_per_slice(width, height)) * u64::from(depth)
            })
            .sum();
        per_face * u64::from(self.number_of_faces()) * u64::from(self.number_of_slices)
    }

    /// Number of bytes the initial data must have.
    pub fn number_of_initial_data_bytes(&self) -> u64 {
        if self.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS) {
            self.number_of_bytes()
        } else {
            u64::from(self.format.number_of_bytes_per_slice(self.width, self.height))
                * u64::from(self.depth)
                * u64::from(self.number_of_faces())
                * u64::from(self.number_of_slices)
        }
    }

    /// Summarizes the descriptor into the properties a texture keeps.
    pub fn info(&self) -> TextureInfo {
        TextureInfo {
            dimension: self.dimension,
            width: self.width,
            height: self.height,
            depth: self.depth,
            number_of_slices: self.number_of_slices,
            format: self.format,
            number_of_mipmaps: self.number_of_mipmaps(),
            number_of_multisamples: self.number_of_multisamples,
            flags: self.flags,
            usage: self.usage,
        }
    }

    /// Checks the structural rules every backend shares.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let invalid = |message: String| Err(ResourceError::InvalidDescriptor(message));

        if self.format == TextureFormat::Unknown {
            return invalid("texture format must be known".to_owned());
        }
        if self.width == 0 || self.height == 0 || self.depth == 0 || self.number_of_slices == 0 {
            return invalid(format!(
                "texture extent {}x{}x{} with {} slice(s) has a zero axis",
                self.width, self.height, self.depth, self.number_of_slices
            ));
        }
        if matches!(self.dimension, TextureDimension::D1 | TextureDimension::D1Array)
            && self.height != 1
        {
            return invalid("1D textures must have a height of 1".to_owned());
        }
        if self.dimension != TextureDimension::D3 && self.depth != 1 {
            return invalid(format!("{:?} textures must have a depth of 1", self.dimension));
        }
        if !self.dimension.is_array() && self.number_of_slices != 1 {
            return invalid(format!(
                "{:?} textures must have exactly one slice",
                self.dimension
            ));
        }
        if self.dimension.is_cube() && self.width != self.height {
            return invalid(format!(
                "cube faces must be square, got {}x{}",
                self.width, self.height
            ));
        }
        if !matches!(self.number_of_multisamples, 1 | 2 | 4 | 8) {
            return invalid(format!(
                "{} is not a valid multisample count",
                self.number_of_multisamples
            ));
        }
        if self.number_of_multisamples > 1 {
            if self.dimension != TextureDimension::D2 {
                return invalid("only 2D textures can be multisampled".to_owned());
            }
            if self.number_of_mipmaps() > 1 {
                return invalid("multisampled textures cannot have mipmaps".to_owned());
            }
            if self.data.is_some() {
                return invalid("multisampled textures cannot have initial data".to_owned());
            }
        }
        if self.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS) && self.data.is_none() {
            return invalid("DATA_CONTAINS_MIPMAPS requires initial data".to_owned());
        }
        if let Some(data) = self.data {
            let expected = self.number_of_initial_data_bytes();
            if data.len() as u64 != expected {
                return invalid(format!(
                    "initial data is {} bytes but the texture needs {expected}",
                    data.len()
                ));
            }
        }
        Ok(())
    }
}

/// The creation-time properties of a texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureInfo {
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels.
    pub depth: u32,
    /// Number of array slices.
    pub number_of_slices: u32,
    /// The texel format.
    pub format: TextureFormat,
    /// Number of mipmap levels.
    pub number_of_mipmaps: u32,
    /// Number of samples per texel.
    pub number_of_multisamples: u32,
    /// Additional usages.
    pub flags: TextureFlags,
    /// Access pattern hint.
    pub usage: TextureUsage,
}

/// A GPU texture of any dimension.
pub trait Texture: Resource {
    /// The creation-time properties of the texture.
    fn info(&self) -> &TextureInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mipmap_chain_length() {
        assert_eq!(number_of_mipmaps(1, 1, 1), 1);
        assert_eq!(number_of_mipmaps(256, 256, 1), 9);
        assert_eq!(number_of_mipmaps(300, 17, 1), 9);
        assert_eq!(number_of_mipmaps(0, 0, 0), 1);
        assert_eq!(mipmap_size(256, 3), 32);
        assert_eq!(mipmap_size(5, 4), 1);
        assert_eq!(mipmap_size(5, 40), 1);
    }

    #[test]
    fn byte_counts_include_mipmaps_and_faces() {
        let mut descriptor = TextureDescriptor::texture_2d(4, 4, TextureFormat::R8G8B8A8);
        assert_eq!(descriptor.number_of_bytes(), 64);

        descriptor.flags = TextureFlags::GENERATE_MIPMAPS;
        // 4x4 + 2x2 + 1x1 texels.
        assert_eq!(descriptor.number_of_bytes(), (16 + 4 + 1) * 4);
        assert_eq!(descriptor.number_of_initial_data_bytes(), 64);

        let cube = TextureDescriptor::texture_cube(8, TextureFormat::R8);
        assert_eq!(cube.number_of_bytes(), 8 * 8 * 6);
    }

    #[test]
    fn validation_rejects_malformed_textures() {
        let mut cube = TextureDescriptor::texture_cube(8, TextureFormat::R8);
        cube.height = 4;
        assert!(matches!(
            cube.validate(),
            Err(ResourceError::InvalidDescriptor(_))
        ));

        let mut multisampled = TextureDescriptor::texture_2d(64, 64, TextureFormat::R8G8B8A8);
        multisampled.number_of_multisamples = 4;
        assert!(multisampled.validate().is_ok());
        multisampled.number_of_multisamples = 3;
        assert!(multisampled.validate().is_err());

        let mut one_dimensional = TextureDescriptor::texture_2d(64, 2, TextureFormat::R8);
        one_dimensional.dimension = TextureDimension::D1;
        assert!(one_dimensional.validate().is_err());
    }

    #[test]
    fn initial_data_must_match_the_extent() {
        let data = vec![0u8; 16 * 16 * 4];
        let mut descriptor = TextureDescriptor::texture_2d(16, 16, TextureFormat::R8G8B8A8);
        descriptor.data = Some(&data);
        assert!(descriptor.validate().is_ok());

        descriptor.width = 8;
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn dimension_maps_to_resource_type() {
        assert_eq!(
            TextureDimension::CubeArray.resource_type(),
            ResourceType::TextureCubeArray
        );
        assert!(TextureDimension::D2Array.is_array());
        assert!(!TextureDimension::D3.is_cube());
    }
}
