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

//! Sampler state objects.

use super::Resource;
use crate::rhi::api::core::Capabilities;
use crate::rhi::api::util::ComparisonFunc;
use crate::rhi::error::ResourceError;

/// Minification, magnification and mipmap filtering, in Direct3D order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Point sampling for every stage.
    MinMagMipPoint,
    /// Point minification and magnification, linear mipmap blending.
    MinMagPointMipLinear,
    /// Point minification, linear magnification, point mipmap selection.
    MinPointMagLinearMipPoint,
    /// Point minification, linear magnification and mipmap blending.
    MinPointMagMipLinear,
    /// Linear minification, point magnification and mipmap selection.
    MinLinearMagMipPoint,
    /// Linear minification, point magnification, linear mipmap blending.
    MinLinearMagPointMipLinear,
    /// Linear minification and magnification, point mipmap selection.
    MinMagLinearMipPoint,
    /// Linear sampling for every stage.
    #[default]
    MinMagMipLinear,
    /// Anisotropic sampling.
    Anisotropic,
    /// [`FilterMode::MinMagMipPoint`] comparing against a reference value.
    ComparisonMinMagMipPoint,
    /// [`FilterMode::MinMagPointMipLinear`] comparing against a reference value.
    ComparisonMinMagPointMipLinear,
    /// [`FilterMode::MinPointMagLinearMipPoint`] comparing against a reference value.
    ComparisonMinPointMagLinearMipPoint,
    /// [`FilterMode::MinPointMagMipLinear`] comparing against a reference value.
    ComparisonMinPointMagMipLinear,
    /// [`FilterMode::MinLinearMagMipPoint`] comparing against a reference value.
    ComparisonMinLinearMagMipPoint,
    /// [`FilterMode::MinLinearMagPointMipLinear`] comparing against a reference value.
    ComparisonMinLinearMagPointMipLinear,
    /// [`FilterMode::MinMagLinearMipPoint`] comparing against a reference value.
    ComparisonMinMagLinearMipPoint,
    /// [`FilterMode::MinMagMipLinear`] comparing against a reference value.
    ComparisonMinMagMipLinear,
    /// [`FilterMode::Anisotropic`] comparing against a reference value.
    ComparisonAnisotropic,
}

impl FilterMode {
    /// Returns `true` for comparison filters, used by shadow map samplers.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::ComparisonMinMagMipPoint
                | Self::ComparisonMinMagPointMipLinear
                | Self::ComparisonMinPointMagLinearMipPoint
                | Self::ComparisonMinPointMagMipLinear
                | Self::ComparisonMinLinearMagMipPoint
                | Self::ComparisonMinLinearMagPointMipLinear
                | Self::ComparisonMinMagLinearMipPoint
                | Self::ComparisonMinMagMipLinear
                | Self::ComparisonAnisotropic
        )
    }

    /// Returns `true` for anisotropic filters.
    pub const fn is_anisotropic(self) -> bool {
        matches!(self, Self::Anisotropic | Self::ComparisonAnisotropic)
    }
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureAddressMode {
    /// Coordinates wrap around.
    Wrap,
    /// Coordinates wrap around, mirroring at every integer boundary.
    Mirror,
    /// Coordinates are clamped to the edge.
    #[default]
    Clamp,
    /// Coordinates outside the range sample the border color.
    Border,
    /// The absolute value is taken, then clamped to the edge.
    MirrorOnce,
}

/// A descriptor used to create a sampler state object.
///
/// The default value matches the Direct3D default sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerStateDescriptor {
    /// Filtering of every stage.
    pub filter: FilterMode,
    /// Addressing of the U coordinate.
    pub address_u: TextureAddressMode,
    /// Addressing of the V coordinate.
    pub address_v: TextureAddressMode,
    /// Addressing of the W coordinate.
    pub address_w: TextureAddressMode,
    /// Offset added to the computed mipmap level.
    pub mip_lod_bias: f32,
    /// Maximum anisotropy, used by anisotropic filters.
    pub max_anisotropy: u32,
    /// Comparison of comparison filters.
    pub comparison_func: ComparisonFunc,
    /// RGBA border color of [`TextureAddressMode::Border`].
    pub border_color: [f32; 4],
    /// Lowest mipmap level that may be accessed.
    pub min_lod: f32,
    /// Highest mipmap level that may be accessed.
    pub max_lod: f32,
}

impl Default for SamplerStateDescriptor {
    fn default() -> Self {
        Self {
            filter: FilterMode::MinMagMipLinear,
            address_u: TextureAddressMode::Clamp,
            address_v: TextureAddressMode::Clamp,
            address_w: TextureAddressMode::Clamp,
            mip_lod_bias: 0.0,
            max_anisotropy: 16,
            comparison_func: ComparisonFunc::Never,
            border_color: [0.0; 4],
            min_lod: -f32::MAX,
            max_lod: f32::MAX,
        }
    }
}

impl SamplerStateDescriptor {
    /// Checks the descriptor against structural rules and device limits.
    pub fn validate(&self, capabilities: &Capabilities) -> Result<(), ResourceError> {
        if self.min_lod > self.max_lod {
            return Err(ResourceError::InvalidDescriptor(format!(
                "min_lod {} is above max_lod {}",
                self.min_lod, self.max_lod
            )));
        }
        if self.filter.is_anisotropic() && self.max_anisotropy > capabilities.maximum_anisotropy {
            return Err(ResourceError::CapabilityExceeded {
                what: "anisotropy",
                requested: self.max_anisotropy,
                maximum: capabilities.maximum_anisotropy,
            });
        }
        Ok(())
    }
}

/// A sampler state object.
pub trait SamplerState: Resource {
    /// The descriptor the sampler was created from.
    fn descriptor(&self) -> &SamplerStateDescriptor;
}
