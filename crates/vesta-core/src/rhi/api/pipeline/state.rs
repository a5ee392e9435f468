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

//! Fixed-function state of a graphics pipeline.
//!
//! Every default matches the Direct3D 12 default state so descriptors written
//! against one backend port to the others unchanged.

use super::enums::*;
use crate::rhi::api::util::ComparisonFunc;
use crate::vesta_bitflags;

/// Maximum number of color attachments a blend state describes.
pub const MAXIMUM_NUMBER_OF_RENDER_TARGETS: usize = 8;

/// Rasterizer state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    /// How polygons are rasterized.
    pub fill_mode: FillMode,
    /// Which faces are culled.
    pub cull_mode: CullMode,
    /// Counter-clockwise triangles are front faces.
    pub front_counter_clockwise: bool,
    /// Constant depth added to every fragment.
    pub depth_bias: i32,
    /// Maximum depth bias.
    pub depth_bias_clamp: f32,
    /// Depth bias scaled by the fragment's slope.
    pub slope_scaled_depth_bias: f32,
    /// Clip fragments against the depth range.
    pub depth_clip_enable: bool,
    /// Use quadrilateral line antialiasing on multisampled targets.
    pub multisample_enable: bool,
    /// Antialias lines.
    pub antialiased_line_enable: bool,
    /// Sample count forced while rendering, 0 to disable.
    pub forced_sample_count: u32,
    /// Rasterize every pixel a primitive touches.
    pub conservative_rasterization: bool,
    /// Discard fragments outside the scissor rectangles.
    pub scissor_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_clip_enable: true,
            multisample_enable: false,
            antialiased_line_enable: false,
            forced_sample_count: 0,
            conservative_rasterization: false,
            scissor_enable: false,
        }
    }
}

/// Stencil operations of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilOpDesc {
    /// Applied when the stencil test fails.
    pub stencil_fail_op: StencilOp,
    /// Applied when the stencil test passes and the depth test fails.
    pub stencil_depth_fail_op: StencilOp,
    /// Applied when both tests pass.
    pub stencil_pass_op: StencilOp,
    /// The stencil test.
    pub stencil_func: ComparisonFunc,
}

impl Default for DepthStencilOpDesc {
    fn default() -> Self {
        Self {
            stencil_fail_op: StencilOp::Keep,
            stencil_depth_fail_op: StencilOp::Keep,
            stencil_pass_op: StencilOp::Keep,
            stencil_func: ComparisonFunc::Always,
        }
    }
}

/// Depth and stencil test state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// Enables the depth test.
    pub depth_enable: bool,
    /// Whether passing fragments write depth.
    pub depth_write_mask: DepthWriteMask,
    /// The depth test.
    pub depth_func: ComparisonFunc,
    /// Enables the stencil test.
    pub stencil_enable: bool,
    /// Mask applied when reading stencil values.
    pub stencil_read_mask: u8,
    /// Mask applied when writing stencil values.
    pub stencil_write_mask: u8,
    /// Stencil operations of front faces.
    pub front_face: DepthStencilOpDesc,
    /// Stencil operations of back faces.
    pub back_face: DepthStencilOpDesc,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write_mask: DepthWriteMask::All,
            depth_func: ComparisonFunc::Less,
            stencil_enable: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            front_face: DepthStencilOpDesc::default(),
            back_face: DepthStencilOpDesc::default(),
        }
    }
}

vesta_bitflags! {
    /// Color channels written by a render target.
    pub struct ColorWriteEnable: u8 {
        /// Red channel.
        const RED = 1 << 0;
        /// Green channel.
        const GREEN = 1 << 1;
        /// Blue channel.
        const BLUE = 1 << 2;
        /// Alpha channel.
        const ALPHA = 1 << 3;
        /// Every channel.
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

/// Blend state of one color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendDesc {
    /// Enables blending.
    pub blend_enable: bool,
    /// Source color factor.
    pub src_blend: Blend,
    /// Destination color factor.
    pub dest_blend: Blend,
    /// Color combination.
    pub blend_op: BlendOp,
    /// Source alpha factor.
    pub src_blend_alpha: Blend,
    /// Destination alpha factor.
    pub dest_blend_alpha: Blend,
    /// Alpha combination.
    pub blend_op_alpha: BlendOp,
    /// Written channels.
    pub render_target_write_mask: ColorWriteEnable,
}

impl Default for RenderTargetBlendDesc {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_blend: Blend::One,
            dest_blend: Blend::Zero,
            blend_op: BlendOp::Add,
            src_blend_alpha: Blend::One,
            dest_blend_alpha: Blend::Zero,
            blend_op_alpha: BlendOp::Add,
            render_target_write_mask: ColorWriteEnable::ALL,
        }
    }
}

impl RenderTargetBlendDesc {
    /// Classic "source over" alpha blending.
    pub fn alpha_blending() -> Self {
        Self {
            blend_enable: true,
            src_blend: Blend::SrcAlpha,
            dest_blend: Blend::InvSrcAlpha,
            src_blend_alpha: Blend::One,
            dest_blend_alpha: Blend::InvSrcAlpha,
            ..Self::default()
        }
    }
}

/// Blend state of every color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendState {
    /// Use the alpha channel as a multisample coverage mask.
    pub alpha_to_coverage_enable: bool,
    /// Use a different blend state per attachment. When disabled only the
    /// first entry is used.
    pub independent_blend_enable: bool,
    /// Per-attachment blend state.
    pub render_target: [RenderTargetBlendDesc; MAXIMUM_NUMBER_OF_RENDER_TARGETS],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_direct3d12() {
        let rasterizer = RasterizerState::default();
        assert_eq!(rasterizer.cull_mode, CullMode::Back);
        assert!(rasterizer.depth_clip_enable);
        assert!(!rasterizer.front_counter_clockwise);

        let depth_stencil = DepthStencilState::default();
        assert!(depth_stencil.depth_enable);
        assert_eq!(depth_stencil.depth_func, ComparisonFunc::Less);
        assert_eq!(depth_stencil.front_face.stencil_func, ComparisonFunc::Always);

        let blend = BlendState::default();
        assert!(!blend.render_target[7].blend_enable);
        assert_eq!(blend.render_target[0].src_blend, Blend::One);
        assert_eq!(
            blend.render_target[0].render_target_write_mask,
            ColorWriteEnable::ALL
        );
    }

    #[test]
    fn topology_classes() {
        assert_eq!(
            PrimitiveTopology::LineStrip.topology_type(),
            PrimitiveTopologyType::Line
        );
        assert_eq!(
            PrimitiveTopology::PatchList(3).topology_type(),
            PrimitiveTopologyType::Patch
        );
    }
}
