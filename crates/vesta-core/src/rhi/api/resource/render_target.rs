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

//! Render passes and framebuffers.

use super::{mipmap_size, Resource, Texture, TextureFlags};
use crate::rhi::api::core::{Capabilities, Ref};
use crate::rhi::api::util::TextureFormat;
use crate::rhi::error::ResourceError;
use std::borrow::Cow;

/// A descriptor used to create a render pass: the attachment formats a
/// render target must match.
#[derive(Debug, Clone)]
pub struct RenderPassDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Formats of the color attachments, in slot order.
    pub color_attachment_formats: Cow<'a, [TextureFormat]>,
    /// Format of the depth attachment, [`TextureFormat::Unknown`] for none.
    pub depth_stencil_attachment_format: TextureFormat,
    /// Number of samples of every attachment.
    pub number_of_multisamples: u32,
}

impl Default for RenderPassDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            color_attachment_formats: Cow::Borrowed(&[]),
            depth_stencil_attachment_format: TextureFormat::Unknown,
            number_of_multisamples: 1,
        }
    }
}

impl RenderPassDescriptor<'_> {
    /// Checks the descriptor against structural rules and device limits.
    pub fn validate(&self, capabilities: &Capabilities) -> Result<(), ResourceError> {
        let number_of_color_attachments = self.color_attachment_formats.len() as u32;
        if number_of_color_attachments > capabilities.maximum_number_of_simultaneous_render_targets
        {
            return Err(ResourceError::CapabilityExceeded {
                what: "simultaneous render targets",
                requested: number_of_color_attachments,
                maximum: capabilities.maximum_number_of_simultaneous_render_targets,
            });
        }
        if self.number_of_multisamples > capabilities.maximum_number_of_multisamples {
            return Err(ResourceError::CapabilityExceeded {
                what: "multisamples",
                requested: self.number_of_multisamples,
                maximum: capabilities.maximum_number_of_multisamples,
            });
        }
        if self.number_of_multisamples == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "a render pass needs at least one sample".to_owned(),
            ));
        }
        if let Some(format) = self
            .color_attachment_formats
            .iter()
            .find(|format| **format == TextureFormat::Unknown || format.is_depth())
        {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{format:?} is not a color attachment format"
            )));
        }
        let depth = self.depth_stencil_attachment_format;
        if depth != TextureFormat::Unknown && !depth.is_depth() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{depth:?} is not a depth attachment format"
            )));
        }
        Ok(())
    }
}

/// The attachment layout render targets are created against.
pub trait RenderPass: Resource {
    /// Formats of the color attachments, in slot order.
    fn color_attachment_formats(&self) -> &[TextureFormat];

    /// Format of the depth attachment, [`TextureFormat::Unknown`] for none.
    fn depth_stencil_attachment_format(&self) -> TextureFormat;

    /// Number of samples of every attachment.
    fn number_of_multisamples(&self) -> u32;

    /// Number of color attachments.
    fn number_of_color_attachments(&self) -> u32 {
        self.color_attachment_formats().len() as u32
    }
}

/// One texture subresource bound to a framebuffer slot.
#[derive(Debug, Clone, Copy)]
pub struct FramebufferAttachment<'a> {
    /// The attached texture. It must have [`TextureFlags::RENDER_TARGET`].
    pub texture: &'a Ref<dyn Texture>,
    /// The mipmap level rendered to.
    pub mipmap_index: u32,
    /// The array slice, cube face or 3D depth slice rendered to.
    pub layer_index: u32,
}

impl<'a> FramebufferAttachment<'a> {
    /// Attaches mipmap 0 of layer 0 of `texture`.
    pub fn new(texture: &'a Ref<dyn Texture>) -> Self {
        Self {
            texture,
            mipmap_index: 0,
            layer_index: 0,
        }
    }
}

/// A descriptor used to create a framebuffer.
#[derive(Debug, Clone)]
pub struct FramebufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The render pass the attachments must match.
    pub render_pass: &'a Ref<dyn RenderPass>,
    /// Color attachments, one per color format of the render pass.
    pub color_attachments: Cow<'a, [FramebufferAttachment<'a>]>,
    /// Depth attachment, required if the render pass has a depth format.
    pub depth_stencil_attachment: Option<FramebufferAttachment<'a>>,
}

impl FramebufferDescriptor<'_> {
    /// Checks the attachments against the render pass and against each other.
    ///
    /// Returns the width and height shared by every attachment.
    pub fn validate(&self) -> Result<(u32, u32), ResourceError> {
        let render_pass = &**self.render_pass;
        let formats = render_pass.color_attachment_formats();
        if formats.len() != self.color_attachments.len() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "the render pass has {} color attachment(s) but {} were given",
                formats.len(),
                self.color_attachments.len()
            )));
        }
        let expects_depth = render_pass.depth_stencil_attachment_format() != TextureFormat::Unknown;
        if expects_depth != self.depth_stencil_attachment.is_some() {
            return Err(ResourceError::InvalidDescriptor(
                "depth attachment does not match the render pass".to_owned(),
            ));
        }

        let mut size = None;
        let attachments = self
            .color_attachments
            .iter()
            .zip(formats.iter().copied())
            .chain(
                self.depth_stencil_attachment
                    .iter()
                    .map(|attachment| (attachment, render_pass.depth_stencil_attachment_format())),
            );
        for (attachment, format) in attachments {
            let info = attachment.texture.info();
            if !info.flags.contains(TextureFlags::RENDER_TARGET) {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "texture {} is not a render target",
                    attachment.texture.id()
                )));
            }
            if info.format != format {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "texture {} is {:?} but the render pass expects {format:?}",
                    attachment.texture.id(),
                    info.format
                )));
            }
            if info.number_of_multisamples != render_pass.number_of_multisamples() {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "texture {} has {} sample(s) but the render pass expects {}",
                    attachment.texture.id(),
                    info.number_of_multisamples,
                    render_pass.number_of_multisamples()
                )));
            }
            if attachment.mipmap_index >= info.number_of_mipmaps {
                return Err(ResourceError::OutOfBounds);
            }
            let number_of_layers = if info.dimension.is_cube() {
                info.number_of_slices * 6
            } else {
                info.number_of_slices.max(info.depth)
            };
            if attachment.layer_index >= number_of_layers {
                return Err(ResourceError::OutOfBounds);
            }

            let attachment_size = (
                mipmap_size(info.width, attachment.mipmap_index),
                mipmap_size(info.height, attachment.mipmap_index),
            );
            match size {
                None => size = Some(attachment_size),
                Some(expected) if expected != attachment_size => {
                    return Err(ResourceError::InvalidDescriptor(format!(
                        "attachment sizes differ: {expected:?} and {attachment_size:?}"
                    )));
                }
                Some(_) => {}
            }
        }

        size.ok_or_else(|| {
            ResourceError::InvalidDescriptor("a framebuffer needs at least one attachment".to_owned())
        })
    }
}

/// An offscreen render target built from textures.
pub trait Framebuffer: Resource {
    /// The render pass the framebuffer was created against.
    fn render_pass(&self) -> &Ref<dyn RenderPass>;

    /// Width and height shared by every attachment.
    fn width_and_height(&self) -> (u32, u32);
}
