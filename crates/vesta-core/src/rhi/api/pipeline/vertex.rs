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

//! Vertex input layout and vertex arrays.

use crate::rhi::api::core::Ref;
use crate::rhi::api::resource::{Buffer, IndexBuffer, Resource, ResourceType};
use crate::rhi::error::ResourceError;
use std::borrow::Cow;

/// The memory format of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// One 32-bit float.
    Float1,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Four 8-bit unsigned integers normalized to `[0, 1]`.
    R8G8B8A8Unorm,
    /// Four 8-bit unsigned integers.
    R8G8B8A8Uint,
    /// Two 16-bit signed integers.
    Short2,
    /// Four 16-bit signed integers.
    Short4,
    /// One 32-bit unsigned integer.
    Uint1,
}

impl VertexAttributeFormat {
    /// Size of one attribute in bytes.
    pub const fn number_of_bytes(self) -> u32 {
        match self {
            Self::Float1 | Self::Uint1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::R8G8B8A8Unorm | Self::R8G8B8A8Uint | Self::Short2 => 4,
            Self::Short4 => 8,
        }
    }
}

/// One attribute of the vertex input layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute<'a> {
    /// The memory format of the attribute.
    pub format: VertexAttributeFormat,
    /// Attribute name as seen by shaders without semantics.
    pub name: Cow<'a, str>,
    /// Semantic name as seen by shaders with semantics.
    pub semantic_name: Cow<'a, str>,
    /// Semantic index.
    pub semantic_index: u32,
    /// The vertex buffer slot the attribute is read from.
    pub input_slot: u32,
    /// Byte offset of the attribute inside one vertex.
    pub aligned_byte_offset: u32,
    /// Byte distance between two consecutive vertices of the slot.
    pub stride_in_bytes: u32,
    /// Number of instances drawn before advancing, 0 for per-vertex data.
    pub instances_per_element: u32,
}

impl<'a> VertexAttribute<'a> {
    /// A per-vertex attribute.
    pub fn new(
        format: VertexAttributeFormat,
        name: impl Into<Cow<'a, str>>,
        semantic_name: impl Into<Cow<'a, str>>,
        input_slot: u32,
        aligned_byte_offset: u32,
        stride_in_bytes: u32,
    ) -> Self {
        Self {
            format,
            name: name.into(),
            semantic_name: semantic_name.into(),
            semantic_index: 0,
            input_slot,
            aligned_byte_offset,
            stride_in_bytes,
            instances_per_element: 0,
        }
    }

    /// Copies every borrowed field so the attribute outlives its descriptor.
    pub fn into_owned(self) -> VertexAttribute<'static> {
        VertexAttribute {
            format: self.format,
            name: Cow::Owned(self.name.into_owned()),
            semantic_name: Cow::Owned(self.semantic_name.into_owned()),
            semantic_index: self.semantic_index,
            input_slot: self.input_slot,
            aligned_byte_offset: self.aligned_byte_offset,
            stride_in_bytes: self.stride_in_bytes,
            instances_per_element: self.instances_per_element,
        }
    }
}

/// Checks a vertex input layout against the number of bound vertex buffers.
pub fn validate_vertex_attributes(
    attributes: &[VertexAttribute<'_>],
    number_of_vertex_buffers: u32,
) -> Result<(), ResourceError> {
    for attribute in attributes {
        if attribute.input_slot >= number_of_vertex_buffers {
            return Err(ResourceError::InvalidDescriptor(format!(
                "attribute '{}' reads input slot {} but only {} vertex buffer(s) exist",
                attribute.name, attribute.input_slot, number_of_vertex_buffers
            )));
        }
        if attribute.stride_in_bytes != 0
            && attribute.aligned_byte_offset + attribute.format.number_of_bytes()
                > attribute.stride_in_bytes
        {
            return Err(ResourceError::InvalidDescriptor(format!(
                "attribute '{}' does not fit into a {}-byte vertex",
                attribute.name, attribute.stride_in_bytes
            )));
        }
    }
    Ok(())
}

/// A descriptor used to create a vertex array.
#[derive(Debug, Clone)]
pub struct VertexArrayDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The vertex input layout.
    pub vertex_attributes: Cow<'a, [VertexAttribute<'a>]>,
    /// Vertex buffers, one per input slot.
    pub vertex_buffers: Cow<'a, [Ref<dyn Buffer>]>,
    /// Optional index buffer.
    pub index_buffer: Option<&'a Ref<dyn IndexBuffer>>,
}

impl VertexArrayDescriptor<'_> {
    /// Checks the buffers and the layout.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if let Some(buffer) = self
            .vertex_buffers
            .iter()
            .find(|buffer| buffer.resource_type() != ResourceType::VertexBuffer)
        {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{} {} is not a vertex buffer",
                buffer.resource_type(),
                buffer.id()
            )));
        }
        validate_vertex_attributes(&self.vertex_attributes, self.vertex_buffers.len() as u32)
    }
}

/// Vertex buffers, layout and optional index buffer bound together.
pub trait VertexArray: Resource {
    /// The vertex buffers, one per input slot.
    fn vertex_buffers(&self) -> &[Ref<dyn Buffer>];

    /// The index buffer, if any.
    fn index_buffer(&self) -> Option<&Ref<dyn IndexBuffer>>;

    /// The vertex input layout.
    fn vertex_attributes(&self) -> &[VertexAttribute<'static>];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(input_slot: u32) -> VertexAttribute<'static> {
        VertexAttribute::new(
            VertexAttributeFormat::Float3,
            "Position",
            "POSITION",
            input_slot,
            0,
            12,
        )
    }

    #[test]
    fn attributes_must_reference_existing_slots() {
        assert!(validate_vertex_attributes(&[position(0)], 1).is_ok());
        assert!(matches!(
            validate_vertex_attributes(&[position(1)], 1),
            Err(ResourceError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn attributes_must_fit_their_stride() {
        let mut attribute = position(0);
        attribute.aligned_byte_offset = 4;
        assert!(validate_vertex_attributes(&[attribute], 1).is_err());
    }

    #[test]
    fn owned_copy_keeps_every_field() {
        let name = String::from("TexCoord");
        let attribute = VertexAttribute::new(
            VertexAttributeFormat::Float2,
            name.as_str(),
            "TEXCOORD",
            0,
            12,
            20,
        );
        let owned = attribute.clone().into_owned();
        drop(name);
        assert_eq!(owned.name, "TexCoord");
        assert_eq!(owned.aligned_byte_offset, 12);
        assert_eq!(owned.format.number_of_bytes(), 8);
    }
}
