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

//! Command packets: the unit of encoding inside a [`CommandBuffer`].
//!
//! A packet is laid out as
//!
//! ```text
//! +-------------------+----------------+---------------------------+-----------------+
//! | next offset (u32) | dispatch (u32) | payload (size_of::<C>())  | auxiliary bytes |
//! +-------------------+----------------+---------------------------+-----------------+
//! ```
//!
//! Payload and auxiliary bytes are each padded to [`PACKET_ALIGNMENT`], so every
//! header and payload starts 8-byte aligned relative to the arena start. Offsets
//! are relative to the arena start, never absolute, so the arena can move when
//! it grows.
//!
//! [`CommandBuffer`]: super::CommandBuffer

use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::fmt;
use std::mem::size_of;

/// Alignment of every header, payload and auxiliary block inside the arena.
pub const PACKET_ALIGNMENT: usize = 8;

/// Size of the header preceding every payload.
pub const PACKET_HEADER_SIZE: usize = size_of::<PacketHeader>();

/// Sentinel "next offset" of the last packet of a chain.
pub const INVALID_PACKET_OFFSET: u32 = u32::MAX;

/// Rounds `number_of_bytes` up to [`PACKET_ALIGNMENT`].
pub const fn align_to_packet(number_of_bytes: usize) -> usize {
    (number_of_bytes + PACKET_ALIGNMENT - 1) & !(PACKET_ALIGNMENT - 1)
}

/// The header preceding every payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct PacketHeader {
    /// Arena offset of the next packet, [`INVALID_PACKET_OFFSET`] for the last.
    pub next_packet_offset: u32,
    /// Raw [`CommandDispatchFunctionIndex`] of the payload.
    pub dispatch_index: u32,
}

pub(crate) fn read_header(bytes: &[u8], offset: usize) -> PacketHeader {
    bytemuck::pod_read_unaligned(&bytes[offset..offset + PACKET_HEADER_SIZE])
}

pub(crate) fn write_next_packet_offset(bytes: &mut [u8], offset: usize, next_packet_offset: u32) {
    bytes[offset..offset + size_of::<u32>()].copy_from_slice(&next_packet_offset.to_ne_bytes());
}

macro_rules! dispatch_function_indices {
    ($($(#[$attr:meta])* $name:ident,)*) => {
        /// Identifies the backend handler that replays a command.
        ///
        /// Every command type carries one of these as a compile-time constant; the
        /// value is stored in the packet header and selects the handler of a
        /// [`DispatchTable`](super::DispatchTable) at replay time.
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum CommandDispatchFunctionIndex {
            $($(#[$attr])* $name,)*
        }

        impl CommandDispatchFunctionIndex {
            /// Every index, in discriminant order.
            pub const ALL: &'static [CommandDispatchFunctionIndex] = &[$(Self::$name,)*];

            /// Returns the index's name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }
    };
}

dispatch_function_indices! {
    /// Replays a nested command buffer.
    DispatchCommandBuffer,
    /// Binds the graphics root signature.
    SetGraphicsRootSignature,
    /// Binds the graphics pipeline state.
    SetGraphicsPipelineState,
    /// Binds a graphics resource group.
    SetGraphicsResourceGroup,
    /// Binds the vertex array.
    SetGraphicsVertexArray,
    /// Sets the viewports.
    SetGraphicsViewports,
    /// Sets the scissor rectangles.
    SetGraphicsScissorRectangles,
    /// Binds the render target.
    SetGraphicsRenderTarget,
    /// Clears the render target.
    ClearGraphics,
    /// Non-indexed draw.
    DrawGraphics,
    /// Indexed draw.
    DrawIndexedGraphics,
    /// Mesh task draw.
    DrawMeshTasks,
    /// Binds the compute root signature.
    SetComputeRootSignature,
    /// Binds the compute pipeline state.
    SetComputePipelineState,
    /// Binds a compute resource group.
    SetComputeResourceGroup,
    /// Compute dispatch.
    DispatchCompute,
    /// Restricts the accessible mipmap range of a texture.
    SetTextureMinimumMaximumMipmapIndex,
    /// Resolves a multisampled framebuffer.
    ResolveMultisampleFramebuffer,
    /// Copies one resource into another.
    CopyResource,
    /// Generates the mipmap chain of a texture.
    GenerateMipmaps,
    /// Uploads uniform buffer data.
    CopyUniformBufferData,
    /// Sets an individual uniform.
    SetUniform,
    /// Resets queries of a pool.
    ResetQueryPool,
    /// Begins a query.
    BeginQuery,
    /// Ends a query.
    EndQuery,
    /// Writes a timestamp query.
    WriteTimestampQuery,
    /// Sets a debug marker.
    SetDebugMarker,
    /// Begins a debug event.
    BeginDebugEvent,
    /// Ends the innermost debug event.
    EndDebugEvent,
}

impl CommandDispatchFunctionIndex {
    /// Number of dispatch functions.
    pub const COUNT: usize = Self::ALL.len();

    /// The handler slot of this index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Converts a raw header value, `None` if it names no command.
    pub const fn from_u32(value: u32) -> Option<Self> {
        if (value as usize) < Self::COUNT {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }
}

impl TryFrom<u32> for CommandDispatchFunctionIndex {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(value)
    }
}

impl fmt::Display for CommandDispatchFunctionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-layout command record.
///
/// Commands are plain data: they are copied into the arena byte for byte and
/// read back the same way during replay. Resource references are
/// [`ResourceId`](crate::rhi::api::resource::ResourceId)s and do not keep
/// the resources alive; the caller keeps every referenced resource alive until
/// the command buffer is dispatched for the last time.
pub trait Command: Pod {
    /// The handler slot replaying this command.
    const DISPATCH_INDEX: CommandDispatchFunctionIndex;
}

/// A read-only view of one encoded packet.
#[derive(Clone, Copy)]
pub struct Packet<'a> {
    offset: u32,
    header: PacketHeader,
    body: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Arena offset of the packet's header.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The raw dispatch index stored in the header.
    pub fn raw_dispatch_index(&self) -> u32 {
        self.header.dispatch_index
    }

    /// The dispatch index stored in the header, `None` if it is corrupt.
    pub fn dispatch_index(&self) -> Option<CommandDispatchFunctionIndex> {
        CommandDispatchFunctionIndex::from_u32(self.header.dispatch_index)
    }

    /// Arena offset of the next packet, [`INVALID_PACKET_OFFSET`] for the last.
    pub fn next_packet_offset(&self) -> u32 {
        self.header.next_packet_offset
    }

    /// Payload and auxiliary bytes, including alignment padding.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Reads the payload as `C`.
    ///
    /// The dispatch index must be `C`'s.
    pub fn command<C: Command>(&self) -> C {
        debug_assert_eq!(
            self.header.dispatch_index,
            C::DISPATCH_INDEX as u32,
            "packet at offset {} is not a {}",
            self.offset,
            C::DISPATCH_INDEX
        );
        bytemuck::pod_read_unaligned(&self.body[..size_of::<C>()])
    }

    /// The auxiliary bytes following a `C` payload, including the trailing
    /// alignment padding.
    pub fn auxiliary_bytes<C: Command>(&self) -> &'a [u8] {
        &self.body[align_to_packet(size_of::<C>())..]
    }

    /// Reads `count` values of `T` from the auxiliary bytes following a `C`
    /// payload. Borrows when the bytes are suitably aligned, copies otherwise.
    pub fn auxiliary<C: Command, T: Pod>(&self, count: usize) -> Cow<'a, [T]> {
        let bytes = &self.auxiliary_bytes::<C>()[..count * size_of::<T>()];
        match bytemuck::try_cast_slice(bytes) {
            Ok(values) => Cow::Borrowed(values),
            Err(_) => Cow::Owned(
                bytes
                    .chunks_exact(size_of::<T>())
                    .map(bytemuck::pod_read_unaligned)
                    .collect(),
            ),
        }
    }
}

impl fmt::Debug for Packet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Packet");
        debug.field("offset", &self.offset);
        match self.dispatch_index() {
            Some(index) => debug.field("dispatch_index", &index),
            None => debug.field("dispatch_index", &self.header.dispatch_index),
        };
        debug
            .field("next_packet_offset", &self.header.next_packet_offset)
            .field("body_bytes", &self.body.len())
            .finish()
    }
}

/// Walks a packet chain from its first packet to the sentinel.
#[derive(Debug, Clone)]
pub struct Packets<'a> {
    bytes: &'a [u8],
    next: u32,
}

impl<'a> Packets<'a> {
    /// Walks the chain encoded in `bytes`, which must end where the last
    /// packet ends. An empty slice is an empty chain.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            next: if bytes.is_empty() {
                INVALID_PACKET_OFFSET
            } else {
                0
            },
        }
    }
}

impl<'a> Iterator for Packets<'a> {
    type Item = Packet<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == INVALID_PACKET_OFFSET {
            return None;
        }
        let offset = self.next as usize;
        let body_start = offset + PACKET_HEADER_SIZE;
        debug_assert!(
            body_start <= self.bytes.len(),
            "broken command packet chain at offset {offset}"
        );
        if body_start > self.bytes.len() {
            log::error!(
                "Command packet offset {offset} is outside of the {}-byte chain",
                self.bytes.len()
            );
            self.next = INVALID_PACKET_OFFSET;
            return None;
        }

        let header = read_header(self.bytes, offset);
        let body_end = if header.next_packet_offset == INVALID_PACKET_OFFSET {
            self.bytes.len()
        } else {
            header.next_packet_offset as usize
        };
        let linked_correctly = body_start <= body_end && body_end <= self.bytes.len();
        debug_assert!(
            linked_correctly,
            "broken command packet chain at offset {offset}"
        );
        if !linked_correctly {
            log::error!(
                "Command packet at offset {offset} links to invalid offset {}",
                header.next_packet_offset
            );
            self.next = INVALID_PACKET_OFFSET;
            return None;
        }

        self.next = header.next_packet_offset;
        Some(Packet {
            offset: offset as u32,
            header,
            body: &self.bytes[body_start..body_end],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_rounds_up_to_eight() {
        assert_eq!(align_to_packet(0), 0);
        assert_eq!(align_to_packet(1), 8);
        assert_eq!(align_to_packet(8), 8);
        assert_eq!(align_to_packet(20), 24);
        assert_eq!(PACKET_HEADER_SIZE, 8);
    }

    #[test]
    fn dispatch_indices_round_trip() {
        assert_eq!(CommandDispatchFunctionIndex::COUNT, 29);
        for (position, index) in CommandDispatchFunctionIndex::ALL.iter().enumerate() {
            assert_eq!(index.index(), position);
            assert_eq!(
                CommandDispatchFunctionIndex::from_u32(position as u32),
                Some(*index)
            );
        }
        assert_eq!(CommandDispatchFunctionIndex::from_u32(29), None);
        assert_eq!(CommandDispatchFunctionIndex::try_from(1000), Err(1000));
        assert_eq!(
            CommandDispatchFunctionIndex::DrawIndexedGraphics.to_string(),
            "DrawIndexedGraphics"
        );
    }

    #[test]
    fn empty_bytes_are_an_empty_chain() {
        assert_eq!(Packets::from_bytes(&[]).count(), 0);
    }
}
