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

//! The command packet encoder.

use super::packet::{
    align_to_packet, read_header, write_next_packet_offset, Command, PacketHeader, Packets,
    INVALID_PACKET_OFFSET, PACKET_ALIGNMENT, PACKET_HEADER_SIZE,
};
use crate::rhi::traits::GraphicsDevice;
use std::fmt;
use std::mem::{align_of, size_of};

/// Bytes reserved on top of the incoming packet whenever the arena grows.
pub const GROWTH_INCREMENT: u32 = 8192;

/// Upper bound of the bytes a command buffer may encode.
///
/// Packet offsets are stored as `u32` and [`INVALID_PACKET_OFFSET`] is reserved
/// for the sentinel, which caps a buffer at just under 4 GiB.
pub const MAXIMUM_NUMBER_OF_BYTES: u32 = INVALID_PACKET_OFFSET - 1;

/// A growable flat arena of command packets.
///
/// Commands are recorded back to back with [`add_command`], replayed in
/// recording order by [`dispatch_to_rhi`] and can be replayed any number of
/// times until [`clear`] is called. Clearing keeps the arena's capacity, so a
/// buffer recorded every frame stops allocating after its first few frames.
///
/// A command buffer is not synchronized; record each one from a single thread.
///
/// [`add_command`]: CommandBuffer::add_command
/// [`dispatch_to_rhi`]: CommandBuffer::dispatch_to_rhi
/// [`clear`]: CommandBuffer::clear
pub struct CommandBuffer {
    // `u64` words keep the arena base aligned to `PACKET_ALIGNMENT`.
    arena: Vec<u64>,
    previous_command_offset: u32,
    current_command_offset: u32,
    growth_increment: u32,
    number_of_growths: u32,
    number_of_commands: u32,
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuffer {
    /// Creates an empty command buffer. No memory is allocated until the first
    /// command is recorded.
    pub const fn new() -> Self {
        Self::with_growth_increment(GROWTH_INCREMENT)
    }

    /// Creates an empty command buffer growing by `growth_increment` extra
    /// bytes, rounded up to the packet alignment, on every reallocation.
    pub const fn with_growth_increment(growth_increment: u32) -> Self {
        Self {
            arena: Vec::new(),
            previous_command_offset: INVALID_PACKET_OFFSET,
            current_command_offset: 0,
            growth_increment: align_to_packet(growth_increment as usize) as u32,
            number_of_growths: 0,
            number_of_commands: 0,
        }
    }

    /// Returns `true` if no command was recorded since creation or the last
    /// [`clear`](Self::clear).
    pub fn is_empty(&self) -> bool {
        self.previous_command_offset == INVALID_PACKET_OFFSET
    }

    /// Number of commands recorded since creation or the last clear.
    pub fn number_of_commands(&self) -> u32 {
        self.number_of_commands
    }

    /// Number of bytes currently encoded.
    pub fn number_of_bytes(&self) -> u32 {
        self.current_command_offset
    }

    /// Number of bytes the arena can hold without growing.
    pub fn capacity(&self) -> usize {
        self.arena.len() * size_of::<u64>()
    }

    /// Number of times the arena was reallocated.
    pub fn number_of_growths(&self) -> u32 {
        self.number_of_growths
    }

    /// The encoded packet chain, from the first packet to the end of the last.
    pub fn command_packet_buffer(&self) -> &[u8] {
        let bytes: &[u8] = bytemuck::cast_slice(&self.arena);
        &bytes[..self.current_command_offset as usize]
    }

    /// Walks the recorded packets in recording order.
    pub fn packets(&self) -> Packets<'_> {
        Packets::from_bytes(self.command_packet_buffer())
    }

    /// Records `command` and returns it for in-place adjustments.
    ///
    /// The returned reference is only valid until the next command is
    /// recorded, which may move the arena.
    pub fn add_command<C: Command>(&mut self, command: C) -> &mut C {
        self.add_command_with_auxiliary(command, 0).0
    }

    /// Records `command` followed by `number_of_auxiliary_bytes` zeroed bytes.
    ///
    /// Returns the recorded command and its auxiliary memory, in which
    /// variable-length data such as inline draw arguments is written.
    pub fn add_command_with_auxiliary<C: Command>(
        &mut self,
        command: C,
        number_of_auxiliary_bytes: u32,
    ) -> (&mut C, &mut [u8]) {
        const {
            assert!(
                align_of::<C>() <= PACKET_ALIGNMENT,
                "commands must not be aligned beyond the packet alignment"
            )
        };

        let payload_size = align_to_packet(size_of::<C>());
        let packet_size =
            PACKET_HEADER_SIZE + payload_size + align_to_packet(number_of_auxiliary_bytes as usize);
        let offset = self.current_command_offset as usize;
        let end = offset + packet_size;
        debug_assert!(
            end <= MAXIMUM_NUMBER_OF_BYTES as usize,
            "command buffer exceeds {MAXIMUM_NUMBER_OF_BYTES} bytes"
        );
        if end > self.capacity() {
            self.grow(packet_size);
        }

        let previous = self.previous_command_offset;
        self.previous_command_offset = offset as u32;
        self.current_command_offset = end as u32;
        self.number_of_commands += 1;

        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.arena);
        if previous != INVALID_PACKET_OFFSET {
            write_next_packet_offset(bytes, previous as usize, offset as u32);
        }
        let packet = &mut bytes[offset..end];
        // Cleared buffers reuse their arena; padding must not leak old bytes.
        packet.fill(0);
        let header = PacketHeader {
            next_packet_offset: INVALID_PACKET_OFFSET,
            dispatch_index: C::DISPATCH_INDEX as u32,
        };
        packet[..PACKET_HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(&header));

        let (payload, auxiliary) = packet[PACKET_HEADER_SIZE..].split_at_mut(payload_size);
        let slot: &mut C = bytemuck::from_bytes_mut(&mut payload[..size_of::<C>()]);
        *slot = command;
        (slot, &mut auxiliary[..number_of_auxiliary_bytes as usize])
    }

    fn grow(&mut self, packet_size: usize) {
        let new_capacity = self.capacity() + packet_size + self.growth_increment as usize;
        log::trace!(
            "Growing command buffer from {} to {new_capacity} bytes",
            self.capacity()
        );
        self.arena.resize(new_capacity / size_of::<u64>(), 0);
        self.number_of_growths += 1;
    }

    /// Forgets every recorded command. The arena's capacity is kept.
    pub fn clear(&mut self) {
        self.previous_command_offset = INVALID_PACKET_OFFSET;
        self.current_command_offset = 0;
        self.number_of_commands = 0;
    }

    /// Replays the recorded commands on `device`. The buffer is left intact
    /// and may be dispatched again.
    pub fn dispatch_to_rhi(&self, device: &dyn GraphicsDevice) {
        device.dispatch_command_buffer(self);
    }

    /// Replays the recorded commands on `device`, then clears the buffer.
    pub fn dispatch_to_rhi_and_clear(&mut self, device: &dyn GraphicsDevice) {
        self.dispatch_to_rhi(device);
        self.clear();
    }

    /// Appends a copy of every command of this buffer to `other`.
    ///
    /// The packets are copied in one block and their offsets rebased onto
    /// `other`'s arena; `other`'s existing commands stay first. This buffer
    /// must not be empty.
    pub fn append_to_command_buffer(&self, other: &mut CommandBuffer) {
        debug_assert!(!self.is_empty(), "appending an empty command buffer");
        if self.is_empty() {
            return;
        }

        let source = self.command_packet_buffer();
        let base = other.current_command_offset as usize;
        let end = base + source.len();
        debug_assert!(
            end <= MAXIMUM_NUMBER_OF_BYTES as usize,
            "command buffer exceeds {MAXIMUM_NUMBER_OF_BYTES} bytes"
        );
        if end > other.capacity() {
            other.grow(source.len());
        }

        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut other.arena);
        bytes[base..end].copy_from_slice(source);

        // Rebase the copied chain.
        let mut offset = base;
        loop {
            let next = read_header(bytes, offset).next_packet_offset;
            if next == INVALID_PACKET_OFFSET {
                break;
            }
            let rebased = next + base as u32;
            write_next_packet_offset(bytes, offset, rebased);
            offset = rebased as usize;
        }

        if other.previous_command_offset != INVALID_PACKET_OFFSET {
            write_next_packet_offset(bytes, other.previous_command_offset as usize, base as u32);
        }
        other.previous_command_offset = base as u32 + self.previous_command_offset;
        other.current_command_offset = end as u32;
        other.number_of_commands += self.number_of_commands;
    }

    /// Appends every command of this buffer to `other`, then clears this buffer.
    pub fn append_to_command_buffer_and_clear(&mut self, other: &mut CommandBuffer) {
        self.append_to_command_buffer(other);
        self.clear();
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("number_of_commands", &self.number_of_commands)
            .field("number_of_bytes", &self.current_command_offset)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::api::command::catalog::*;
    use crate::rhi::api::command::packet::CommandDispatchFunctionIndex as Index;
    use crate::rhi::api::resource::ResourceId;

    fn dispatch_indices(buffer: &CommandBuffer) -> Vec<Index> {
        buffer
            .packets()
            .map(|packet| packet.dispatch_index().unwrap())
            .collect()
    }

    #[test]
    fn new_buffer_is_empty() {
        let buffer = CommandBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.packets().count(), 0);
        assert!(buffer.command_packet_buffer().is_empty());
    }

    #[test]
    fn chain_visits_every_recorded_command() {
        let mut buffer = CommandBuffer::new();
        for n in 0..10 {
            DispatchCompute::create(&mut buffer, n, 1, 1);
            assert!(!buffer.is_empty());
        }
        assert_eq!(buffer.number_of_commands(), 10);

        let packets: Vec<_> = buffer.packets().collect();
        assert_eq!(packets.len(), 10);
        for (n, packet) in packets.iter().enumerate() {
            assert_eq!(packet.command::<DispatchCompute>().group_count_x, n as u32);
        }
        assert_eq!(
            packets.last().unwrap().next_packet_offset(),
            INVALID_PACKET_OFFSET
        );
    }

    #[test]
    fn returned_command_is_the_stored_command() {
        let mut buffer = CommandBuffer::new();
        let command = buffer.add_command(CopyResource {
            destination_resource: ResourceId(1),
            source_resource: ResourceId(2),
        });
        command.source_resource = ResourceId(3);

        let packet = buffer.packets().next().unwrap();
        let stored = packet.command::<CopyResource>();
        assert_eq!(stored.destination_resource, ResourceId(1));
        assert_eq!(stored.source_resource, ResourceId(3));
        assert_eq!(
            packet.body().len(),
            std::mem::size_of::<CopyResource>()
        );
    }

    #[test]
    fn auxiliary_memory_follows_the_payload() {
        let mut buffer = CommandBuffer::new();
        let (_, auxiliary) = buffer.add_command_with_auxiliary(
            CopyUniformBufferData {
                uniform_buffer: ResourceId(9),
                number_of_bytes: 5,
                _padding: 0,
            },
            5,
        );
        assert_eq!(auxiliary.len(), 5);
        assert!(auxiliary.iter().all(|byte| *byte == 0));
        auxiliary.copy_from_slice(b"vesta");
        buffer.add_command(GenerateMipmaps { texture: ResourceId(4) });

        let packet = buffer.packets().next().unwrap();
        assert_eq!(
            &packet.auxiliary_bytes::<CopyUniformBufferData>()[..5],
            b"vesta"
        );
        // Header, 16-byte payload and 5 auxiliary bytes padded to 8.
        assert_eq!(buffer.packets().nth(1).unwrap().offset(), 8 + 16 + 8);
    }

    #[test]
    fn clear_is_idempotent_and_keeps_capacity() {
        let mut buffer = CommandBuffer::new();
        buffer.clear();
        assert!(buffer.is_empty());

        EndDebugEvent::create(&mut buffer);
        let capacity = buffer.capacity();
        buffer.clear();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.number_of_commands(), 0);
        assert_eq!(buffer.capacity(), capacity);
        assert_eq!(buffer.packets().count(), 0);

        EndDebugEvent::create(&mut buffer);
        assert_eq!(buffer.packets().count(), 1);
        assert_eq!(buffer.number_of_growths(), 1);
    }

    #[test]
    fn append_rebases_offsets_and_keeps_order() {
        let mut source = CommandBuffer::new();
        DispatchCompute::create(&mut source, 1, 2, 3);
        BeginDebugEvent::create(&mut source, "append");
        EndDebugEvent::create(&mut source);

        let mut destination = CommandBuffer::new();
        ClearGraphics::create(&mut destination, ClearFlags::COLOR, [0.0; 4], 1.0, 0);
        destination.add_command(GenerateMipmaps { texture: ResourceId(5) });

        source.append_to_command_buffer(&mut destination);
        assert_eq!(destination.number_of_commands(), 5);
        assert_eq!(
            dispatch_indices(&destination),
            [
                Index::ClearGraphics,
                Index::GenerateMipmaps,
                Index::DispatchCompute,
                Index::BeginDebugEvent,
                Index::EndDebugEvent,
            ]
        );
        let appended = destination.packets().nth(3).unwrap();
        assert_eq!(appended.command::<BeginDebugEvent>().name(), "append");

        // Recording after an append links to the appended tail.
        destination.add_command(GenerateMipmaps { texture: ResourceId(6) });
        assert_eq!(destination.packets().count(), 6);

        // The source is untouched and may be appended again.
        assert_eq!(source.packets().count(), 3);
        source.append_to_command_buffer_and_clear(&mut destination);
        assert!(source.is_empty());
        assert_eq!(destination.packets().count(), 9);
    }

    #[test]
    fn append_into_an_empty_buffer() {
        let mut source = CommandBuffer::new();
        DispatchCompute::create(&mut source, 8, 8, 1);
        let mut destination = CommandBuffer::new();
        source.append_to_command_buffer(&mut destination);
        assert_eq!(dispatch_indices(&destination), [Index::DispatchCompute]);
        assert_eq!(destination.command_packet_buffer(), source.command_packet_buffer());
    }

    #[test]
    fn growth_happens_once_per_overflow() {
        let mut buffer = CommandBuffer::with_growth_increment(64);
        // Every DispatchCompute packet is 8 + 16 bytes.
        DispatchCompute::create(&mut buffer, 0, 0, 0);
        assert_eq!(buffer.number_of_growths(), 1);
        assert_eq!(buffer.capacity(), 24 + 64);

        // 88 bytes hold three packets, the fourth overflows.
        DispatchCompute::create(&mut buffer, 1, 0, 0);
        DispatchCompute::create(&mut buffer, 2, 0, 0);
        assert_eq!(buffer.number_of_growths(), 1);
        DispatchCompute::create(&mut buffer, 3, 0, 0);
        assert_eq!(buffer.number_of_growths(), 2);
        assert_eq!(buffer.capacity(), 88 + 24 + 64);

        let xs: Vec<u32> = buffer
            .packets()
            .map(|packet| packet.command::<DispatchCompute>().group_count_x)
            .collect();
        assert_eq!(xs, [0, 1, 2, 3]);
    }

    #[test]
    fn thousands_of_commands_survive_growth() {
        let mut buffer = CommandBuffer::new();
        for n in 0..2000u32 {
            if n % 2 == 0 {
                DispatchCompute::create(&mut buffer, n, 1, 1);
            } else {
                buffer.add_command(GenerateMipmaps {
                    texture: ResourceId(u64::from(n)),
                });
            }
        }
        assert!(buffer.number_of_growths() > 1);
        assert!(buffer.capacity() > GROWTH_INCREMENT as usize);

        let packets: Vec<_> = buffer.packets().collect();
        assert_eq!(packets.len(), 2000);
        // The 1,000th command was recorded with n = 999.
        let thousandth = &packets[999];
        assert_eq!(
            thousandth.dispatch_index(),
            Some(Index::GenerateMipmaps)
        );
        assert_eq!(
            thousandth.command::<GenerateMipmaps>().texture,
            ResourceId(999)
        );
    }
}
