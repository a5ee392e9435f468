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

//! Command buffer composition.

use super::impl_command;
use crate::rhi::api::command::{CommandBuffer, Packet, Packets};
use bytemuck::{Pod, Zeroable};

/// Replays another command buffer in place.
///
/// The nested buffer's packet chain is copied into this packet's auxiliary
/// memory at recording time, so the nested buffer may be cleared or dropped
/// afterwards.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DispatchCommandBuffer {
    /// Size of the nested packet chain.
    pub number_of_bytes: u32,
    #[doc(hidden)]
    pub _padding: u32,
}

impl DispatchCommandBuffer {
    /// Records `command_buffer_to_dispatch`, which must not be empty.
    pub fn create(command_buffer: &mut CommandBuffer, command_buffer_to_dispatch: &CommandBuffer) {
        debug_assert!(
            !command_buffer_to_dispatch.is_empty(),
            "dispatching an empty command buffer"
        );
        let chain = command_buffer_to_dispatch.command_packet_buffer();
        let (_, auxiliary) = command_buffer.add_command_with_auxiliary(
            Self {
                number_of_bytes: chain.len() as u32,
                _padding: 0,
            },
            chain.len() as u32,
        );
        auxiliary.copy_from_slice(chain);
    }

    /// The nested packet chain of a recorded `DispatchCommandBuffer` packet.
    pub fn nested_packets<'a>(packet: &Packet<'a>) -> Packets<'a> {
        let command = packet.command::<Self>();
        Packets::from_bytes(&packet.auxiliary_bytes::<Self>()[..command.number_of_bytes as usize])
    }
}

impl_command!(DispatchCommandBuffer => DispatchCommandBuffer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::api::command::catalog::{DispatchCompute, EndDebugEvent};
    use crate::rhi::api::command::CommandDispatchFunctionIndex as Index;

    #[test]
    fn nested_chain_is_a_snapshot() {
        let mut nested = CommandBuffer::new();
        DispatchCompute::create(&mut nested, 2, 2, 2);
        EndDebugEvent::create(&mut nested);

        let mut outer = CommandBuffer::new();
        DispatchCommandBuffer::create(&mut outer, &nested);
        nested.clear();

        let packet = outer.packets().next().unwrap();
        assert_eq!(packet.dispatch_index(), Some(Index::DispatchCommandBuffer));
        let indices: Vec<_> = DispatchCommandBuffer::nested_packets(&packet)
            .map(|packet| packet.dispatch_index())
            .collect();
        assert_eq!(
            indices,
            [Some(Index::DispatchCompute), Some(Index::EndDebugEvent)]
        );
    }
}
