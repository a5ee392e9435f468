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

//! Handler tables replaying recorded packets on a backend.

use super::buffer::CommandBuffer;
use super::packet::{CommandDispatchFunctionIndex, Packet, Packets};
use std::fmt;

/// A backend handler replaying one packet on the backend `B`.
pub type CommandDispatchFunction<B> = fn(&Packet<'_>, &B);

/// One handler per [`CommandDispatchFunctionIndex`].
///
/// Backends build a table once, usually as a `static` or inside their device,
/// and replay command buffers through it. Replay is a sequential walk of the
/// packet chain with one indirect call per packet.
pub struct DispatchTable<B: ?Sized> {
    functions: [CommandDispatchFunction<B>; CommandDispatchFunctionIndex::COUNT],
}

impl<B: ?Sized> DispatchTable<B> {
    /// Creates a table routing every index to `fallback`.
    pub fn new(fallback: CommandDispatchFunction<B>) -> Self {
        Self {
            functions: [fallback; CommandDispatchFunctionIndex::COUNT],
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(
        mut self,
        index: CommandDispatchFunctionIndex,
        function: CommandDispatchFunction<B>,
    ) -> Self {
        self.set(index, function);
        self
    }

    /// Registers the handler of `index`, replacing the previous one.
    pub fn set(&mut self, index: CommandDispatchFunctionIndex, function: CommandDispatchFunction<B>) {
        self.functions[index.index()] = function;
    }

    /// Returns the handler registered for `index`.
    pub fn get(&self, index: CommandDispatchFunctionIndex) -> CommandDispatchFunction<B> {
        self.functions[index.index()]
    }

    /// Replays every packet of `command_buffer` on `backend`, in recording order.
    pub fn dispatch(&self, command_buffer: &CommandBuffer, backend: &B) {
        self.dispatch_packets(command_buffer.packets(), backend);
    }

    /// Replays a packet chain on `backend`.
    ///
    /// Packets carrying an unknown dispatch index are logged and skipped.
    pub fn dispatch_packets(&self, packets: Packets<'_>, backend: &B) {
        for packet in packets {
            match packet.dispatch_index() {
                Some(index) => {
                    log::trace!("Dispatching {index} at offset {}", packet.offset());
                    (self.functions[index.index()])(&packet, backend);
                }
                None => log::error!(
                    "Skipping command packet at offset {} with invalid dispatch index {}",
                    packet.offset(),
                    packet.raw_dispatch_index()
                ),
            }
        }
    }
}

impl<B: ?Sized> Clone for DispatchTable<B> {
    fn clone(&self) -> Self {
        Self {
            functions: self.functions,
        }
    }
}

impl<B: ?Sized> fmt::Debug for DispatchTable<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("number_of_functions", &self.functions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::api::command::catalog::*;
    use crate::rhi::api::command::packet::CommandDispatchFunctionIndex as Index;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    fn record_unknown(packet: &Packet<'_>, recorder: &Recorder) {
        recorder
            .calls
            .lock()
            .unwrap()
            .push(format!("unhandled {}", packet.raw_dispatch_index()));
    }

    fn record_dispatch(packet: &Packet<'_>, recorder: &Recorder) {
        let command = packet.command::<DispatchCompute>();
        recorder.calls.lock().unwrap().push(format!(
            "dispatch {}x{}x{}",
            command.group_count_x, command.group_count_y, command.group_count_z
        ));
    }

    fn record_marker(packet: &Packet<'_>, recorder: &Recorder) {
        let command = packet.command::<SetDebugMarker>();
        recorder
            .calls
            .lock()
            .unwrap()
            .push(format!("marker {}", command.name()));
    }

    fn table() -> DispatchTable<Recorder> {
        DispatchTable::new(record_unknown)
            .with(Index::DispatchCompute, record_dispatch)
            .with(Index::SetDebugMarker, record_marker)
    }

    #[test]
    fn handlers_run_in_recording_order() {
        let mut buffer = CommandBuffer::new();
        SetDebugMarker::create(&mut buffer, "first");
        DispatchCompute::create(&mut buffer, 4, 2, 1);
        EndDebugEvent::create(&mut buffer);

        let recorder = Recorder::default();
        table().dispatch(&buffer, &recorder);
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            [
                "marker first".to_string(),
                "dispatch 4x2x1".to_string(),
                format!("unhandled {}", Index::EndDebugEvent as u32),
            ]
        );
    }

    #[test]
    fn recorded_buffer_replays_many_times() {
        let mut buffer = CommandBuffer::new();
        DispatchCompute::create(&mut buffer, 1, 1, 1);

        let recorder = Recorder::default();
        let table = table();
        for _ in 0..3 {
            table.dispatch(&buffer, &recorder);
        }
        assert_eq!(recorder.calls.lock().unwrap().len(), 3);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn corrupt_dispatch_index_is_skipped() {
        let header = crate::rhi::api::command::packet::PacketHeader {
            next_packet_offset: crate::rhi::api::command::packet::INVALID_PACKET_OFFSET,
            dispatch_index: 4242,
        };
        let bytes = bytemuck::bytes_of(&header);

        let recorder = Recorder::default();
        table().dispatch_packets(Packets::from_bytes(bytes), &recorder);
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn handlers_can_be_replaced() {
        let mut table = table();
        table.set(Index::DispatchCompute, record_unknown);
        assert!(std::ptr::fn_addr_eq(
            table.get(Index::DispatchCompute),
            record_unknown as CommandDispatchFunction<Recorder>
        ));
    }
}
