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

//! Debug markers and events for graphics debuggers and profilers.

use super::impl_command;
use crate::rhi::api::command::CommandBuffer;
use bytemuck::{Pod, Zeroable};

/// Capacity of a recorded marker or event name, terminating zero included.
pub const MAXIMUM_DEBUG_EVENT_NAME_LENGTH: usize = 128;

fn encode_name(name: &str) -> [u8; MAXIMUM_DEBUG_EVENT_NAME_LENGTH] {
    let mut length = name.len().min(MAXIMUM_DEBUG_EVENT_NAME_LENGTH - 1);
    while !name.is_char_boundary(length) {
        length -= 1;
    }
    let mut bytes = [0; MAXIMUM_DEBUG_EVENT_NAME_LENGTH];
    bytes[..length].copy_from_slice(&name.as_bytes()[..length]);
    bytes
}

fn decode_name(bytes: &[u8; MAXIMUM_DEBUG_EVENT_NAME_LENGTH]) -> &str {
    let length = bytes.iter().position(|byte| *byte == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..length]).unwrap_or_default()
}

/// Inserts a named marker.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetDebugMarker {
    /// Zero-terminated UTF-8, truncated to fit.
    pub name: [u8; MAXIMUM_DEBUG_EVENT_NAME_LENGTH],
}

impl SetDebugMarker {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer, name: &str) {
        command_buffer.add_command(Self {
            name: encode_name(name),
        });
    }

    /// The recorded name.
    pub fn name(&self) -> &str {
        decode_name(&self.name)
    }
}

/// Opens a named event; events nest and each one must be closed with
/// [`EndDebugEvent`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BeginDebugEvent {
    /// Zero-terminated UTF-8, truncated to fit.
    pub name: [u8; MAXIMUM_DEBUG_EVENT_NAME_LENGTH],
}

impl BeginDebugEvent {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer, name: &str) {
        command_buffer.add_command(Self {
            name: encode_name(name),
        });
    }

    /// The recorded name.
    pub fn name(&self) -> &str {
        decode_name(&self.name)
    }
}

/// Closes the innermost open [`BeginDebugEvent`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct EndDebugEvent {
    #[doc(hidden)]
    pub _reserved: u32,
}

impl EndDebugEvent {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer) {
        command_buffer.add_command(Self::default());
    }
}

impl_command!(
    SetDebugMarker => SetDebugMarker,
    BeginDebugEvent => BeginDebugEvent,
    EndDebugEvent => EndDebugEvent,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_names_are_truncated_on_a_char_boundary() {
        let name = "é".repeat(100);
        let marker = SetDebugMarker {
            name: encode_name(&name),
        };
        assert_eq!(marker.name().len(), 126);
        assert!(name.starts_with(marker.name()));
    }

    #[test]
    fn short_names_round_trip() {
        let mut buffer = CommandBuffer::new();
        BeginDebugEvent::create(&mut buffer, "Shadow pass");
        let packet = buffer.packets().next().unwrap();
        assert_eq!(packet.command::<BeginDebugEvent>().name(), "Shadow pass");
    }
}
