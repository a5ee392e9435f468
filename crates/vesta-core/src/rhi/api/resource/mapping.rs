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

//! CPU access to resource contents.

use crate::vesta_bitflags;

/// The CPU access requested by a `map` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapType {
    /// The mapped contents are read.
    Read,
    /// The mapped contents are written; nothing is read back.
    Write,
    /// The mapped contents are read and written.
    ReadWrite,
    /// The previous contents are discarded and the memory is written.
    WriteDiscard,
    /// Written without overwriting data the GPU may still read.
    WriteNoOverwrite,
}

impl MapType {
    /// Returns `true` if the previous contents are visible to the caller.
    pub const fn reads(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite | Self::WriteNoOverwrite)
    }

    /// Returns `true` if the mapped contents are written back on unmap.
    pub const fn writes(self) -> bool {
        !matches!(self, Self::Read)
    }
}

vesta_bitflags! {
    /// Flags of a `map` call.
    pub struct MapFlags: u32 {
        /// Fail instead of blocking when the GPU still uses the resource.
        const DO_NOT_WAIT = 1 << 0;
    }
}

/// A mapped subresource.
///
/// Holds a CPU copy of the subresource contents while it is mapped. Writes go
/// through [`MappedSubresource::data`] and reach the resource on `unmap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedSubresource {
    /// The subresource contents.
    pub data: Vec<u8>,
    /// Number of bytes of one row; the size of the data for buffers.
    pub row_pitch: u32,
    /// Number of bytes of one depth slice; the size of the data for buffers.
    pub depth_pitch: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_direction() {
        assert!(MapType::Read.reads());
        assert!(!MapType::Read.writes());
        assert!(!MapType::WriteDiscard.reads());
        assert!(MapType::ReadWrite.reads() && MapType::ReadWrite.writes());
    }
}
