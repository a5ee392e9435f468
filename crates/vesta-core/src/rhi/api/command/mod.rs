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

//! Deferred command recording and replay.
//!
//! Calling code records commands into a [`CommandBuffer`] and hands it to a
//! [`GraphicsDevice`](crate::rhi::GraphicsDevice), which replays the packet
//! chain through its [`DispatchTable`]. A recorded buffer may be dispatched any
//! number of times until it is cleared.

mod buffer;
mod catalog;
mod dispatch;
mod packet;

pub use self::buffer::*;
pub use self::catalog::*;
pub use self::dispatch::*;
pub use self::packet::*;
