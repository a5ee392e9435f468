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

//! Every command a [`CommandBuffer`](super::CommandBuffer) can record.
//!
//! Commands are grouped the way backends implement them. Each one offers a
//! `create` function recording it into a command buffer; commands that accept
//! variable-length data write it into the packet's auxiliary memory.

mod composition;
mod compute;
mod debug;
mod graphics;
mod query;
mod resource;

pub use self::composition::*;
pub use self::compute::*;
pub use self::debug::*;
pub use self::graphics::*;
pub use self::query::*;
pub use self::resource::*;

/// Implements [`Command`](super::Command) for each `Type => Index` pair.
macro_rules! impl_command {
    ($($command:ty => $index:ident),* $(,)?) => {
        $(
            impl $crate::rhi::api::command::Command for $command {
                const DISPATCH_INDEX: $crate::rhi::api::command::CommandDispatchFunctionIndex =
                    $crate::rhi::api::command::CommandDispatchFunctionIndex::$index;
            }
        )*
    };
}

pub(crate) use impl_command;
