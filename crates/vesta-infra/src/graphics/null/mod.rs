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

//! The Null backend.
//!
//! A complete [`GraphicsDevice`](vesta_core::GraphicsDevice) that renders
//! nothing. Resources keep their contents in CPU memory, so uploads, copies,
//! clears, mapping and mipmap generation behave like on a real device, and
//! every replayed command is validated against the bound state and the
//! device's capabilities. Useful for tests, tools and headless servers.

mod conversions;
mod device;
mod dispatch;
mod resources;
mod shader_language;
mod state;

pub use self::device::NullDevice;
pub use self::resources::*;
pub use self::shader_language::{NullShaderLanguage, NULL_SHADER_LANGUAGE_NAME};
pub use self::state::{BoundState, FrameStatistics};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex from a context that cannot report errors.
///
/// Every critical section of the backend leaves its data consistent before it
/// can panic, so a poisoned lock is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
