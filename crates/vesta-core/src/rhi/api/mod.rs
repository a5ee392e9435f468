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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`core`]**: Reference counting, statistics, capabilities and settings.
//! - **[`resource`]**: Resource kinds, handles and their descriptors.
//! - **[`pipeline`]**: Fixed-function state, vertex input and root signatures.
//! - **[`command`]**: The command packet encoder, its dispatch table and catalog.
//! - **[`util`]**: Generic enums shared across the other modules.

pub mod command;
pub mod core;
pub mod pipeline;
pub mod resource;
pub mod util;

pub use self::command::*;
pub use self::core::*;
pub use self::pipeline::*;
pub use self::resource::*;
pub use self::util::*;
