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

//! # Vesta Core
//!
//! Foundational crate of the Vesta rendering hardware interface (RHI). It holds
//! the backend-agnostic contracts every graphics backend implements and the
//! data structures calling code builds against:
//!
//! - reference-counted resource handles and per-kind resource statistics,
//! - plain-data descriptors that parameterize resource creation,
//! - the command packet encoder ([`CommandBuffer`]) and its command catalog,
//! - the [`GraphicsDevice`] façade resources are created through and command
//!   buffers are dispatched to.
//!
//! Concrete backends live in `vesta-infra`.

#![warn(missing_docs)]

pub mod rhi;
pub mod utils;

pub use rhi::{CommandBuffer, GraphicsDevice, Ref, RefCounted, RenderError, ResourceError};
