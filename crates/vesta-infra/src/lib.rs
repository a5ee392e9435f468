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

//! # Vesta Infra
//!
//! Concrete implementations of the contracts defined in `vesta-core`.
//!
//! Each backend implements [`vesta_core::GraphicsDevice`], creates its own
//! resource types and registers one handler per command dispatch index. The
//! [`graphics::create_device`] entry point picks a backend from
//! [`DeviceSettings`](vesta_core::rhi::DeviceSettings).

pub mod graphics;

pub use graphics::create_device;
