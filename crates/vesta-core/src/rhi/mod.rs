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

//! Provides the public, backend-agnostic rendering hardware interface.
//!
//! This module defines the "common language" between calling code and graphics
//! backends. It contains the abstract [`traits`] (like [`GraphicsDevice`]), the
//! data structures in [`api`] (descriptors, resources, the command encoder) and
//! the error types shared by both.
//!
//! The 'what' of rendering is described here, while the 'how' is handled by a
//! backend in `vesta-infra` which implements these traits and registers one
//! handler per command dispatch index.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{RenderError, ResourceError, ShaderError};
pub use self::traits::{GraphicsDevice, ShaderLanguage};
