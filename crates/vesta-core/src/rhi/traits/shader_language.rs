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

use crate::rhi::api::core::{Ref, RefCounted};
use crate::rhi::api::pipeline::RootSignature;
use crate::rhi::api::resource::{GraphicsProgram, GraphicsProgramDescriptor, Shader, ShaderDescriptor};
use crate::rhi::error::ResourceError;
use std::fmt::Debug;

/// A shader language offered by a device, e.g. GLSL or HLSL.
///
/// Shader languages create the shaders and graphics programs of their device.
/// Compilation itself is the backend's business.
pub trait ShaderLanguage: RefCounted + Debug {
    /// The language's name, as accepted by `GraphicsDevice::shader_language`.
    fn name(&self) -> &str;

    /// Creates a shader of one stage.
    /// ## Arguments
    /// * `descriptor` - The stage, code and debug label of the shader.
    /// ## Returns
    /// A `Result` containing the new shader.
    /// ## Errors
    /// * `ResourceError::Shader` - If the stage is unsupported, the code is
    ///   empty or fails to compile.
    fn create_shader(&self, descriptor: &ShaderDescriptor<'_>) -> Result<Ref<dyn Shader>, ResourceError>;

    /// Links shaders into a graphics program laid out for `root_signature`.
    /// ## Arguments
    /// * `root_signature` - The binding layout the program's resources follow.
    /// * `descriptor` - The shaders to link, one per stage slot.
    /// ## Returns
    /// A `Result` containing the new graphics program.
    /// ## Errors
    /// * `ResourceError::InvalidDescriptor` - If the shader combination is invalid.
    /// * `ResourceError::ForeignResource` - If a shader or the root signature
    ///   belongs to another device.
    fn create_graphics_program(
        &self,
        root_signature: &Ref<dyn RootSignature>,
        descriptor: &GraphicsProgramDescriptor<'_>,
    ) -> Result<Ref<dyn GraphicsProgram>, ResourceError>;
}
