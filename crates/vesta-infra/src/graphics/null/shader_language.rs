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

use super::device::NullDevice;
use super::resources::{NullGraphicsProgram, NullShader};
use std::sync::{Arc, Weak};
use vesta_core::rhi::{
    GraphicsDevice, GraphicsProgram, GraphicsProgramDescriptor, Ref, RefCount, RefCounted,
    Resource, ResourceError, ResourceType, RootSignature, Shader, ShaderDescriptor,
    ShaderLanguage, ShaderSource,
};

/// Name of the only shader language of the Null device.
pub const NULL_SHADER_LANGUAGE_NAME: &str = "Null";

/// The shader language of the Null device. Accepts any non-empty code.
#[derive(Debug)]
pub struct NullShaderLanguage {
    ref_count: RefCount,
    device: Weak<NullDevice>,
}

impl NullShaderLanguage {
    pub(crate) fn new(device: Weak<NullDevice>) -> Self {
        Self {
            ref_count: RefCount::new(),
            device,
        }
    }

    fn device(&self) -> Result<Arc<NullDevice>, ResourceError> {
        self.device.upgrade().ok_or_else(|| {
            ResourceError::BackendError("the shader language outlived its device".to_owned())
        })
    }
}

impl RefCounted for NullShaderLanguage {
    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }
}

impl ShaderLanguage for NullShaderLanguage {
    fn name(&self) -> &str {
        NULL_SHADER_LANGUAGE_NAME
    }

    fn create_shader(
        &self,
        descriptor: &ShaderDescriptor<'_>,
    ) -> Result<Ref<dyn Shader>, ResourceError> {
        let device = self.device()?;
        descriptor.validate(device.capabilities())?;
        let code = match &descriptor.source {
            ShaderSource::Source(source) => source.as_bytes().to_vec(),
            ShaderSource::Bytecode(bytecode) => bytecode.to_vec(),
        };
        let base = device.resource_base(descriptor.stage.resource_type(), descriptor.label_str());
        let shader = device.track(NullShader::new(
            base,
            descriptor.stage,
            NULL_SHADER_LANGUAGE_NAME,
            code,
        ))?;
        Ok(Ref::from_arc(shader as Arc<dyn Shader>))
    }

    fn create_graphics_program(
        &self,
        root_signature: &Ref<dyn RootSignature>,
        descriptor: &GraphicsProgramDescriptor<'_>,
    ) -> Result<Ref<dyn GraphicsProgram>, ResourceError> {
        let device = self.device()?;
        descriptor.validate()?;
        device.check_owned(&**root_signature)?;
        let mut shaders = Vec::new();
        for (_, shader) in descriptor.slots() {
            device.check_owned(&**shader)?;
            if shader.shader_language_name() != NULL_SHADER_LANGUAGE_NAME {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "shader {} was created by the '{}' shader language",
                    shader.id(),
                    shader.shader_language_name()
                )));
            }
            shaders.push(shader.clone());
        }
        let label = descriptor.label.as_deref().unwrap_or("");
        let base = device.resource_base(ResourceType::GraphicsProgram, label);
        let program = device.track(NullGraphicsProgram::new(
            base,
            root_signature.clone(),
            shaders,
            descriptor.is_mesh_pipeline(),
        ))?;
        Ok(Ref::from_arc(program as Arc<dyn GraphicsProgram>))
    }
}
