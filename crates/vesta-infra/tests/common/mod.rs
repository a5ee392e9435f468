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

//! Fixtures shared by the Null backend integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use vesta_core::rhi::{
    DeviceSettings, Framebuffer, FramebufferAttachment, FramebufferDescriptor, GraphicsDevice,
    GraphicsPipelineState, GraphicsPipelineStateDescriptor, GraphicsProgram,
    GraphicsProgramDescriptor, Ref, RenderPass, RenderPassDescriptor, Resource, RootParameter,
    RootSignature, RootSignatureDescriptor, ShaderDescriptor, ShaderLanguage, ShaderStage,
    Texture, TextureDescriptor, TextureFlags, TextureFormat, VertexAttribute,
};
use vesta_infra::graphics::null::{NullDevice, NullTexture};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn null_device() -> Arc<NullDevice> {
    init_logging();
    NullDevice::new(&DeviceSettings::default())
}

pub fn empty_root_signature(device: &NullDevice) -> Ref<dyn RootSignature> {
    device
        .create_root_signature(&RootSignatureDescriptor::new(Vec::<RootParameter>::new()))
        .expect("Empty root signature should be valid")
}

/// Everything needed to draw into a 4x4 RGBA8 render target.
pub struct DrawSetup {
    pub root_signature: Ref<dyn RootSignature>,
    pub render_pass: Ref<dyn RenderPass>,
    pub color: Ref<dyn Texture>,
    pub framebuffer: Ref<dyn Framebuffer>,
    pub program: Ref<dyn GraphicsProgram>,
    pub pipeline_state: Ref<dyn GraphicsPipelineState>,
}

impl DrawSetup {
    pub fn new(device: &NullDevice) -> Self {
        let root_signature = empty_root_signature(device);
        let render_pass = device
            .create_render_pass(&RenderPassDescriptor {
                color_attachment_formats: vec![TextureFormat::R8G8B8A8].into(),
                ..RenderPassDescriptor::default()
            })
            .expect("Render pass should be valid");
        let color = device
            .create_texture(&TextureDescriptor {
                flags: TextureFlags::RENDER_TARGET | TextureFlags::SHADER_RESOURCE,
                ..TextureDescriptor::texture_2d(4, 4, TextureFormat::R8G8B8A8)
            })
            .expect("Color texture should be valid");
        let framebuffer = device
            .create_framebuffer(&FramebufferDescriptor {
                label: Some("color target".into()),
                render_pass: &render_pass,
                color_attachments: vec![FramebufferAttachment::new(&color)].into(),
                depth_stencil_attachment: None,
            })
            .expect("Framebuffer should be valid");

        let language = device
            .shader_language(None)
            .expect("Null shader language should exist");
        let vertex = language
            .create_shader(&ShaderDescriptor::from_source(ShaderStage::Vertex, "main"))
            .expect("Vertex shader should compile");
        let fragment = language
            .create_shader(&ShaderDescriptor::from_source(ShaderStage::Fragment, "main"))
            .expect("Fragment shader should compile");
        let program = language
            .create_graphics_program(
                &root_signature,
                &GraphicsProgramDescriptor::vertex_fragment(&vertex, &fragment),
            )
            .expect("Program should link");
        let pipeline_state = device
            .create_graphics_pipeline_state(&GraphicsPipelineStateDescriptor::new(
                &root_signature,
                &program,
                Vec::<VertexAttribute>::new(),
                &render_pass,
            ))
            .expect("Pipeline state should be valid");

        Self {
            root_signature,
            render_pass,
            color,
            framebuffer,
            program,
            pipeline_state,
        }
    }

    pub fn color_texels(&self) -> Vec<u8> {
        self.color
            .as_any()
            .downcast_ref::<NullTexture>()
            .and_then(|texture| texture.subresource(0))
            .expect("Color attachment should be a Null texture")
    }
}
