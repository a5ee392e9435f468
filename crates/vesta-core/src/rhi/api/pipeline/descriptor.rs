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

//! Pipeline state objects and their descriptors.

use super::enums::{PrimitiveTopology, PrimitiveTopologyType};
use super::root_signature::RootSignature;
use super::state::{BlendState, DepthStencilState, RasterizerState};
use super::vertex::VertexAttribute;
use crate::rhi::api::core::{Capabilities, Ref};
use crate::rhi::api::resource::{GraphicsProgram, RenderPass, Resource, Shader, ShaderStage};
use crate::rhi::error::ResourceError;
use std::borrow::Cow;

/// A descriptor used to create a graphics pipeline state.
#[derive(Debug, Clone)]
pub struct GraphicsPipelineStateDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The binding layout.
    pub root_signature: &'a Ref<dyn RootSignature>,
    /// The linked shaders.
    pub graphics_program: &'a Ref<dyn GraphicsProgram>,
    /// The vertex input layout. Must be empty for mesh programs.
    pub vertex_attributes: Cow<'a, [VertexAttribute<'a>]>,
    /// Rasterizer state.
    pub rasterizer_state: RasterizerState,
    /// Depth and stencil state.
    pub depth_stencil_state: DepthStencilState,
    /// Blend state.
    pub blend_state: BlendState,
    /// How vertices are assembled.
    pub primitive_topology: PrimitiveTopology,
    /// The primitive class the pipeline is compiled for.
    pub primitive_topology_type: PrimitiveTopologyType,
    /// The render pass render targets must match.
    pub render_pass: &'a Ref<dyn RenderPass>,
}

impl<'a> GraphicsPipelineStateDescriptor<'a> {
    /// Describes a triangle-list pipeline with default fixed-function state.
    pub fn new(
        root_signature: &'a Ref<dyn RootSignature>,
        graphics_program: &'a Ref<dyn GraphicsProgram>,
        vertex_attributes: impl Into<Cow<'a, [VertexAttribute<'a>]>>,
        render_pass: &'a Ref<dyn RenderPass>,
    ) -> Self {
        Self {
            label: None,
            root_signature,
            graphics_program,
            vertex_attributes: vertex_attributes.into(),
            rasterizer_state: RasterizerState::default(),
            depth_stencil_state: DepthStencilState::default(),
            blend_state: BlendState::default(),
            primitive_topology: PrimitiveTopology::TriangleList,
            primitive_topology_type: PrimitiveTopologyType::Triangle,
            render_pass,
        }
    }

    /// Sets the debug label.
    pub fn label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, or an empty string.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Checks the descriptor against structural rules and device limits.
    pub fn validate(&self, capabilities: &Capabilities) -> Result<(), ResourceError> {
        if self.graphics_program.is_mesh_program() {
            if !self.vertex_attributes.is_empty() {
                return Err(ResourceError::InvalidDescriptor(
                    "mesh pipelines have no vertex input".to_owned(),
                ));
            }
        } else if self.primitive_topology.topology_type() != self.primitive_topology_type {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{:?} does not belong to {:?}",
                self.primitive_topology, self.primitive_topology_type
            )));
        }
        if let PrimitiveTopology::PatchList(control_points) = self.primitive_topology {
            let control_points = u32::from(control_points);
            if control_points == 0 {
                return Err(ResourceError::InvalidDescriptor(
                    "a patch needs at least one control point".to_owned(),
                ));
            }
            if control_points > capabilities.maximum_number_of_patch_vertices {
                return Err(ResourceError::CapabilityExceeded {
                    what: "patch vertices",
                    requested: control_points,
                    maximum: capabilities.maximum_number_of_patch_vertices,
                });
            }
        }
        if self.blend_state.alpha_to_coverage_enable
            && self.render_pass.number_of_multisamples() == 1
        {
            log::warn!(
                "Pipeline '{}' enables alpha to coverage without multisampling",
                self.label_str()
            );
        }
        Ok(())
    }
}

/// A compiled graphics pipeline.
pub trait GraphicsPipelineState: Resource {
    /// The binding layout.
    fn root_signature(&self) -> &Ref<dyn RootSignature>;

    /// The linked shaders.
    fn graphics_program(&self) -> &Ref<dyn GraphicsProgram>;

    /// The render pass render targets must match.
    fn render_pass(&self) -> &Ref<dyn RenderPass>;

    /// How vertices are assembled.
    fn primitive_topology(&self) -> PrimitiveTopology;
}

/// A descriptor used to create a compute pipeline state.
#[derive(Debug, Clone)]
pub struct ComputePipelineStateDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The binding layout.
    pub root_signature: &'a Ref<dyn RootSignature>,
    /// The compute shader.
    pub compute_shader: &'a Ref<dyn Shader>,
}

impl ComputePipelineStateDescriptor<'_> {
    /// The label, or an empty string.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Checks that the shader is a compute shader.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.compute_shader.stage() != ShaderStage::Compute {
            return Err(ResourceError::InvalidDescriptor(format!(
                "a {:?} shader cannot build a compute pipeline",
                self.compute_shader.stage()
            )));
        }
        Ok(())
    }
}

/// A compiled compute pipeline.
pub trait ComputePipelineState: Resource {
    /// The binding layout.
    fn root_signature(&self) -> &Ref<dyn RootSignature>;

    /// The compute shader.
    fn compute_shader(&self) -> &Ref<dyn Shader>;
}
