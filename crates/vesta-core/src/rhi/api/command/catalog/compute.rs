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

//! Compute state and dispatch commands.

use super::impl_command;
use crate::rhi::api::command::CommandBuffer;
use crate::rhi::api::pipeline::{ComputePipelineState, ResourceGroup, RootSignature};
use crate::rhi::api::resource::ResourceId;
use bytemuck::{Pod, Zeroable};

/// Binds the compute root signature.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetComputeRootSignature {
    /// The root signature to bind, null to unbind.
    pub root_signature: ResourceId,
}

impl SetComputeRootSignature {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer, root_signature: Option<&dyn RootSignature>) {
        command_buffer.add_command(Self {
            root_signature: ResourceId::of(root_signature),
        });
    }
}

/// Binds the compute pipeline state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetComputePipelineState {
    /// The pipeline state to bind, null to unbind.
    pub compute_pipeline_state: ResourceId,
}

impl SetComputePipelineState {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        compute_pipeline_state: Option<&dyn ComputePipelineState>,
    ) {
        command_buffer.add_command(Self {
            compute_pipeline_state: ResourceId::of(compute_pipeline_state),
        });
    }
}

/// Binds a resource group to a descriptor table of the compute root signature.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetComputeResourceGroup {
    /// Index of the descriptor table root parameter.
    pub root_parameter_index: u32,
    #[doc(hidden)]
    pub _padding: u32,
    /// The resource group to bind, null to unbind.
    pub resource_group: ResourceId,
}

impl SetComputeResourceGroup {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        root_parameter_index: u32,
        resource_group: Option<&dyn ResourceGroup>,
    ) {
        command_buffer.add_command(Self {
            root_parameter_index,
            _padding: 0,
            resource_group: ResourceId::of(resource_group),
        });
    }
}

/// Launches `x * y * z` compute thread groups.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DispatchCompute {
    /// Thread groups along x.
    pub group_count_x: u32,
    /// Thread groups along y.
    pub group_count_y: u32,
    /// Thread groups along z.
    pub group_count_z: u32,
}

impl DispatchCompute {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) {
        command_buffer.add_command(Self {
            group_count_x,
            group_count_y,
            group_count_z,
        });
    }
}

impl_command!(
    SetComputeRootSignature => SetComputeRootSignature,
    SetComputePipelineState => SetComputePipelineState,
    SetComputeResourceGroup => SetComputeResourceGroup,
    DispatchCompute => DispatchCompute,
);
