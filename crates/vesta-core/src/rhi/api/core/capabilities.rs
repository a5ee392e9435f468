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

//! Device capabilities.

use serde::{Deserialize, Serialize};

/// Limits and feature flags of a device.
///
/// Populated once when the device is created and read-only afterwards. Resource
/// factories validate descriptors against these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Maximum number of viewports set by one `SetGraphicsViewports` command.
    pub maximum_number_of_viewports: u32,
    /// Maximum number of color attachments of a render pass.
    pub maximum_number_of_simultaneous_render_targets: u32,
    /// Maximum width or height of a 1D, 2D or cube texture.
    pub maximum_texture_dimension: u32,
    /// Maximum depth of a 3D texture.
    pub maximum_3d_texture_dimension: u32,
    /// Maximum number of slices of a 1D texture array, 0 when unsupported.
    pub maximum_number_of_1d_texture_array_slices: u32,
    /// Maximum number of slices of a 2D texture array, 0 when unsupported.
    pub maximum_number_of_2d_texture_array_slices: u32,
    /// Maximum number of cubes of a cube texture array, 0 when unsupported.
    pub maximum_number_of_cube_texture_array_slices: u32,
    /// Maximum number of texels of a texture buffer, 0 when unsupported.
    pub maximum_texture_buffer_size: u32,
    /// Maximum number of bytes of a structured buffer, 0 when unsupported.
    pub maximum_structured_buffer_size: u32,
    /// Maximum number of bytes of an indirect buffer.
    pub maximum_indirect_buffer_size: u32,
    /// Maximum number of bytes of a uniform buffer, 0 when unsupported.
    pub maximum_uniform_buffer_size: u32,
    /// Maximum number of multisamples, 1 when multisampling is unsupported.
    pub maximum_number_of_multisamples: u32,
    /// Maximum anisotropy of a sampler.
    pub maximum_anisotropy: u32,
    /// The framebuffer origin is the upper-left corner.
    pub upper_left_origin: bool,
    /// Clip space depth ranges from 0 to 1 instead of -1 to 1.
    pub zero_to_one_clip_z: bool,
    /// Individual uniforms (`SetUniform`) are supported.
    pub individual_uniforms: bool,
    /// Per-instance vertex attributes are supported.
    pub instanced_arrays: bool,
    /// Instanced draw calls are supported.
    pub draw_instanced: bool,
    /// Indexed draws may add a base vertex.
    pub base_vertex: bool,
    /// Resources may be created and command buffers recorded from any thread.
    pub native_multithreading: bool,
    /// Shaders may be created from bytecode.
    pub shader_bytecode: bool,
    /// Vertex shaders are supported.
    pub vertex_shader: bool,
    /// Maximum number of patch vertices, 0 when tessellation is unsupported.
    pub maximum_number_of_patch_vertices: u32,
    /// Maximum number of vertices a geometry shader may emit, 0 when geometry
    /// shaders are unsupported.
    pub maximum_number_of_gs_output_vertices: u32,
    /// Fragment shaders are supported.
    pub fragment_shader: bool,
    /// Task and mesh shaders are supported.
    pub mesh_shader: bool,
    /// Compute shaders are supported.
    pub compute_shader: bool,
}

impl Default for Capabilities {
    /// Limits of a typical desktop-class device.
    fn default() -> Self {
        Self {
            maximum_number_of_viewports: 16,
            maximum_number_of_simultaneous_render_targets: 8,
            maximum_texture_dimension: 16384,
            maximum_3d_texture_dimension: 2048,
            maximum_number_of_1d_texture_array_slices: 2048,
            maximum_number_of_2d_texture_array_slices: 2048,
            maximum_number_of_cube_texture_array_slices: 341,
            maximum_texture_buffer_size: 128 * 1024 * 1024,
            maximum_structured_buffer_size: 128 * 1024 * 1024,
            maximum_indirect_buffer_size: 128 * 1024,
            maximum_uniform_buffer_size: 64 * 1024,
            maximum_number_of_multisamples: 8,
            maximum_anisotropy: 16,
            upper_left_origin: true,
            zero_to_one_clip_z: true,
            individual_uniforms: true,
            instanced_arrays: true,
            draw_instanced: true,
            base_vertex: true,
            native_multithreading: true,
            shader_bytecode: true,
            vertex_shader: true,
            maximum_number_of_patch_vertices: 32,
            maximum_number_of_gs_output_vertices: 1024,
            fragment_shader: true,
            mesh_shader: true,
            compute_shader: true,
        }
    }
}

impl Capabilities {
    /// Returns `true` if tessellation shaders are supported.
    pub fn tessellation_shaders(&self) -> bool {
        self.maximum_number_of_patch_vertices > 0
    }

    /// Returns `true` if geometry shaders are supported.
    pub fn geometry_shader(&self) -> bool {
        self.maximum_number_of_gs_output_vertices > 0
    }
}
