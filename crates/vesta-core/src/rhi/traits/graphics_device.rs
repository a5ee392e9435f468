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

use crate::rhi::api::*;
use crate::rhi::error::{RenderError, ResourceError};
use crate::rhi::traits::ShaderLanguage;
use std::fmt::Debug;

/// The entry point of a graphics backend.
///
/// Resources are created through the device's factories and command buffers
/// are replayed with [`dispatch_command_buffer`](Self::dispatch_command_buffer).
/// Resources keep a non-owning back-reference to their device and must not be
/// mixed across devices.
///
/// Factories report every failure through `ResourceError` and leave the
/// device untouched when they fail. A successful factory call counts the new
/// resource in [`statistics`](Self::statistics).
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// The backend's display name.
    fn name(&self) -> &str;

    /// The graphics API the device drives.
    fn backend_type(&self) -> GraphicsBackendType;

    /// Returns `true` if the device was created with debugging enabled.
    fn is_debug_enabled(&self) -> bool;

    /// The device's limits and features, fixed at initialization.
    fn capabilities(&self) -> &Capabilities;

    /// Live and lifetime resource counts of the device.
    fn statistics(&self) -> &Statistics;

    /// The number of shader languages the device offers.
    fn number_of_shader_languages(&self) -> u32;

    /// The name of the shader language at `index`, `None` past the end.
    fn shader_language_name(&self, index: u32) -> Option<&str>;

    /// Looks up a shader language.
    /// ## Arguments
    /// * `name` - The language's name, or `None` for the device's default language.
    /// ## Returns
    /// A `Result` containing the shader language.
    /// ## Errors
    /// * `ResourceError::Shader` - If the device offers no language of that name.
    fn shader_language(&self, name: Option<&str>) -> Result<Ref<dyn ShaderLanguage>, ResourceError>;

    /// Creates a render pass.
    /// ## Arguments
    /// * `descriptor` - The attachment formats and sample count of the render pass.
    /// ## Returns
    /// A `Result` containing the new render pass.
    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> Result<Ref<dyn RenderPass>, ResourceError>;

    /// Creates a query pool.
    /// ## Arguments
    /// * `descriptor` - The query kind and number of queries of the pool.
    /// ## Returns
    /// A `Result` containing the new query pool.
    fn create_query_pool(
        &self,
        descriptor: &QueryPoolDescriptor<'_>,
    ) -> Result<Ref<dyn QueryPool>, ResourceError>;

    /// Creates an offscreen framebuffer from textures.
    /// ## Arguments
    /// * `descriptor` - The render pass and the attachment textures.
    /// ## Returns
    /// A `Result` containing the new framebuffer.
    /// ## Errors
    /// * `ResourceError::InvalidDescriptor` - If the attachments do not match the
    ///   render pass or differ in size.
    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor<'_>,
    ) -> Result<Ref<dyn Framebuffer>, ResourceError>;

    /// Creates a vertex buffer.
    fn create_vertex_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Ref<dyn Buffer>, ResourceError>;

    /// Creates an index buffer.
    /// ## Arguments
    /// * `descriptor` - The size, contents and usage of the buffer.
    /// * `format` - The element type of the indices.
    /// ## Returns
    /// A `Result` containing the new index buffer.
    fn create_index_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: IndexBufferFormat,
    ) -> Result<Ref<dyn IndexBuffer>, ResourceError>;

    /// Creates a buffer read by shaders as a one-dimensional texture of `format`.
    fn create_texture_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: TextureFormat,
    ) -> Result<Ref<dyn Buffer>, ResourceError>;

    /// Creates a buffer of structures of `number_of_structure_bytes` bytes each.
    fn create_structured_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        number_of_structure_bytes: u32,
    ) -> Result<Ref<dyn Buffer>, ResourceError>;

    /// Creates a buffer holding indirect draw arguments.
    /// ## Errors
    /// * `ResourceError::InvalidDescriptor` - If neither `DRAW_ARGUMENTS` nor
    ///   `DRAW_INDEXED_ARGUMENTS` is set.
    fn create_indirect_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Ref<dyn Buffer>, ResourceError>;

    /// Creates a uniform buffer.
    fn create_uniform_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Ref<dyn Buffer>, ResourceError>;

    /// Creates a texture of any dimension.
    /// ## Arguments
    /// * `descriptor` - The dimension, size, format and initial contents.
    /// ## Returns
    /// A `Result` containing the new texture.
    /// ## Errors
    /// * `ResourceError::CapabilityExceeded` - If a size or the sample count
    ///   exceeds the device's limits.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<Ref<dyn Texture>, ResourceError>;

    /// Creates a root signature. The descriptor's parameters are copied.
    fn create_root_signature(
        &self,
        descriptor: &RootSignatureDescriptor<'_>,
    ) -> Result<Ref<dyn RootSignature>, ResourceError>;

    /// Creates a resource group for one descriptor table of a root signature.
    /// ## Errors
    /// * `ResourceError::InvalidDescriptor` - If the resources do not match the
    ///   table's descriptor ranges.
    fn create_resource_group(
        &self,
        descriptor: &ResourceGroupDescriptor<'_>,
    ) -> Result<Ref<dyn ResourceGroup>, ResourceError>;

    /// Creates a vertex array. The attributes are copied and the buffers kept
    /// alive by the vertex array.
    fn create_vertex_array(
        &self,
        descriptor: &VertexArrayDescriptor<'_>,
    ) -> Result<Ref<dyn VertexArray>, ResourceError>;

    /// Creates a graphics pipeline state object.
    fn create_graphics_pipeline_state(
        &self,
        descriptor: &GraphicsPipelineStateDescriptor<'_>,
    ) -> Result<Ref<dyn GraphicsPipelineState>, ResourceError>;

    /// Creates a compute pipeline state object.
    fn create_compute_pipeline_state(
        &self,
        descriptor: &ComputePipelineStateDescriptor<'_>,
    ) -> Result<Ref<dyn ComputePipelineState>, ResourceError>;

    /// Creates a sampler state object.
    /// ## Errors
    /// * `ResourceError::CapabilityExceeded` - If the anisotropy exceeds the limit.
    fn create_sampler_state(
        &self,
        descriptor: &SamplerStateDescriptor,
    ) -> Result<Ref<dyn SamplerState>, ResourceError>;

    /// Maps a subresource of a buffer or texture for CPU access.
    ///
    /// May block until conflicting GPU work completes unless
    /// `MapFlags::DO_NOT_WAIT` is set.
    /// ## Arguments
    /// * `resource` - The buffer or texture to map.
    /// * `subresource` - The subresource index; 0 for buffers, `mipmap + layer * number_of_mipmaps`
    ///   for textures, where layers count array slices times cube faces.
    /// * `map_type` - The access the CPU needs.
    /// * `flags` - Additional mapping flags.
    /// ## Returns
    /// A `Result` containing the mapped memory, handed back to [`unmap`](Self::unmap).
    /// ## Errors
    /// * `ResourceError::AlreadyMapped` - If the subresource is mapped already.
    /// * `ResourceError::ForeignResource` - If the resource belongs to another device.
    fn map(
        &self,
        resource: &dyn Resource,
        subresource: u32,
        map_type: MapType,
        flags: MapFlags,
    ) -> Result<MappedSubresource, ResourceError>;

    /// Unmaps a subresource, writing `mapped` back when it was mapped for writing.
    /// ## Errors
    /// * `ResourceError::NotMapped` - If the subresource is not mapped.
    fn unmap(
        &self,
        resource: &dyn Resource,
        subresource: u32,
        mapped: MappedSubresource,
    ) -> Result<(), ResourceError>;

    /// Copies query results into `data`.
    /// ## Arguments
    /// * `query_pool` - The pool to read.
    /// * `data` - Destination memory, `number_of_queries` results spaced `stride_in_bytes` apart.
    /// * `first_query_index` - The first query to read.
    /// * `number_of_queries` - The number of queries to read.
    /// * `stride_in_bytes` - Distance between two results; 0 packs them.
    /// * `flags` - `QueryResultFlags::WAIT` blocks until the results are available.
    /// ## Returns
    /// `Ok(true)` if the results were written, `Ok(false)` if they are not
    /// available yet and `WAIT` was not requested.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the query range or `data` is too small.
    fn get_query_pool_results(
        &self,
        query_pool: &dyn QueryPool,
        data: &mut [u8],
        first_query_index: u32,
        number_of_queries: u32,
        stride_in_bytes: u32,
        flags: QueryResultFlags,
    ) -> Result<bool, ResourceError>;

    /// Begins a scene; command buffers are dispatched between `begin_scene`
    /// and `end_scene`.
    fn begin_scene(&self) -> Result<(), RenderError>;

    /// Ends the current scene.
    fn end_scene(&self) -> Result<(), RenderError>;

    /// Submits pending GPU work without waiting for it.
    fn flush(&self);

    /// Submits pending GPU work and waits for its completion.
    fn finish(&self);

    /// Called by a resource of this device once its last handle is gone.
    ///
    /// Backends drop whatever they keep about `id`; the default keeps nothing.
    fn on_resource_destroyed(&self, _id: ResourceId) {}

    /// Replays `command_buffer` on the device. The command buffer is left intact.
    fn dispatch_command_buffer(&self, command_buffer: &CommandBuffer);
}
