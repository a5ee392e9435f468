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

use super::dispatch::DISPATCH_TABLE;
use super::lock;
use super::resources::{
    buffer_storage, BufferLayout, NullAttachment, NullBuffer, NullComputePipelineState,
    NullFramebuffer, NullGraphicsPipelineState, NullIndexBuffer, NullQueryPool, NullRenderPass,
    NullResourceGroup, NullRootSignature, NullSamplerState, NullTexture, NullVertexArray,
};
use super::shader_language::{NullShaderLanguage, NULL_SHADER_LANGUAGE_NAME};
use super::state::{BoundState, FrameStatistics, ReplayState};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Instant;
use vesta_core::rhi::{
    Buffer, BufferDescriptor, BufferFlags, Capabilities, CommandBuffer, ComputePipelineState,
    ComputePipelineStateDescriptor, DeviceSettings, Framebuffer, FramebufferAttachment,
    FramebufferDescriptor, GraphicsBackendType, GraphicsDevice, GraphicsPipelineState,
    GraphicsPipelineStateDescriptor, IndexBuffer, IndexBufferFormat, MapFlags, MapType,
    MappedSubresource, QueryPool, QueryPoolDescriptor, QueryResultFlags, Ref, RenderError,
    RenderPass, RenderPassDescriptor, Resource, ResourceBase, ResourceError, ResourceGroup,
    ResourceGroupDescriptor, ResourceId, ResourceType, RootSignature, RootSignatureDescriptor,
    SamplerState, SamplerStateDescriptor, ShaderError, ShaderLanguage, Statistics, Texture,
    TextureDescriptor, TextureDimension, TextureFormat, VertexArray, VertexArrayDescriptor,
};

const DEVICE_NAME: &str = "Null";

fn check_limit(what: &'static str, requested: u32, maximum: u32) -> Result<(), ResourceError> {
    if requested > maximum {
        return Err(ResourceError::CapabilityExceeded {
            what,
            requested,
            maximum,
        });
    }
    Ok(())
}

/// A graphics device that validates and tracks everything and renders nothing.
pub struct NullDevice {
    self_reference: Weak<NullDevice>,
    debug_enabled: bool,
    validate: bool,
    capabilities: Capabilities,
    statistics: Arc<Statistics>,
    created_at: Instant,

    next_resource_id: AtomicU64,
    /// Every live resource the device created, for resolving command ids.
    /// Entries leave when their resource is destroyed.
    resources: Mutex<HashMap<ResourceId, Weak<dyn Resource>>>,
    replay: Mutex<ReplayState>,
}

impl NullDevice {
    /// Creates a device from `settings`.
    ///
    /// `settings.capabilities` replaces the default desktop-class limits when
    /// set; `settings.validate` enables replay-time validation of bindings.
    pub fn new(settings: &DeviceSettings) -> Arc<Self> {
        let capabilities = settings.capabilities.clone().unwrap_or_default();
        if let Some(adapter) = &settings.adapter_name {
            log::debug!("The Null device has no adapters; ignoring '{adapter}'");
        }
        let device = Arc::new_cyclic(|self_reference| Self {
            self_reference: self_reference.clone(),
            debug_enabled: settings.enable_debug,
            validate: settings.validate,
            capabilities,
            statistics: Arc::new(Statistics::new()),
            created_at: Instant::now(),
            next_resource_id: AtomicU64::new(1),
            resources: Mutex::new(HashMap::new()),
            replay: Mutex::new(ReplayState::default()),
        });
        log::info!(
            "Null graphics device initialized (debug: {}, validation: {})",
            device.debug_enabled,
            device.validate
        );
        device
    }

    /// The bindings established by the commands replayed so far.
    pub fn bound_state(&self) -> BoundState {
        self.replay().bound.clone()
    }

    /// Work counted during the current scene, or the last one once it ended.
    pub fn frame_statistics(&self) -> FrameStatistics {
        self.replay().frame
    }

    /// Returns `true` between `begin_scene` and `end_scene`.
    pub fn is_in_scene(&self) -> bool {
        self.replay().in_scene
    }

    /// Number of created resources that are still alive.
    pub fn number_of_tracked_resources(&self) -> usize {
        lock(&self.resources)
            .values()
            .filter(|resource| resource.strong_count() > 0)
            .count()
    }

    pub(crate) fn is_validating(&self) -> bool {
        self.validate
    }

    pub(crate) fn replay(&self) -> MutexGuard<'_, ReplayState> {
        lock(&self.replay)
    }

    /// Nanoseconds since the device was created.
    pub(crate) fn timestamp(&self) -> u64 {
        self.created_at.elapsed().as_nanos() as u64
    }

    /// The base of a new resource owned by this device.
    pub(crate) fn resource_base(&self, resource_type: ResourceType, label: &str) -> ResourceBase {
        let id = ResourceId(self.next_resource_id.fetch_add(1, Ordering::Relaxed));
        let device: Weak<dyn GraphicsDevice> = self.self_reference.clone();
        ResourceBase::new(resource_type, id, device, Arc::clone(&self.statistics), label)
    }

    /// Allocates `resource` and registers it for id lookups.
    pub(crate) fn track<T: Resource>(&self, resource: T) -> Result<Arc<T>, ResourceError> {
        let resource = Arc::new(resource);
        let weak: Weak<T> = Arc::downgrade(&resource);
        let weak: Weak<dyn Resource> = weak;
        self.resources
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (resources): {e}")))?
            .insert(resource.id(), weak);
        Ok(resource)
    }

    /// Fails with `ForeignResource` unless this device created `resource`.
    pub(crate) fn check_owned<R: Resource + ?Sized>(&self, resource: &R) -> Result<(), ResourceError> {
        if resource.base().belongs_to(self) {
            Ok(())
        } else {
            Err(ResourceError::ForeignResource)
        }
    }

    /// Looks up a live resource by id.
    ///
    /// An entry whose resource is mid-destruction is forgotten here.
    pub(crate) fn resolve(&self, id: ResourceId) -> Result<Arc<dyn Resource>, String> {
        if id.is_null() {
            return Err("no resource was given".to_owned());
        }
        let mut resources = lock(&self.resources);
        match resources.get(&id).map(Weak::upgrade) {
            Some(Some(resource)) => Ok(resource),
            Some(None) => {
                resources.remove(&id);
                Err(format!(
                    "resource {id} was destroyed before a command using it was replayed"
                ))
            }
            None => Err(format!("resource {id} was not created by this device")),
        }
    }

    /// Logs a command that failed validation and counts it.
    pub(crate) fn reject(&self, message: std::fmt::Arguments<'_>) {
        log::error!("Null device: {message}");
        self.replay()
            .count(|statistics| statistics.number_of_rejected_commands += 1);
    }

    fn check_texture_limits(&self, descriptor: &TextureDescriptor<'_>) -> Result<(), ResourceError> {
        let capabilities = &self.capabilities;
        match descriptor.dimension {
            TextureDimension::D3 => {
                let maximum = capabilities.maximum_3d_texture_dimension;
                check_limit("3D texture texels", descriptor.width, maximum)?;
                check_limit("3D texture texels", descriptor.height, maximum)?;
                check_limit("3D texture texels", descriptor.depth, maximum)?;
            }
            _ => {
                let maximum = capabilities.maximum_texture_dimension;
                check_limit("texture texels", descriptor.width, maximum)?;
                check_limit("texture texels", descriptor.height, maximum)?;
            }
        }
        let maximum_slices = match descriptor.dimension {
            TextureDimension::D1Array => Some(capabilities.maximum_number_of_1d_texture_array_slices),
            TextureDimension::D2Array => Some(capabilities.maximum_number_of_2d_texture_array_slices),
            TextureDimension::CubeArray => {
                Some(capabilities.maximum_number_of_cube_texture_array_slices)
            }
            _ => None,
        };
        if let Some(maximum) = maximum_slices {
            check_limit("texture array slices", descriptor.number_of_slices, maximum)?;
        }
        check_limit(
            "multisamples",
            descriptor.number_of_multisamples,
            capabilities.maximum_number_of_multisamples,
        )
    }

    fn create_buffer(
        &self,
        resource_type: ResourceType,
        descriptor: &BufferDescriptor<'_>,
        layout: BufferLayout,
    ) -> Result<Ref<dyn Buffer>, ResourceError> {
        let base = self.resource_base(resource_type, descriptor.label_str());
        let buffer = self.track(NullBuffer::new(base, descriptor, layout))?;
        Ok(Ref::from_arc(buffer as Arc<dyn Buffer>))
    }
}

impl fmt::Debug for NullDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullDevice")
            .field("debug_enabled", &self.debug_enabled)
            .field("validate", &self.validate)
            .field("alive_resources", &self.statistics.number_of_current_resources())
            .finish()
    }
}

impl Drop for NullDevice {
    fn drop(&mut self) {
        self.statistics.log_current_resources("Null device");
        log::info!("Null graphics device destroyed");
    }
}

impl GraphicsDevice for NullDevice {
    fn name(&self) -> &str {
        DEVICE_NAME
    }

    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::Null
    }

    fn is_debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn number_of_shader_languages(&self) -> u32 {
        1
    }

    fn shader_language_name(&self, index: u32) -> Option<&str> {
        (index == 0).then_some(NULL_SHADER_LANGUAGE_NAME)
    }

    fn shader_language(&self, name: Option<&str>) -> Result<Ref<dyn ShaderLanguage>, ResourceError> {
        match name {
            None | Some(NULL_SHADER_LANGUAGE_NAME) => {
                let language: Arc<dyn ShaderLanguage> =
                    Arc::new(NullShaderLanguage::new(self.self_reference.clone()));
                Ok(Ref::from_arc(language))
            }
            Some(name) => Err(ShaderError::UnknownLanguage(name.to_owned()).into()),
        }
    }

    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> Result<Ref<dyn RenderPass>, ResourceError> {
        descriptor.validate(&self.capabilities)?;
        let base = self.resource_base(
            ResourceType::RenderPass,
            descriptor.label.as_deref().unwrap_or(""),
        );
        let render_pass = self.track(NullRenderPass::new(
            base,
            descriptor.color_attachment_formats.to_vec(),
            descriptor.depth_stencil_attachment_format,
            descriptor.number_of_multisamples,
        ))?;
        Ok(Ref::from_arc(render_pass as Arc<dyn RenderPass>))
    }

    fn create_query_pool(
        &self,
        descriptor: &QueryPoolDescriptor<'_>,
    ) -> Result<Ref<dyn QueryPool>, ResourceError> {
        descriptor.validate()?;
        let base = self.resource_base(
            ResourceType::QueryPool,
            descriptor.label.as_deref().unwrap_or(""),
        );
        let query_pool = self.track(NullQueryPool::new(
            base,
            descriptor.query_type,
            descriptor.number_of_queries,
        ))?;
        Ok(Ref::from_arc(query_pool as Arc<dyn QueryPool>))
    }

    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor<'_>,
    ) -> Result<Ref<dyn Framebuffer>, ResourceError> {
        self.check_owned(&**descriptor.render_pass)?;
        for attachment in descriptor
            .color_attachments
            .iter()
            .chain(descriptor.depth_stencil_attachment.iter())
        {
            self.check_owned(&**attachment.texture)?;
        }
        let width_and_height = descriptor.validate()?;

        let attachment = |attachment: &FramebufferAttachment<'_>| NullAttachment {
            texture: attachment.texture.clone(),
            mipmap_index: attachment.mipmap_index,
            layer_index: attachment.layer_index,
        };
        let base = self.resource_base(
            ResourceType::Framebuffer,
            descriptor.label.as_deref().unwrap_or(""),
        );
        let framebuffer = self.track(NullFramebuffer::new(
            base,
            descriptor.render_pass.clone(),
            descriptor.color_attachments.iter().map(attachment).collect(),
            descriptor.depth_stencil_attachment.as_ref().map(attachment),
            width_and_height,
        ))?;
        Ok(Ref::from_arc(framebuffer as Arc<dyn Framebuffer>))
    }

    fn create_vertex_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Ref<dyn Buffer>, ResourceError> {
        descriptor.validate()?;
        self.create_buffer(ResourceType::VertexBuffer, descriptor, BufferLayout::Bytes)
    }

    fn create_index_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: IndexBufferFormat,
    ) -> Result<Ref<dyn IndexBuffer>, ResourceError> {
        descriptor.validate()?;
        if descriptor.number_of_bytes % format.number_of_bytes_per_element() != 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{} bytes is not a whole number of {format:?} indices",
                descriptor.number_of_bytes
            )));
        }
        let base = self.resource_base(ResourceType::IndexBuffer, descriptor.label_str());
        let index_buffer = self.track(NullIndexBuffer::new(base, descriptor, format))?;
        Ok(Ref::from_arc(index_buffer as Arc<dyn IndexBuffer>))
    }

    fn create_texture_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: TextureFormat,
    ) -> Result<Ref<dyn Buffer>, ResourceError> {
        descriptor.validate()?;
        if format.is_compressed() || format.is_depth() || format == TextureFormat::Unknown {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{format:?} cannot be the format of a texture buffer"
            )));
        }
        let texel = format.number_of_bytes_per_element();
        if descriptor.number_of_bytes % texel != 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{} bytes is not a whole number of {format:?} texels",
                descriptor.number_of_bytes
            )));
        }
        check_limit(
            "texture buffer texels",
            descriptor.number_of_bytes / texel,
            self.capabilities.maximum_texture_buffer_size,
        )?;
        self.create_buffer(
            ResourceType::TextureBuffer,
            descriptor,
            BufferLayout::Texels(format),
        )
    }

    fn create_structured_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        number_of_structure_bytes: u32,
    ) -> Result<Ref<dyn Buffer>, ResourceError> {
        descriptor.validate()?;
        if number_of_structure_bytes == 0
            || descriptor.number_of_bytes % number_of_structure_bytes != 0
        {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{} bytes is not a whole number of {number_of_structure_bytes}-byte structures",
                descriptor.number_of_bytes
            )));
        }
        check_limit(
            "structured buffer bytes",
            descriptor.number_of_bytes,
            self.capabilities.maximum_structured_buffer_size,
        )?;
        self.create_buffer(
            ResourceType::StructuredBuffer,
            descriptor,
            BufferLayout::Structures(number_of_structure_bytes),
        )
    }

    fn create_indirect_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Ref<dyn Buffer>, ResourceError> {
        descriptor.validate()?;
        if !descriptor
            .flags
            .intersects(BufferFlags::DRAW_ARGUMENTS | BufferFlags::DRAW_INDEXED_ARGUMENTS)
        {
            return Err(ResourceError::InvalidDescriptor(
                "an indirect buffer needs DRAW_ARGUMENTS or DRAW_INDEXED_ARGUMENTS".to_owned(),
            ));
        }
        check_limit(
            "indirect buffer bytes",
            descriptor.number_of_bytes,
            self.capabilities.maximum_indirect_buffer_size,
        )?;
        self.create_buffer(ResourceType::IndirectBuffer, descriptor, BufferLayout::Bytes)
    }

    fn create_uniform_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Ref<dyn Buffer>, ResourceError> {
        descriptor.validate()?;
        check_limit(
            "uniform buffer bytes",
            descriptor.number_of_bytes,
            self.capabilities.maximum_uniform_buffer_size,
        )?;
        self.create_buffer(ResourceType::UniformBuffer, descriptor, BufferLayout::Bytes)
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<Ref<dyn Texture>, ResourceError> {
        descriptor.validate()?;
        self.check_texture_limits(descriptor)?;
        let base = self.resource_base(descriptor.dimension.resource_type(), descriptor.label_str());
        let texture = self.track(NullTexture::new(base, descriptor))?;
        Ok(Ref::from_arc(texture as Arc<dyn Texture>))
    }

    fn create_root_signature(
        &self,
        descriptor: &RootSignatureDescriptor<'_>,
    ) -> Result<Ref<dyn RootSignature>, ResourceError> {
        descriptor.validate()?;
        let base = self.resource_base(ResourceType::RootSignature, descriptor.label_str());
        let root_signature =
            self.track(NullRootSignature::new(base, descriptor.clone().into_owned()))?;
        Ok(Ref::from_arc(root_signature as Arc<dyn RootSignature>))
    }

    fn create_resource_group(
        &self,
        descriptor: &ResourceGroupDescriptor<'_>,
    ) -> Result<Ref<dyn ResourceGroup>, ResourceError> {
        self.check_owned(&**descriptor.root_signature)?;
        for resource in descriptor.resources.iter() {
            self.check_owned(&**resource)?;
        }
        for sampler_state in descriptor.sampler_states.iter().flatten() {
            self.check_owned(&**sampler_state)?;
        }
        descriptor.validate()?;
        let base = self.resource_base(
            ResourceType::ResourceGroup,
            descriptor.label.as_deref().unwrap_or(""),
        );
        let resource_group = self.track(NullResourceGroup::new(
            base,
            descriptor.root_signature.clone(),
            descriptor.root_parameter_index,
            descriptor.resources.to_vec(),
            descriptor.sampler_states.to_vec(),
        ))?;
        Ok(Ref::from_arc(resource_group as Arc<dyn ResourceGroup>))
    }

    fn create_vertex_array(
        &self,
        descriptor: &VertexArrayDescriptor<'_>,
    ) -> Result<Ref<dyn VertexArray>, ResourceError> {
        for buffer in descriptor.vertex_buffers.iter() {
            self.check_owned(&**buffer)?;
        }
        if let Some(index_buffer) = descriptor.index_buffer {
            self.check_owned(&**index_buffer)?;
        }
        descriptor.validate()?;
        if !self.capabilities.instanced_arrays
            && descriptor
                .vertex_attributes
                .iter()
                .any(|attribute| attribute.instances_per_element > 0)
        {
            return Err(ResourceError::Unsupported(
                "per-instance vertex attributes".to_owned(),
            ));
        }
        let base = self.resource_base(
            ResourceType::VertexArray,
            descriptor.label.as_deref().unwrap_or(""),
        );
        let vertex_array = self.track(NullVertexArray::new(
            base,
            descriptor.vertex_buffers.to_vec(),
            descriptor.index_buffer.cloned(),
            descriptor
                .vertex_attributes
                .iter()
                .cloned()
                .map(|attribute| attribute.into_owned())
                .collect(),
        ))?;
        Ok(Ref::from_arc(vertex_array as Arc<dyn VertexArray>))
    }

    fn create_graphics_pipeline_state(
        &self,
        descriptor: &GraphicsPipelineStateDescriptor<'_>,
    ) -> Result<Ref<dyn GraphicsPipelineState>, ResourceError> {
        self.check_owned(&**descriptor.root_signature)?;
        self.check_owned(&**descriptor.graphics_program)?;
        self.check_owned(&**descriptor.render_pass)?;
        descriptor.validate(&self.capabilities)?;
        let base = self.resource_base(ResourceType::GraphicsPipelineState, descriptor.label_str());
        let pipeline_state = self.track(NullGraphicsPipelineState::new(
            base,
            descriptor.root_signature.clone(),
            descriptor.graphics_program.clone(),
            descriptor.render_pass.clone(),
            descriptor
                .vertex_attributes
                .iter()
                .cloned()
                .map(|attribute| attribute.into_owned())
                .collect(),
            descriptor.primitive_topology,
        ))?;
        Ok(Ref::from_arc(pipeline_state as Arc<dyn GraphicsPipelineState>))
    }

    fn create_compute_pipeline_state(
        &self,
        descriptor: &ComputePipelineStateDescriptor<'_>,
    ) -> Result<Ref<dyn ComputePipelineState>, ResourceError> {
        if !self.capabilities.compute_shader {
            return Err(ResourceError::Unsupported("compute shaders".to_owned()));
        }
        self.check_owned(&**descriptor.root_signature)?;
        self.check_owned(&**descriptor.compute_shader)?;
        descriptor.validate()?;
        let base = self.resource_base(ResourceType::ComputePipelineState, descriptor.label_str());
        let pipeline_state = self.track(NullComputePipelineState::new(
            base,
            descriptor.root_signature.clone(),
            descriptor.compute_shader.clone(),
        ))?;
        Ok(Ref::from_arc(pipeline_state as Arc<dyn ComputePipelineState>))
    }

    fn create_sampler_state(
        &self,
        descriptor: &SamplerStateDescriptor,
    ) -> Result<Ref<dyn SamplerState>, ResourceError> {
        descriptor.validate(&self.capabilities)?;
        let base = self.resource_base(ResourceType::SamplerState, "");
        let sampler_state = self.track(NullSamplerState::new(base, *descriptor))?;
        Ok(Ref::from_arc(sampler_state as Arc<dyn SamplerState>))
    }

    fn map(
        &self,
        resource: &dyn Resource,
        subresource: u32,
        map_type: MapType,
        flags: MapFlags,
    ) -> Result<MappedSubresource, ResourceError> {
        self.check_owned(resource)?;
        // Nothing runs on a GPU timeline, so DO_NOT_WAIT never has to fail.
        log::trace!(
            "Mapping {} {} subresource {subresource} for {map_type:?} ({flags:?})",
            resource.resource_type(),
            resource.id()
        );
        if let Some(storage) = buffer_storage(resource) {
            if subresource != 0 {
                return Err(ResourceError::OutOfBounds);
            }
            return storage.map(map_type);
        }
        if let Some(texture) = resource.as_any().downcast_ref::<NullTexture>() {
            return texture.map(subresource, map_type);
        }
        Err(ResourceError::Unsupported(format!(
            "{} resources cannot be mapped",
            resource.resource_type()
        )))
    }

    fn unmap(
        &self,
        resource: &dyn Resource,
        subresource: u32,
        mapped: MappedSubresource,
    ) -> Result<(), ResourceError> {
        self.check_owned(resource)?;
        if let Some(storage) = buffer_storage(resource) {
            if subresource != 0 {
                return Err(ResourceError::OutOfBounds);
            }
            return storage.unmap(mapped);
        }
        if let Some(texture) = resource.as_any().downcast_ref::<NullTexture>() {
            return texture.unmap(subresource, mapped);
        }
        Err(ResourceError::Unsupported(format!(
            "{} resources cannot be mapped",
            resource.resource_type()
        )))
    }

    fn get_query_pool_results(
        &self,
        query_pool: &dyn QueryPool,
        data: &mut [u8],
        first_query_index: u32,
        number_of_queries: u32,
        stride_in_bytes: u32,
        flags: QueryResultFlags,
    ) -> Result<bool, ResourceError> {
        self.check_owned(query_pool)?;
        let pool = query_pool
            .as_any()
            .downcast_ref::<NullQueryPool>()
            .ok_or(ResourceError::InvalidHandle)?;
        let result_size = query_pool.query_type().number_of_result_bytes() as usize;
        let stride = match stride_in_bytes {
            0 => result_size,
            stride => stride as usize,
        };
        if stride < result_size {
            return Err(ResourceError::InvalidDescriptor(format!(
                "a stride of {stride} bytes cannot hold {result_size}-byte results"
            )));
        }
        if number_of_queries == 0 {
            return Ok(true);
        }
        let required = (number_of_queries as usize - 1) * stride + result_size;
        if data.len() < required {
            return Err(ResourceError::OutOfBounds);
        }
        let results = pool
            .results(first_query_index, number_of_queries)
            .map_err(|_| ResourceError::OutOfBounds)?;

        if let Some(pending) = results.iter().position(Option::is_none) {
            if flags.contains(QueryResultFlags::WAIT) {
                return Err(ResourceError::BackendError(format!(
                    "query {} of pool {} was never issued; waiting for it would never return",
                    first_query_index as usize + pending,
                    query_pool.id()
                )));
            }
            return Ok(false);
        }
        for (index, result) in results.into_iter().flatten().enumerate() {
            let start = index * stride;
            data[start..start + result_size].copy_from_slice(&result);
        }
        Ok(true)
    }

    fn begin_scene(&self) -> Result<(), RenderError> {
        let mut replay = self.replay();
        if replay.in_scene {
            return Err(RenderError::Internal(
                "begin_scene called while a scene is already active".to_owned(),
            ));
        }
        replay.in_scene = true;
        replay.frame = FrameStatistics::default();
        log::trace!("Null device: scene begun");
        Ok(())
    }

    fn end_scene(&self) -> Result<(), RenderError> {
        let mut replay = self.replay();
        if !replay.in_scene {
            return Err(RenderError::Internal(
                "end_scene called without an active scene".to_owned(),
            ));
        }
        if replay.debug_event_depth > 0 {
            log::warn!(
                "Scene ended with {} unclosed debug event(s)",
                replay.debug_event_depth
            );
            replay.debug_event_depth = 0;
        }
        replay.in_scene = false;
        replay.bound.render_target = ResourceId::NULL;
        log::debug!("Null device: scene ended, {:?}", replay.frame);
        Ok(())
    }

    fn flush(&self) {
        log::trace!("Null device: flush");
    }

    fn finish(&self) {
        let mut resources = lock(&self.resources);
        let before = resources.len();
        resources.retain(|_, resource| resource.strong_count() > 0);
        log::trace!(
            "Null device: finish, forgot {} destroyed resource(s)",
            before - resources.len()
        );
    }

    fn on_resource_destroyed(&self, id: ResourceId) {
        lock(&self.resources).remove(&id);
    }

    fn dispatch_command_buffer(&self, command_buffer: &CommandBuffer) {
        {
            let mut replay = self.replay();
            if self.validate && !replay.in_scene {
                log::warn!("Command buffer dispatched outside of a scene");
            }
            let number_of_commands = u64::from(command_buffer.number_of_commands());
            replay.count(|statistics| statistics.number_of_commands += number_of_commands);
        }
        DISPATCH_TABLE.dispatch(command_buffer, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> Arc<NullDevice> {
        NullDevice::new(&DeviceSettings::default())
    }

    #[test]
    fn resource_ids_are_unique_and_resolvable() {
        let device = device();
        let first = device
            .create_vertex_buffer(&BufferDescriptor::zeroed(16))
            .unwrap();
        let second = device
            .create_uniform_buffer(&BufferDescriptor::zeroed(16))
            .unwrap();
        assert_ne!(first.id(), second.id());
        assert!(!first.id().is_null());
        assert!(device.resolve(first.id()).is_ok());

        let id = second.id();
        drop(second);
        assert!(device.resolve(id).is_err());
        assert_eq!(device.number_of_tracked_resources(), 1);
    }

    #[test]
    fn destroyed_resources_leave_the_id_registry() {
        let device = device();
        let kept = device
            .create_vertex_buffer(&BufferDescriptor::zeroed(16))
            .unwrap();
        for _ in 0..10_000 {
            let buffer = device
                .create_vertex_buffer(&BufferDescriptor::zeroed(16))
                .unwrap();
            drop(buffer);
        }
        assert_eq!(lock(&device.resources).len(), 1);
        assert!(device.resolve(kept.id()).is_ok());

        drop(kept);
        assert!(lock(&device.resources).is_empty());
        assert_eq!(device.statistics().number_of_current_resources(), 0);
    }

    #[test]
    fn scenes_do_not_nest() {
        let device = device();
        device.begin_scene().unwrap();
        assert!(device.is_in_scene());
        assert!(device.begin_scene().is_err());
        device.end_scene().unwrap();
        assert!(device.end_scene().is_err());
    }

    #[test]
    fn texture_limits_come_from_the_capabilities() {
        let settings = DeviceSettings {
            capabilities: Some(Capabilities {
                maximum_texture_dimension: 256,
                ..Capabilities::default()
            }),
            ..DeviceSettings::default()
        };
        let device = NullDevice::new(&settings);
        let error = device
            .create_texture(&TextureDescriptor::texture_2d(512, 16, TextureFormat::R8))
            .unwrap_err();
        assert!(matches!(
            error,
            ResourceError::CapabilityExceeded {
                requested: 512,
                maximum: 256,
                ..
            }
        ));
        assert!(device
            .create_texture(&TextureDescriptor::texture_2d(256, 16, TextureFormat::R8))
            .is_ok());
    }

    #[test]
    fn only_the_null_shader_language_exists() {
        let device = device();
        assert_eq!(device.number_of_shader_languages(), 1);
        assert_eq!(device.shader_language_name(0), Some("Null"));
        assert_eq!(device.shader_language_name(1), None);
        assert_eq!(device.shader_language(None).unwrap().name(), "Null");
        assert!(matches!(
            device.shader_language(Some("HLSL")),
            Err(ResourceError::Shader(ShaderError::UnknownLanguage(_)))
        ));
    }
}
