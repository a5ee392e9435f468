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

//! Resource types of the Null backend.
//!
//! Buffers and textures keep their contents in CPU memory behind a mutex;
//! everything else only remembers what it was created from.

use super::conversions::{downsample, Extent};
use super::lock;
use super::state::FrameStatistics;
use std::collections::HashMap;
use std::sync::Mutex;
use vesta_core::rhi::{
    mipmap_size, Buffer, BufferDescriptor, BufferFlags, BufferUsage, ComputePipelineState,
    Framebuffer, GraphicsPipelineState, GraphicsProgram, IndexBuffer, IndexBufferFormat, MapType,
    MappedSubresource, PrimitiveTopology, QueryPool, QueryType, Ref, RenderPass, Resource,
    ResourceBase, ResourceError, ResourceGroup, RootSignature, RootSignatureDescriptor,
    SamplerState, SamplerStateDescriptor, Shader, ShaderStage, Texture, TextureDescriptor,
    TextureDimension, TextureFlags, TextureFormat, TextureInfo, UniformKind, VertexArray,
    VertexAttribute,
};

// --- Buffers ---

#[derive(Debug)]
struct BufferState {
    data: Vec<u8>,
    mapped: Option<MapType>,
}

/// The CPU-side contents shared by every buffer kind.
#[derive(Debug)]
pub(crate) struct BufferStorage {
    number_of_bytes: u32,
    flags: BufferFlags,
    usage: BufferUsage,
    state: Mutex<BufferState>,
}

impl BufferStorage {
    pub(crate) fn new(descriptor: &BufferDescriptor<'_>) -> Self {
        let data = match descriptor.data {
            Some(data) => data.to_vec(),
            None => vec![0; descriptor.number_of_bytes as usize],
        };
        Self {
            number_of_bytes: descriptor.number_of_bytes,
            flags: descriptor.flags,
            usage: descriptor.usage,
            state: Mutex::new(BufferState { data, mapped: None }),
        }
    }

    pub(crate) fn flags(&self) -> BufferFlags {
        self.flags
    }

    /// A copy of the whole contents.
    pub(crate) fn contents(&self) -> Vec<u8> {
        lock(&self.state).data.clone()
    }

    /// A copy of `length` bytes at `offset`, `None` past the end.
    pub(crate) fn read(&self, offset: usize, length: usize) -> Option<Vec<u8>> {
        let state = lock(&self.state);
        state
            .data
            .get(offset..offset.checked_add(length)?)
            .map(<[u8]>::to_vec)
    }

    /// Overwrites the bytes at `offset`. Returns `false` past the end.
    pub(crate) fn write(&self, offset: usize, bytes: &[u8]) -> bool {
        let mut state = lock(&self.state);
        let Some(end) = offset.checked_add(bytes.len()) else {
            return false;
        };
        match state.data.get_mut(offset..end) {
            Some(destination) => {
                destination.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    pub(crate) fn map(&self, map_type: MapType) -> Result<MappedSubresource, ResourceError> {
        let mut state = lock(&self.state);
        if state.mapped.is_some() {
            return Err(ResourceError::AlreadyMapped);
        }
        state.mapped = Some(map_type);
        let data = if map_type == MapType::WriteDiscard {
            vec![0; state.data.len()]
        } else {
            state.data.clone()
        };
        Ok(MappedSubresource {
            data,
            row_pitch: self.number_of_bytes,
            depth_pitch: self.number_of_bytes,
        })
    }

    pub(crate) fn unmap(&self, mapped: MappedSubresource) -> Result<(), ResourceError> {
        let mut state = lock(&self.state);
        let map_type = state.mapped.ok_or(ResourceError::NotMapped)?;
        if map_type.writes() {
            if mapped.data.len() != state.data.len() {
                return Err(ResourceError::OutOfBounds);
            }
            state.data = mapped.data;
        }
        state.mapped = None;
        Ok(())
    }
}

/// How the elements of a [`NullBuffer`] are interpreted by shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferLayout {
    /// Untyped bytes: vertex, indirect and uniform buffers.
    Bytes,
    /// Texels of the given format: texture buffers.
    Texels(TextureFormat),
    /// Structures of the given size: structured buffers.
    Structures(u32),
}

/// A buffer of the Null backend; every kind but index buffers.
#[derive(Debug)]
pub struct NullBuffer {
    base: ResourceBase,
    storage: BufferStorage,
    layout: BufferLayout,
}

vesta_core::impl_resource!(NullBuffer, base);

impl NullBuffer {
    pub(crate) fn new(
        base: ResourceBase,
        descriptor: &BufferDescriptor<'_>,
        layout: BufferLayout,
    ) -> Self {
        Self {
            base,
            storage: BufferStorage::new(descriptor),
            layout,
        }
    }

    pub(crate) fn storage(&self) -> &BufferStorage {
        &self.storage
    }

    /// How shaders interpret the elements.
    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    /// A copy of the buffer contents.
    pub fn contents(&self) -> Vec<u8> {
        self.storage.contents()
    }
}

impl Buffer for NullBuffer {
    fn number_of_bytes(&self) -> u32 {
        self.storage.number_of_bytes
    }

    fn flags(&self) -> BufferFlags {
        self.storage.flags
    }

    fn usage(&self) -> BufferUsage {
        self.storage.usage
    }
}

/// An index buffer of the Null backend.
#[derive(Debug)]
pub struct NullIndexBuffer {
    base: ResourceBase,
    storage: BufferStorage,
    format: IndexBufferFormat,
}

vesta_core::impl_resource!(NullIndexBuffer, base);

impl NullIndexBuffer {
    pub(crate) fn new(
        base: ResourceBase,
        descriptor: &BufferDescriptor<'_>,
        format: IndexBufferFormat,
    ) -> Self {
        Self {
            base,
            storage: BufferStorage::new(descriptor),
            format,
        }
    }

    pub(crate) fn storage(&self) -> &BufferStorage {
        &self.storage
    }

    /// A copy of the buffer contents.
    pub fn contents(&self) -> Vec<u8> {
        self.storage.contents()
    }
}

impl Buffer for NullIndexBuffer {
    fn number_of_bytes(&self) -> u32 {
        self.storage.number_of_bytes
    }

    fn flags(&self) -> BufferFlags {
        self.storage.flags
    }

    fn usage(&self) -> BufferUsage {
        self.storage.usage
    }
}

impl IndexBuffer for NullIndexBuffer {
    fn format(&self) -> IndexBufferFormat {
        self.format
    }
}

/// The storage of any Null buffer, `None` for other resources.
pub(crate) fn buffer_storage(resource: &dyn Resource) -> Option<&BufferStorage> {
    let any = resource.as_any();
    any.downcast_ref::<NullBuffer>()
        .map(NullBuffer::storage)
        .or_else(|| any.downcast_ref::<NullIndexBuffer>().map(NullIndexBuffer::storage))
}

// --- Textures ---

/// Where one subresource sits in a texture and how its bytes are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubresourceLayout {
    pub(crate) extent: Extent,
    pub(crate) row_pitch: u32,
    pub(crate) depth_pitch: u32,
}

impl SubresourceLayout {
    pub(crate) fn number_of_bytes(&self) -> usize {
        self.depth_pitch as usize * self.extent.depth as usize
    }
}

/// Number of layers of a texture: array slices times cube faces.
pub(crate) fn number_of_layers(info: &TextureInfo) -> u32 {
    let faces = if info.dimension.is_cube() { 6 } else { 1 };
    info.number_of_slices * faces
}

fn mipmap_layout(info: &TextureInfo, mipmap_index: u32) -> SubresourceLayout {
    let extent = Extent {
        width: mipmap_size(info.width, mipmap_index),
        height: mipmap_size(info.height, mipmap_index),
        depth: mipmap_size(info.depth, mipmap_index),
    };
    SubresourceLayout {
        extent,
        row_pitch: info.format.number_of_bytes_per_row(extent.width),
        depth_pitch: info.format.number_of_bytes_per_slice(extent.width, extent.height),
    }
}

#[derive(Debug)]
struct TextureState {
    /// Indexed by `mipmap + layer * number_of_mipmaps`.
    subresources: Vec<Vec<u8>>,
    mapped: HashMap<u32, MapType>,
    mipmap_range: (u32, u32),
}

/// A texture of the Null backend, of any dimension.
///
/// Multisampled textures store one sample per texel.
#[derive(Debug)]
pub struct NullTexture {
    base: ResourceBase,
    info: TextureInfo,
    state: Mutex<TextureState>,
}

vesta_core::impl_resource!(NullTexture, base);

impl NullTexture {
    /// Creates the texture from a validated descriptor.
    pub(crate) fn new(base: ResourceBase, descriptor: &TextureDescriptor<'_>) -> Self {
        let info = descriptor.info();
        let with_mipmaps = info.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS);
        let mut offset = 0;
        let mut subresources =
            Vec::with_capacity((info.number_of_mipmaps * number_of_layers(&info)) as usize);
        for layer_index in 0..number_of_layers(&info) {
            for mipmap_index in 0..info.number_of_mipmaps {
                debug_assert_eq!(
                    subresources.len() as u32,
                    mipmap_index + layer_index * info.number_of_mipmaps
                );
                let size = mipmap_layout(&info, mipmap_index).number_of_bytes();
                let initial = descriptor
                    .data
                    .filter(|_| mipmap_index == 0 || with_mipmaps)
                    .and_then(|data| data.get(offset..offset + size));
                match initial {
                    Some(bytes) => {
                        offset += size;
                        subresources.push(bytes.to_vec());
                    }
                    None => subresources.push(vec![0; size]),
                }
            }
        }
        Self {
            base,
            info,
            state: Mutex::new(TextureState {
                subresources,
                mapped: HashMap::new(),
                mipmap_range: (0, info.number_of_mipmaps - 1),
            }),
        }
    }

    /// Number of subresources: mipmaps times layers.
    pub fn number_of_subresources(&self) -> u32 {
        self.info.number_of_mipmaps * number_of_layers(&self.info)
    }

    pub(crate) fn subresource_index(&self, mipmap_index: u32, layer_index: u32) -> u32 {
        mipmap_index + layer_index * self.info.number_of_mipmaps
    }

    pub(crate) fn layout(&self, subresource: u32) -> Option<SubresourceLayout> {
        (subresource < self.number_of_subresources())
            .then(|| mipmap_layout(&self.info, subresource % self.info.number_of_mipmaps))
    }

    /// A copy of one subresource, `None` past the last one.
    pub fn subresource(&self, subresource: u32) -> Option<Vec<u8>> {
        lock(&self.state).subresources.get(subresource as usize).cloned()
    }

    /// The accessible mipmap range set by `SetTextureMinimumMaximumMipmapIndex`.
    pub fn mipmap_range(&self) -> (u32, u32) {
        lock(&self.state).mipmap_range
    }

    pub(crate) fn set_mipmap_range(&self, minimum: u32, maximum: u32) -> Result<(), String> {
        if minimum > maximum || maximum >= self.info.number_of_mipmaps {
            return Err(format!(
                "mipmap range {minimum}..={maximum} is invalid for {} mipmap(s)",
                self.info.number_of_mipmaps
            ));
        }
        lock(&self.state).mipmap_range = (minimum, maximum);
        Ok(())
    }

    /// Fills one attachment subresource with `texel`.
    ///
    /// For 3D textures `layer_index` selects a depth slice of the mipmap;
    /// otherwise it selects an array slice or cube face.
    pub(crate) fn fill(&self, mipmap_index: u32, layer_index: u32, texel: &[u8]) {
        let (subresource, slice) = if self.info.dimension == TextureDimension::D3 {
            (self.subresource_index(mipmap_index, 0), Some(layer_index))
        } else {
            (self.subresource_index(mipmap_index, layer_index), None)
        };
        let Some(layout) = self.layout(subresource) else {
            return;
        };
        let mut state = lock(&self.state);
        let Some(bytes) = state.subresources.get_mut(subresource as usize) else {
            return;
        };
        let region = match slice {
            Some(slice) => {
                let start = layout.depth_pitch as usize * slice as usize;
                match bytes.get_mut(start..start + layout.depth_pitch as usize) {
                    Some(region) => region,
                    None => return,
                }
            }
            None => &mut bytes[..],
        };
        for chunk in region.chunks_exact_mut(texel.len()) {
            chunk.copy_from_slice(texel);
        }
    }

    pub(crate) fn copy_subresource_from(
        &self,
        destination: u32,
        source: &NullTexture,
        source_subresource: u32,
    ) -> Result<(), String> {
        let bytes = source
            .subresource(source_subresource)
            .ok_or_else(|| format!("source subresource {source_subresource} does not exist"))?;
        let mut state = lock(&self.state);
        let target = state
            .subresources
            .get_mut(destination as usize)
            .ok_or_else(|| format!("destination subresource {destination} does not exist"))?;
        if target.len() != bytes.len() {
            return Err(format!(
                "subresource sizes differ: {} and {} bytes",
                target.len(),
                bytes.len()
            ));
        }
        *target = bytes;
        Ok(())
    }

    /// Replaces every subresource with the contents of `source`, which must
    /// have the same layout.
    pub(crate) fn copy_from(&self, source: &NullTexture) -> Result<(), String> {
        if source.info != self.info {
            return Err("textures differ in dimension, size, format or mipmaps".to_owned());
        }
        let contents = lock(&source.state).subresources.clone();
        lock(&self.state).subresources = contents;
        Ok(())
    }

    /// Rebuilds every mipmap below level 0.
    pub(crate) fn generate_mipmaps(&self) -> Result<(), String> {
        if !self.info.flags.contains(TextureFlags::GENERATE_MIPMAPS) {
            return Err("the texture was not created with GENERATE_MIPMAPS".to_owned());
        }
        let mut state = lock(&self.state);
        for layer_index in 0..number_of_layers(&self.info) {
            for mipmap_index in 1..self.info.number_of_mipmaps {
                let source_index = self.subresource_index(mipmap_index - 1, layer_index) as usize;
                let source_extent = mipmap_layout(&self.info, mipmap_index - 1).extent;
                let destination_extent = mipmap_layout(&self.info, mipmap_index).extent;
                let next = downsample(
                    self.info.format,
                    &state.subresources[source_index],
                    source_extent,
                    destination_extent,
                )
                .ok_or_else(|| format!("cannot downsample {:?} texels", self.info.format))?;
                state.subresources[source_index + 1] = next;
            }
        }
        Ok(())
    }

    pub(crate) fn map(
        &self,
        subresource: u32,
        map_type: MapType,
    ) -> Result<MappedSubresource, ResourceError> {
        let layout = self.layout(subresource).ok_or(ResourceError::OutOfBounds)?;
        let mut state = lock(&self.state);
        if state.mapped.contains_key(&subresource) {
            return Err(ResourceError::AlreadyMapped);
        }
        let data = if map_type == MapType::WriteDiscard {
            vec![0; layout.number_of_bytes()]
        } else {
            state.subresources[subresource as usize].clone()
        };
        state.mapped.insert(subresource, map_type);
        Ok(MappedSubresource {
            data,
            row_pitch: layout.row_pitch,
            depth_pitch: layout.depth_pitch,
        })
    }

    pub(crate) fn unmap(
        &self,
        subresource: u32,
        mapped: MappedSubresource,
    ) -> Result<(), ResourceError> {
        let mut state = lock(&self.state);
        let map_type = *state
            .mapped
            .get(&subresource)
            .ok_or(ResourceError::NotMapped)?;
        if map_type.writes() {
            let target = &mut state.subresources[subresource as usize];
            if mapped.data.len() != target.len() {
                return Err(ResourceError::OutOfBounds);
            }
            *target = mapped.data;
        }
        state.mapped.remove(&subresource);
        Ok(())
    }
}

impl Texture for NullTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// --- Render targets ---

/// A render pass of the Null backend.
#[derive(Debug)]
pub struct NullRenderPass {
    base: ResourceBase,
    color_attachment_formats: Vec<TextureFormat>,
    depth_stencil_attachment_format: TextureFormat,
    number_of_multisamples: u32,
}

vesta_core::impl_resource!(NullRenderPass, base);

impl NullRenderPass {
    pub(crate) fn new(
        base: ResourceBase,
        color_attachment_formats: Vec<TextureFormat>,
        depth_stencil_attachment_format: TextureFormat,
        number_of_multisamples: u32,
    ) -> Self {
        Self {
            base,
            color_attachment_formats,
            depth_stencil_attachment_format,
            number_of_multisamples,
        }
    }
}

impl RenderPass for NullRenderPass {
    fn color_attachment_formats(&self) -> &[TextureFormat] {
        &self.color_attachment_formats
    }

    fn depth_stencil_attachment_format(&self) -> TextureFormat {
        self.depth_stencil_attachment_format
    }

    fn number_of_multisamples(&self) -> u32 {
        self.number_of_multisamples
    }
}

/// One texture subresource bound to a [`NullFramebuffer`].
#[derive(Debug, Clone)]
pub struct NullAttachment {
    /// The attached texture.
    pub texture: Ref<dyn Texture>,
    /// The mipmap level rendered to.
    pub mipmap_index: u32,
    /// The array slice, cube face or depth slice rendered to.
    pub layer_index: u32,
}

/// A framebuffer of the Null backend. Keeps its render pass and textures
/// alive.
#[derive(Debug)]
pub struct NullFramebuffer {
    base: ResourceBase,
    render_pass: Ref<dyn RenderPass>,
    color_attachments: Vec<NullAttachment>,
    depth_stencil_attachment: Option<NullAttachment>,
    width_and_height: (u32, u32),
}

vesta_core::impl_resource!(NullFramebuffer, base);

impl NullFramebuffer {
    pub(crate) fn new(
        base: ResourceBase,
        render_pass: Ref<dyn RenderPass>,
        color_attachments: Vec<NullAttachment>,
        depth_stencil_attachment: Option<NullAttachment>,
        width_and_height: (u32, u32),
    ) -> Self {
        Self {
            base,
            render_pass,
            color_attachments,
            depth_stencil_attachment,
            width_and_height,
        }
    }

    /// The color attachments, in slot order.
    pub fn color_attachments(&self) -> &[NullAttachment] {
        &self.color_attachments
    }

    /// The depth attachment, if any.
    pub fn depth_stencil_attachment(&self) -> Option<&NullAttachment> {
        self.depth_stencil_attachment.as_ref()
    }
}

impl Framebuffer for NullFramebuffer {
    fn render_pass(&self) -> &Ref<dyn RenderPass> {
        &self.render_pass
    }

    fn width_and_height(&self) -> (u32, u32) {
        self.width_and_height
    }
}

// --- Samplers and queries ---

/// A sampler state of the Null backend.
#[derive(Debug)]
pub struct NullSamplerState {
    base: ResourceBase,
    descriptor: SamplerStateDescriptor,
}

vesta_core::impl_resource!(NullSamplerState, base);

impl NullSamplerState {
    pub(crate) fn new(base: ResourceBase, descriptor: SamplerStateDescriptor) -> Self {
        Self { base, descriptor }
    }
}

impl SamplerState for NullSamplerState {
    fn descriptor(&self) -> &SamplerStateDescriptor {
        &self.descriptor
    }
}

#[derive(Debug, Clone, PartialEq)]
enum QueryState {
    Unavailable,
    Active(FrameStatistics),
    Available(Vec<u8>),
}

/// A query pool of the Null backend.
///
/// Results become available as soon as the query ends: the Null backend has
/// no GPU timeline to wait for.
#[derive(Debug)]
pub struct NullQueryPool {
    base: ResourceBase,
    query_type: QueryType,
    queries: Mutex<Vec<QueryState>>,
}

vesta_core::impl_resource!(NullQueryPool, base);

impl NullQueryPool {
    pub(crate) fn new(base: ResourceBase, query_type: QueryType, number_of_queries: u32) -> Self {
        Self {
            base,
            query_type,
            queries: Mutex::new(vec![QueryState::Unavailable; number_of_queries as usize]),
        }
    }

    fn check_range(&self, first: u32, count: u32) -> Result<std::ops::Range<usize>, String> {
        let end = first
            .checked_add(count)
            .filter(|end| *end <= self.number_of_queries())
            .ok_or_else(|| {
                format!(
                    "queries {first}..{} are out of the pool's {} queries",
                    first.saturating_add(count),
                    self.number_of_queries()
                )
            })?;
        Ok(first as usize..end as usize)
    }

    pub(crate) fn reset(&self, first: u32, count: u32) -> Result<(), String> {
        let range = self.check_range(first, count)?;
        lock(&self.queries)[range].fill(QueryState::Unavailable);
        Ok(())
    }

    pub(crate) fn begin(&self, index: u32, counters: FrameStatistics) -> Result<(), String> {
        if self.query_type == QueryType::Timestamp {
            return Err("timestamp queries are written, not begun".to_owned());
        }
        let range = self.check_range(index, 1)?;
        let mut queries = lock(&self.queries);
        if matches!(queries[range.start], QueryState::Active(_)) {
            return Err(format!("query {index} is already active"));
        }
        queries[range.start] = QueryState::Active(counters);
        Ok(())
    }

    pub(crate) fn end(&self, index: u32, counters: FrameStatistics) -> Result<(), String> {
        let range = self.check_range(index, 1)?;
        let mut queries = lock(&self.queries);
        let QueryState::Active(begin) = queries[range.start] else {
            return Err(format!("query {index} was not begun"));
        };
        let result = match self.query_type {
            QueryType::Occlusion => counters.samples_passed_since(&begin).to_le_bytes().to_vec(),
            QueryType::PipelineStatistics => {
                bytemuck::bytes_of(&counters.pipeline_statistics_since(&begin)).to_vec()
            }
            QueryType::Timestamp => return Err("timestamp queries cannot be ended".to_owned()),
        };
        queries[range.start] = QueryState::Available(result);
        Ok(())
    }

    pub(crate) fn write_timestamp(&self, index: u32, nanoseconds: u64) -> Result<(), String> {
        if self.query_type != QueryType::Timestamp {
            return Err(format!("{:?} pools cannot record timestamps", self.query_type));
        }
        let range = self.check_range(index, 1)?;
        lock(&self.queries)[range.start] =
            QueryState::Available(nanoseconds.to_le_bytes().to_vec());
        Ok(())
    }

    /// The results of `count` queries from `first`, `None` for every query
    /// whose result is not available.
    pub(crate) fn results(&self, first: u32, count: u32) -> Result<Vec<Option<Vec<u8>>>, String> {
        let range = self.check_range(first, count)?;
        Ok(lock(&self.queries)[range]
            .iter()
            .map(|query| match query {
                QueryState::Available(result) => Some(result.clone()),
                _ => None,
            })
            .collect())
    }
}

impl QueryPool for NullQueryPool {
    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn number_of_queries(&self) -> u32 {
        lock(&self.queries).len() as u32
    }
}

// --- Shaders ---

/// A shader of the Null backend. The code is kept verbatim and never compiled.
#[derive(Debug)]
pub struct NullShader {
    base: ResourceBase,
    stage: ShaderStage,
    shader_language_name: String,
    code: Vec<u8>,
}

vesta_core::impl_resource!(NullShader, base);

impl NullShader {
    pub(crate) fn new(
        base: ResourceBase,
        stage: ShaderStage,
        shader_language_name: &str,
        code: Vec<u8>,
    ) -> Self {
        Self {
            base,
            stage,
            shader_language_name: shader_language_name.to_owned(),
            code,
        }
    }

    /// The source text or bytecode the shader was created from.
    pub fn code(&self) -> &[u8] {
        &self.code
    }
}

impl Shader for NullShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn shader_language_name(&self) -> &str {
        &self.shader_language_name
    }
}

#[derive(Debug, Clone)]
struct NullUniform {
    name: String,
    value: Option<(UniformKind, Vec<u32>)>,
}

/// A graphics program of the Null backend.
///
/// Without shader reflection every non-empty uniform name is accepted; the
/// first lookup of a name allocates its handle.
#[derive(Debug)]
pub struct NullGraphicsProgram {
    base: ResourceBase,
    root_signature: Ref<dyn RootSignature>,
    shaders: Vec<Ref<dyn Shader>>,
    mesh_program: bool,
    uniforms: Mutex<Vec<NullUniform>>,
}

vesta_core::impl_resource!(NullGraphicsProgram, base);

impl NullGraphicsProgram {
    pub(crate) fn new(
        base: ResourceBase,
        root_signature: Ref<dyn RootSignature>,
        shaders: Vec<Ref<dyn Shader>>,
        mesh_program: bool,
    ) -> Self {
        Self {
            base,
            root_signature,
            shaders,
            mesh_program,
            uniforms: Mutex::new(Vec::new()),
        }
    }

    /// The root signature the program was linked against.
    pub fn root_signature(&self) -> &Ref<dyn RootSignature> {
        &self.root_signature
    }

    /// The linked shaders.
    pub fn shaders(&self) -> &[Ref<dyn Shader>] {
        &self.shaders
    }

    /// The last value set for a uniform as raw 32-bit components.
    pub fn uniform_value(&self, handle: u32) -> Option<(UniformKind, Vec<u32>)> {
        lock(&self.uniforms)
            .get(handle as usize)
            .and_then(|uniform| uniform.value.clone())
    }

    pub(crate) fn set_uniform(&self, handle: u32, kind: UniformKind, components: &[u32]) -> bool {
        match lock(&self.uniforms).get_mut(handle as usize) {
            Some(uniform) => {
                uniform.value = Some((kind, components.to_vec()));
                true
            }
            None => false,
        }
    }
}

impl GraphicsProgram for NullGraphicsProgram {
    fn is_mesh_program(&self) -> bool {
        self.mesh_program
    }

    fn uniform_handle(&self, name: &str) -> Option<u32> {
        if name.is_empty() {
            return None;
        }
        let mut uniforms = lock(&self.uniforms);
        let handle = match uniforms.iter().position(|uniform| uniform.name == name) {
            Some(index) => index,
            None => {
                uniforms.push(NullUniform {
                    name: name.to_owned(),
                    value: None,
                });
                uniforms.len() - 1
            }
        };
        Some(handle as u32)
    }
}

// --- Pipeline objects ---

/// A vertex array of the Null backend. Keeps its buffers alive.
#[derive(Debug)]
pub struct NullVertexArray {
    base: ResourceBase,
    vertex_buffers: Vec<Ref<dyn Buffer>>,
    index_buffer: Option<Ref<dyn IndexBuffer>>,
    vertex_attributes: Vec<VertexAttribute<'static>>,
}

vesta_core::impl_resource!(NullVertexArray, base);

impl NullVertexArray {
    pub(crate) fn new(
        base: ResourceBase,
        vertex_buffers: Vec<Ref<dyn Buffer>>,
        index_buffer: Option<Ref<dyn IndexBuffer>>,
        vertex_attributes: Vec<VertexAttribute<'static>>,
    ) -> Self {
        Self {
            base,
            vertex_buffers,
            index_buffer,
            vertex_attributes,
        }
    }
}

impl VertexArray for NullVertexArray {
    fn vertex_buffers(&self) -> &[Ref<dyn Buffer>] {
        &self.vertex_buffers
    }

    fn index_buffer(&self) -> Option<&Ref<dyn IndexBuffer>> {
        self.index_buffer.as_ref()
    }

    fn vertex_attributes(&self) -> &[VertexAttribute<'static>] {
        &self.vertex_attributes
    }
}

/// A root signature of the Null backend.
#[derive(Debug)]
pub struct NullRootSignature {
    base: ResourceBase,
    descriptor: RootSignatureDescriptor<'static>,
}

vesta_core::impl_resource!(NullRootSignature, base);

impl NullRootSignature {
    pub(crate) fn new(base: ResourceBase, descriptor: RootSignatureDescriptor<'static>) -> Self {
        Self { base, descriptor }
    }
}

impl RootSignature for NullRootSignature {
    fn descriptor(&self) -> &RootSignatureDescriptor<'static> {
        &self.descriptor
    }
}

/// A resource group of the Null backend. Keeps its resources alive.
#[derive(Debug)]
pub struct NullResourceGroup {
    base: ResourceBase,
    root_signature: Ref<dyn RootSignature>,
    root_parameter_index: u32,
    resources: Vec<Ref<dyn Resource>>,
    sampler_states: Vec<Option<Ref<dyn SamplerState>>>,
}

vesta_core::impl_resource!(NullResourceGroup, base);

impl NullResourceGroup {
    pub(crate) fn new(
        base: ResourceBase,
        root_signature: Ref<dyn RootSignature>,
        root_parameter_index: u32,
        resources: Vec<Ref<dyn Resource>>,
        sampler_states: Vec<Option<Ref<dyn SamplerState>>>,
    ) -> Self {
        Self {
            base,
            root_signature,
            root_parameter_index,
            resources,
            sampler_states,
        }
    }

    /// The root signature the group was laid out against.
    pub fn root_signature(&self) -> &Ref<dyn RootSignature> {
        &self.root_signature
    }
}

impl ResourceGroup for NullResourceGroup {
    fn root_parameter_index(&self) -> u32 {
        self.root_parameter_index
    }

    fn resources(&self) -> &[Ref<dyn Resource>] {
        &self.resources
    }

    fn sampler_states(&self) -> &[Option<Ref<dyn SamplerState>>] {
        &self.sampler_states
    }
}

/// A graphics pipeline state of the Null backend.
#[derive(Debug)]
pub struct NullGraphicsPipelineState {
    base: ResourceBase,
    root_signature: Ref<dyn RootSignature>,
    graphics_program: Ref<dyn GraphicsProgram>,
    render_pass: Ref<dyn RenderPass>,
    vertex_attributes: Vec<VertexAttribute<'static>>,
    primitive_topology: PrimitiveTopology,
}

vesta_core::impl_resource!(NullGraphicsPipelineState, base);

impl NullGraphicsPipelineState {
    pub(crate) fn new(
        base: ResourceBase,
        root_signature: Ref<dyn RootSignature>,
        graphics_program: Ref<dyn GraphicsProgram>,
        render_pass: Ref<dyn RenderPass>,
        vertex_attributes: Vec<VertexAttribute<'static>>,
        primitive_topology: PrimitiveTopology,
    ) -> Self {
        Self {
            base,
            root_signature,
            graphics_program,
            render_pass,
            vertex_attributes,
            primitive_topology,
        }
    }

    /// The vertex input layout.
    pub fn vertex_attributes(&self) -> &[VertexAttribute<'static>] {
        &self.vertex_attributes
    }
}

impl GraphicsPipelineState for NullGraphicsPipelineState {
    fn root_signature(&self) -> &Ref<dyn RootSignature> {
        &self.root_signature
    }

    fn graphics_program(&self) -> &Ref<dyn GraphicsProgram> {
        &self.graphics_program
    }

    fn render_pass(&self) -> &Ref<dyn RenderPass> {
        &self.render_pass
    }

    fn primitive_topology(&self) -> PrimitiveTopology {
        self.primitive_topology
    }
}

/// A compute pipeline state of the Null backend.
#[derive(Debug)]
pub struct NullComputePipelineState {
    base: ResourceBase,
    root_signature: Ref<dyn RootSignature>,
    compute_shader: Ref<dyn Shader>,
}

vesta_core::impl_resource!(NullComputePipelineState, base);

impl NullComputePipelineState {
    pub(crate) fn new(
        base: ResourceBase,
        root_signature: Ref<dyn RootSignature>,
        compute_shader: Ref<dyn Shader>,
    ) -> Self {
        Self {
            base,
            root_signature,
            compute_shader,
        }
    }
}

impl ComputePipelineState for NullComputePipelineState {
    fn root_signature(&self) -> &Ref<dyn RootSignature> {
        &self.root_signature
    }

    fn compute_shader(&self) -> &Ref<dyn Shader> {
        &self.compute_shader
    }
}
