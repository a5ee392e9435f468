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

//! Replays recorded command packets on the Null device.
//!
//! Every handler resolves the ids a packet carries through the device
//! registry, validates the command against the bound state and the device
//! capabilities, then updates the replay state and the resources it touches.
//! A command that fails validation is logged, counted as rejected and
//! otherwise skipped; replay continues with the next packet.

use super::conversions::{encode_color, encode_depth, number_of_primitives};
use super::device::NullDevice;
use super::resources::{
    buffer_storage, NullAttachment, NullComputePipelineState, NullFramebuffer,
    NullGraphicsPipelineState, NullGraphicsProgram, NullQueryPool, NullResourceGroup,
    NullRootSignature, NullTexture, NullVertexArray,
};
use std::sync::{Arc, LazyLock};
use vesta_core::rhi::{
    BeginDebugEvent, BeginQuery, BufferFlags, ClearFlags, ClearGraphics, CommandDispatchFunction,
    CommandDispatchFunctionIndex as Index, ComputePipelineState, CopyResource,
    CopyUniformBufferData, DispatchCommandBuffer, DispatchCompute, DispatchTable, DrawArguments,
    DrawGraphics, DrawIndexedArguments, DrawIndexedGraphics, DrawMeshTasks, DrawMeshTasksArguments,
    EndDebugEvent, EndQuery, Framebuffer, GenerateMipmaps, GraphicsDevice, GraphicsPipelineState,
    GraphicsProgram, IndexBuffer, Packet, PrimitiveTopology, RenderPass, ResetQueryPool,
    ResolveMultisampleFramebuffer, Resource, ResourceGroup, ResourceId, ResourceType,
    SetComputePipelineState, SetComputeResourceGroup, SetComputeRootSignature, SetDebugMarker,
    SetGraphicsPipelineState, SetGraphicsRenderTarget, SetGraphicsResourceGroup,
    SetGraphicsRootSignature, SetGraphicsScissorRectangles, SetGraphicsVertexArray,
    SetGraphicsViewports, SetTextureMinimumMaximumMipmapIndex, SetUniform, Texture,
    TextureDimension, VertexArray, WriteTimestampQuery,
};

type Replay = Result<(), String>;

/// Wraps a fallible replay function into a table entry that rejects the
/// packet when it fails.
macro_rules! checked {
    ($replay:path) => {{
        fn handler(packet: &Packet<'_>, device: &NullDevice) {
            if let Err(message) = $replay(packet, device) {
                let command = packet
                    .dispatch_index()
                    .map_or("unknown command", Index::name);
                device.reject(format_args!("{command} rejected: {message}"));
            }
        }
        handler as CommandDispatchFunction<NullDevice>
    }};
}

/// The handlers of the Null device, one per command.
pub(crate) static DISPATCH_TABLE: LazyLock<DispatchTable<NullDevice>> = LazyLock::new(|| {
    DispatchTable::new(unhandled)
        // Composition
        .with(Index::DispatchCommandBuffer, dispatch_command_buffer)
        // Graphics
        .with(
            Index::SetGraphicsRootSignature,
            checked!(set_graphics_root_signature),
        )
        .with(
            Index::SetGraphicsPipelineState,
            checked!(set_graphics_pipeline_state),
        )
        .with(
            Index::SetGraphicsResourceGroup,
            checked!(set_graphics_resource_group),
        )
        .with(Index::SetGraphicsVertexArray, checked!(set_graphics_vertex_array))
        .with(Index::SetGraphicsViewports, checked!(set_graphics_viewports))
        .with(
            Index::SetGraphicsScissorRectangles,
            checked!(set_graphics_scissor_rectangles),
        )
        .with(Index::SetGraphicsRenderTarget, checked!(set_graphics_render_target))
        .with(Index::ClearGraphics, checked!(clear_graphics))
        .with(Index::DrawGraphics, checked!(draw_graphics))
        .with(Index::DrawIndexedGraphics, checked!(draw_indexed_graphics))
        .with(Index::DrawMeshTasks, checked!(draw_mesh_tasks))
        // Compute
        .with(Index::SetComputeRootSignature, checked!(set_compute_root_signature))
        .with(Index::SetComputePipelineState, checked!(set_compute_pipeline_state))
        .with(Index::SetComputeResourceGroup, checked!(set_compute_resource_group))
        .with(Index::DispatchCompute, checked!(dispatch_compute))
        // Resources
        .with(
            Index::SetTextureMinimumMaximumMipmapIndex,
            checked!(set_texture_minimum_maximum_mipmap_index),
        )
        .with(
            Index::ResolveMultisampleFramebuffer,
            checked!(resolve_multisample_framebuffer),
        )
        .with(Index::CopyResource, checked!(copy_resource))
        .with(Index::GenerateMipmaps, checked!(generate_mipmaps))
        .with(Index::CopyUniformBufferData, checked!(copy_uniform_buffer_data))
        .with(Index::SetUniform, checked!(set_uniform))
        // Queries
        .with(Index::ResetQueryPool, checked!(reset_query_pool))
        .with(Index::BeginQuery, checked!(begin_query))
        .with(Index::EndQuery, checked!(end_query))
        .with(Index::WriteTimestampQuery, checked!(write_timestamp_query))
        // Debug
        .with(Index::SetDebugMarker, set_debug_marker)
        .with(Index::BeginDebugEvent, begin_debug_event)
        .with(Index::EndDebugEvent, checked!(end_debug_event))
});

fn unhandled(packet: &Packet<'_>, device: &NullDevice) {
    device.reject(format_args!(
        "no handler for command packet at offset {}",
        packet.offset()
    ));
}

/// Borrows a resolved resource as the backend type `T`.
fn downcast<T: Resource>(resource: &Arc<dyn Resource>) -> Result<&T, String> {
    resource.as_any().downcast_ref::<T>().ok_or_else(|| {
        format!(
            "resource {} is a {}, which cannot be used here",
            resource.id(),
            resource.resource_type()
        )
    })
}

/// Checks that `id` names a live `T`, without keeping it.
fn check_kind<T: Resource>(device: &NullDevice, id: ResourceId) -> Replay {
    let resource = device.resolve(id)?;
    downcast::<T>(&resource).map(|_| ())
}

// --- Composition ---

fn dispatch_command_buffer(packet: &Packet<'_>, device: &NullDevice) {
    let nested = DispatchCommandBuffer::nested_packets(packet);
    let number_of_commands = nested.clone().count() as u64;
    // The dispatching packet was already counted by its parent; only leaves count.
    device.replay().count(|statistics| {
        statistics.number_of_commands =
            (statistics.number_of_commands + number_of_commands).saturating_sub(1);
    });
    DISPATCH_TABLE.dispatch_packets(nested, device);
}

// --- Graphics ---

fn set_graphics_root_signature(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetGraphicsRootSignature>();
    if !command.root_signature.is_null() {
        check_kind::<NullRootSignature>(device, command.root_signature)?;
    }
    let mut replay = device.replay();
    if replay.bound.graphics_root_signature != command.root_signature {
        replay.bound.graphics_resource_groups.clear();
    }
    replay.bound.graphics_root_signature = command.root_signature;
    Ok(())
}

fn set_graphics_pipeline_state(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetGraphicsPipelineState>();
    if !command.graphics_pipeline_state.is_null() {
        check_kind::<NullGraphicsPipelineState>(device, command.graphics_pipeline_state)?;
    }
    device.replay().bound.graphics_pipeline_state = command.graphics_pipeline_state;
    Ok(())
}

/// Validates a resource group against the root signature bound next to it.
fn check_resource_group(
    device: &NullDevice,
    root_parameter_index: u32,
    resource_group: ResourceId,
    bound_root_signature: ResourceId,
) -> Replay {
    let resource = device.resolve(resource_group)?;
    let group = downcast::<NullResourceGroup>(&resource)?;
    if group.root_parameter_index() != root_parameter_index {
        return Err(format!(
            "resource group {resource_group} was created for root parameter {}, not {root_parameter_index}",
            group.root_parameter_index()
        ));
    }
    if device.is_validating() && group.root_signature().id() != bound_root_signature {
        return Err(format!(
            "resource group {resource_group} was laid out against root signature {}, but {bound_root_signature} is bound",
            group.root_signature().id()
        ));
    }
    Ok(())
}

fn set_graphics_resource_group(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetGraphicsResourceGroup>();
    if command.resource_group.is_null() {
        device
            .replay()
            .bound
            .graphics_resource_groups
            .remove(&command.root_parameter_index);
        return Ok(());
    }
    let root_signature = device.replay().bound.graphics_root_signature;
    check_resource_group(
        device,
        command.root_parameter_index,
        command.resource_group,
        root_signature,
    )?;
    device
        .replay()
        .bound
        .graphics_resource_groups
        .insert(command.root_parameter_index, command.resource_group);
    Ok(())
}

fn set_graphics_vertex_array(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetGraphicsVertexArray>();
    if !command.vertex_array.is_null() {
        check_kind::<NullVertexArray>(device, command.vertex_array)?;
    }
    device.replay().bound.vertex_array = command.vertex_array;
    Ok(())
}

fn check_number_of_viewports(device: &NullDevice, what: &str, count: usize) -> Replay {
    let maximum = device.capabilities().maximum_number_of_viewports as usize;
    if count == 0 || count > maximum {
        return Err(format!(
            "{count} {what} given, the device supports 1 to {maximum}"
        ));
    }
    Ok(())
}

fn set_graphics_viewports(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let viewports = SetGraphicsViewports::viewports(packet);
    check_number_of_viewports(device, "viewports", viewports.len())?;
    device.replay().bound.viewports = viewports.into_owned();
    Ok(())
}

fn set_graphics_scissor_rectangles(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let scissor_rectangles = SetGraphicsScissorRectangles::scissor_rectangles(packet);
    check_number_of_viewports(device, "scissor rectangles", scissor_rectangles.len())?;
    device.replay().bound.scissor_rectangles = scissor_rectangles.into_owned();
    Ok(())
}

fn set_graphics_render_target(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetGraphicsRenderTarget>();
    if !command.render_target.is_null() {
        check_kind::<NullFramebuffer>(device, command.render_target)?;
    }
    device.replay().bound.render_target = command.render_target;
    Ok(())
}

fn attachment_texture(attachment: &NullAttachment) -> Result<&NullTexture, String> {
    attachment
        .texture
        .as_any()
        .downcast_ref::<NullTexture>()
        .ok_or_else(|| format!("attachment {} is not a Null texture", attachment.texture.id()))
}

fn clear_graphics(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<ClearGraphics>();
    let flags = command.flags();
    let render_target = device.replay().bound.render_target;
    if render_target.is_null() {
        return Err("no render target is bound".to_owned());
    }
    let resource = device.resolve(render_target)?;
    let framebuffer = downcast::<NullFramebuffer>(&resource)?;

    if flags.contains(ClearFlags::COLOR) {
        for attachment in framebuffer.color_attachments() {
            let texture = attachment_texture(attachment)?;
            let format = texture.info().format;
            let texel = encode_color(format, command.color)
                .ok_or_else(|| format!("{format:?} attachments cannot be cleared to a color"))?;
            texture.fill(attachment.mipmap_index, attachment.layer_index, &texel);
        }
    }
    if flags.contains(ClearFlags::DEPTH) {
        if let Some(attachment) = framebuffer.depth_stencil_attachment() {
            let texture = attachment_texture(attachment)?;
            let format = texture.info().format;
            let texel = encode_depth(format, command.z)
                .ok_or_else(|| format!("{format:?} attachments cannot be cleared to a depth"))?;
            texture.fill(attachment.mipmap_index, attachment.layer_index, &texel);
        }
    }
    if flags.contains(ClearFlags::STENCIL) {
        // No supported depth format carries a stencil plane.
        log::trace!("Ignoring stencil clear to {}", command.stencil);
    }
    device
        .replay()
        .count(|statistics| statistics.number_of_clears += 1);
    Ok(())
}

/// What a draw needs from the bound graphics state.
struct BoundPipeline {
    topology: PrimitiveTopology,
    /// Number of indices of the bound index buffer, for indexed draws.
    number_of_indices: Option<u32>,
}

fn bound_pipeline(device: &NullDevice, mesh: bool, indexed: bool) -> Result<BoundPipeline, String> {
    let bound = device.bound_state();
    if bound.graphics_pipeline_state.is_null() {
        return Err("no graphics pipeline state is bound".to_owned());
    }
    let resource = device.resolve(bound.graphics_pipeline_state)?;
    let pipeline_state = downcast::<NullGraphicsPipelineState>(&resource)?;

    let mesh_program = pipeline_state.graphics_program().is_mesh_program();
    if mesh_program != mesh {
        return Err(if mesh {
            "mesh tasks need a pipeline with a mesh program".to_owned()
        } else {
            "pipelines with a mesh program only draw mesh tasks".to_owned()
        });
    }

    if device.is_validating() {
        let root_signature = pipeline_state.root_signature().id();
        if root_signature != bound.graphics_root_signature {
            return Err(format!(
                "the pipeline uses root signature {root_signature}, but {} is bound",
                bound.graphics_root_signature
            ));
        }
        if !bound.render_target.is_null() {
            let render_target = device.resolve(bound.render_target)?;
            let framebuffer = downcast::<NullFramebuffer>(&render_target)?;
            let expected = pipeline_state.render_pass();
            let actual = framebuffer.render_pass();
            if expected.color_attachment_formats() != actual.color_attachment_formats()
                || expected.depth_stencil_attachment_format()
                    != actual.depth_stencil_attachment_format()
            {
                return Err(format!(
                    "render target {} does not match the render pass of the pipeline",
                    bound.render_target
                ));
            }
        }
    }

    let mut number_of_indices = None;
    let needs_vertex_array = !mesh && (indexed || !pipeline_state.vertex_attributes().is_empty());
    if needs_vertex_array {
        if bound.vertex_array.is_null() {
            return Err("no vertex array is bound".to_owned());
        }
        let resource = device.resolve(bound.vertex_array)?;
        let vertex_array = downcast::<NullVertexArray>(&resource)?;
        if indexed {
            let index_buffer = vertex_array
                .index_buffer()
                .ok_or("the bound vertex array has no index buffer")?;
            number_of_indices = Some(index_buffer.number_of_indices());
        }
    }

    Ok(BoundPipeline {
        topology: pipeline_state.primitive_topology(),
        number_of_indices,
    })
}

/// Reads `number_of_draws` argument records from an indirect buffer.
fn indirect_arguments<A: bytemuck::Pod>(
    device: &NullDevice,
    indirect_buffer: ResourceId,
    offset: u32,
    number_of_draws: u32,
    required_flag: BufferFlags,
) -> Result<Vec<A>, String> {
    let resource = device.resolve(indirect_buffer)?;
    if resource.resource_type() != ResourceType::IndirectBuffer {
        return Err(format!(
            "resource {indirect_buffer} is a {}, not an indirect buffer",
            resource.resource_type()
        ));
    }
    let storage = buffer_storage(&*resource)
        .ok_or_else(|| format!("resource {indirect_buffer} has no storage"))?;
    if !storage.flags().contains(required_flag) {
        return Err(format!(
            "indirect buffer {indirect_buffer} lacks the {required_flag:?} flag"
        ));
    }
    let stride = size_of::<A>();
    let bytes = storage
        .read(offset as usize, stride * number_of_draws as usize)
        .ok_or_else(|| {
            format!("{number_of_draws} draw(s) at offset {offset} overrun indirect buffer {indirect_buffer}")
        })?;
    Ok(bytes
        .chunks_exact(stride)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

fn check_instancing(device: &NullDevice, instance_count: u32, start_instance: u32) -> Replay {
    if (instance_count > 1 || start_instance > 0) && !device.capabilities().draw_instanced {
        return Err("the device cannot draw instanced".to_owned());
    }
    Ok(())
}

fn count_draws(device: &NullDevice, topology: PrimitiveTopology, draws: &[(u32, u32)]) {
    let (vertices, primitives) = draws.iter().fold((0u64, 0u64), |(v, p), &(count, instances)| {
        let instances = u64::from(instances);
        (
            v + u64::from(count) * instances,
            p + number_of_primitives(topology, u64::from(count)) * instances,
        )
    });
    let number_of_draws = draws.len() as u64;
    device.replay().count(|statistics| {
        statistics.number_of_draw_calls += number_of_draws;
        statistics.number_of_vertices += vertices;
        statistics.number_of_primitives += primitives;
    });
}

fn draw_graphics(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<DrawGraphics>();
    let pipeline = bound_pipeline(device, false, false)?;
    let arguments: Vec<DrawArguments> = if command.is_inline() {
        DrawGraphics::inline_arguments(packet).into_owned()
    } else {
        indirect_arguments(
            device,
            command.indirect_buffer,
            command.indirect_buffer_offset,
            command.number_of_draws,
            BufferFlags::DRAW_ARGUMENTS,
        )?
    };
    for arguments in &arguments {
        check_instancing(
            device,
            arguments.instance_count,
            arguments.start_instance_location,
        )?;
    }
    let draws: Vec<(u32, u32)> = arguments
        .iter()
        .map(|arguments| (arguments.vertex_count_per_instance, arguments.instance_count))
        .collect();
    count_draws(device, pipeline.topology, &draws);
    Ok(())
}

fn draw_indexed_graphics(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<DrawIndexedGraphics>();
    let pipeline = bound_pipeline(device, false, true)?;
    let arguments: Vec<DrawIndexedArguments> = if command.is_inline() {
        DrawIndexedGraphics::inline_arguments(packet).into_owned()
    } else {
        indirect_arguments(
            device,
            command.indirect_buffer,
            command.indirect_buffer_offset,
            command.number_of_draws,
            BufferFlags::DRAW_INDEXED_ARGUMENTS,
        )?
    };
    let number_of_indices = pipeline.number_of_indices.unwrap_or(0);
    for arguments in &arguments {
        check_instancing(
            device,
            arguments.instance_count,
            arguments.start_instance_location,
        )?;
        if arguments.base_vertex_location != 0 && !device.capabilities().base_vertex {
            return Err("the device does not support a base vertex".to_owned());
        }
        let end = u64::from(arguments.start_index_location)
            + u64::from(arguments.index_count_per_instance);
        if end > u64::from(number_of_indices) {
            return Err(format!(
                "indices {}..{end} overrun the {number_of_indices} bound indices",
                arguments.start_index_location
            ));
        }
    }
    let draws: Vec<(u32, u32)> = arguments
        .iter()
        .map(|arguments| (arguments.index_count_per_instance, arguments.instance_count))
        .collect();
    count_draws(device, pipeline.topology, &draws);
    Ok(())
}

fn draw_mesh_tasks(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<DrawMeshTasks>();
    if !device.capabilities().mesh_shader {
        return Err("the device has no mesh shaders".to_owned());
    }
    bound_pipeline(device, true, false)?;
    let arguments: Vec<DrawMeshTasksArguments> = if command.is_inline() {
        DrawMeshTasks::inline_arguments(packet).into_owned()
    } else {
        indirect_arguments(
            device,
            command.indirect_buffer,
            command.indirect_buffer_offset,
            command.number_of_draws,
            BufferFlags::DRAW_ARGUMENTS,
        )?
    };
    let number_of_draws = arguments.len() as u64;
    let number_of_tasks: u64 = arguments
        .iter()
        .map(|arguments| u64::from(arguments.number_of_tasks))
        .sum();
    device.replay().count(|statistics| {
        statistics.number_of_draw_calls += number_of_draws;
        statistics.number_of_mesh_tasks += number_of_tasks;
    });
    Ok(())
}

// --- Compute ---

fn set_compute_root_signature(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetComputeRootSignature>();
    if !command.root_signature.is_null() {
        check_kind::<NullRootSignature>(device, command.root_signature)?;
    }
    let mut replay = device.replay();
    if replay.bound.compute_root_signature != command.root_signature {
        replay.bound.compute_resource_groups.clear();
    }
    replay.bound.compute_root_signature = command.root_signature;
    Ok(())
}

fn set_compute_pipeline_state(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetComputePipelineState>();
    if !command.compute_pipeline_state.is_null() {
        check_kind::<NullComputePipelineState>(device, command.compute_pipeline_state)?;
    }
    device.replay().bound.compute_pipeline_state = command.compute_pipeline_state;
    Ok(())
}

fn set_compute_resource_group(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetComputeResourceGroup>();
    if command.resource_group.is_null() {
        device
            .replay()
            .bound
            .compute_resource_groups
            .remove(&command.root_parameter_index);
        return Ok(());
    }
    let root_signature = device.replay().bound.compute_root_signature;
    check_resource_group(
        device,
        command.root_parameter_index,
        command.resource_group,
        root_signature,
    )?;
    device
        .replay()
        .bound
        .compute_resource_groups
        .insert(command.root_parameter_index, command.resource_group);
    Ok(())
}

fn dispatch_compute(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<DispatchCompute>();
    let bound = device.bound_state();
    if bound.compute_pipeline_state.is_null() {
        return Err("no compute pipeline state is bound".to_owned());
    }
    let resource = device.resolve(bound.compute_pipeline_state)?;
    let pipeline_state = downcast::<NullComputePipelineState>(&resource)?;
    if device.is_validating() {
        let root_signature = pipeline_state.root_signature().id();
        if root_signature != bound.compute_root_signature {
            return Err(format!(
                "the pipeline uses root signature {root_signature}, but {} is bound",
                bound.compute_root_signature
            ));
        }
    }
    let groups = u64::from(command.group_count_x)
        * u64::from(command.group_count_y)
        * u64::from(command.group_count_z);
    device.replay().count(|statistics| {
        statistics.number_of_compute_dispatches += 1;
        statistics.number_of_compute_groups += groups;
    });
    Ok(())
}

// --- Resources ---

fn set_texture_minimum_maximum_mipmap_index(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetTextureMinimumMaximumMipmapIndex>();
    let resource = device.resolve(command.texture)?;
    downcast::<NullTexture>(&resource)?
        .set_mipmap_range(command.minimum_mipmap_index, command.maximum_mipmap_index)
}

/// The subresource a framebuffer attachment renders to.
fn attachment_subresource(texture: &NullTexture, attachment: &NullAttachment) -> u32 {
    let layer_index = match texture.info().dimension {
        TextureDimension::D3 => 0,
        _ => attachment.layer_index,
    };
    texture.subresource_index(attachment.mipmap_index, layer_index)
}

fn resolve_multisample_framebuffer(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<ResolveMultisampleFramebuffer>();
    let source = device.resolve(command.source_multisample_framebuffer)?;
    let source = downcast::<NullFramebuffer>(&source)?;
    let destination = device.resolve(command.destination_render_target)?;
    let destination = downcast::<NullFramebuffer>(&destination)?;

    if source.color_attachments().len() != destination.color_attachments().len() {
        return Err(format!(
            "cannot resolve {} color attachment(s) into {}",
            source.color_attachments().len(),
            destination.color_attachments().len()
        ));
    }
    for (from, to) in source
        .color_attachments()
        .iter()
        .zip(destination.color_attachments())
    {
        let from_texture = attachment_texture(from)?;
        let to_texture = attachment_texture(to)?;
        if from_texture.info().format != to_texture.info().format {
            return Err(format!(
                "cannot resolve {:?} texels into a {:?} attachment",
                from_texture.info().format,
                to_texture.info().format
            ));
        }
        // One sample is stored per texel, so resolving is a copy.
        to_texture.copy_subresource_from(
            attachment_subresource(to_texture, to),
            from_texture,
            attachment_subresource(from_texture, from),
        )?;
    }
    device
        .replay()
        .count(|statistics| statistics.number_of_copies += 1);
    Ok(())
}

fn copy_resource(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<CopyResource>();
    if command.destination_resource == command.source_resource {
        device.resolve(command.source_resource)?;
        return Ok(());
    }
    let source = device.resolve(command.source_resource)?;
    let destination = device.resolve(command.destination_resource)?;

    match (buffer_storage(&*destination), buffer_storage(&*source)) {
        (Some(to), Some(from)) => {
            let contents = from.contents();
            if contents.len() != to.contents().len() {
                return Err(format!(
                    "buffers differ in size: {} and {} bytes",
                    to.contents().len(),
                    contents.len()
                ));
            }
            to.write(0, &contents);
        }
        _ => {
            let to = destination.as_any().downcast_ref::<NullTexture>();
            let from = source.as_any().downcast_ref::<NullTexture>();
            match (to, from) {
                (Some(to), Some(from)) => to.copy_from(from)?,
                _ => {
                    return Err(format!(
                        "cannot copy a {} into a {}",
                        source.resource_type(),
                        destination.resource_type()
                    ))
                }
            }
        }
    }
    device
        .replay()
        .count(|statistics| statistics.number_of_copies += 1);
    Ok(())
}

fn generate_mipmaps(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<GenerateMipmaps>();
    let resource = device.resolve(command.texture)?;
    downcast::<NullTexture>(&resource)?.generate_mipmaps()
}

fn copy_uniform_buffer_data(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<CopyUniformBufferData>();
    let resource = device.resolve(command.uniform_buffer)?;
    if resource.resource_type() != ResourceType::UniformBuffer {
        return Err(format!(
            "resource {} is a {}, not a uniform buffer",
            command.uniform_buffer,
            resource.resource_type()
        ));
    }
    let storage = buffer_storage(&*resource)
        .ok_or_else(|| format!("resource {} has no storage", command.uniform_buffer))?;
    let data = CopyUniformBufferData::data(packet);
    if !storage.write(0, data) {
        return Err(format!(
            "{} bytes do not fit uniform buffer {}",
            data.len(),
            command.uniform_buffer
        ));
    }
    device
        .replay()
        .count(|statistics| statistics.number_of_copies += 1);
    Ok(())
}

fn set_uniform(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<SetUniform>();
    if !device.capabilities().individual_uniforms {
        return Err("the device has no individual uniforms".to_owned());
    }
    let kind = command
        .uniform_kind()
        .ok_or_else(|| format!("unknown uniform kind {}", command.kind))?;
    let resource = device.resolve(command.graphics_program)?;
    let program = downcast::<NullGraphicsProgram>(&resource)?;
    let components = &command.value[..kind.number_of_components()];
    if !program.set_uniform(command.uniform_handle, kind, components) {
        return Err(format!(
            "program {} has no uniform with handle {}",
            command.graphics_program, command.uniform_handle
        ));
    }
    Ok(())
}

// --- Queries ---

fn reset_query_pool(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<ResetQueryPool>();
    let resource = device.resolve(command.query_pool)?;
    downcast::<NullQueryPool>(&resource)?.reset(command.first_query_index, command.number_of_queries)
}

fn begin_query(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<BeginQuery>();
    let resource = device.resolve(command.query_pool)?;
    let query_pool = downcast::<NullQueryPool>(&resource)?;
    // Results are exact, so PRECISE needs no special handling.
    let counters = device.replay().lifetime;
    query_pool.begin(command.query_index, counters)
}

fn end_query(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<EndQuery>();
    let resource = device.resolve(command.query_pool)?;
    let query_pool = downcast::<NullQueryPool>(&resource)?;
    let counters = device.replay().lifetime;
    query_pool.end(command.query_index, counters)
}

fn write_timestamp_query(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    let command = packet.command::<WriteTimestampQuery>();
    let resource = device.resolve(command.query_pool)?;
    downcast::<NullQueryPool>(&resource)?.write_timestamp(command.query_index, device.timestamp())
}

// --- Debug ---

fn set_debug_marker(packet: &Packet<'_>, device: &NullDevice) {
    let command = packet.command::<SetDebugMarker>();
    if device.is_debug_enabled() {
        log::debug!("Debug marker: {}", command.name());
    }
    device
        .replay()
        .count(|statistics| statistics.number_of_debug_markers += 1);
}

fn begin_debug_event(packet: &Packet<'_>, device: &NullDevice) {
    let command = packet.command::<BeginDebugEvent>();
    let mut replay = device.replay();
    replay.debug_event_depth += 1;
    if device.is_debug_enabled() {
        log::debug!(
            "Debug event begun: {} (depth {})",
            command.name(),
            replay.debug_event_depth
        );
    }
    replay.count(|statistics| statistics.number_of_debug_markers += 1);
}

fn end_debug_event(packet: &Packet<'_>, device: &NullDevice) -> Replay {
    packet.command::<EndDebugEvent>();
    let mut replay = device.replay();
    if replay.debug_event_depth == 0 {
        return Err("no debug event is open".to_owned());
    }
    replay.debug_event_depth -= 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_handler() {
        let table = &*DISPATCH_TABLE;
        let fallback = unhandled as CommandDispatchFunction<NullDevice>;
        for &index in Index::ALL {
            assert!(
                !std::ptr::fn_addr_eq(table.get(index), fallback),
                "{index} has no handler"
            );
        }
    }
}
