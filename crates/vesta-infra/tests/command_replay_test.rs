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

mod common;

use approx::assert_relative_eq;
use common::{null_device, DrawSetup};
use std::borrow::Cow;
use vesta_core::rhi::{
    BeginDebugEvent, BeginQuery, BufferDescriptor, BufferFlags, ClearFlags, ClearGraphics,
    CommandBuffer, CopyResource, CopyUniformBufferData, DispatchCommandBuffer, DrawArguments,
    DrawGraphics, DrawIndexedArguments, DrawIndexedGraphics, EndDebugEvent, EndQuery,
    GenerateMipmaps, GraphicsDevice, GraphicsProgram, IndexBufferFormat, MapFlags, MapType,
    PipelineStatisticsQueryResult, QueryControlFlags, QueryPoolDescriptor, QueryResultFlags,
    QueryType, Resource, SetDebugMarker, SetGraphicsPipelineState, SetGraphicsRenderTarget,
    SetGraphicsRootSignature, SetGraphicsVertexArray, SetGraphicsViewports, SetUniform,
    TextureDescriptor, TextureFlags, TextureFormat, UniformKind, VertexArrayDescriptor,
    WriteTimestampQuery,
};
use vesta_infra::graphics::null::{NullBuffer, NullDevice, NullGraphicsProgram, NullTexture};

/// Records the bindings every draw of `setup` needs.
fn record_bindings(command_buffer: &mut CommandBuffer, setup: &DrawSetup) {
    SetGraphicsRootSignature::create(command_buffer, Some(&*setup.root_signature));
    SetGraphicsPipelineState::create(command_buffer, Some(&*setup.pipeline_state));
    SetGraphicsRenderTarget::create(command_buffer, Some(&*setup.framebuffer));
    SetGraphicsViewports::create_single(command_buffer, 0.0, 0.0, 4.0, 4.0);
}

fn replay(device: &NullDevice, command_buffer: &CommandBuffer) {
    device.begin_scene().unwrap();
    command_buffer.dispatch_to_rhi(device);
    device.end_scene().unwrap();
}

#[test]
fn test_clear_fills_the_render_target() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let setup = DrawSetup::new(&device);
    let mut command_buffer = CommandBuffer::new();
    SetGraphicsRenderTarget::create(&mut command_buffer, Some(&*setup.framebuffer));
    ClearGraphics::create(
        &mut command_buffer,
        ClearFlags::COLOR | ClearFlags::DEPTH,
        [1.0, 0.5, 0.0, 1.0],
        1.0,
        0,
    );

    // --- 2. ACT ---
    replay(&device, &command_buffer);

    // --- 3. ASSERT ---
    let texels = setup.color_texels();
    assert_eq!(texels.len(), 4 * 4 * 4);
    for texel in texels.chunks_exact(4) {
        assert_eq!(texel, [255, 128, 0, 255]);
    }
    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_clears, 1);
    assert_eq!(statistics.number_of_rejected_commands, 0);
    assert_eq!(statistics.number_of_commands, 2);
}

#[test]
fn test_clear_without_render_target_is_rejected() {
    let device = null_device();
    let mut command_buffer = CommandBuffer::new();
    ClearGraphics::create(&mut command_buffer, ClearFlags::COLOR, [0.0; 4], 1.0, 0);

    replay(&device, &command_buffer);

    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_clears, 0);
    assert_eq!(statistics.number_of_rejected_commands, 1);
}

#[test]
fn test_draws_are_counted_against_the_bound_state() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let setup = DrawSetup::new(&device);
    let mut command_buffer = CommandBuffer::new();
    record_bindings(&mut command_buffer, &setup);
    DrawGraphics::create_single(&mut command_buffer, DrawArguments::new(3));
    DrawGraphics::create_inline(
        &mut command_buffer,
        &[
            DrawArguments::new(6),
            DrawArguments {
                instance_count: 2,
                ..DrawArguments::new(3)
            },
        ],
    );

    // --- 2. ACT ---
    device.begin_scene().unwrap();
    command_buffer.dispatch_to_rhi(&*device);
    let bound = device.bound_state();
    device.end_scene().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(bound.graphics_root_signature, setup.root_signature.id());
    assert_eq!(bound.graphics_pipeline_state, setup.pipeline_state.id());
    assert_eq!(bound.render_target, setup.framebuffer.id());
    assert_eq!(bound.viewports.len(), 1);
    assert!(
        device.bound_state().render_target.is_null(),
        "Ending the scene unbinds the render target"
    );

    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_draw_calls, 3);
    assert_eq!(statistics.number_of_vertices, 3 + 6 + 3 * 2);
    assert_eq!(statistics.number_of_primitives, 1 + 2 + 2);
    assert_eq!(statistics.number_of_rejected_commands, 0);
}

#[test]
fn test_draw_without_pipeline_is_rejected() {
    let device = null_device();
    let mut command_buffer = CommandBuffer::new();
    DrawGraphics::create_single(&mut command_buffer, DrawArguments::new(3));

    replay(&device, &command_buffer);

    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_draw_calls, 0);
    assert_eq!(statistics.number_of_rejected_commands, 1);
}

#[test]
fn test_indexed_draws_stay_within_the_index_buffer() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let setup = DrawSetup::new(&device);
    let indices: [u16; 6] = [0, 1, 2, 2, 1, 3];
    let index_buffer = device
        .create_index_buffer(
            &BufferDescriptor::with_data(bytemuck::cast_slice(&indices)),
            IndexBufferFormat::UnsignedShort,
        )
        .unwrap();
    let vertex_array = device
        .create_vertex_array(&VertexArrayDescriptor {
            label: None,
            vertex_attributes: Cow::Borrowed(&[]),
            vertex_buffers: Cow::Borrowed(&[]),
            index_buffer: Some(&index_buffer),
        })
        .unwrap();

    let mut command_buffer = CommandBuffer::new();
    record_bindings(&mut command_buffer, &setup);
    SetGraphicsVertexArray::create(&mut command_buffer, Some(&*vertex_array));
    DrawIndexedGraphics::create_single(&mut command_buffer, DrawIndexedArguments::new(6));
    DrawIndexedGraphics::create_single(
        &mut command_buffer,
        DrawIndexedArguments {
            start_index_location: 3,
            ..DrawIndexedArguments::new(6)
        },
    );

    // --- 2. ACT ---
    replay(&device, &command_buffer);

    // --- 3. ASSERT ---
    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_draw_calls, 1);
    assert_eq!(statistics.number_of_primitives, 2);
    assert_eq!(
        statistics.number_of_rejected_commands, 1,
        "Indices 3..9 overrun the six bound indices"
    );
}

#[test]
fn test_indirect_draws_read_their_arguments_from_the_buffer() {
    let device = null_device();
    let setup = DrawSetup::new(&device);
    let arguments = [
        DrawArguments::new(3),
        DrawArguments {
            instance_count: 4,
            ..DrawArguments::new(6)
        },
    ];
    let indirect_buffer = device
        .create_indirect_buffer(
            &BufferDescriptor::with_data(bytemuck::cast_slice(&arguments))
                .flags(BufferFlags::DRAW_ARGUMENTS),
        )
        .unwrap();

    let mut command_buffer = CommandBuffer::new();
    record_bindings(&mut command_buffer, &setup);
    DrawGraphics::create(&mut command_buffer, &*indirect_buffer, 0, 2);
    // One record past the end.
    DrawGraphics::create(
        &mut command_buffer,
        &*indirect_buffer,
        DrawGraphics::arguments_stride(),
        2,
    );
    replay(&device, &command_buffer);

    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_draw_calls, 2);
    assert_eq!(statistics.number_of_vertices, 3 + 6 * 4);
    assert_eq!(statistics.number_of_rejected_commands, 1);
}

#[test]
fn test_nested_command_buffers_are_replayed_in_place() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let setup = DrawSetup::new(&device);
    let mut inner = CommandBuffer::new();
    DrawGraphics::create_single(&mut inner, DrawArguments::new(3));
    SetDebugMarker::create(&mut inner, "inner draw");

    let mut middle = CommandBuffer::new();
    DispatchCommandBuffer::create(&mut middle, &inner);
    SetDebugMarker::create(&mut middle, "middle");

    let mut outer = CommandBuffer::new();
    record_bindings(&mut outer, &setup);
    DispatchCommandBuffer::create(&mut outer, &inner);
    DispatchCommandBuffer::create(&mut outer, &middle);

    // --- 2. ACT ---
    replay(&device, &outer);

    // --- 3. ASSERT ---
    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_draw_calls, 2);
    assert_eq!(statistics.number_of_debug_markers, 3);
    // Only leaf commands count: the four bindings, two inner buffers of two
    // commands each and the middle marker.
    assert_eq!(statistics.number_of_commands, 4 + 2 * 2 + 1);
    assert_eq!(statistics.number_of_rejected_commands, 0);
}

#[test]
fn test_queries_measure_the_replayed_work() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let setup = DrawSetup::new(&device);
    let occlusion = device
        .create_query_pool(&QueryPoolDescriptor {
            label: None,
            query_type: QueryType::Occlusion,
            number_of_queries: 1,
        })
        .unwrap();
    let pipeline_statistics = device
        .create_query_pool(&QueryPoolDescriptor {
            label: None,
            query_type: QueryType::PipelineStatistics,
            number_of_queries: 1,
        })
        .unwrap();
    let timestamps = device
        .create_query_pool(&QueryPoolDescriptor {
            label: None,
            query_type: QueryType::Timestamp,
            number_of_queries: 2,
        })
        .unwrap();

    let mut command_buffer = CommandBuffer::new();
    record_bindings(&mut command_buffer, &setup);
    DrawGraphics::create_single(&mut command_buffer, DrawArguments::new(300));
    WriteTimestampQuery::create(&mut command_buffer, &*timestamps, 0);
    BeginQuery::create_with_reset(&mut command_buffer, &*occlusion, 0, QueryControlFlags::PRECISE);
    BeginQuery::create(
        &mut command_buffer,
        &*pipeline_statistics,
        0,
        QueryControlFlags::EMPTY,
    );
    DrawGraphics::create_single(&mut command_buffer, DrawArguments::new(36));
    EndQuery::create(&mut command_buffer, &*pipeline_statistics, 0);
    EndQuery::create(&mut command_buffer, &*occlusion, 0);
    WriteTimestampQuery::create(&mut command_buffer, &*timestamps, 1);

    // --- 2. ACT ---
    replay(&device, &command_buffer);

    // --- 3. ASSERT ---
    let mut samples = [0u8; 8];
    assert!(device
        .get_query_pool_results(&*occlusion, &mut samples, 0, 1, 0, QueryResultFlags::WAIT)
        .unwrap());
    assert_eq!(u64::from_le_bytes(samples), 36);

    let mut bytes = [0u8; size_of::<PipelineStatisticsQueryResult>()];
    assert!(device
        .get_query_pool_results(
            &*pipeline_statistics,
            &mut bytes,
            0,
            1,
            0,
            QueryResultFlags::EMPTY
        )
        .unwrap());
    let result: PipelineStatisticsQueryResult = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(result.number_of_input_assembler_vertices, 36);
    assert_eq!(result.number_of_input_assembler_primitives, 12);

    // Two timestamps, 16 bytes apart in a padded layout.
    let mut times = [0u8; 24];
    assert!(device
        .get_query_pool_results(&*timestamps, &mut times, 0, 2, 16, QueryResultFlags::WAIT)
        .unwrap());
    let first = u64::from_le_bytes(times[0..8].try_into().unwrap());
    let second = u64::from_le_bytes(times[16..24].try_into().unwrap());
    assert!(second >= first, "Timestamps must not go backwards");
    assert_eq!(device.frame_statistics().number_of_rejected_commands, 0);
}

#[test]
fn test_generate_mipmaps_downsamples_the_chain() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let texture = device
        .create_texture(&TextureDescriptor {
            flags: TextureFlags::GENERATE_MIPMAPS,
            ..TextureDescriptor::texture_2d(4, 4, TextureFormat::R8)
        })
        .unwrap();
    let mut mapped = device
        .map(&*texture, 0, MapType::WriteDiscard, MapFlags::EMPTY)
        .unwrap();
    mapped.data.fill(200);
    device.unmap(&*texture, 0, mapped).unwrap();

    let mut command_buffer = CommandBuffer::new();
    GenerateMipmaps::create(&mut command_buffer, &*texture);

    // --- 2. ACT ---
    replay(&device, &command_buffer);

    // --- 3. ASSERT ---
    let texture = texture.as_any().downcast_ref::<NullTexture>().unwrap();
    assert_eq!(texture.subresource(1), Some(vec![200; 4]));
    assert_eq!(texture.subresource(2), Some(vec![200]));
}

#[test]
fn test_copy_resource_copies_buffer_contents() {
    let device = null_device();
    let source = device
        .create_vertex_buffer(&BufferDescriptor::with_data(&[1, 2, 3, 4]))
        .unwrap();
    let destination = device
        .create_vertex_buffer(&BufferDescriptor::zeroed(4))
        .unwrap();
    let too_small = device
        .create_vertex_buffer(&BufferDescriptor::zeroed(2))
        .unwrap();

    let mut command_buffer = CommandBuffer::new();
    CopyResource::create(&mut command_buffer, &*destination, &*source);
    CopyResource::create(&mut command_buffer, &*too_small, &*source);
    replay(&device, &command_buffer);

    let contents = destination
        .as_any()
        .downcast_ref::<NullBuffer>()
        .unwrap()
        .contents();
    assert_eq!(contents, vec![1, 2, 3, 4]);
    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_copies, 1);
    assert_eq!(statistics.number_of_rejected_commands, 1);
}

#[test]
fn test_uniform_buffer_upload_lands_at_the_start() {
    let device = null_device();
    let uniform_buffer = device
        .create_uniform_buffer(&BufferDescriptor::zeroed(16))
        .unwrap();
    let values = [0.5f32, 0.25];

    let mut command_buffer = CommandBuffer::new();
    CopyUniformBufferData::create(
        &mut command_buffer,
        &*uniform_buffer,
        bytemuck::cast_slice(&values),
    );
    replay(&device, &command_buffer);

    let contents = uniform_buffer
        .as_any()
        .downcast_ref::<NullBuffer>()
        .unwrap()
        .contents();
    let uploaded: &[f32] = bytemuck::cast_slice(&contents[..8]);
    assert_relative_eq!(uploaded[0], 0.5);
    assert_relative_eq!(uploaded[1], 0.25);
    assert_eq!(&contents[8..], &[0; 8]);
}

#[test]
fn test_set_uniform_stores_the_value_in_the_program() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let setup = DrawSetup::new(&device);
    let handle = setup.program.uniform_handle("tint").unwrap();
    let mut command_buffer = CommandBuffer::new();
    SetUniform::create_4fv(
        &mut command_buffer,
        &*setup.program,
        handle,
        [0.1, 0.2, 0.3, 1.0],
    );
    SetUniform::create_1f(&mut command_buffer, &*setup.program, handle + 1, 1.0);

    // --- 2. ACT ---
    replay(&device, &command_buffer);

    // --- 3. ASSERT ---
    let program = setup
        .program
        .as_any()
        .downcast_ref::<NullGraphicsProgram>()
        .unwrap();
    let (kind, bits) = program.uniform_value(handle).unwrap();
    assert_eq!(kind, UniformKind::Float4);
    let expected = [0.1f32, 0.2, 0.3, 1.0];
    assert_eq!(bits.len(), expected.len());
    for (bits, expected) in bits.into_iter().zip(expected) {
        assert_relative_eq!(f32::from_bits(bits), expected);
    }
    assert_eq!(
        device.frame_statistics().number_of_rejected_commands,
        1,
        "Unknown uniform handles are rejected"
    );
}

#[test]
fn test_unbalanced_debug_events_are_tolerated() {
    let device = null_device();
    let mut command_buffer = CommandBuffer::new();
    EndDebugEvent::create(&mut command_buffer);
    BeginDebugEvent::create(&mut command_buffer, "shadow pass");
    BeginDebugEvent::create(&mut command_buffer, "cascade 0");
    EndDebugEvent::create(&mut command_buffer);

    replay(&device, &command_buffer);

    let statistics = device.frame_statistics();
    assert_eq!(statistics.number_of_debug_markers, 2);
    assert_eq!(statistics.number_of_rejected_commands, 1);

    // The open event was closed by end_scene.
    let mut command_buffer = CommandBuffer::new();
    EndDebugEvent::create(&mut command_buffer);
    replay(&device, &command_buffer);
    assert_eq!(device.frame_statistics().number_of_rejected_commands, 1);
}
