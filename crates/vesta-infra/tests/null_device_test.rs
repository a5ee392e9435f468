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

use std::borrow::Cow;
use common::{empty_root_signature, init_logging, null_device, DrawSetup};
use vesta_core::rhi::{
    BufferDescriptor, BufferFlags, DescriptorRange, DescriptorRangeType, DeviceSettings,
    GraphicsBackendType, GraphicsDevice, IndexBufferFormat, MapFlags, MapType, QueryPoolDescriptor,
    QueryResultFlags, QueryType, Ref, RenderError, Resource, ResourceError,
    ResourceGroupDescriptor, ResourceType, RootParameter, RootSignatureDescriptor,
    SamplerStateDescriptor, ShaderVisibility, TextureDescriptor, TextureFlags, TextureFormat,
};
use vesta_infra::graphics::null::{NullBuffer, NullDevice, NullTexture};

#[test]
fn test_factories_update_statistics() {
    // --- 1. ARRANGE ---
    let device = null_device();

    // --- 2. ACT ---
    let vertex_buffer = device
        .create_vertex_buffer(&BufferDescriptor::zeroed(64).label("vertices"))
        .unwrap();
    let index_buffer = device
        .create_index_buffer(&BufferDescriptor::zeroed(12), IndexBufferFormat::UnsignedShort)
        .unwrap();
    let texture = device
        .create_texture(&TextureDescriptor::texture_2d(8, 8, TextureFormat::R8G8B8A8))
        .unwrap();
    let sampler = device
        .create_sampler_state(&SamplerStateDescriptor::default())
        .unwrap();

    // --- 3. ASSERT ---
    let statistics = device.statistics();
    assert_eq!(statistics.current(ResourceType::VertexBuffer), 1);
    assert_eq!(statistics.current(ResourceType::IndexBuffer), 1);
    assert_eq!(statistics.current(ResourceType::Texture2D), 1);
    assert_eq!(statistics.current(ResourceType::SamplerState), 1);
    assert_eq!(statistics.number_of_current_resources(), 4);
    assert_eq!(vertex_buffer.debug_name(), "vertices");
    assert_eq!(index_buffer.number_of_indices(), 6);

    drop((vertex_buffer, index_buffer, texture, sampler));
    assert_eq!(
        device.statistics().number_of_current_resources(),
        0,
        "Dropping the last handle should destroy the resource"
    );
    assert_eq!(device.statistics().total(ResourceType::VertexBuffer), 1);
}

#[test]
fn test_resources_keep_their_device_reference_weak() {
    let device = null_device();
    let buffer = device
        .create_uniform_buffer(&BufferDescriptor::zeroed(16))
        .unwrap();
    assert!(buffer.base().belongs_to(&*device));

    drop(device);
    assert!(
        buffer.base().device().is_none(),
        "A resource must not keep its device alive"
    );
}

#[test]
fn test_buffer_map_write_then_read() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let buffer = device
        .create_vertex_buffer(&BufferDescriptor::with_data(&[1, 2, 3, 4]))
        .unwrap();

    // --- 2. ACT ---
    let mut mapped = device
        .map(&*buffer, 0, MapType::ReadWrite, MapFlags::EMPTY)
        .unwrap();
    assert_eq!(mapped.data, vec![1, 2, 3, 4]);
    assert!(matches!(
        device.map(&*buffer, 0, MapType::Read, MapFlags::EMPTY),
        Err(ResourceError::AlreadyMapped)
    ));
    mapped.data[0] = 9;
    device.unmap(&*buffer, 0, mapped).unwrap();

    // --- 3. ASSERT ---
    let contents = buffer
        .as_any()
        .downcast_ref::<NullBuffer>()
        .unwrap()
        .contents();
    assert_eq!(contents, vec![9, 2, 3, 4]);
    assert!(matches!(
        device.unmap(&*buffer, 0, Default::default()),
        Err(ResourceError::NotMapped)
    ));
    assert!(matches!(
        device.map(&*buffer, 1, MapType::Read, MapFlags::EMPTY),
        Err(ResourceError::OutOfBounds)
    ));
}

#[test]
fn test_texture_subresources_are_mapped_individually() {
    let device = null_device();
    let texture = device
        .create_texture(&TextureDescriptor {
            flags: TextureFlags::GENERATE_MIPMAPS,
            ..TextureDescriptor::texture_2d(4, 4, TextureFormat::R8)
        })
        .unwrap();
    assert_eq!(texture.info().number_of_mipmaps, 3);

    // Mipmap 1 is 2x2 texels.
    let mut mapped = device
        .map(&*texture, 1, MapType::WriteDiscard, MapFlags::DO_NOT_WAIT)
        .unwrap();
    assert_eq!(mapped.data.len(), 4);
    assert_eq!(mapped.row_pitch, 2);
    mapped.data.copy_from_slice(&[1, 2, 3, 4]);
    device.unmap(&*texture, 1, mapped).unwrap();

    let texture = texture.as_any().downcast_ref::<NullTexture>().unwrap();
    assert_eq!(texture.subresource(1), Some(vec![1, 2, 3, 4]));
    assert_eq!(texture.subresource(0), Some(vec![0; 16]));
    assert!(matches!(
        device.map(texture, 3, MapType::Read, MapFlags::EMPTY),
        Err(ResourceError::OutOfBounds)
    ));
}

#[test]
fn test_cube_faces_keep_their_mipmap_chains_together() {
    // --- 1. ARRANGE ---
    let device = null_device();
    // Each 2x2 face carries a 4-byte top level followed by a 1-byte mipmap.
    let data: Vec<u8> = (0..6u8)
        .flat_map(|face| (1..=5).map(move |texel| face * 10 + texel))
        .collect();

    // --- 2. ACT ---
    let texture = device
        .create_texture(&TextureDescriptor {
            flags: TextureFlags::SHADER_RESOURCE | TextureFlags::DATA_CONTAINS_MIPMAPS,
            data: Some(&data),
            ..TextureDescriptor::texture_cube(2, TextureFormat::R8)
        })
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(texture.info().number_of_mipmaps, 2);
    let texture = texture.as_any().downcast_ref::<NullTexture>().unwrap();
    // Subresource index = mipmap + face * mipmaps.
    assert_eq!(texture.subresource(0), Some(vec![1, 2, 3, 4]));
    assert_eq!(texture.subresource(1), Some(vec![5]));
    assert_eq!(texture.subresource(4), Some(vec![21, 22, 23, 24]));
    assert_eq!(texture.subresource(11), Some(vec![55]));
    assert_eq!(texture.subresource(12), None);
}

#[test]
fn test_resources_of_another_device_are_rejected() {
    // --- 1. ARRANGE ---
    let device = null_device();
    let other = NullDevice::new(&DeviceSettings::default());
    let foreign_buffer = other
        .create_vertex_buffer(&BufferDescriptor::zeroed(4))
        .unwrap();
    let foreign_root_signature = empty_root_signature(&other);

    // --- 2. ACT & 3. ASSERT ---
    assert!(matches!(
        device.map(&*foreign_buffer, 0, MapType::Read, MapFlags::EMPTY),
        Err(ResourceError::ForeignResource)
    ));
    let language = device.shader_language(None).unwrap();
    let shader = language
        .create_shader(&vesta_core::rhi::ShaderDescriptor::from_source(
            vesta_core::rhi::ShaderStage::Compute,
            "main",
        ))
        .unwrap();
    let result = device.create_compute_pipeline_state(
        &vesta_core::rhi::ComputePipelineStateDescriptor {
            label: None,
            root_signature: &foreign_root_signature,
            compute_shader: &shader,
        },
    );
    assert!(matches!(result, Err(ResourceError::ForeignResource)));
}

#[test]
fn test_buffer_factories_check_their_limits() {
    let device = NullDevice::new(&DeviceSettings {
        capabilities: Some(vesta_core::rhi::Capabilities {
            maximum_uniform_buffer_size: 256,
            maximum_structured_buffer_size: 1024,
            ..Default::default()
        }),
        ..DeviceSettings::default()
    });

    assert!(matches!(
        device.create_uniform_buffer(&BufferDescriptor::zeroed(512)),
        Err(ResourceError::CapabilityExceeded {
            requested: 512,
            maximum: 256,
            ..
        })
    ));
    assert!(matches!(
        device.create_structured_buffer(&BufferDescriptor::zeroed(100), 16),
        Err(ResourceError::InvalidDescriptor(_))
    ));
    assert!(device
        .create_structured_buffer(&BufferDescriptor::zeroed(96), 16)
        .is_ok());
    assert!(matches!(
        device.create_indirect_buffer(&BufferDescriptor::zeroed(16)),
        Err(ResourceError::InvalidDescriptor(_))
    ));
    assert!(device
        .create_indirect_buffer(&BufferDescriptor::zeroed(16).flags(BufferFlags::DRAW_ARGUMENTS))
        .is_ok());
    assert!(matches!(
        device.create_texture_buffer(&BufferDescriptor::zeroed(16), TextureFormat::Bc1),
        Err(ResourceError::InvalidDescriptor(_))
    ));
}

#[test]
fn test_resource_group_binds_a_descriptor_table() {
    let device = null_device();
    let ranges = vec![DescriptorRange::new(
        DescriptorRangeType::Ubv,
        1,
        0,
        "UniformBlock",
        ShaderVisibility::All,
    )];
    let root_signature = device
        .create_root_signature(&RootSignatureDescriptor::new(vec![
            RootParameter::descriptor_table(ranges, ShaderVisibility::All),
        ]))
        .unwrap();
    let uniform_buffer = device
        .create_uniform_buffer(&BufferDescriptor::zeroed(64))
        .unwrap();
    let vertex_buffer = device
        .create_vertex_buffer(&BufferDescriptor::zeroed(64))
        .unwrap();

    let group = device.create_resource_group(&ResourceGroupDescriptor {
        label: None,
        root_signature: &root_signature,
        root_parameter_index: 0,
        resources: vec![Ref::<dyn Resource>::from(uniform_buffer)].into(),
        sampler_states: Cow::Borrowed(&[]),
    });
    assert_eq!(group.unwrap().root_parameter_index(), 0);

    let wrong_kind = device.create_resource_group(&ResourceGroupDescriptor {
        label: None,
        root_signature: &root_signature,
        root_parameter_index: 0,
        resources: vec![Ref::<dyn Resource>::from(vertex_buffer)].into(),
        sampler_states: Cow::Borrowed(&[]),
    });
    assert!(matches!(wrong_kind, Err(ResourceError::InvalidDescriptor(_))));
}

#[test]
fn test_unanswered_queries_report_unavailable() {
    let device = null_device();
    let pool = device
        .create_query_pool(&QueryPoolDescriptor {
            label: None,
            query_type: QueryType::Occlusion,
            number_of_queries: 2,
        })
        .unwrap();
    let mut data = [0xAA; 16];

    let available = device
        .get_query_pool_results(&*pool, &mut data, 0, 2, 0, QueryResultFlags::EMPTY)
        .unwrap();
    assert!(!available);
    assert_eq!(data, [0xAA; 16], "Unavailable results must not be written");

    assert!(device
        .get_query_pool_results(&*pool, &mut data, 0, 2, 0, QueryResultFlags::WAIT)
        .is_err());
    assert!(matches!(
        device.get_query_pool_results(&*pool, &mut data[..8], 0, 2, 0, QueryResultFlags::EMPTY),
        Err(ResourceError::OutOfBounds)
    ));
    assert!(matches!(
        device.get_query_pool_results(&*pool, &mut data, 0, 2, 4, QueryResultFlags::EMPTY),
        Err(ResourceError::InvalidDescriptor(_))
    ));
}

#[test]
fn test_scenes_must_alternate() {
    let device = null_device();
    assert!(matches!(device.end_scene(), Err(RenderError::Internal(_))));
    device.begin_scene().unwrap();
    assert!(matches!(device.begin_scene(), Err(RenderError::Internal(_))));
    device.end_scene().unwrap();
    assert!(!device.is_in_scene());
}

#[test]
fn test_device_is_created_from_json_settings() {
    init_logging();
    let settings = DeviceSettings::from_json(
        r#"{
            "backend": "Null",
            "enable_debug": true,
            "capabilities": { "mesh_shader": false, "maximum_anisotropy": 4 }
        }"#,
    )
    .unwrap();
    let device = vesta_infra::create_device(&settings).unwrap();

    assert_eq!(device.backend_type(), GraphicsBackendType::Null);
    assert!(device.is_debug_enabled());
    assert!(!device.capabilities().mesh_shader);
    assert_eq!(device.capabilities().maximum_anisotropy, 4);
    assert_eq!(
        device.capabilities().maximum_number_of_viewports,
        16,
        "Unspecified capabilities keep their defaults"
    );
}

#[test]
fn test_draw_setup_builds_on_the_null_device() {
    let device = null_device();
    let setup = DrawSetup::new(&device);
    assert_eq!(setup.framebuffer.width_and_height(), (4, 4));
    assert!(!setup.program.is_mesh_program());
    assert!(setup.program.uniform_handle("color").is_some());
    assert_eq!(setup.program.uniform_handle(""), None);
}

#[test]
fn test_statistics_snapshot_serializes_live_kinds_only() {
    let device = null_device();
    let _buffer = device
        .create_vertex_buffer(&BufferDescriptor::zeroed(4))
        .unwrap();
    drop(device.create_texture(&TextureDescriptor::texture_2d(1, 1, TextureFormat::R8)));

    let json = device.statistics().snapshot().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let entries = value["entries"].as_array().unwrap();

    assert_eq!(entries.len(), 2, "Only kinds that were created are listed");
    assert_eq!(entries[0]["resource_type"], "VertexBuffer");
    assert_eq!(entries[0]["current"], 1);
    assert_eq!(entries[1]["current"], 0);
    assert_eq!(entries[1]["total"], 1);
}
