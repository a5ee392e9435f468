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

//! Conversions between API values and the texel bytes the Null backend stores.

use vesta_core::rhi::{PrimitiveTopology, TextureFormat};

fn unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn unorm16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// Encodes an RGBA clear color as one texel of `format`.
///
/// Returns `None` for formats the Null backend cannot encode (packed floats,
/// half floats, signed normalized and block-compressed formats).
pub(crate) fn encode_color(format: TextureFormat, color: [f32; 4]) -> Option<Vec<u8>> {
    let [r, g, b, a] = color;
    let texel = match format {
        TextureFormat::R8 => vec![unorm8(r)],
        TextureFormat::R8G8B8 => vec![unorm8(r), unorm8(g), unorm8(b)],
        TextureFormat::R8G8B8A8 | TextureFormat::R8G8B8A8Srgb => {
            vec![unorm8(r), unorm8(g), unorm8(b), unorm8(a)]
        }
        TextureFormat::B8G8R8A8 => vec![unorm8(b), unorm8(g), unorm8(r), unorm8(a)],
        TextureFormat::R16Unorm => unorm16(r).to_le_bytes().to_vec(),
        TextureFormat::R32Float => r.to_le_bytes().to_vec(),
        TextureFormat::R32Uint => (r.max(0.0) as u32).to_le_bytes().to_vec(),
        TextureFormat::R32G32B32A32F => bytemuck::cast_slice(&color).to_vec(),
        _ => return None,
    };
    debug_assert_eq!(texel.len() as u32, format.number_of_bytes_per_element());
    Some(texel)
}

/// Encodes a depth clear value as one texel of a depth `format`.
pub(crate) fn encode_depth(format: TextureFormat, depth: f32) -> Option<Vec<u8>> {
    match format {
        TextureFormat::D32Float => Some(depth.to_le_bytes().to_vec()),
        _ => None,
    }
}

/// Number of primitives `number_of_vertices` vertices assemble into.
pub(crate) fn number_of_primitives(topology: PrimitiveTopology, number_of_vertices: u64) -> u64 {
    match topology {
        PrimitiveTopology::PointList => number_of_vertices,
        PrimitiveTopology::LineList => number_of_vertices / 2,
        PrimitiveTopology::LineStrip => number_of_vertices.saturating_sub(1),
        PrimitiveTopology::TriangleList => number_of_vertices / 3,
        PrimitiveTopology::TriangleStrip => number_of_vertices.saturating_sub(2),
        PrimitiveTopology::PatchList(0) => 0,
        PrimitiveTopology::PatchList(control_points) => {
            number_of_vertices / u64::from(control_points)
        }
    }
}

/// Extent of a texture level in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Extent {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) depth: u32,
}

/// Builds the next mipmap level of `source` by point sampling every other
/// texel. Returns `None` for block-compressed formats.
pub(crate) fn downsample(
    format: TextureFormat,
    source: &[u8],
    source_extent: Extent,
    destination_extent: Extent,
) -> Option<Vec<u8>> {
    if format.is_compressed() || format == TextureFormat::Unknown {
        return None;
    }
    let texel = format.number_of_bytes_per_element() as usize;
    let source_row = format.number_of_bytes_per_row(source_extent.width) as usize;
    let source_slice = format.number_of_bytes_per_slice(source_extent.width, source_extent.height)
        as usize;

    let mut destination = Vec::with_capacity(
        format.number_of_bytes_per_slice(destination_extent.width, destination_extent.height)
            as usize
            * destination_extent.depth as usize,
    );
    for z in 0..destination_extent.depth {
        let source_z = (z * 2).min(source_extent.depth - 1) as usize;
        for y in 0..destination_extent.height {
            let source_y = (y * 2).min(source_extent.height - 1) as usize;
            for x in 0..destination_extent.width {
                let source_x = (x * 2).min(source_extent.width - 1) as usize;
                let start = source_z * source_slice + source_y * source_row + source_x * texel;
                destination.extend_from_slice(source.get(start..start + texel)?);
            }
        }
    }
    Some(destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_are_encoded_per_format() {
        let color = [1.0, 0.5, 0.0, 1.0];
        assert_eq!(
            encode_color(TextureFormat::R8G8B8A8, color),
            Some(vec![255, 128, 0, 255])
        );
        assert_eq!(
            encode_color(TextureFormat::B8G8R8A8, color),
            Some(vec![0, 128, 255, 255])
        );
        assert_eq!(encode_color(TextureFormat::R8, [2.0, 0.0, 0.0, 0.0]), Some(vec![255]));
        let floats = encode_color(TextureFormat::R32G32B32A32F, color).unwrap();
        assert_eq!(bytemuck::cast_slice::<u8, f32>(&floats), &color);
        assert_eq!(encode_color(TextureFormat::Bc1, color), None);
        assert_eq!(encode_color(TextureFormat::R16G16Float, color), None);
    }

    #[test]
    fn depth_is_encoded_for_depth_formats_only() {
        assert_eq!(
            encode_depth(TextureFormat::D32Float, 1.0),
            Some(1.0f32.to_le_bytes().to_vec())
        );
        assert_eq!(encode_depth(TextureFormat::R32Float, 1.0), None);
    }

    #[test]
    fn primitive_counts() {
        assert_eq!(number_of_primitives(PrimitiveTopology::TriangleList, 36), 12);
        assert_eq!(number_of_primitives(PrimitiveTopology::TriangleStrip, 4), 2);
        assert_eq!(number_of_primitives(PrimitiveTopology::TriangleStrip, 1), 0);
        assert_eq!(number_of_primitives(PrimitiveTopology::LineStrip, 5), 4);
        assert_eq!(number_of_primitives(PrimitiveTopology::PatchList(4), 16), 4);
        assert_eq!(number_of_primitives(PrimitiveTopology::PointList, 7), 7);
    }

    #[test]
    fn downsampling_point_samples_even_texels() {
        // 4x2 R8 level: 0 1 2 3 / 4 5 6 7
        let source: Vec<u8> = (0..8).collect();
        let next = downsample(
            TextureFormat::R8,
            &source,
            Extent { width: 4, height: 2, depth: 1 },
            Extent { width: 2, height: 1, depth: 1 },
        );
        assert_eq!(next, Some(vec![0, 2]));

        let last = downsample(
            TextureFormat::R8,
            &[0, 2],
            Extent { width: 2, height: 1, depth: 1 },
            Extent { width: 1, height: 1, depth: 1 },
        );
        assert_eq!(last, Some(vec![0]));
        assert_eq!(
            downsample(
                TextureFormat::Bc1,
                &[0; 8],
                Extent { width: 4, height: 4, depth: 1 },
                Extent { width: 2, height: 2, depth: 1 },
            ),
            None
        );
    }
}
