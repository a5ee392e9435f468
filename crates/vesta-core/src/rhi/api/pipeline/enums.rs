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

//! Enums of the fixed-function pipeline stages.

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Isolated points.
    PointList,
    /// Isolated lines, two vertices each.
    LineList,
    /// A connected line strip.
    LineStrip,
    /// Isolated triangles, three vertices each.
    #[default]
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
    /// Tessellation patches with the given number of control points (1 to 32).
    PatchList(u8),
}

impl PrimitiveTopology {
    /// The primitive class the topology belongs to.
    pub const fn topology_type(self) -> PrimitiveTopologyType {
        match self {
            Self::PointList => PrimitiveTopologyType::Point,
            Self::LineList | Self::LineStrip => PrimitiveTopologyType::Line,
            Self::TriangleList | Self::TriangleStrip => PrimitiveTopologyType::Triangle,
            Self::PatchList(_) => PrimitiveTopologyType::Patch,
        }
    }
}

/// The primitive class a graphics pipeline state is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopologyType {
    /// Points.
    Point,
    /// Lines.
    Line,
    /// Triangles.
    #[default]
    Triangle,
    /// Tessellation patches.
    Patch,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Only edges are drawn.
    Wireframe,
    /// Polygons are filled.
    #[default]
    Solid,
}

/// Which triangle faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    None,
    /// Front faces are culled.
    Front,
    /// Back faces are culled.
    #[default]
    Back,
}

/// Whether depth values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthWriteMask {
    /// Depth writes are disabled.
    Zero,
    /// Depth writes are enabled.
    #[default]
    All,
}

/// The operation applied to a stencil value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOp {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set the value to zero.
    Zero,
    /// Set the value to the reference value.
    Replace,
    /// Increment and clamp.
    IncrSat,
    /// Decrement and clamp.
    DecrSat,
    /// Invert the bits.
    Invert,
    /// Increment and wrap.
    Incr,
    /// Decrement and wrap.
    Decr,
}

/// A blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blend {
    /// `(0, 0, 0, 0)`
    Zero,
    /// `(1, 1, 1, 1)`
    One,
    /// Source color.
    SrcColor,
    /// One minus source color.
    InvSrcColor,
    /// Source alpha.
    SrcAlpha,
    /// One minus source alpha.
    InvSrcAlpha,
    /// Destination alpha.
    DestAlpha,
    /// One minus destination alpha.
    InvDestAlpha,
    /// Destination color.
    DestColor,
    /// One minus destination color.
    InvDestColor,
    /// Source alpha clamped to one minus destination alpha.
    SrcAlphaSat,
    /// The pipeline's blend factor.
    BlendFactor,
    /// One minus the pipeline's blend factor.
    InvBlendFactor,
}

/// How source and destination terms are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOp {
    /// `source + destination`
    #[default]
    Add,
    /// `source - destination`
    Subtract,
    /// `destination - source`
    RevSubtract,
    /// `min(source, destination)`
    Min,
    /// `max(source, destination)`
    Max,
}
