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

//! Query pools.

use super::Resource;
use crate::rhi::error::ResourceError;
use crate::vesta_bitflags;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;

/// The kind of queries a pool holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// Counts samples passing the depth and stencil tests. One `u64` per query.
    Occlusion,
    /// Counts pipeline events. One [`PipelineStatisticsQueryResult`] per query.
    PipelineStatistics,
    /// Records a GPU timestamp in nanoseconds. One `u64` per query.
    Timestamp,
}

impl QueryType {
    /// The number of bytes of one query result.
    pub const fn number_of_result_bytes(self) -> u32 {
        match self {
            Self::Occlusion | Self::Timestamp => std::mem::size_of::<u64>() as u32,
            Self::PipelineStatistics => std::mem::size_of::<PipelineStatisticsQueryResult>() as u32,
        }
    }
}

vesta_bitflags! {
    /// Flags of a `BeginQuery` command.
    pub struct QueryControlFlags: u32 {
        /// Occlusion queries must count exact samples, not just "any passed".
        const PRECISE = 1 << 0;
    }
}

vesta_bitflags! {
    /// Flags of a query result retrieval.
    pub struct QueryResultFlags: u32 {
        /// Block until every requested result is available.
        const WAIT = 1 << 0;
    }
}

/// The result layout of a pipeline statistics query.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct PipelineStatisticsQueryResult {
    /// Vertices read by the input assembler.
    pub number_of_input_assembler_vertices: u64,
    /// Primitives read by the input assembler.
    pub number_of_input_assembler_primitives: u64,
    /// Vertex shader invocations.
    pub number_of_vertex_shader_invocations: u64,
    /// Geometry shader invocations.
    pub number_of_geometry_shader_invocations: u64,
    /// Primitives emitted by geometry shaders.
    pub number_of_geometry_shader_output_primitives: u64,
    /// Primitives sent to the clipper.
    pub number_of_clipping_input_primitives: u64,
    /// Primitives leaving the clipper.
    pub number_of_clipping_output_primitives: u64,
    /// Fragment shader invocations.
    pub number_of_fragment_shader_invocations: u64,
    /// Tessellation control shader invocations.
    pub number_of_tessellation_control_shader_invocations: u64,
    /// Tessellation evaluation shader invocations.
    pub number_of_tessellation_evaluation_shader_invocations: u64,
    /// Compute shader invocations.
    pub number_of_compute_shader_invocations: u64,
}

/// A descriptor used to create a query pool.
#[derive(Debug, Clone)]
pub struct QueryPoolDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The kind of queries of the pool.
    pub query_type: QueryType,
    /// The number of queries of the pool.
    pub number_of_queries: u32,
}

impl QueryPoolDescriptor<'_> {
    /// Checks the structural rules every backend shares.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.number_of_queries == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "a query pool needs at least one query".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A pool of GPU queries.
pub trait QueryPool: Resource {
    /// The kind of queries of the pool.
    fn query_type(&self) -> QueryType;

    /// The number of queries of the pool.
    fn number_of_queries(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_sizes() {
        assert_eq!(QueryType::Occlusion.number_of_result_bytes(), 8);
        assert_eq!(QueryType::Timestamp.number_of_result_bytes(), 8);
        assert_eq!(QueryType::PipelineStatistics.number_of_result_bytes(), 88);
    }

    #[test]
    fn empty_pools_are_rejected() {
        let descriptor = QueryPoolDescriptor {
            label: None,
            query_type: QueryType::Occlusion,
            number_of_queries: 0,
        };
        assert!(descriptor.validate().is_err());
    }
}
