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

//! Query pool commands.

use super::impl_command;
use crate::rhi::api::command::CommandBuffer;
use crate::rhi::api::resource::{QueryControlFlags, QueryPool, Resource, ResourceId};
use bytemuck::{Pod, Zeroable};

/// Resets a range of queries so they can be begun again.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ResetQueryPool {
    /// The query pool.
    pub query_pool: ResourceId,
    /// First query to reset.
    pub first_query_index: u32,
    /// Number of queries to reset.
    pub number_of_queries: u32,
}

impl ResetQueryPool {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        query_pool: &dyn QueryPool,
        first_query_index: u32,
        number_of_queries: u32,
    ) {
        debug_assert!(
            query_range_fits(
                first_query_index,
                number_of_queries,
                query_pool.number_of_queries()
            ),
            "resetting queries past the end of the pool"
        );
        command_buffer.add_command(Self {
            query_pool: query_pool.id(),
            first_query_index,
            number_of_queries,
        });
    }
}

fn query_range_fits(first_query_index: u32, number_of_queries: u32, pool_size: u32) -> bool {
    first_query_index
        .checked_add(number_of_queries)
        .is_some_and(|end| end <= pool_size)
}

/// Begins an occlusion or pipeline statistics query.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BeginQuery {
    /// The query pool.
    pub query_pool: ResourceId,
    /// Index of the query inside the pool.
    pub query_index: u32,
    /// Raw [`QueryControlFlags`] bits.
    pub query_control_flags: u32,
}

impl BeginQuery {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        query_pool: &dyn QueryPool,
        query_index: u32,
        query_control_flags: QueryControlFlags,
    ) {
        debug_assert!(query_index < query_pool.number_of_queries());
        command_buffer.add_command(Self {
            query_pool: query_pool.id(),
            query_index,
            query_control_flags: query_control_flags.bits(),
        });
    }

    /// Records a reset of the single query followed by its begin.
    pub fn create_with_reset(
        command_buffer: &mut CommandBuffer,
        query_pool: &dyn QueryPool,
        query_index: u32,
        query_control_flags: QueryControlFlags,
    ) {
        ResetQueryPool::create(command_buffer, query_pool, query_index, 1);
        Self::create(command_buffer, query_pool, query_index, query_control_flags);
    }

    /// The recorded control flags.
    pub fn flags(&self) -> QueryControlFlags {
        QueryControlFlags::from_bits_retain(self.query_control_flags)
    }
}

/// Ends a query begun with [`BeginQuery`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct EndQuery {
    /// The query pool.
    pub query_pool: ResourceId,
    /// Index of the query inside the pool.
    pub query_index: u32,
    #[doc(hidden)]
    pub _padding: u32,
}

impl EndQuery {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer, query_pool: &dyn QueryPool, query_index: u32) {
        debug_assert!(query_index < query_pool.number_of_queries());
        command_buffer.add_command(Self {
            query_pool: query_pool.id(),
            query_index,
            _padding: 0,
        });
    }
}

/// Writes the GPU timestamp into a timestamp query.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct WriteTimestampQuery {
    /// The query pool.
    pub query_pool: ResourceId,
    /// Index of the query inside the pool.
    pub query_index: u32,
    #[doc(hidden)]
    pub _padding: u32,
}

impl WriteTimestampQuery {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer, query_pool: &dyn QueryPool, query_index: u32) {
        debug_assert!(query_index < query_pool.number_of_queries());
        command_buffer.add_command(Self {
            query_pool: query_pool.id(),
            query_index,
            _padding: 0,
        });
    }
}

impl_command!(
    ResetQueryPool => ResetQueryPool,
    BeginQuery => BeginQuery,
    EndQuery => EndQuery,
    WriteTimestampQuery => WriteTimestampQuery,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_ranges_stay_inside_the_pool() {
        assert!(query_range_fits(0, 4, 4));
        assert!(query_range_fits(4, 0, 4));
        assert!(!query_range_fits(3, 2, 4));
        assert!(!query_range_fits(u32::MAX, 2, 4));
        assert!(!query_range_fits(1, u32::MAX, u32::MAX));
    }
}
