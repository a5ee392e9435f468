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

//! Replay state of the Null device.

use std::collections::BTreeMap;
use vesta_core::rhi::{PipelineStatisticsQueryResult, ResourceId, ScissorRectangle, Viewport};

/// The bindings established by replayed commands.
///
/// Bindings are ids: they never keep a resource alive and are resolved again
/// when a draw or dispatch needs them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundState {
    /// Root signature of the graphics pipeline.
    pub graphics_root_signature: ResourceId,
    /// Graphics pipeline state.
    pub graphics_pipeline_state: ResourceId,
    /// Graphics resource groups by root parameter index.
    pub graphics_resource_groups: BTreeMap<u32, ResourceId>,
    /// Vertex array.
    pub vertex_array: ResourceId,
    /// Current viewports.
    pub viewports: Vec<Viewport>,
    /// Current scissor rectangles.
    pub scissor_rectangles: Vec<ScissorRectangle>,
    /// Framebuffer draws and clears go to.
    pub render_target: ResourceId,
    /// Root signature of the compute pipeline.
    pub compute_root_signature: ResourceId,
    /// Compute pipeline state.
    pub compute_pipeline_state: ResourceId,
    /// Compute resource groups by root parameter index.
    pub compute_resource_groups: BTreeMap<u32, ResourceId>,
}

/// Work counted while replaying command buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStatistics {
    /// Replayed commands. A nested command buffer counts its own commands,
    /// not the packet that dispatched it.
    pub number_of_commands: u64,
    /// Commands skipped because they failed validation.
    pub number_of_rejected_commands: u64,
    /// Individual draws, every record of a multi-draw included.
    pub number_of_draw_calls: u64,
    /// Vertices processed, instances included.
    pub number_of_vertices: u64,
    /// Primitives assembled, instances included.
    pub number_of_primitives: u64,
    /// Mesh shader task groups launched.
    pub number_of_mesh_tasks: u64,
    /// Compute dispatches.
    pub number_of_compute_dispatches: u64,
    /// Compute work groups launched.
    pub number_of_compute_groups: u64,
    /// Render target clears.
    pub number_of_clears: u64,
    /// Resource copies, uniform uploads and resolves.
    pub number_of_copies: u64,
    /// Debug markers and events.
    pub number_of_debug_markers: u64,
}

impl FrameStatistics {
    /// The pipeline statistics a query spanning `begin..self` reports.
    ///
    /// The Null backend runs no shaders; invocations are derived from the
    /// vertices and groups it counted.
    pub(crate) fn pipeline_statistics_since(&self, begin: &Self) -> PipelineStatisticsQueryResult {
        let vertices = self.number_of_vertices.saturating_sub(begin.number_of_vertices);
        let primitives = self.number_of_primitives.saturating_sub(begin.number_of_primitives);
        let groups = self
            .number_of_compute_groups
            .saturating_sub(begin.number_of_compute_groups);
        PipelineStatisticsQueryResult {
            number_of_input_assembler_vertices: vertices,
            number_of_input_assembler_primitives: primitives,
            number_of_vertex_shader_invocations: vertices,
            number_of_clipping_input_primitives: primitives,
            number_of_clipping_output_primitives: primitives,
            number_of_compute_shader_invocations: groups,
            ..PipelineStatisticsQueryResult::default()
        }
    }

    /// Samples an occlusion query spanning `begin..self` reports: one per
    /// vertex, since nothing is rasterized.
    pub(crate) fn samples_passed_since(&self, begin: &Self) -> u64 {
        self.number_of_vertices.saturating_sub(begin.number_of_vertices)
    }
}

/// Everything the device mutates while replaying.
#[derive(Debug, Default)]
pub(crate) struct ReplayState {
    pub(crate) bound: BoundState,
    pub(crate) in_scene: bool,
    pub(crate) debug_event_depth: u32,
    /// Counters of the current (or last) scene.
    pub(crate) frame: FrameStatistics,
    /// Counters since the device was created; queries measure against these.
    pub(crate) lifetime: FrameStatistics,
}

impl ReplayState {
    /// Applies `update` to the scene and lifetime counters.
    pub(crate) fn count(&mut self, update: impl Fn(&mut FrameStatistics)) {
        update(&mut self.frame);
        update(&mut self.lifetime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_deltas_saturate() {
        let begin = FrameStatistics {
            number_of_vertices: 100,
            number_of_primitives: 30,
            ..FrameStatistics::default()
        };
        let end = FrameStatistics {
            number_of_vertices: 136,
            number_of_primitives: 42,
            number_of_compute_groups: 8,
            ..FrameStatistics::default()
        };
        let statistics = end.pipeline_statistics_since(&begin);
        assert_eq!(statistics.number_of_input_assembler_vertices, 36);
        assert_eq!(statistics.number_of_input_assembler_primitives, 12);
        assert_eq!(statistics.number_of_compute_shader_invocations, 8);
        assert_eq!(end.samples_passed_since(&begin), 36);
        assert_eq!(begin.samples_passed_since(&end), 0);
    }

    #[test]
    fn counting_updates_both_scopes() {
        let mut state = ReplayState::default();
        state.count(|statistics| statistics.number_of_clears += 1);
        state.frame = FrameStatistics::default();
        state.count(|statistics| statistics.number_of_clears += 1);
        assert_eq!(state.frame.number_of_clears, 1);
        assert_eq!(state.lifetime.number_of_clears, 2);
    }
}
