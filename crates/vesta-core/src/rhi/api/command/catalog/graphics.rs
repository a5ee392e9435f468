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

//! Graphics state, clear and draw commands.

use super::impl_command;
use crate::rhi::api::command::{CommandBuffer, Packet};
use crate::rhi::api::pipeline::{GraphicsPipelineState, ResourceGroup, RootSignature, VertexArray};
use crate::rhi::api::resource::{Buffer, Framebuffer, Resource, ResourceId};
use crate::vesta_bitflags;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::mem::{size_of, size_of_val};

fn write_auxiliary<T: Pod>(auxiliary: &mut [u8], values: &[T]) {
    auxiliary.copy_from_slice(bytemuck::cast_slice(values));
}

/// Binds the graphics root signature.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsRootSignature {
    /// The root signature to bind, null to unbind.
    pub root_signature: ResourceId,
}

impl SetGraphicsRootSignature {
    /// Records the binding of `root_signature`, `None` unbinds.
    pub fn create(command_buffer: &mut CommandBuffer, root_signature: Option<&dyn RootSignature>) {
        command_buffer.add_command(Self {
            root_signature: ResourceId::of(root_signature),
        });
    }
}

/// Binds the graphics pipeline state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsPipelineState {
    /// The pipeline state to bind, null to unbind.
    pub graphics_pipeline_state: ResourceId,
}

impl SetGraphicsPipelineState {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        graphics_pipeline_state: Option<&dyn GraphicsPipelineState>,
    ) {
        command_buffer.add_command(Self {
            graphics_pipeline_state: ResourceId::of(graphics_pipeline_state),
        });
    }
}

/// Binds a resource group to a descriptor table of the graphics root signature.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsResourceGroup {
    /// Index of the descriptor table root parameter.
    pub root_parameter_index: u32,
    #[doc(hidden)]
    pub _padding: u32,
    /// The resource group to bind, null to unbind.
    pub resource_group: ResourceId,
}

impl SetGraphicsResourceGroup {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        root_parameter_index: u32,
        resource_group: Option<&dyn ResourceGroup>,
    ) {
        command_buffer.add_command(Self {
            root_parameter_index,
            _padding: 0,
            resource_group: ResourceId::of(resource_group),
        });
    }
}

/// Binds the vertex array used by subsequent draws.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsVertexArray {
    /// The vertex array to bind, null to unbind.
    pub vertex_array: ResourceId,
}

impl SetGraphicsVertexArray {
    /// Records the command into `command_buffer`.
    pub fn create(command_buffer: &mut CommandBuffer, vertex_array: Option<&dyn VertexArray>) {
        command_buffer.add_command(Self {
            vertex_array: ResourceId::of(vertex_array),
        });
    }
}

/// A viewport rectangle with its depth range.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Viewport {
    /// Left edge.
    pub top_left_x: f32,
    /// Top edge.
    pub top_left_y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Minimum depth.
    pub min_depth: f32,
    /// Maximum depth.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering `width` x `height` with the full `[0, 1]` depth range.
    pub const fn new(top_left_x: f32, top_left_y: f32, width: f32, height: f32) -> Self {
        Self {
            top_left_x,
            top_left_y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Sets the viewports. The viewports travel in auxiliary memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsViewports {
    /// Number of `Viewport`s in auxiliary memory.
    pub number_of_viewports: u32,
    #[doc(hidden)]
    pub _padding: u32,
}

impl SetGraphicsViewports {
    /// Records `viewports`, which must not be empty.
    pub fn create(command_buffer: &mut CommandBuffer, viewports: &[Viewport]) {
        debug_assert!(!viewports.is_empty(), "setting zero viewports");
        let (_, auxiliary) = command_buffer.add_command_with_auxiliary(
            Self {
                number_of_viewports: viewports.len() as u32,
                _padding: 0,
            },
            size_of_val(viewports) as u32,
        );
        write_auxiliary(auxiliary, viewports);
    }

    /// Records a single viewport.
    pub fn create_single(
        command_buffer: &mut CommandBuffer,
        top_left_x: f32,
        top_left_y: f32,
        width: f32,
        height: f32,
    ) {
        Self::create(
            command_buffer,
            &[Viewport::new(top_left_x, top_left_y, width, height)],
        );
    }

    /// The viewports of a recorded packet.
    pub fn viewports<'a>(packet: &Packet<'a>) -> Cow<'a, [Viewport]> {
        let command = packet.command::<Self>();
        packet.auxiliary::<Self, Viewport>(command.number_of_viewports as usize)
    }
}

/// A scissor rectangle in window coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ScissorRectangle {
    /// Left edge.
    pub top_left_x: i32,
    /// Top edge.
    pub top_left_y: i32,
    /// Right edge, exclusive.
    pub bottom_right_x: i32,
    /// Bottom edge, exclusive.
    pub bottom_right_y: i32,
}

/// Sets the scissor rectangles. The rectangles travel in auxiliary memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsScissorRectangles {
    /// Number of `ScissorRectangle`s in auxiliary memory.
    pub number_of_scissor_rectangles: u32,
    #[doc(hidden)]
    pub _padding: u32,
}

impl SetGraphicsScissorRectangles {
    /// Records `scissor_rectangles`, which must not be empty.
    pub fn create(command_buffer: &mut CommandBuffer, scissor_rectangles: &[ScissorRectangle]) {
        debug_assert!(
            !scissor_rectangles.is_empty(),
            "setting zero scissor rectangles"
        );
        let (_, auxiliary) = command_buffer.add_command_with_auxiliary(
            Self {
                number_of_scissor_rectangles: scissor_rectangles.len() as u32,
                _padding: 0,
            },
            size_of_val(scissor_rectangles) as u32,
        );
        write_auxiliary(auxiliary, scissor_rectangles);
    }

    /// Records a single scissor rectangle.
    pub fn create_single(
        command_buffer: &mut CommandBuffer,
        top_left_x: i32,
        top_left_y: i32,
        bottom_right_x: i32,
        bottom_right_y: i32,
    ) {
        Self::create(
            command_buffer,
            &[ScissorRectangle {
                top_left_x,
                top_left_y,
                bottom_right_x,
                bottom_right_y,
            }],
        );
    }

    /// The scissor rectangles of a recorded packet.
    pub fn scissor_rectangles<'a>(packet: &Packet<'a>) -> Cow<'a, [ScissorRectangle]> {
        let command = packet.command::<Self>();
        packet.auxiliary::<Self, ScissorRectangle>(command.number_of_scissor_rectangles as usize)
    }
}

/// Binds the render target that subsequent draws and clears write to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsRenderTarget {
    /// The framebuffer to bind, null to unbind.
    pub render_target: ResourceId,
}

impl SetGraphicsRenderTarget {
    /// Records the binding of `render_target`, `None` unbinds.
    pub fn create(command_buffer: &mut CommandBuffer, render_target: Option<&dyn Framebuffer>) {
        command_buffer.add_command(Self {
            render_target: ResourceId::of(render_target),
        });
    }
}

vesta_bitflags! {
    /// Which planes of the render target a clear touches.
    pub struct ClearFlags: u32 {
        /// Clear the color attachments.
        const COLOR = 1 << 0;
        /// Clear the depth plane.
        const DEPTH = 1 << 1;
        /// Clear the stencil plane.
        const STENCIL = 1 << 2;
        /// Clear color and depth.
        const COLOR_DEPTH = (1 << 0) | (1 << 1);
        /// Clear everything.
        const COLOR_DEPTH_STENCIL = (1 << 0) | (1 << 1) | (1 << 2);
    }
}

/// Clears the bound render target.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ClearGraphics {
    /// Raw [`ClearFlags`] bits.
    pub clear_flags: u32,
    /// Color clear value.
    pub color: [f32; 4],
    /// Depth clear value, in `[0, 1]`.
    pub z: f32,
    /// Stencil clear value.
    pub stencil: u32,
}

impl ClearGraphics {
    /// Records the command into `command_buffer`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        clear_flags: ClearFlags,
        color: [f32; 4],
        z: f32,
        stencil: u32,
    ) {
        debug_assert!((0.0..=1.0).contains(&z), "depth clear value {z} outside [0, 1]");
        command_buffer.add_command(Self {
            clear_flags: clear_flags.bits(),
            color,
            z,
            stencil,
        });
    }

    /// The recorded clear flags.
    pub fn flags(&self) -> ClearFlags {
        ClearFlags::from_bits_retain(self.clear_flags)
    }
}

/// Arguments of one non-indexed draw, laid out as indirect buffers expect.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArguments {
    /// Vertices drawn per instance.
    pub vertex_count_per_instance: u32,
    /// Number of instances.
    pub instance_count: u32,
    /// First vertex.
    pub start_vertex_location: u32,
    /// First instance.
    pub start_instance_location: u32,
}

impl DrawArguments {
    /// One instance of `vertex_count_per_instance` vertices from the start.
    pub const fn new(vertex_count_per_instance: u32) -> Self {
        Self {
            vertex_count_per_instance,
            instance_count: 1,
            start_vertex_location: 0,
            start_instance_location: 0,
        }
    }
}

/// Arguments of one indexed draw, laid out as indirect buffers expect.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    /// Indices drawn per instance.
    pub index_count_per_instance: u32,
    /// Number of instances.
    pub instance_count: u32,
    /// First index.
    pub start_index_location: u32,
    /// Value added to every index.
    pub base_vertex_location: i32,
    /// First instance.
    pub start_instance_location: u32,
}

impl DrawIndexedArguments {
    /// One instance of `index_count_per_instance` indices from the start.
    pub const fn new(index_count_per_instance: u32) -> Self {
        Self {
            index_count_per_instance,
            instance_count: 1,
            start_index_location: 0,
            base_vertex_location: 0,
            start_instance_location: 0,
        }
    }
}

/// Arguments of one mesh task draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawMeshTasksArguments {
    /// Number of task groups.
    pub number_of_tasks: u32,
    /// First task group.
    pub first_task: u32,
}

/// Defines a draw command with an indirect-buffer form and an inline form.
///
/// A null `indirect_buffer` means the draw arguments live in the packet's
/// auxiliary memory instead.
macro_rules! draw_command {
    ($(#[$attr:meta])* $name:ident, $arguments:ty) => {
        $(#[$attr])*
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
        pub struct $name {
            /// The buffer holding the arguments, null for inline arguments.
            pub indirect_buffer: ResourceId,
            /// Byte offset of the first arguments record inside the indirect buffer.
            pub indirect_buffer_offset: u32,
            /// Number of draws.
            pub number_of_draws: u32,
        }

        impl $name {
            /// Records `number_of_draws` draws whose arguments are read from
            /// `indirect_buffer` starting at `indirect_buffer_offset`.
            pub fn create(
                command_buffer: &mut CommandBuffer,
                indirect_buffer: &dyn Buffer,
                indirect_buffer_offset: u32,
                number_of_draws: u32,
            ) {
                debug_assert!(number_of_draws > 0, "recording zero draws");
                command_buffer.add_command(Self {
                    indirect_buffer: indirect_buffer.id(),
                    indirect_buffer_offset,
                    number_of_draws,
                });
            }

            /// Records one draw per entry of `arguments`, stored inline.
            pub fn create_inline(command_buffer: &mut CommandBuffer, arguments: &[$arguments]) {
                debug_assert!(!arguments.is_empty(), "recording zero draws");
                let (_, auxiliary) = command_buffer.add_command_with_auxiliary(
                    Self {
                        indirect_buffer: ResourceId::NULL,
                        indirect_buffer_offset: 0,
                        number_of_draws: arguments.len() as u32,
                    },
                    size_of_val(arguments) as u32,
                );
                write_auxiliary(auxiliary, arguments);
            }

            /// Returns `true` if the arguments travel inside the packet.
            pub fn is_inline(&self) -> bool {
                self.indirect_buffer.is_null()
            }

            /// The inline arguments of a recorded packet; empty for the
            /// indirect form.
            pub fn inline_arguments<'a>(packet: &Packet<'a>) -> Cow<'a, [$arguments]> {
                let command = packet.command::<Self>();
                if command.is_inline() {
                    packet.auxiliary::<Self, $arguments>(command.number_of_draws as usize)
                } else {
                    Cow::Borrowed(&[])
                }
            }

            /// Size of one arguments record inside an indirect buffer.
            pub const fn arguments_stride() -> u32 {
                size_of::<$arguments>() as u32
            }
        }
    };
}

draw_command!(
    /// Draws non-indexed primitives with the bound vertex array.
    DrawGraphics,
    DrawArguments
);
draw_command!(
    /// Draws indexed primitives with the bound vertex array's index buffer.
    DrawIndexedGraphics,
    DrawIndexedArguments
);
draw_command!(
    /// Launches mesh shader task groups.
    DrawMeshTasks,
    DrawMeshTasksArguments
);

impl DrawGraphics {
    /// Records one inline draw.
    pub fn create_single(command_buffer: &mut CommandBuffer, arguments: DrawArguments) {
        Self::create_inline(command_buffer, &[arguments]);
    }
}

impl DrawIndexedGraphics {
    /// Records one inline indexed draw.
    pub fn create_single(command_buffer: &mut CommandBuffer, arguments: DrawIndexedArguments) {
        Self::create_inline(command_buffer, &[arguments]);
    }
}

impl DrawMeshTasks {
    /// Records one inline mesh task draw.
    pub fn create_single(command_buffer: &mut CommandBuffer, number_of_tasks: u32, first_task: u32) {
        Self::create_inline(
            command_buffer,
            &[DrawMeshTasksArguments {
                number_of_tasks,
                first_task,
            }],
        );
    }
}

impl_command!(
    SetGraphicsRootSignature => SetGraphicsRootSignature,
    SetGraphicsPipelineState => SetGraphicsPipelineState,
    SetGraphicsResourceGroup => SetGraphicsResourceGroup,
    SetGraphicsVertexArray => SetGraphicsVertexArray,
    SetGraphicsViewports => SetGraphicsViewports,
    SetGraphicsScissorRectangles => SetGraphicsScissorRectangles,
    SetGraphicsRenderTarget => SetGraphicsRenderTarget,
    ClearGraphics => ClearGraphics,
    DrawGraphics => DrawGraphics,
    DrawIndexedGraphics => DrawIndexedGraphics,
    DrawMeshTasks => DrawMeshTasks,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::api::command::CommandDispatchFunctionIndex as Index;
    use approx::assert_relative_eq;

    #[test]
    fn clear_then_inline_indexed_draw() {
        let mut buffer = CommandBuffer::new();
        ClearGraphics::create(
            &mut buffer,
            ClearFlags::COLOR_DEPTH,
            [0.5, 0.5, 0.5, 1.0],
            1.0,
            0,
        );
        DrawIndexedGraphics::create_single(&mut buffer, DrawIndexedArguments::new(36));

        let packets: Vec<_> = buffer.packets().collect();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].dispatch_index(), Some(Index::ClearGraphics));
        assert_eq!(packets[1].dispatch_index(), Some(Index::DrawIndexedGraphics));

        let clear = packets[0].command::<ClearGraphics>();
        assert_eq!(clear.flags(), ClearFlags::COLOR_DEPTH);
        assert_relative_eq!(clear.z, 1.0);

        let draw = packets[1].command::<DrawIndexedGraphics>();
        assert!(draw.is_inline());
        assert_eq!(draw.number_of_draws, 1);
        let arguments: DrawIndexedArguments = bytemuck::pod_read_unaligned(
            &packets[1].auxiliary_bytes::<DrawIndexedGraphics>()
                [..size_of::<DrawIndexedArguments>()],
        );
        assert_eq!(arguments.index_count_per_instance, 36);
        assert_eq!(arguments.instance_count, 1);
        assert_eq!(arguments.start_index_location, 0);
        assert_eq!(arguments.base_vertex_location, 0);
        assert_eq!(arguments.start_instance_location, 0);
    }

    #[test]
    fn viewports_and_scissors_travel_inline() {
        let mut buffer = CommandBuffer::new();
        SetGraphicsViewports::create(
            &mut buffer,
            &[
                Viewport::new(0.0, 0.0, 640.0, 480.0),
                Viewport::new(640.0, 0.0, 640.0, 480.0),
            ],
        );
        SetGraphicsScissorRectangles::create_single(&mut buffer, 0, 0, 1280, 480);

        let mut packets = buffer.packets();
        let viewports = SetGraphicsViewports::viewports(&packets.next().unwrap());
        assert_eq!(viewports.len(), 2);
        assert_relative_eq!(viewports[1].top_left_x, 640.0);
        assert_relative_eq!(viewports[1].max_depth, 1.0);

        let rectangles =
            SetGraphicsScissorRectangles::scissor_rectangles(&packets.next().unwrap());
        assert_eq!(rectangles[0].bottom_right_x, 1280);
    }

    #[test]
    fn multi_draw_inline_arguments() {
        let mut buffer = CommandBuffer::new();
        DrawGraphics::create_inline(
            &mut buffer,
            &[DrawArguments::new(3), DrawArguments::new(6)],
        );
        DrawMeshTasks::create_single(&mut buffer, 32, 0);

        let mut packets = buffer.packets();
        let draws = DrawGraphics::inline_arguments(&packets.next().unwrap());
        let counts: Vec<u32> = draws.iter().map(|d| d.vertex_count_per_instance).collect();
        assert_eq!(counts, [3, 6]);
        let tasks = DrawMeshTasks::inline_arguments(&packets.next().unwrap());
        assert_eq!(tasks[0].number_of_tasks, 32);
        assert_eq!(DrawIndexedGraphics::arguments_stride(), 20);
    }
}
