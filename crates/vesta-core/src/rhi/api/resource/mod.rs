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

//! The backend-independent resource object model.
//!
//! Every GPU-side object implements [`Resource`] and embeds a [`ResourceBase`]
//! carrying its reference counter, kind, device-unique [`ResourceId`], a
//! non-owning link to the device that created it and the device's
//! [`Statistics`]. Calling code holds resources through [`Ref`] handles;
//! commands refer to them by id only.

pub mod buffer;
pub mod mapping;
pub mod query;
pub mod render_target;
pub mod resource_type;
pub mod sampler;
pub mod shader;
pub mod texture;

pub use self::buffer::*;
pub use self::mapping::*;
pub use self::query::*;
pub use self::render_target::*;
pub use self::resource_type::*;
pub use self::sampler::*;
pub use self::shader::*;
pub use self::texture::*;

use crate::rhi::api::core::{Ref, RefCount, RefCounted, Statistics};
use crate::rhi::api::pipeline::{
    ComputePipelineState, GraphicsPipelineState, ResourceGroup, RootSignature, VertexArray,
};
use crate::rhi::traits::GraphicsDevice;
use bytemuck::{Pod, Zeroable};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// Maximum number of characters kept from a resource debug name.
pub const MAXIMUM_DEBUG_NAME_LENGTH: usize = 255;

/// A device-unique, non-owning reference to a resource.
///
/// Ids are what command packets store: they are plain data, never keep the
/// resource alive and are resolved by the backend at replay time.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Pod, Zeroable)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// The id of "no resource".
    pub const NULL: Self = Self(0);

    /// Returns `true` for [`ResourceId::NULL`].
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the id of `resource`, or [`ResourceId::NULL`] for `None`.
    pub fn of<T: Resource + ?Sized>(resource: Option<&T>) -> Self {
        resource.map_or(Self::NULL, |resource| resource.id())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("#null")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// State shared by every resource, embedded by backend resource types.
pub struct ResourceBase {
    ref_count: RefCount,
    resource_type: ResourceType,
    id: ResourceId,
    device: Weak<dyn GraphicsDevice>,
    statistics: Arc<Statistics>,
    #[cfg(feature = "debug-names")]
    debug_name: String,
}

impl ResourceBase {
    /// Creates the base of a new resource and records it in `statistics`.
    ///
    /// `debug_name` is truncated to [`MAXIMUM_DEBUG_NAME_LENGTH`] characters and
    /// ignored when the `debug-names` feature is disabled.
    pub fn new(
        resource_type: ResourceType,
        id: ResourceId,
        device: Weak<dyn GraphicsDevice>,
        statistics: Arc<Statistics>,
        debug_name: &str,
    ) -> Self {
        debug_assert!(!id.is_null(), "resources must not use the null id");
        statistics.on_created(resource_type);
        log::debug!("Created {resource_type} {id} '{debug_name}'");
        #[cfg(not(feature = "debug-names"))]
        let _ = debug_name;
        Self {
            ref_count: RefCount::new(),
            resource_type,
            id,
            device,
            statistics,
            #[cfg(feature = "debug-names")]
            debug_name: truncate_debug_name(debug_name),
        }
    }

    /// The resource's reference counter.
    pub fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }

    /// The resource's kind.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// The resource's device-unique id.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// The device that created this resource, if it is still alive.
    pub fn device(&self) -> Option<Arc<dyn GraphicsDevice>> {
        self.device.upgrade()
    }

    /// Returns `true` if `device` created this resource.
    pub fn belongs_to(&self, device: &dyn GraphicsDevice) -> bool {
        std::ptr::addr_eq(self.device.as_ptr(), device as *const dyn GraphicsDevice)
    }

    /// The debug name, empty when none was given or names are compiled out.
    pub fn debug_name(&self) -> &str {
        #[cfg(feature = "debug-names")]
        {
            &self.debug_name
        }
        #[cfg(not(feature = "debug-names"))]
        {
            ""
        }
    }
}

impl Drop for ResourceBase {
    fn drop(&mut self) {
        debug_assert_eq!(
            self.ref_count.get(),
            0,
            "{} {} destroyed while still referenced",
            self.resource_type,
            self.id
        );
        self.statistics.on_destroyed(self.resource_type);
        if let Some(device) = self.device.upgrade() {
            device.on_resource_destroyed(self.id);
        }
        log::debug!("Destroyed {} {}", self.resource_type, self.id);
    }
}

impl fmt::Debug for ResourceBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBase")
            .field("resource_type", &self.resource_type)
            .field("id", &self.id)
            .field("ref_count", &self.ref_count.get())
            .field("debug_name", &self.debug_name())
            .finish()
    }
}

#[cfg(feature = "debug-names")]
fn truncate_debug_name(name: &str) -> String {
    name.chars().take(MAXIMUM_DEBUG_NAME_LENGTH).collect()
}

/// A GPU-side object created by a [`GraphicsDevice`].
pub trait Resource: RefCounted + fmt::Debug + Any {
    /// The state shared by every resource.
    fn base(&self) -> &ResourceBase;

    /// Allows backends to recover their concrete type.
    fn as_any(&self) -> &dyn Any;

    /// The resource's kind.
    fn resource_type(&self) -> ResourceType {
        self.base().resource_type()
    }

    /// The resource's device-unique id.
    fn id(&self) -> ResourceId {
        self.base().id()
    }

    /// The resource's debug name.
    fn debug_name(&self) -> &str {
        self.base().debug_name()
    }
}

/// Implements [`RefCounted`] and [`Resource`] for a backend type holding a
/// [`ResourceBase`] field.
///
/// ```ignore
/// struct NullBuffer { base: ResourceBase, .. }
/// vesta_core::impl_resource!(NullBuffer, base);
/// ```
#[macro_export]
macro_rules! impl_resource {
    ($ty:ty, $base:ident) => {
        impl $crate::rhi::api::core::RefCounted for $ty {
            fn ref_count(&self) -> &$crate::rhi::api::core::RefCount {
                self.$base.ref_count()
            }
        }

        impl $crate::rhi::api::resource::Resource for $ty {
            fn base(&self) -> &$crate::rhi::api::resource::ResourceBase {
                &self.$base
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

macro_rules! impl_upcast {
    ($($from:ident => $to:ident),* $(,)?) => {
        $(
            impl From<Ref<dyn $from>> for Ref<dyn $to> {
                fn from(handle: Ref<dyn $from>) -> Self {
                    let arc: Arc<dyn $to> = handle.into_arc();
                    Ref::adopt(arc)
                }
            }
        )*
    };
}

impl_upcast! {
    Buffer => Resource,
    IndexBuffer => Resource,
    IndexBuffer => Buffer,
    Texture => Resource,
    SamplerState => Resource,
    QueryPool => Resource,
    RenderPass => Resource,
    Framebuffer => Resource,
    Shader => Resource,
    GraphicsProgram => Resource,
    VertexArray => Resource,
    RootSignature => Resource,
    ResourceGroup => Resource,
    GraphicsPipelineState => Resource,
    ComputePipelineState => Resource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_id() {
        assert!(ResourceId::NULL.is_null());
        assert!(!ResourceId(7).is_null());
        assert_eq!(ResourceId::of::<dyn Resource>(None), ResourceId::NULL);
        assert_eq!(ResourceId(7).to_string(), "#7");
        assert_eq!(ResourceId::NULL.to_string(), "#null");
    }

    #[cfg(feature = "debug-names")]
    #[test]
    fn debug_names_are_truncated() {
        let long = "x".repeat(400);
        assert_eq!(truncate_debug_name(&long).len(), MAXIMUM_DEBUG_NAME_LENGTH);
        assert_eq!(truncate_debug_name("vertex buffer"), "vertex buffer");
    }
}
