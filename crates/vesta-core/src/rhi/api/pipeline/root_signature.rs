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

//! Root signatures and resource groups.
//!
//! A root signature is the backend-neutral binding layout of a pipeline: an
//! ordered list of root parameters, each either a table of descriptor ranges,
//! inline constants or a single descriptor. Resource groups are the concrete
//! resources bound to one descriptor table.

use crate::rhi::api::core::Ref;
use crate::rhi::api::resource::{
    Resource, ResourceType, SamplerState, SamplerStateDescriptor,
};
use crate::rhi::api::util::ShaderVisibility;
use crate::rhi::error::ResourceError;
use crate::vesta_bitflags;
use std::borrow::Cow;

/// The kind of descriptors of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    /// Shader resource views: read-only textures and buffers.
    Srv,
    /// Unordered access views: read/write textures and buffers.
    Uav,
    /// Uniform buffer views.
    Ubv,
    /// Samplers.
    Sampler,
}

impl DescriptorRangeType {
    /// Returns `true` if a resource of the given kind can be bound to a range
    /// of this type.
    pub const fn accepts(self, resource_type: ResourceType) -> bool {
        match self {
            Self::Srv => {
                resource_type.is_texture()
                    || matches!(
                        resource_type,
                        ResourceType::TextureBuffer
                            | ResourceType::StructuredBuffer
                            | ResourceType::VertexBuffer
                            | ResourceType::IndexBuffer
                    )
            }
            Self::Uav => {
                resource_type.is_texture()
                    || matches!(
                        resource_type,
                        ResourceType::TextureBuffer
                            | ResourceType::StructuredBuffer
                            | ResourceType::IndirectBuffer
                            | ResourceType::VertexBuffer
                            | ResourceType::IndexBuffer
                    )
            }
            Self::Ubv => matches!(resource_type, ResourceType::UniformBuffer),
            Self::Sampler => matches!(resource_type, ResourceType::SamplerState),
        }
    }
}

/// A contiguous range of descriptors inside a descriptor table.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorRange<'a> {
    /// The kind of descriptors.
    pub range_type: DescriptorRangeType,
    /// Number of descriptors of the range.
    pub number_of_descriptors: u32,
    /// First shader register of the range.
    pub base_shader_register: u32,
    /// Register space of the range.
    pub register_space: u32,
    /// Name of the first register, for backends binding by name.
    pub base_shader_register_name: Cow<'a, str>,
    /// Restricts the range to one resource kind; any accepted kind when `None`.
    pub resource_type: Option<ResourceType>,
    /// Stages the range is visible to.
    pub shader_visibility: ShaderVisibility,
}

impl<'a> DescriptorRange<'a> {
    /// A range of `number_of_descriptors` descriptors starting at
    /// `base_shader_register` in register space 0.
    pub fn new(
        range_type: DescriptorRangeType,
        number_of_descriptors: u32,
        base_shader_register: u32,
        base_shader_register_name: impl Into<Cow<'a, str>>,
        shader_visibility: ShaderVisibility,
    ) -> Self {
        Self {
            range_type,
            number_of_descriptors,
            base_shader_register,
            register_space: 0,
            base_shader_register_name: base_shader_register_name.into(),
            resource_type: None,
            shader_visibility,
        }
    }

    /// A range of sampler descriptors.
    pub fn samplers(
        number_of_descriptors: u32,
        base_shader_register: u32,
        shader_visibility: ShaderVisibility,
    ) -> Self {
        Self::new(
            DescriptorRangeType::Sampler,
            number_of_descriptors,
            base_shader_register,
            "",
            shader_visibility,
        )
    }

    /// Restricts the range to one resource kind.
    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    /// Returns `true` if a resource of the given kind fits the range.
    pub fn accepts(&self, resource_type: ResourceType) -> bool {
        self.range_type.accepts(resource_type)
            && self.resource_type.is_none_or(|expected| expected == resource_type)
    }

    /// Copies every borrowed field.
    pub fn into_owned(self) -> DescriptorRange<'static> {
        DescriptorRange {
            range_type: self.range_type,
            number_of_descriptors: self.number_of_descriptors,
            base_shader_register: self.base_shader_register,
            register_space: self.register_space,
            base_shader_register_name: Cow::Owned(self.base_shader_register_name.into_owned()),
            resource_type: self.resource_type,
            shader_visibility: self.shader_visibility,
        }
    }
}

/// The kind of a root descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootDescriptorType {
    /// A uniform buffer.
    Ubv,
    /// A read-only buffer.
    Srv,
    /// A read/write buffer.
    Uav,
}

/// One entry of a root signature.
#[derive(Debug, Clone, PartialEq)]
pub enum RootParameter<'a> {
    /// A table of descriptor ranges, bound through a resource group.
    DescriptorTable {
        /// The ranges of the table, in binding order.
        ranges: Cow<'a, [DescriptorRange<'a>]>,
        /// Stages the table is visible to.
        shader_visibility: ShaderVisibility,
    },
    /// Inline 32-bit constants.
    Constants {
        /// Shader register of the constants.
        shader_register: u32,
        /// Register space of the constants.
        register_space: u32,
        /// Number of 32-bit values.
        number_of_values: u32,
        /// Stages the constants are visible to.
        shader_visibility: ShaderVisibility,
    },
    /// A single buffer descriptor bound directly.
    Descriptor {
        /// The descriptor kind.
        descriptor_type: RootDescriptorType,
        /// Shader register of the descriptor.
        shader_register: u32,
        /// Register space of the descriptor.
        register_space: u32,
        /// Stages the descriptor is visible to.
        shader_visibility: ShaderVisibility,
    },
}

impl<'a> RootParameter<'a> {
    /// A descriptor table over `ranges`.
    pub fn descriptor_table(
        ranges: impl Into<Cow<'a, [DescriptorRange<'a>]>>,
        shader_visibility: ShaderVisibility,
    ) -> Self {
        Self::DescriptorTable {
            ranges: ranges.into(),
            shader_visibility,
        }
    }

    /// `number_of_values` inline 32-bit constants.
    pub fn constants(
        shader_register: u32,
        number_of_values: u32,
        shader_visibility: ShaderVisibility,
    ) -> Self {
        Self::Constants {
            shader_register,
            register_space: 0,
            number_of_values,
            shader_visibility,
        }
    }

    /// The descriptor ranges of a table, `None` for other parameters.
    pub fn ranges(&self) -> Option<&[DescriptorRange<'a>]> {
        match self {
            Self::DescriptorTable { ranges, .. } => Some(&ranges[..]),
            _ => None,
        }
    }

    /// Copies every borrowed field.
    pub fn into_owned(self) -> RootParameter<'static> {
        match self {
            Self::DescriptorTable {
                ranges,
                shader_visibility,
            } => RootParameter::DescriptorTable {
                ranges: Cow::Owned(
                    ranges
                        .into_owned()
                        .into_iter()
                        .map(DescriptorRange::into_owned)
                        .collect(),
                ),
                shader_visibility,
            },
            Self::Constants {
                shader_register,
                register_space,
                number_of_values,
                shader_visibility,
            } => RootParameter::Constants {
                shader_register,
                register_space,
                number_of_values,
                shader_visibility,
            },
            Self::Descriptor {
                descriptor_type,
                shader_register,
                register_space,
                shader_visibility,
            } => RootParameter::Descriptor {
                descriptor_type,
                shader_register,
                register_space,
                shader_visibility,
            },
        }
    }
}

/// A sampler baked into a root signature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSampler {
    /// The sampler state.
    pub sampler: SamplerStateDescriptor,
    /// Shader register of the sampler.
    pub shader_register: u32,
    /// Register space of the sampler.
    pub register_space: u32,
    /// Stages the sampler is visible to.
    pub shader_visibility: ShaderVisibility,
}

vesta_bitflags! {
    /// Root signature options.
    pub struct RootSignatureFlags: u32 {
        /// The pipeline reads vertex attributes from vertex buffers.
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 1 << 0;
        /// Vertex shaders cannot access the root signature.
        const DENY_VERTEX_SHADER_ROOT_ACCESS = 1 << 1;
        /// Fragment shaders cannot access the root signature.
        const DENY_FRAGMENT_SHADER_ROOT_ACCESS = 1 << 2;
    }
}

/// A descriptor used to create a root signature.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSignatureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Root parameters, addressed by index.
    pub parameters: Cow<'a, [RootParameter<'a>]>,
    /// Static samplers.
    pub static_samplers: Cow<'a, [StaticSampler]>,
    /// Options.
    pub flags: RootSignatureFlags,
}

impl<'a> RootSignatureDescriptor<'a> {
    /// A root signature with the given parameters and no static samplers,
    /// reading vertex attributes from vertex buffers.
    pub fn new(parameters: impl Into<Cow<'a, [RootParameter<'a>]>>) -> Self {
        Self {
            label: None,
            parameters: parameters.into(),
            static_samplers: Cow::Borrowed(&[]),
            flags: RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        }
    }

    /// Sets the debug label.
    pub fn label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, or an empty string.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Checks the structural rules every backend shares.
    pub fn validate(&self) -> Result<(), ResourceError> {
        for (index, parameter) in self.parameters.iter().enumerate() {
            match parameter {
                RootParameter::DescriptorTable { ranges, .. } => {
                    if ranges.is_empty() {
                        return Err(ResourceError::InvalidDescriptor(format!(
                            "descriptor table {index} has no ranges"
                        )));
                    }
                    if ranges.iter().any(|range| range.number_of_descriptors == 0) {
                        return Err(ResourceError::InvalidDescriptor(format!(
                            "descriptor table {index} has an empty range"
                        )));
                    }
                    let samplers = ranges
                        .iter()
                        .filter(|range| range.range_type == DescriptorRangeType::Sampler)
                        .count();
                    if samplers != 0 && samplers != ranges.len() {
                        return Err(ResourceError::InvalidDescriptor(format!(
                            "descriptor table {index} mixes sampler and resource ranges"
                        )));
                    }
                }
                RootParameter::Constants {
                    number_of_values, ..
                } if *number_of_values == 0 => {
                    return Err(ResourceError::InvalidDescriptor(format!(
                        "root constants {index} hold no values"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Copies every borrowed field so the layout outlives its descriptor.
    pub fn into_owned(self) -> RootSignatureDescriptor<'static> {
        RootSignatureDescriptor {
            label: self.label.map(|label| Cow::Owned(label.into_owned())),
            parameters: Cow::Owned(
                self.parameters
                    .into_owned()
                    .into_iter()
                    .map(RootParameter::into_owned)
                    .collect(),
            ),
            static_samplers: Cow::Owned(self.static_samplers.into_owned()),
            flags: self.flags,
        }
    }
}

/// The binding layout of a pipeline.
pub trait RootSignature: Resource {
    /// The layout the root signature was created from.
    fn descriptor(&self) -> &RootSignatureDescriptor<'static>;
}

/// A descriptor used to create a resource group.
#[derive(Debug, Clone)]
pub struct ResourceGroupDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The root signature the group is laid out against.
    pub root_signature: &'a Ref<dyn RootSignature>,
    /// Index of the descriptor table parameter the group binds.
    pub root_parameter_index: u32,
    /// One resource per descriptor, ranges flattened in order.
    pub resources: Cow<'a, [Ref<dyn Resource>]>,
    /// Optional per-resource samplers for backends that pair textures with
    /// samplers. Empty, or one entry per resource.
    pub sampler_states: Cow<'a, [Option<Ref<dyn SamplerState>>]>,
}

impl ResourceGroupDescriptor<'_> {
    /// Checks the resources against the descriptor table they bind.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let parameters = &self.root_signature.descriptor().parameters;
        let parameter = parameters
            .get(self.root_parameter_index as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        let ranges = parameter.ranges().ok_or_else(|| {
            ResourceError::InvalidDescriptor(format!(
                "root parameter {} is not a descriptor table",
                self.root_parameter_index
            ))
        })?;

        let expected: u32 = ranges.iter().map(|range| range.number_of_descriptors).sum();
        if self.resources.len() != expected as usize {
            return Err(ResourceError::InvalidDescriptor(format!(
                "descriptor table {} expects {expected} resource(s), got {}",
                self.root_parameter_index,
                self.resources.len()
            )));
        }
        if !self.sampler_states.is_empty() && self.sampler_states.len() != self.resources.len() {
            return Err(ResourceError::InvalidDescriptor(
                "sampler states must be empty or match the resources one to one".to_owned(),
            ));
        }

        let slots = ranges
            .iter()
            .flat_map(|range| std::iter::repeat_n(range, range.number_of_descriptors as usize));
        for (slot, (range, resource)) in slots.zip(self.resources.iter()).enumerate() {
            if !range.accepts(resource.resource_type()) {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "slot {slot}: a {:?} range cannot bind {} {}",
                    range.range_type,
                    resource.resource_type(),
                    resource.id()
                )));
            }
        }
        Ok(())
    }
}

/// Concrete resources bound to one descriptor table of a root signature.
pub trait ResourceGroup: Resource {
    /// Index of the descriptor table parameter the group binds.
    fn root_parameter_index(&self) -> u32;

    /// The bound resources.
    fn resources(&self) -> &[Ref<dyn Resource>];

    /// The per-resource samplers, empty when none were given.
    fn sampler_states(&self) -> &[Option<Ref<dyn SamplerState>>];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture_and_uniform_table() -> RootParameter<'static> {
        RootParameter::descriptor_table(
            vec![
                DescriptorRange::new(
                    DescriptorRangeType::Ubv,
                    1,
                    0,
                    "UniformBlock",
                    ShaderVisibility::AllGraphics,
                ),
                DescriptorRange::new(
                    DescriptorRangeType::Srv,
                    2,
                    0,
                    "AlbedoMap",
                    ShaderVisibility::Fragment,
                ),
            ],
            ShaderVisibility::All,
        )
    }

    #[test]
    fn range_types_accept_matching_resources() {
        assert!(DescriptorRangeType::Srv.accepts(ResourceType::Texture2D));
        assert!(DescriptorRangeType::Srv.accepts(ResourceType::StructuredBuffer));
        assert!(!DescriptorRangeType::Srv.accepts(ResourceType::UniformBuffer));
        assert!(DescriptorRangeType::Uav.accepts(ResourceType::IndirectBuffer));
        assert!(DescriptorRangeType::Ubv.accepts(ResourceType::UniformBuffer));
        assert!(DescriptorRangeType::Sampler.accepts(ResourceType::SamplerState));
        assert!(!DescriptorRangeType::Sampler.accepts(ResourceType::Texture2D));

        let range = DescriptorRange::new(
            DescriptorRangeType::Srv,
            1,
            0,
            "Cube",
            ShaderVisibility::Fragment,
        )
        .with_resource_type(ResourceType::TextureCube);
        assert!(range.accepts(ResourceType::TextureCube));
        assert!(!range.accepts(ResourceType::Texture2D));
    }

    #[test]
    fn valid_layout() {
        let parameters = vec![
            texture_and_uniform_table(),
            RootParameter::descriptor_table(
                vec![DescriptorRange::samplers(1, 0, ShaderVisibility::Fragment)],
                ShaderVisibility::Fragment,
            ),
            RootParameter::constants(1, 4, ShaderVisibility::Vertex),
        ];
        let descriptor = RootSignatureDescriptor::new(parameters).label("forward");
        assert!(descriptor.validate().is_ok());
        assert_eq!(descriptor.label_str(), "forward");
    }

    #[test]
    fn mixed_sampler_tables_are_rejected() {
        let parameters = vec![RootParameter::descriptor_table(
            vec![
                DescriptorRange::samplers(1, 0, ShaderVisibility::Fragment),
                DescriptorRange::new(
                    DescriptorRangeType::Srv,
                    1,
                    0,
                    "AlbedoMap",
                    ShaderVisibility::Fragment,
                ),
            ],
            ShaderVisibility::Fragment,
        )];
        assert!(matches!(
            RootSignatureDescriptor::new(parameters).validate(),
            Err(ResourceError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn empty_tables_are_rejected() {
        let parameters = vec![RootParameter::descriptor_table(
            Vec::<DescriptorRange>::new(),
            ShaderVisibility::All,
        )];
        assert!(RootSignatureDescriptor::new(parameters)
            .validate()
            .is_err());
    }

    #[test]
    fn owned_copy_outlives_borrowed_names() {
        let name = String::from("AlbedoMap");
        let ranges = vec![DescriptorRange::new(
            DescriptorRangeType::Srv,
            1,
            0,
            name.as_str(),
            ShaderVisibility::Fragment,
        )];
        let parameters = vec![RootParameter::descriptor_table(
            &ranges[..],
            ShaderVisibility::Fragment,
        )];
        let owned = RootSignatureDescriptor::new(parameters).into_owned();
        drop(ranges);
        drop(name);
        let ranges = owned.parameters[0].ranges().unwrap();
        assert_eq!(ranges[0].base_shader_register_name, "AlbedoMap");
    }
}
