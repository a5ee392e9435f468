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

//! Device creation settings.

use super::capabilities::Capabilities;
use crate::rhi::api::util::GraphicsBackendType;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings a device is created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// The requested backend.
    pub backend: GraphicsBackendType,
    /// Enables backend debug layers and debug markers.
    pub enable_debug: bool,
    /// Validates descriptors and commands beyond what the backend requires.
    pub validate: bool,
    /// Overrides the capabilities a backend reports. Only honored by backends
    /// without a physical adapter.
    pub capabilities: Option<Capabilities>,
    /// Preferred adapter name; the first adapter is used when unset.
    pub adapter_name: Option<String>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            backend: GraphicsBackendType::Null,
            enable_debug: cfg!(debug_assertions),
            validate: true,
            capabilities: None,
            adapter_name: None,
        }
    }
}

impl DeviceSettings {
    /// Parses settings from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("failed to parse device settings")
    }

    /// Loads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read device settings from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Serializes the settings as pretty-printed JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize device settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings = DeviceSettings::from_json("{}").unwrap();
        assert_eq!(settings, DeviceSettings::default());
    }

    #[test]
    fn backend_and_capability_override() {
        let settings = DeviceSettings::from_json(
            r#"{ "backend": "Null", "validate": false,
                 "capabilities": { "maximum_number_of_multisamples": 1 } }"#,
        )
        .unwrap();
        assert_eq!(settings.backend, GraphicsBackendType::Null);
        assert!(!settings.validate);
        let capabilities = settings.capabilities.unwrap();
        assert_eq!(capabilities.maximum_number_of_multisamples, 1);
        assert_eq!(capabilities.maximum_anisotropy, 16);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let error = DeviceSettings::from_json("{ backend: ").unwrap_err();
        assert!(error.to_string().contains("device settings"));
    }

    #[test]
    fn json_round_trip() {
        let settings = DeviceSettings {
            adapter_name: Some("software".to_owned()),
            ..DeviceSettings::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(DeviceSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn missing_file_is_reported() {
        let error = DeviceSettings::load("/nonexistent/vesta/settings.json").unwrap_err();
        assert!(format!("{error:#}").contains("settings.json"));
    }
}
