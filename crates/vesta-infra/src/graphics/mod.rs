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

//! Graphics backends.

#[cfg(feature = "null")]
pub mod null;

use anyhow::Context;
use std::sync::Arc;
use vesta_core::rhi::{DeviceSettings, GraphicsBackendType, RenderError};
use vesta_core::GraphicsDevice;

/// Creates a device for the backend selected in `settings`.
///
/// Only the backends compiled into this build are available; asking for any
/// other one fails with [`RenderError::UnsupportedBackend`].
pub fn create_device(settings: &DeviceSettings) -> anyhow::Result<Arc<dyn GraphicsDevice>> {
    log::info!(
        "Creating {} graphics device (debug: {}, validation: {})",
        settings.backend.name(),
        settings.enable_debug,
        settings.validate
    );
    match settings.backend {
        #[cfg(feature = "null")]
        GraphicsBackendType::Null => {
            let device: Arc<dyn GraphicsDevice> = null::NullDevice::new(settings);
            Ok(device)
        }
        backend => Err(RenderError::UnsupportedBackend(backend))
            .with_context(|| format!("cannot create a {} device", backend.name())),
    }
}

#[cfg(all(test, feature = "null"))]
mod tests {
    use super::*;

    #[test]
    fn null_backend_is_created() {
        let device = create_device(&DeviceSettings::default()).unwrap();
        assert_eq!(device.backend_type(), GraphicsBackendType::Null);
        assert_eq!(device.name(), "Null");
    }

    #[test]
    fn unavailable_backend_is_reported() {
        let settings = DeviceSettings {
            backend: GraphicsBackendType::Vulkan,
            ..DeviceSettings::default()
        };
        let error = create_device(&settings).unwrap_err();
        assert!(format!("{error:#}").contains("Vulkan"));
        assert!(matches!(
            error.downcast_ref::<RenderError>(),
            Some(RenderError::UnsupportedBackend(GraphicsBackendType::Vulkan))
        ));
    }
}
