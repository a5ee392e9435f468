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

//! Per-resource-kind creation and destruction counters.
//!
//! A device owns one [`Statistics`] instance and shares it with every resource
//! it creates. Resource constructors call [`Statistics::on_created`] and
//! destructors call [`Statistics::on_destroyed`], which makes leak detection a
//! matter of reading the current counters when the device goes away.
//!
//! Counting is compiled in with the `statistics` feature. Without it every
//! update is a no-op and every read returns zero.

use crate::rhi::api::resource::ResourceType;
use serde::Serialize;
#[cfg(feature = "statistics")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "statistics")]
#[derive(Debug, Default)]
struct ResourceCounter {
    current: AtomicU32,
    total: AtomicU32,
}

/// Live and lifetime resource counts of one device.
#[derive(Debug)]
pub struct Statistics {
    #[cfg(feature = "statistics")]
    counters: [ResourceCounter; ResourceType::COUNT],
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "statistics")]
            counters: std::array::from_fn(|_| ResourceCounter::default()),
        }
    }

    /// Records the construction of a resource of the given kind.
    pub fn on_created(&self, resource_type: ResourceType) {
        #[cfg(feature = "statistics")]
        {
            let counter = &self.counters[resource_type.index()];
            counter.current.fetch_add(1, Ordering::Relaxed);
            counter.total.fetch_add(1, Ordering::Relaxed);
        }
        #[cfg(not(feature = "statistics"))]
        let _ = resource_type;
    }

    /// Records the destruction of a resource of the given kind.
    pub fn on_destroyed(&self, resource_type: ResourceType) {
        #[cfg(feature = "statistics")]
        {
            let previous = self.counters[resource_type.index()]
                .current
                .fetch_sub(1, Ordering::Relaxed);
            debug_assert!(previous > 0, "destroyed more {resource_type}s than were created");
        }
        #[cfg(not(feature = "statistics"))]
        let _ = resource_type;
    }

    /// Number of currently alive resources of the given kind.
    pub fn current(&self, resource_type: ResourceType) -> u32 {
        #[cfg(feature = "statistics")]
        {
            self.counters[resource_type.index()]
                .current
                .load(Ordering::Relaxed)
        }
        #[cfg(not(feature = "statistics"))]
        {
            let _ = resource_type;
            0
        }
    }

    /// Number of resources of the given kind ever created.
    pub fn total(&self, resource_type: ResourceType) -> u32 {
        #[cfg(feature = "statistics")]
        {
            self.counters[resource_type.index()]
                .total
                .load(Ordering::Relaxed)
        }
        #[cfg(not(feature = "statistics"))]
        {
            let _ = resource_type;
            0
        }
    }

    /// Number of currently alive resources of every kind.
    pub fn number_of_current_resources(&self) -> u32 {
        ResourceType::ALL
            .iter()
            .map(|resource_type| self.current(*resource_type))
            .sum()
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            entries: ResourceType::ALL
                .iter()
                .map(|resource_type| ResourceCount {
                    resource_type: *resource_type,
                    current: self.current(*resource_type),
                    total: self.total(*resource_type),
                })
                .filter(|entry| entry.total > 0)
                .collect(),
        }
    }

    /// Logs every resource kind that still has live instances.
    ///
    /// Returns the number of live resources found.
    pub fn log_current_resources(&self, owner: &str) -> u32 {
        let alive = self.number_of_current_resources();
        if alive == 0 {
            log::info!("{owner}: no resources alive");
            return 0;
        }
        log::warn!("{owner}: {alive} resource(s) still alive");
        for resource_type in ResourceType::ALL {
            let current = self.current(resource_type);
            if current > 0 {
                log::warn!("  {resource_type}: {current}");
            }
        }
        alive
    }
}

/// One row of a [`StatisticsSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceCount {
    /// The resource kind.
    pub resource_type: ResourceType,
    /// Instances currently alive.
    pub current: u32,
    /// Instances ever created.
    pub total: u32,
}

/// A serializable copy of a device's statistics, listing only the kinds that
/// were ever created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatisticsSnapshot {
    /// Per-kind counts.
    pub entries: Vec<ResourceCount>,
}

impl StatisticsSnapshot {
    /// Renders the snapshot as JSON, e.g. for a telemetry sink or a log line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(all(test, feature = "statistics"))]
mod tests {
    use super::*;

    #[test]
    fn counters_follow_creation_and_destruction() {
        let statistics = Statistics::new();
        statistics.on_created(ResourceType::VertexBuffer);
        statistics.on_created(ResourceType::VertexBuffer);
        statistics.on_created(ResourceType::Texture2D);
        statistics.on_destroyed(ResourceType::VertexBuffer);

        assert_eq!(statistics.current(ResourceType::VertexBuffer), 1);
        assert_eq!(statistics.total(ResourceType::VertexBuffer), 2);
        assert_eq!(statistics.current(ResourceType::Texture2D), 1);
        assert_eq!(statistics.number_of_current_resources(), 2);
    }

    #[test]
    fn snapshot_lists_only_used_kinds() {
        let statistics = Statistics::new();
        statistics.on_created(ResourceType::SamplerState);
        statistics.on_destroyed(ResourceType::SamplerState);

        let snapshot = statistics.snapshot();
        assert_eq!(
            snapshot.entries,
            vec![ResourceCount {
                resource_type: ResourceType::SamplerState,
                current: 0,
                total: 1,
            }]
        );
        let json = snapshot.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"entries":[{"resource_type":"SamplerState","current":0,"total":1}]}"#
        );
    }

    #[test]
    fn leak_report_counts_alive_resources() {
        let statistics = Statistics::new();
        assert_eq!(statistics.log_current_resources("test device"), 0);
        statistics.on_created(ResourceType::QueryPool);
        assert_eq!(statistics.log_current_resources("test device"), 1);
    }
}
