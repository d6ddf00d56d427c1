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

//! Tunables of the runtime components.

use serde::{Deserialize, Serialize};

/// Configuration for the [`CommandExecutor`](crate::CommandExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Concurrency bound used by parallel dispatch when the caller gives none.
    pub default_max_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_max_concurrency: 4,
        }
    }
}

/// Configuration for the event bus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Whether native references in events are upgraded to wrappers before delivery.
    pub auto_conversion: bool,
}

/// Configuration for the [`LifecycleDetector`](crate::LifecycleDetector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Singleton whose presence means the host hub is up.
    pub hub_singleton: String,
    /// Singleton that roots the running simulation.
    pub simulation_root: String,
    /// Member of the simulation root that must also be present.
    pub sub_root_member: String,
    /// Full-load polling happens on ticks divisible by this interval.
    /// Values below 1 are treated as 1.
    pub poll_interval_ticks: u64,
    /// Ticks spent waiting for the full load before giving up.
    pub max_full_load_ticks: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            hub_singleton: "GameHub".to_string(),
            simulation_root: "Universe".to_string(),
            sub_root_member: "CurrentPlanet".to_string(),
            poll_interval_ticks: 30,
            max_full_load_ticks: 18_000,
        }
    }
}
