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

//! Loading of the aggregated SDK configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tether_control::{BusConfig, ExecutorConfig, LifecycleConfig};
use thiserror::Error;

/// Errors raised while loading an [`SdkConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every tunable of the SDK. Missing sections and keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Command execution.
    pub executor: ExecutorConfig,
    /// Event delivery.
    pub bus: BusConfig,
    /// Startup detection.
    pub lifecycle: LifecycleConfig,
    /// Default `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            bus: BusConfig::default(),
            lifecycle: LifecycleConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl SdkConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::debug!("Loaded SDK config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(SdkConfig::from_json_str("{}").unwrap(), SdkConfig::default());
    }

    #[test]
    fn test_nested_overrides() {
        let config = SdkConfig::from_json_str(
            r#"{
                "bus": { "auto_conversion": true },
                "lifecycle": { "hub_singleton": "MainHub", "max_full_load_ticks": 600 },
                "log_filter": "debug"
            }"#,
        )
        .unwrap();

        assert!(config.bus.auto_conversion);
        assert_eq!(config.lifecycle.hub_singleton, "MainHub");
        assert_eq!(config.lifecycle.max_full_load_ticks, 600);
        assert_eq!(config.lifecycle.poll_interval_ticks, 30);
        assert_eq!(config.executor.default_max_concurrency, 4);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid_json() {
        let err = SdkConfig::from_json_str("{ \"bus\": 3 }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SdkConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
