// Copyright 2025 John Brosnihan
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
//! Runtime configuration
//!
//! Configuration can be built in code, parsed from TOML, or read from the
//! environment:
//!
//! ```bash
//! export ECS_RUNTIME_INSPECT_MODE=broadcast
//! export ECS_RUNTIME_ENTITY_CAPACITY=4096
//! ```
//!
//! ```toml
//! inspect_mode = "targeted"
//! entity_capacity = 1024
//! ```

use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the [`InspectMode`]
pub const INSPECT_MODE_ENV: &str = "ECS_RUNTIME_INSPECT_MODE";

/// Environment variable selecting the initial entity capacity
pub const ENTITY_CAPACITY_ENV: &str = "ECS_RUNTIME_ENTITY_CAPACITY";

/// Which groups re-evaluate an entity after a component is added or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectMode {
    /// Only groups that require the mutated component type
    #[default]
    Targeted,
    /// Every group, regardless of the mutated type
    Broadcast,
}

impl FromStr for InspectMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "targeted" => Ok(InspectMode::Targeted),
            "broadcast" => Ok(InspectMode::Broadcast),
            _ => Err(ConfigError::InvalidValue {
                key: INSPECT_MODE_ENV,
                value: s.to_string(),
            }),
        }
    }
}

/// Settings for an [`EntityManager`](crate::ecs::EntityManager)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Group dispatch strategy
    pub inspect_mode: InspectMode,
    /// Number of entities to reserve room for up front
    pub entity_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            inspect_mode: InspectMode::Targeted,
            entity_capacity: 64,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from TOML; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read the configuration from the environment
    ///
    /// Unset variables keep their defaults; set but invalid values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = RuntimeConfig::default();

        if let Some(mode) = lookup(INSPECT_MODE_ENV) {
            config.inspect_mode = mode.parse()?;
        }
        if let Some(capacity) = lookup(ENTITY_CAPACITY_ENV) {
            config.entity_capacity =
                capacity
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENTITY_CAPACITY_ENV,
                        value: capacity.clone(),
                    })?;
        }

        tracing::debug!(?config, "runtime configuration loaded from environment");
        Ok(config)
    }

    /// Set the group dispatch strategy
    pub fn with_inspect_mode(mut self, mode: InspectMode) -> Self {
        self.inspect_mode = mode;
        self
    }

    /// Set the initial entity capacity
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting holds a value it cannot take
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Setting name
        key: &'static str,
        /// Rejected value
        value: String,
    },
}
