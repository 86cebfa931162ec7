//! Configuration management for Keyforge
// Copyright 2025 Francisco F. Pinochet
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


use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Prefix shared by every environment variable Keyforge reads
pub const ENV_PREFIX: &str = "KEYFORGE";

/// Default on-disk location of the principal database
pub const DEFAULT_STORE_PATH: &str = "./principals";

/// Default enctype list, strongest first
pub const DEFAULT_ENCTYPES: &str = "aes256-cts-hmac-sha1-96,aes128-cts-hmac-sha1-96";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Which principal store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One JSON document per principal under `store_path`
    File,
    /// Process-local map, gone when the process exits
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::InvalidValue {
                field: "store_backend",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::File => f.write_str("file"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Console,
    Json,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub store_path: PathBuf,
    /// Comma separated enctype names; validated by the key crate
    pub enctypes: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from `.env` and `KEYFORGE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_sources(None)
    }

    /// Load configuration from an explicit variable map instead of the process
    /// environment. Keys carry the `KEYFORGE_` prefix, as they would in the
    /// environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_sources(Some(vars))
    }

    fn from_sources(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("store_backend", "file")?
            .set_default("store_path", DEFAULT_STORE_PATH)?
            .set_default("enctypes", DEFAULT_ENCTYPES)?
            .set_default("log_level", "info")?
            .set_default("log_format", "console")?
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(vars))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store_backend == StoreBackend::File && self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store_path",
                value: String::new(),
            });
        }
        if self.enctype_names().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "enctypes",
                value: self.enctypes.clone(),
            });
        }
        Ok(())
    }

    /// Override the store directory
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Override the store backend
    pub fn with_store_backend(mut self, backend: StoreBackend) -> Self {
        self.store_backend = backend;
        self
    }

    /// Override the enctype list
    pub fn with_enctypes(mut self, enctypes: impl Into<String>) -> Self {
        self.enctypes = enctypes.into();
        self
    }

    /// Get the store directory
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Individual enctype names, trimmed, empty entries dropped
    pub fn enctype_names(&self) -> Vec<&str> {
        self.enctypes
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        if self.log_level.is_empty() {
            "info"
        } else {
            &self.log_level
        }
    }
}
