//! Command line arguments
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


use clap::{Parser, Subcommand};
use keyforge_config::{AppConfig, StoreBackend};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "keyforge")]
#[command(about = "Manage principals and their keytabs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding principal records (overrides KEYFORGE_STORE_PATH)
    #[arg(long, global = true)]
    pub store_path: Option<PathBuf>,

    /// Store backend: file or memory (overrides KEYFORGE_STORE_BACKEND)
    #[arg(long, global = true)]
    pub backend: Option<StoreBackend>,

    /// Comma separated enctypes for new keys (overrides KEYFORGE_ENCTYPES)
    #[arg(long, global = true)]
    pub enctypes: Option<String>,

    /// Default log level when RUST_LOG is unset (overrides KEYFORGE_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether a principal exists
    Exists { principal: String },

    /// Create a principal and print its first keytab
    Create { principal: String },

    /// Print a principal's keytab
    #[command(alias = "extract-keytab")]
    Extract {
        principal: String,

        /// Generate new keys and bump the kvno first
        #[arg(long)]
        rotate: bool,
    },

    /// List all principals
    List,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Exists { .. } => "exists",
            Command::Create { .. } => "create",
            Command::Extract { .. } => "extract",
            Command::List => "list",
        }
    }
}

impl Cli {
    /// Apply command line overrides on top of loaded configuration
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(path) = &self.store_path {
            config = config.with_store_path(path);
        }
        if let Some(backend) = self.backend {
            config = config.with_store_backend(backend);
        }
        if let Some(enctypes) = &self.enctypes {
            config = config.with_enctypes(enctypes.as_str());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config
    }
}
