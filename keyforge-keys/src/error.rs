//! Error types for principal and keytab management
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


use crate::principal::PrincipalName;
use thiserror::Error;

/// Principal management errors
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Principal already exists: {0}")]
    PrincipalAlreadyExists(PrincipalName),

    #[error("Principal not found: {0}")]
    PrincipalNotFound(PrincipalName),

    #[error("Corrupt record for {principal}: {reason}")]
    CorruptRecord {
        principal: PrincipalName,
        reason: String,
    },

    #[error("Concurrent modification of {principal}: expected kvno {expected}, found {found}")]
    VersionConflict {
        principal: PrincipalName,
        expected: u32,
        found: u32,
    },

    #[error("Key version number exhausted for {0}")]
    VersionExhausted(PrincipalName),

    #[error("Invalid principal name: {0:?}")]
    InvalidPrincipal(String),

    #[error("Unsupported enctype: {0}")]
    UnsupportedEnctype(String),

    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl KeyError {
    /// Stable machine-readable name for this error, used in responses
    pub fn kind(&self) -> &'static str {
        match self {
            KeyError::PrincipalAlreadyExists(_) => "principal_already_exists",
            KeyError::PrincipalNotFound(_) => "principal_not_found",
            KeyError::CorruptRecord { .. } => "corrupt_record",
            KeyError::VersionConflict { .. } => "version_conflict",
            KeyError::VersionExhausted(_) => "version_exhausted",
            KeyError::InvalidPrincipal(_) => "invalid_principal",
            KeyError::UnsupportedEnctype(_) => "unsupported_enctype",
            KeyError::KeyGeneration(_) => "key_generation",
            KeyError::Storage(_) => "storage",
            KeyError::Serialization(_) => "serialization",
            KeyError::Configuration(_) => "configuration",
        }
    }

    pub(crate) fn corrupt(principal: &PrincipalName, reason: impl Into<String>) -> Self {
        KeyError::CorruptRecord {
            principal: principal.clone(),
            reason: reason.into(),
        }
    }
}

/// Result type for principal operations
pub type KeyResult<T> = Result<T, KeyError>;
