//! Response documents returned to callers
//!
//! Operation outcomes become a [`Response`]: a success flag, a request id for
//! log correlation, and either a result payload or an error message. This is
//! the only place errors are turned into strings.
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


use crate::error::{KeyError, KeyResult};
use crate::principal::{Keytab, PrincipalName};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error kind reported for failures outside the key management core
pub const UNEXPECTED_ERROR_KIND: &str = "unexpected";

/// Result payload, shaped per operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Exists { exists: bool },
    Keytab { keytab: Keytab },
    Principals { principals: Vec<PrincipalName> },
}

/// Top-level response document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResponsePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub request_id: Uuid,
}

impl Response {
    pub fn ok(request_id: Uuid, payload: ResponsePayload) -> Self {
        Self {
            success: true,
            result: Some(payload),
            error: None,
            error_kind: None,
            request_id,
        }
    }

    pub fn failure(request_id: Uuid, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
            error_kind: Some(kind.into()),
            request_id,
        }
    }

    pub fn from_error(request_id: Uuid, error: &KeyError) -> Self {
        Self::failure(request_id, error.kind(), error.to_string())
    }

    /// Failure outside the key management core (configuration, startup)
    pub fn unexpected(request_id: Uuid, error: &dyn std::fmt::Display) -> Self {
        Self::failure(
            request_id,
            UNEXPECTED_ERROR_KIND,
            format!("Unexpected error: {}", error),
        )
    }

    /// Process exit status matching the success flag
    pub fn exit_code(&self) -> u8 {
        if self.success {
            0
        } else {
            1
        }
    }

    pub fn to_json(&self) -> KeyResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Converts manager outcomes into responses
#[derive(Debug, Clone, Copy)]
pub struct ResultCodec {
    request_id: Uuid,
}

impl ResultCodec {
    /// Codec for a new request with a fresh id
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4())
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn exists(&self, outcome: KeyResult<bool>) -> Response {
        self.encode(outcome.map(|exists| ResponsePayload::Exists { exists }))
    }

    pub fn keytab(&self, outcome: KeyResult<Keytab>) -> Response {
        self.encode(outcome.map(|keytab| ResponsePayload::Keytab { keytab }))
    }

    pub fn principals(&self, outcome: KeyResult<Vec<PrincipalName>>) -> Response {
        self.encode(outcome.map(|principals| ResponsePayload::Principals { principals }))
    }

    fn encode(&self, outcome: KeyResult<ResponsePayload>) -> Response {
        match outcome {
            Ok(payload) => Response::ok(self.request_id, payload),
            Err(e) => Response::from_error(self.request_id, &e),
        }
    }
}

impl Default for ResultCodec {
    fn default() -> Self {
        Self::new()
    }
}
