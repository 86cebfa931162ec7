//! Principal and keytab management for Keyforge
//!
//! Tracks named principals and their versioned key sets. A principal is
//! created once, read any number of times, and re-keyed by rotation, which
//! bumps its key version number (kvno) by exactly one and replaces every key.
//! Storage is pluggable through [`PrincipalStore`]; key bytes come from an
//! injectable [`KeyGenerator`].
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


pub mod codec;
pub mod enctype;
pub mod error;
pub mod file_store;
pub mod generator;
pub mod manager;
pub mod memory_store;
pub mod principal;
pub mod service_integration;
pub mod store;

pub use codec::{Response, ResponsePayload, ResultCodec};
pub use enctype::{EnctypeSet, EncryptionType};
pub use error::{KeyError, KeyResult};
pub use file_store::FilePrincipalStore;
pub use generator::{KeyGenerator, RandomKeyGenerator};
pub use manager::PrincipalManager;
pub use memory_store::MemoryPrincipalStore;
pub use principal::{KeyMaterial, Keytab, PrincipalName, PrincipalRecord};
pub use service_integration::*;
pub use store::PrincipalStore;
