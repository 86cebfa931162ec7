//! Principal store interface
//!
//! A store is the only owner of durable principal state. Implementations:
//! - In-memory map ([`crate::memory_store::MemoryPrincipalStore`])
//! - One file per principal ([`crate::file_store::FilePrincipalStore`])
//!
//! Every write is all-or-nothing: a reader sees the previous record or the
//! new one, never a mix.
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


use crate::error::KeyResult;
use crate::principal::{PrincipalName, PrincipalRecord};
use async_trait::async_trait;

/// Trait for principal store backends
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Check whether a record has been written for this principal
    async fn exists(&self, principal: &PrincipalName) -> KeyResult<bool>;

    /// Read the current record
    ///
    /// Fails with `PrincipalNotFound` if absent and `CorruptRecord` if the
    /// stored form does not decode into a valid record.
    async fn read(&self, principal: &PrincipalName) -> KeyResult<PrincipalRecord>;

    /// Persist a record, replacing any previous one
    async fn write(&self, record: &PrincipalRecord) -> KeyResult<()>;

    /// Persist a record only if none exists yet, else `PrincipalAlreadyExists`
    async fn insert(&self, record: &PrincipalRecord) -> KeyResult<()>;

    /// Persist a record only if the stored kvno is still `expected_kvno`,
    /// else `VersionConflict`
    async fn compare_and_swap(
        &self,
        expected_kvno: u32,
        record: &PrincipalRecord,
    ) -> KeyResult<()>;

    /// All stored principals, sorted
    async fn list(&self) -> KeyResult<Vec<PrincipalName>>;

    /// Backend name for logging
    fn backend_name(&self) -> &str;
}
