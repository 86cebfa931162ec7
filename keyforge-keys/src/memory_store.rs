//! In-memory principal store
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
use crate::principal::{PrincipalName, PrincipalRecord};
use crate::store::PrincipalStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Principal store kept in a map; state is lost when dropped
#[derive(Default)]
pub struct MemoryPrincipalStore {
    records: RwLock<HashMap<PrincipalName, PrincipalRecord>>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn exists(&self, principal: &PrincipalName) -> KeyResult<bool> {
        Ok(self.records.read().await.contains_key(principal))
    }

    async fn read(&self, principal: &PrincipalName) -> KeyResult<PrincipalRecord> {
        self.records
            .read()
            .await
            .get(principal)
            .cloned()
            .ok_or_else(|| KeyError::PrincipalNotFound(principal.clone()))
    }

    async fn write(&self, record: &PrincipalRecord) -> KeyResult<()> {
        let mut records = self.records.write().await;
        records.insert(record.principal.clone(), record.clone());
        debug!(principal = %record.principal, kvno = record.kvno, "Record written");
        Ok(())
    }

    async fn insert(&self, record: &PrincipalRecord) -> KeyResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.principal) {
            return Err(KeyError::PrincipalAlreadyExists(record.principal.clone()));
        }
        records.insert(record.principal.clone(), record.clone());
        debug!(principal = %record.principal, kvno = record.kvno, "Record inserted");
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        expected_kvno: u32,
        record: &PrincipalRecord,
    ) -> KeyResult<()> {
        let mut records = self.records.write().await;
        let current = records
            .get(&record.principal)
            .ok_or_else(|| KeyError::PrincipalNotFound(record.principal.clone()))?;

        if current.kvno != expected_kvno {
            return Err(KeyError::VersionConflict {
                principal: record.principal.clone(),
                expected: expected_kvno,
                found: current.kvno,
            });
        }

        records.insert(record.principal.clone(), record.clone());
        debug!(principal = %record.principal, kvno = record.kvno, "Record swapped");
        Ok(())
    }

    async fn list(&self) -> KeyResult<Vec<PrincipalName>> {
        let mut names: Vec<PrincipalName> = self.records.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
