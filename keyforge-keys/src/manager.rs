//! Principal lifecycle operations
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


use crate::enctype::EnctypeSet;
use crate::error::{KeyError, KeyResult};
use crate::generator::KeyGenerator;
use crate::principal::{Keytab, PrincipalName, PrincipalRecord};
use crate::store::PrincipalStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Creates principals and hands out their keytabs.
///
/// Holds no principal state of its own: every call reads from and writes to
/// the store, so several managers may share one store.
pub struct PrincipalManager {
    store: Arc<dyn PrincipalStore>,
    generator: Arc<dyn KeyGenerator>,
    enctypes: EnctypeSet,
}

impl PrincipalManager {
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        generator: Arc<dyn KeyGenerator>,
        enctypes: EnctypeSet,
    ) -> Self {
        Self {
            store,
            generator,
            enctypes,
        }
    }

    pub fn enctypes(&self) -> &EnctypeSet {
        &self.enctypes
    }

    pub fn store(&self) -> &Arc<dyn PrincipalStore> {
        &self.store
    }

    /// Check if a principal exists
    pub async fn exists(&self, principal: &PrincipalName) -> KeyResult<bool> {
        self.store.exists(principal).await
    }

    /// Create a principal with a fresh key set at kvno 1
    pub async fn create(&self, principal: &PrincipalName) -> KeyResult<Keytab> {
        if self.store.exists(principal).await? {
            return Err(KeyError::PrincipalAlreadyExists(principal.clone()));
        }

        let keys = self.generator.generate(&self.enctypes)?;
        let record = PrincipalRecord::new(principal.clone(), keys);

        // A concurrent creator may have won since the existence check;
        // insert refuses to overwrite it.
        self.store.insert(&record).await?;

        info!(
            principal = %principal,
            kvno = record.kvno,
            backend = self.store.backend_name(),
            "Principal created"
        );
        Ok(Keytab::from(record))
    }

    /// Return the principal's keytab, rotating its keys first if `rotate`
    pub async fn extract_keytab(
        &self,
        principal: &PrincipalName,
        rotate: bool,
    ) -> KeyResult<Keytab> {
        let current = self.store.read(principal).await?;

        if !rotate {
            debug!(principal = %principal, kvno = current.kvno, "Keytab extracted");
            return Ok(Keytab::from(current));
        }

        let keys = self.generator.generate(&self.enctypes)?;
        let next = current.rotated(keys)?;

        if let Err(e) = self.store.compare_and_swap(current.kvno, &next).await {
            if matches!(e, KeyError::VersionConflict { .. }) {
                warn!(principal = %principal, error = %e, "Lost rotation race");
            }
            return Err(e);
        }

        info!(
            principal = %principal,
            kvno = next.kvno,
            backend = self.store.backend_name(),
            "Principal keys rotated"
        );
        Ok(Keytab::from(next))
    }

    /// List all principals
    pub async fn list(&self) -> KeyResult<Vec<PrincipalName>> {
        self.store.list().await
    }
}
