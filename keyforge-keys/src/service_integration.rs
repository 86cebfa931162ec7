//! Helpers for wiring a principal manager from application configuration
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
use crate::error::KeyResult;
use crate::file_store::FilePrincipalStore;
use crate::generator::RandomKeyGenerator;
use crate::manager::PrincipalManager;
use crate::memory_store::MemoryPrincipalStore;
use crate::store::PrincipalStore;
use keyforge_config::{AppConfig, StoreBackend};
use std::sync::Arc;
use tracing::info;

/// Open the store selected by the configuration
pub async fn init_store(config: &AppConfig) -> KeyResult<Arc<dyn PrincipalStore>> {
    let store: Arc<dyn PrincipalStore> = match config.store_backend {
        StoreBackend::File => Arc::new(FilePrincipalStore::new(config.store_path()).await?),
        StoreBackend::Memory => Arc::new(MemoryPrincipalStore::new()),
    };
    Ok(store)
}

/// Initialize a principal manager with the reference key generator
pub async fn init_manager(config: &AppConfig) -> KeyResult<PrincipalManager> {
    // Reject unknown enctypes before touching storage
    let enctypes = EnctypeSet::parse(&config.enctype_names())?;
    let store = init_store(config).await?;

    info!(
        backend = store.backend_name(),
        path = %config.store_path().display(),
        enctypes = ?enctypes.as_slice(),
        "Initialized principal manager"
    );

    Ok(PrincipalManager::new(
        store,
        Arc::new(RandomKeyGenerator::new()),
        enctypes,
    ))
}
