//! Subcommand dispatch
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


use crate::cli::Command;
use keyforge_config::AppConfig;
use keyforge_keys::{
    init_manager, KeyResult, Keytab, PrincipalManager, PrincipalName, Response, ResultCodec,
};
use tracing::{debug, info, warn};

/// Run one subcommand and render its outcome
pub async fn execute(command: Command, config: &AppConfig, codec: &ResultCodec) -> Response {
    let manager = match init_manager(config).await {
        Ok(manager) => manager,
        Err(e) => {
            warn!(error = %e, "Failed to initialize principal manager");
            return Response::from_error(codec.request_id(), &e);
        }
    };

    let enctypes: Vec<&str> = manager.enctypes().iter().map(|e| e.name()).collect();
    debug!(
        backend = manager.store().backend_name(),
        enctypes = %enctypes.join(","),
        "Principal manager ready"
    );

    let response = match command {
        Command::Exists { principal } => codec.exists(exists(&manager, principal).await),
        Command::Create { principal } => codec.keytab(create(&manager, principal).await),
        Command::Extract { principal, rotate } => {
            codec.keytab(extract(&manager, principal, rotate).await)
        }
        Command::List => codec.principals(manager.list().await),
    };

    match &response.error {
        None => info!("Request succeeded"),
        Some(error) => warn!(error = %error, kind = ?response.error_kind, "Request failed"),
    }
    response
}

async fn exists(manager: &PrincipalManager, principal: String) -> KeyResult<bool> {
    manager.exists(&PrincipalName::new(principal)?).await
}

async fn create(manager: &PrincipalManager, principal: String) -> KeyResult<Keytab> {
    manager.create(&PrincipalName::new(principal)?).await
}

async fn extract(manager: &PrincipalManager, principal: String, rotate: bool) -> KeyResult<Keytab> {
    manager
        .extract_keytab(&PrincipalName::new(principal)?, rotate)
        .await
}
