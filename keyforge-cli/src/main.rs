//! Keyforge CLI
//!
//! Runs one principal operation per invocation and prints exactly one JSON
//! response document on stdout. Logs go to stderr. The exit status is 0 when
//! the response reports success and 1 otherwise.
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


mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use keyforge_config::{AppConfig, LogFormat};
use keyforge_keys::{Response, ResultCodec};
use keyforge_logging::{init_console_logging, init_logging};
use std::process::ExitCode;
use tracing::{error, info_span, Instrument};

const SERVICE_NAME: &str = "keyforge";

/// Error kind reported when the command line cannot be parsed
const INVALID_ARGUMENTS_KIND: &str = "invalid_arguments";

#[tokio::main]
async fn main() -> ExitCode {
    let codec = ResultCodec::new();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            return emit(&Response::failure(
                codec.request_id(),
                INVALID_ARGUMENTS_KIND,
                e.to_string().trim_end(),
            ));
        }
    };

    let response = match run(cli, &codec).await {
        Ok(response) => response,
        Err(e) => {
            error!(request_id = %codec.request_id(), error = %e, "Unexpected failure");
            Response::unexpected(codec.request_id(), &e)
        }
    };

    emit(&response)
}

/// Print the response document and map it to an exit status
fn emit(response: &Response) -> ExitCode {
    match response.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!(error = %e, "Failed to encode response");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::from(response.exit_code())
}

async fn run(cli: Cli, codec: &ResultCodec) -> Result<Response> {
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e));
    let config = match config {
        Ok(config) => cli.apply(config),
        Err(e) => {
            init_console_logging(SERVICE_NAME, "warn");
            return Err(e);
        }
    };

    match config.log_format {
        LogFormat::Json => init_logging(SERVICE_NAME, config.log_level()),
        LogFormat::Console => init_console_logging(SERVICE_NAME, config.log_level()),
    }

    let span = info_span!(
        "request",
        request_id = %codec.request_id(),
        command = cli.command.name()
    );

    Ok(commands::execute(cli.command, &config, codec)
        .instrument(span)
        .await)
}
