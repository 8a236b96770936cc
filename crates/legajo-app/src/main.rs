// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Legajo — local document conversion and PDF maintenance
//
// Entry point. Resolves the data directory, loads configuration, initialises
// logging and runs the requested command.

mod cli;
mod logging;
mod services;

use std::process::ExitCode;

use clap::Parser;
use legajo_core::AppConfig;

use cli::Cli;
use services::data_dir::data_dir;
use services::operations::{Failure, Services, load_config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let data_dir = data_dir();

    let config = match load_config(cli.config.as_deref(), &data_dir) {
        Ok(config) => config,
        Err(err) => {
            Services::new(AppConfig::default(), cli.json).print_failure(&Failure::Rejected(err));
            return ExitCode::FAILURE;
        }
    };

    let log_path = data_dir.join(&config.log_file);
    if let Err(err) = logging::init(cli.verbose, &log_path) {
        tracing::warn!(path = %log_path.display(), %err, "operational log unavailable");
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %data_dir.display(),
        "Legajo starting"
    );

    let services = Services::new(config, cli.json);
    match services.run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            services.print_failure(&failure);
            ExitCode::FAILURE
        }
    }
}
