// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subscriber setup. Library crates only emit `tracing` events; this is the one
// place that decides where they go.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber: human-readable stderr plus an append-only,
/// non-ANSI operational log at `log_path`.
///
/// Verbosity 0 honours `RUST_LOG` (default `info`); 1 forces `debug`, 2+
/// `trace`. If the log file cannot be opened only stderr is used and the
/// returned error says why.
pub fn init(verbosity: u8, log_path: &Path) -> std::io::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, file_error) = match open_log(log_path) {
        Ok(file) => (
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file))),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    // Ignore a second initialisation (integration harnesses may have one).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    match file_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
