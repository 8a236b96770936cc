// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that replaces the whole lookup.
pub const DATA_DIR_ENV: &str = "LEGAJO_DATA_DIR";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = resolve(|key| std::env::var_os(key));
    // Creation errors surface later, when the config or log is opened.
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Lookup order: `LEGAJO_DATA_DIR` as-is, then the platform location with a
/// `legajo` subdirectory, then the system temp directory.
fn resolve(env: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    if let Some(dir) = non_empty(env(DATA_DIR_ENV)) {
        return PathBuf::from(dir);
    }
    platform_base(&env)
        .unwrap_or_else(std::env::temp_dir)
        .join("legajo")
}

fn platform_base(env: &impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if cfg!(windows) {
        return non_empty(env("APPDATA")).map(PathBuf::from);
    }

    let home = non_empty(env("HOME")).map(PathBuf::from);

    if cfg!(target_os = "macos") {
        return home.map(|home| home.join("Library").join("Application Support"));
    }

    if let Some(xdg) = non_empty(env("XDG_DATA_HOME")) {
        return Some(PathBuf::from(xdg));
    }
    home.map(|home| home.join(".local").join("share"))
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|value| !value.is_empty())
}
