// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LegajoError, Result};
use crate::QualityProfile;

/// File name looked up inside the data directory when no explicit
/// configuration path is given.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application settings.
///
/// Every field has a default, so a partial JSON file only overrides what it
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Explicit Ghostscript executable. When set it must exist; no fallback
    /// search is performed.
    pub ghostscript_path: Option<PathBuf>,
    /// Explicit office suite executable (LibreOffice `soffice`).
    pub office_path: Option<PathBuf>,
    /// Directory holding bundled engine executables. Defaults to
    /// `<executable dir>/resources`.
    pub resource_dir: Option<PathBuf>,
    /// Profile used when the caller does not choose one.
    pub default_quality: QualityProfile,
    /// Appended to the input stem to derive a conversion output name.
    pub conversion_suffix: String,
    /// Shred the source document after a successful page removal.
    pub secure_delete_sources: bool,
    /// Operational log file name inside the data directory.
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ghostscript_path: None,
            office_path: None,
            resource_dir: None,
            default_quality: QualityProfile::Ebook,
            conversion_suffix: "_convertido".to_string(),
            secure_delete_sources: false,
            log_file: "legajo.log".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            LegajoError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Load `<dir>/config.json` if present, defaults otherwise.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.log_file.trim().is_empty() {
            return Err(LegajoError::Config("log_file cannot be empty".into()));
        }
        if self.conversion_suffix.contains(['/', '\\']) {
            return Err(LegajoError::Config(format!(
                "conversion_suffix must not contain path separators: '{}'",
                self.conversion_suffix
            )));
        }
        Ok(())
    }
}
