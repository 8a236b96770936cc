// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External engine discovery and process setup.
//
// Resolution order for an engine executable:
//   1. explicitly configured path (must exist, no fallback)
//   2. bundled resource directory (default `<executable dir>/resources`)
//   3. directories on `PATH`
//   4. well-known install locations

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use legajo_core::AppConfig;
use legajo_core::error::{LegajoError, Result};
use tracing::{debug, instrument};

/// How to find one external executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSpec {
    /// Human-facing name used in errors and logs.
    pub name: &'static str,
    /// File names tried in each directory, in order.
    pub candidates: Vec<&'static str>,
    /// Absolute paths tried last.
    pub well_known: Vec<PathBuf>,
}

impl EngineSpec {
    /// The Ghostscript command-line interpreter.
    pub fn ghostscript() -> Self {
        let candidates = if cfg!(windows) {
            vec!["gswin64c.exe", "gswin32c.exe"]
        } else {
            vec!["gs"]
        };

        let well_known = if cfg!(windows) {
            Vec::new()
        } else {
            vec![
                PathBuf::from("/usr/bin/gs"),
                PathBuf::from("/usr/local/bin/gs"),
                PathBuf::from("/opt/homebrew/bin/gs"),
            ]
        };

        Self {
            name: "Ghostscript",
            candidates,
            well_known,
        }
    }

    /// The LibreOffice headless converter.
    pub fn office() -> Self {
        let candidates = if cfg!(windows) {
            vec!["soffice.exe", "soffice.com"]
        } else {
            vec!["soffice", "libreoffice"]
        };

        let well_known = if cfg!(windows) {
            vec![
                PathBuf::from(r"C:\Program Files\LibreOffice\program\soffice.exe"),
                PathBuf::from(r"C:\Program Files (x86)\LibreOffice\program\soffice.exe"),
            ]
        } else if cfg!(target_os = "macos") {
            vec![PathBuf::from(
                "/Applications/LibreOffice.app/Contents/MacOS/soffice",
            )]
        } else {
            vec![
                PathBuf::from("/usr/bin/soffice"),
                PathBuf::from("/usr/lib/libreoffice/program/soffice"),
                PathBuf::from("/opt/libreoffice/program/soffice"),
            ]
        };

        Self {
            name: "LibreOffice",
            candidates,
            well_known,
        }
    }
}

/// Finds an engine executable following the documented resolution order.
#[derive(Debug, Clone)]
pub struct EngineLocator {
    spec: EngineSpec,
    configured: Option<PathBuf>,
    resource_dir: Option<PathBuf>,
    search_path: Option<OsString>,
    search_well_known: bool,
}

impl EngineLocator {
    pub fn new(spec: EngineSpec) -> Self {
        Self {
            spec,
            configured: None,
            resource_dir: default_resource_dir(),
            search_path: std::env::var_os("PATH"),
            search_well_known: true,
        }
    }

    /// Ghostscript locator honouring `ghostscript_path` and `resource_dir`.
    pub fn ghostscript(config: &AppConfig) -> Self {
        Self::from_config(EngineSpec::ghostscript(), config.ghostscript_path.clone(), config)
    }

    /// LibreOffice locator honouring `office_path` and `resource_dir`.
    pub fn office(config: &AppConfig) -> Self {
        Self::from_config(EngineSpec::office(), config.office_path.clone(), config)
    }

    fn from_config(spec: EngineSpec, configured: Option<PathBuf>, config: &AppConfig) -> Self {
        let mut locator = Self::new(spec);
        locator.configured = configured;
        if let Some(dir) = &config.resource_dir {
            locator.resource_dir = Some(dir.clone());
        }
        locator
    }

    // -- Builders -------------------------------------------------------------

    pub fn with_configured(mut self, path: impl Into<PathBuf>) -> Self {
        self.configured = Some(path.into());
        self
    }

    pub fn with_resource_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.resource_dir = dir;
        self
    }

    /// Replace the `PATH` value searched (tests use an isolated one).
    pub fn with_search_path(mut self, path: Option<OsString>) -> Self {
        self.search_path = path;
        self
    }

    pub fn with_well_known(mut self, enabled: bool) -> Self {
        self.search_well_known = enabled;
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.spec.name
    }

    // -- Resolution -----------------------------------------------------------

    /// Resolve the executable, or `EngineNotFound` listing what was tried.
    #[instrument(skip(self), fields(engine = self.spec.name))]
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(path) = &self.configured {
            if path.is_file() {
                debug!(path = %path.display(), "using configured engine");
                return Ok(path.clone());
            }
            return Err(LegajoError::EngineNotFound {
                engine: self.spec.name.to_string(),
                searched: format!("configured path {}", path.display()),
            });
        }

        let mut searched: Vec<String> = Vec::new();

        if let Some(dir) = &self.resource_dir {
            if let Some(found) = self.find_in(dir) {
                debug!(path = %found.display(), "using bundled engine");
                return Ok(found);
            }
            searched.push(dir.display().to_string());
        }

        if let Some(path_var) = &self.search_path {
            for dir in std::env::split_paths(path_var) {
                if let Some(found) = self.find_in(&dir) {
                    debug!(path = %found.display(), "engine found on PATH");
                    return Ok(found);
                }
            }
            searched.push("PATH".to_string());
        }

        if self.search_well_known {
            for path in &self.spec.well_known {
                if path.is_file() {
                    debug!(path = %path.display(), "engine found in well-known location");
                    return Ok(path.clone());
                }
                searched.push(path.display().to_string());
            }
        }

        Err(LegajoError::EngineNotFound {
            engine: self.spec.name.to_string(),
            searched: if searched.is_empty() {
                "nowhere".to_string()
            } else {
                searched.join(", ")
            },
        })
    }

    fn find_in(&self, dir: &Path) -> Option<PathBuf> {
        self.spec
            .candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

/// `<directory of the running executable>/resources`, if that can be known.
pub fn default_resource_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("resources"))
}

/// A `Command` for `program` with stdin closed and output captured.
///
/// On Windows the child gets no console window.
pub fn command(program: &Path) -> Command {
    let mut command = Command::new(program);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    command
}

/// Trimmed stdout followed by trimmed stderr, whichever are non-empty.
pub(crate) fn captured_text(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    [stdout.trim(), stderr.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
