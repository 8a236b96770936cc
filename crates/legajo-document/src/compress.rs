// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF compression through Ghostscript's `pdfwrite` device.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use legajo_core::error::{LegajoError, Result};
use legajo_core::{AppConfig, CompressionResult, OperationOutcome, QualityProfile};
use tracing::{debug, info, instrument, warn};

use crate::engine::{self, EngineLocator};
use crate::pdf::writer::{commit_staged, staged_file};

/// Compresses PDFs with an external Ghostscript executable.
///
/// Every call returns a [`CompressionResult`]; no error escapes as `Err` or
/// panic. The engine writes to a temporary sibling of the output, which is
/// renamed onto the output only on success. A failure leaves whatever was at
/// the output path untouched.
#[derive(Debug, Clone)]
pub struct CompressionPipeline {
    locator: EngineLocator,
}

impl CompressionPipeline {
    pub fn new(locator: EngineLocator) -> Self {
        Self { locator }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(EngineLocator::ghostscript(config))
    }

    pub fn compress(&self, input: &Path, output: &Path, profile: QualityProfile) -> CompressionResult {
        self.compress_with_progress(input, output, profile, &|_| {})
    }

    /// Compress and report progress: 10 before the engine starts, 100 once
    /// it has produced the output.
    #[instrument(skip_all, fields(input = %input.display(), output = %output.display(), profile = %profile))]
    pub fn compress_with_progress(
        &self,
        input: &Path,
        output: &Path,
        profile: QualityProfile,
        progress: &dyn Fn(u8),
    ) -> CompressionResult {
        match self.try_compress_with_progress(input, output, profile, progress) {
            Ok(engine_output) => {
                let message = if engine_output.is_empty() {
                    format!("compressed with profile {profile}")
                } else {
                    format!("compressed with profile {profile}: {engine_output}")
                };
                info!("compression succeeded");
                OperationOutcome::succeeded(message, output)
            }
            Err(err) => {
                warn!(%err, error_kind = %err.kind(), "compression failed");
                OperationOutcome::failed(&err)
            }
        }
    }

    /// Same steps as [`Self::compress_with_progress`], keeping the error
    /// value. Returns the engine's captured output on success.
    pub fn try_compress_with_progress(
        &self,
        input: &Path,
        output: &Path,
        profile: QualityProfile,
        progress: &dyn Fn(u8),
    ) -> Result<String> {
        if !input.is_file() {
            return Err(LegajoError::source_unreadable(input, "file does not exist"));
        }
        if same_file(input, output) {
            return Err(LegajoError::destination_write(
                output,
                "output must differ from the input document",
            ));
        }

        let executable = self.locator.locate()?;
        let engine_name = self.locator.engine_name();
        let staged = staged_file(output)?;

        progress(10);
        debug!(
            executable = %executable.display(),
            staged = %staged.path().display(),
            "launching engine"
        );

        let result = engine::command(&executable)
            .args(engine_arguments(profile, input, staged.path()))
            .output();

        let process = match result {
            Ok(process) => process,
            Err(err) => {
                return Err(LegajoError::EngineExecution {
                    engine: engine_name.to_string(),
                    exit_code: None,
                    detail: format!("failed to launch {}: {err}", executable.display()),
                });
            }
        };

        let engine_output = engine::captured_text(&process);

        if !process.status.success() {
            return Err(LegajoError::EngineExecution {
                engine: engine_name.to_string(),
                exit_code: process.status.code(),
                detail: engine_output,
            });
        }

        if !wrote_output(staged.path()) {
            return Err(LegajoError::EngineExecution {
                engine: engine_name.to_string(),
                exit_code: process.status.code(),
                detail: "engine reported success but wrote no output".to_string(),
            });
        }

        commit_staged(staged, output)?;
        progress(100);
        Ok(engine_output)
    }
}

/// Ghostscript arguments, in the order the engine receives them.
pub fn engine_arguments(profile: QualityProfile, input: &Path, output: &Path) -> Vec<OsString> {
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output.as_os_str());

    vec![
        OsString::from("-sDEVICE=pdfwrite"),
        OsString::from("-dCompatibilityLevel=1.4"),
        OsString::from(format!("-dPDFSETTINGS=/{}", profile.engine_name())),
        OsString::from("-dNOPAUSE"),
        OsString::from("-dQUIET"),
        OsString::from("-dBATCH"),
        output_arg,
        input.as_os_str().to_os_string(),
    ]
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn wrote_output(staged: &Path) -> bool {
    std::fs::metadata(staged).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// Output path used when the caller only names the input:
/// `<dir>/<stem>_<profile>.pdf`.
pub fn default_output_path(input: &Path, profile: QualityProfile) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{stem}_{}.pdf", profile.engine_name()))
}
