// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word → PDF conversion through an office suite.
//
// The pipeline validates paths and names the output; the actual export is
// delegated to an `OfficeExporter`. The default exporter drives LibreOffice
// in headless mode with a throwaway user profile.

use std::path::{Path, PathBuf};

use legajo_core::error::{ConversionCause, LegajoError, Result};
use legajo_core::AppConfig;
use tracing::{debug, info, instrument, warn};

use crate::engine::{self, EngineLocator};
use crate::pdf::writer::persist_copy;

/// File extensions accepted as word-processor input (compared
/// case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["docx", "doc", "odt", "rtf"];

/// Something that can turn a word-processor document into a PDF.
pub trait OfficeExporter: Send + Sync {
    /// Name shown in logs.
    fn name(&self) -> &str;

    /// Export `input` to a PDF at `output`.
    ///
    /// Implementations report a missing office suite as
    /// `Conversion { cause: OfficeUnavailable }` and any other failure as
    /// `Conversion { cause: ExportFailed }`.
    fn export_pdf(&self, input: &Path, output: &Path) -> Result<()>;
}

// ---------------------------------------------------------------------------
// LibreOffice exporter
// ---------------------------------------------------------------------------

/// Exports through `soffice --headless --convert-to pdf`.
#[derive(Debug, Clone)]
pub struct SofficeExporter {
    locator: EngineLocator,
}

impl SofficeExporter {
    pub fn new(locator: EngineLocator) -> Self {
        Self { locator }
    }
}

impl OfficeExporter for SofficeExporter {
    fn name(&self) -> &str {
        self.locator.engine_name()
    }

    #[instrument(skip_all, fields(input = %input.display()))]
    fn export_pdf(&self, input: &Path, output: &Path) -> Result<()> {
        let executable = self.locator.locate().map_err(|err| {
            LegajoError::conversion(ConversionCause::OfficeUnavailable, err.to_string())
        })?;

        // Scratch space: the export directory plus a private user profile so a
        // running desktop instance does not swallow the request.
        let scratch = tempfile::tempdir().map_err(|err| {
            LegajoError::conversion(
                ConversionCause::ExportFailed,
                format!("cannot create scratch directory: {err}"),
            )
        })?;
        let out_dir = scratch.path().join("out");
        let profile_dir = scratch.path().join("profile");
        std::fs::create_dir_all(&out_dir).map_err(|err| {
            LegajoError::conversion(
                ConversionCause::ExportFailed,
                format!("cannot create export directory: {err}"),
            )
        })?;

        let mut user_installation = std::ffi::OsString::from("-env:UserInstallation=");
        user_installation.push(file_url(&profile_dir));

        debug!(executable = %executable.display(), "launching office suite");
        let process = engine::command(&executable)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(&out_dir)
            .arg(user_installation)
            .arg(input)
            .output()
            .map_err(|err| {
                LegajoError::conversion(
                    ConversionCause::OfficeUnavailable,
                    format!("failed to launch {}: {err}", executable.display()),
                )
            })?;

        let engine_output = engine::captured_text(&process);
        if !process.status.success() {
            return Err(LegajoError::conversion(
                ConversionCause::ExportFailed,
                format!(
                    "{} exited with {}: {engine_output}",
                    self.name(),
                    process.status
                ),
            ));
        }

        let produced = out_dir.join(exported_file_name(input));
        if !produced.is_file() {
            return Err(LegajoError::conversion(
                ConversionCause::ExportFailed,
                format!("{} produced no PDF. {engine_output}", self.name()).trim().to_string(),
            ));
        }

        persist_copy(&produced, output)?;
        debug!("export moved to destination");
        Ok(())
    }
}

/// `<stem>.pdf`, the name LibreOffice gives its export.
fn exported_file_name(input: &Path) -> PathBuf {
    let mut name = PathBuf::from(input.file_stem().unwrap_or_default());
    name.set_extension("pdf");
    name
}

/// `file://` URL for a local directory, as LibreOffice expects for
/// `UserInstallation`.
fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let absolute = if raw.starts_with('/') {
        raw
    } else {
        format!("/{raw}")
    };
    format!("file://{}", absolute.replace(' ', "%20"))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Converts word-processor documents to PDF.
pub struct ConversionPipeline {
    exporter: Box<dyn OfficeExporter>,
    suffix: String,
}

impl ConversionPipeline {
    pub fn new(exporter: Box<dyn OfficeExporter>) -> Self {
        Self {
            exporter,
            suffix: AppConfig::default().conversion_suffix,
        }
    }

    /// LibreOffice exporter and output suffix taken from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let exporter = SofficeExporter::new(EngineLocator::office(config));
        Self::new(Box::new(exporter)).with_suffix(config.conversion_suffix.clone())
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn convert_word_to_pdf(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        self.convert_with_progress(input, output, &|_| {})
    }

    /// Convert `input`, writing to `output` or to the derived default name.
    ///
    /// Progress: 10 once the input is validated, 100 when the PDF is in
    /// place.
    #[instrument(skip_all, fields(input = %input.display(), exporter = self.exporter.name()))]
    pub fn convert_with_progress(
        &self,
        input: &Path,
        output: Option<&Path>,
        progress: &dyn Fn(u8),
    ) -> Result<PathBuf> {
        if !input.is_file() {
            return Err(LegajoError::source_unreadable(input, "file does not exist"));
        }
        if !is_supported(input) {
            return Err(LegajoError::conversion(
                ConversionCause::UnsupportedInput,
                format!(
                    "{} is not a word-processor document (expected one of: {})",
                    input.display(),
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            ));
        }

        let output = match output {
            Some(path) => path.to_path_buf(),
            None => derive_output_path(input, &self.suffix),
        };

        progress(10);
        self.exporter
            .export_pdf(input, &output)
            .inspect_err(|err| warn!(%err, "export failed"))?;
        progress(100);

        info!(output = %output.display(), "document converted");
        Ok(output)
    }
}

/// `<input dir>/<input stem><suffix>.pdf`
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.pdf"))
}

fn is_supported(input: &Path) -> bool {
    input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}
