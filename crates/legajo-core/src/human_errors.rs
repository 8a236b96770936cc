// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to a plain sentence with a suggestion the
// person in front of the screen can act on. The calling layer decides how to
// present it; the triggering control is re-enabled for every severity.

use serde::Serialize;

use crate::error::{ConversionCause, LegajoError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth trying again as-is (busy disk, engine hiccup).
    Transient,
    /// User must change something (pick other pages, another folder).
    ActionRequired,
    /// Retrying the same input will not help (damaged file).
    Permanent,
    /// Software must be installed before the feature works.
    InstallRequired,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct HumanError {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying unchanged could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `LegajoError` into a `HumanError`.
pub fn humanize_error(err: &LegajoError) -> HumanError {
    match err {
        LegajoError::SourceUnreadable { path, .. } => HumanError {
            message: "The file could not be opened.".into(),
            suggestion: format!(
                "Check that {} still exists and opens in a PDF viewer. The file may be damaged.",
                path.display()
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        LegajoError::DestinationWrite { path, .. } => HumanError {
            message: "The result could not be saved.".into(),
            suggestion: format!(
                "Choose another folder or file name than {}, and make sure the disk is not full.",
                path.display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LegajoError::InvalidPageIndex { index, page_count } => HumanError {
            message: format!("Page {} does not exist.", index + 1),
            suggestion: format!("This document has {page_count} pages. Select pages between 1 and {page_count}."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LegajoError::EmptyResult { .. } => HumanError {
            message: "All pages are selected for removal.".into(),
            suggestion: "Keep at least one page, or delete the file instead.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LegajoError::InvalidSelection(detail) => HumanError {
            message: "The page selection could not be understood.".into(),
            suggestion: format!("Use page numbers and ranges such as \"1, 3, 5-7\". ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LegajoError::InvalidTier(_) => HumanError {
            message: "Unknown compression level.".into(),
            suggestion: "Pick one of the three compression levels offered.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LegajoError::EngineNotFound { engine, .. } => HumanError {
            message: format!("{engine} is not installed."),
            suggestion: format!(
                "Install {engine} or set its location in the configuration file, then try again."
            ),
            retriable: false,
            severity: Severity::InstallRequired,
        },

        LegajoError::EngineExecution { engine, .. } => HumanError {
            message: format!("{engine} could not process this document."),
            suggestion: "Try a different compression level. If it keeps failing the PDF may be damaged or protected.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LegajoError::Conversion { cause, .. } => match cause {
            ConversionCause::OfficeUnavailable => HumanError {
                message: "No office suite is available for the conversion.".into(),
                suggestion: "Install LibreOffice (or Microsoft Word) and try again.".into(),
                retriable: false,
                severity: Severity::InstallRequired,
            },
            ConversionCause::UnsupportedInput => HumanError {
                message: "This file is not a Word document.".into(),
                suggestion: "Select a .docx or .doc file.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            ConversionCause::ExportFailed => HumanError {
                message: "The document could not be converted to PDF.".into(),
                suggestion: "Open it in your word processor to check it is not damaged or password protected, then try again.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        LegajoError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        LegajoError::Config(detail) => HumanError {
            message: "The configuration is invalid.".into(),
            suggestion: format!("Fix or remove the configuration file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LegajoError::Io(_) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: "Check that the disk has free space and that you have permission to use the folder.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LegajoError::Serialization(_) => HumanError {
            message: "Saved settings could not be read.".into(),
            suggestion: "The configuration file may be damaged. Remove it to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
