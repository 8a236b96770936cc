// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Legajo.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a Word → PDF conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionCause {
    /// No office suite could be found or launched.
    OfficeUnavailable,
    /// The input is not a word-processor document we know how to export.
    UnsupportedInput,
    /// The office suite ran but did not produce a PDF.
    ExportFailed,
}

/// Top-level error type for all Legajo operations.
#[derive(Debug, Error)]
pub enum LegajoError {
    // -- Input / output --
    #[error("cannot read source document {}: {detail}", .path.display())]
    SourceUnreadable { path: PathBuf, detail: String },

    #[error("cannot write destination {}: {detail}", .path.display())]
    DestinationWrite { path: PathBuf, detail: String },

    // -- Page selection --
    #[error("page index {index} out of range (document has {page_count} pages)")]
    InvalidPageIndex { index: usize, page_count: usize },

    #[error("removing the selected pages would leave an empty document (all {page_count} pages selected)")]
    EmptyResult { page_count: usize },

    #[error("invalid page selection: {0}")]
    InvalidSelection(String),

    // -- Compression --
    #[error("invalid compression tier {0} (expected 0, 1 or 2)")]
    InvalidTier(usize),

    #[error("{engine} executable not found (searched: {searched})")]
    EngineNotFound { engine: String, searched: String },

    #[error("{engine} failed{}: {detail}", exit_suffix(.exit_code))]
    EngineExecution {
        engine: String,
        exit_code: Option<i32>,
        detail: String,
    },

    // -- Conversion --
    #[error("document conversion failed: {detail}")]
    Conversion {
        cause: ConversionCause,
        detail: String,
    },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn exit_suffix(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" with exit code {code}"),
        None => String::new(),
    }
}

/// Flat, serialisable category of a [`LegajoError`], used in operation
/// reports and structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SourceUnreadable,
    DestinationWrite,
    InvalidPageIndex,
    EmptyResult,
    InvalidSelection,
    InvalidTier,
    EngineNotFound,
    EngineExecution,
    Conversion,
    Image,
    Config,
    Io,
    Serialization,
}

impl ErrorKind {
    /// Stable snake_case name, identical to the serialised form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceUnreadable => "source_unreadable",
            Self::DestinationWrite => "destination_write",
            Self::InvalidPageIndex => "invalid_page_index",
            Self::EmptyResult => "empty_result",
            Self::InvalidSelection => "invalid_selection",
            Self::InvalidTier => "invalid_tier",
            Self::EngineNotFound => "engine_not_found",
            Self::EngineExecution => "engine_execution",
            Self::Conversion => "conversion",
            Self::Image => "image",
            Self::Config => "config",
            Self::Io => "io",
            Self::Serialization => "serialization",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LegajoError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceUnreadable { .. } => ErrorKind::SourceUnreadable,
            Self::DestinationWrite { .. } => ErrorKind::DestinationWrite,
            Self::InvalidPageIndex { .. } => ErrorKind::InvalidPageIndex,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::InvalidSelection(_) => ErrorKind::InvalidSelection,
            Self::InvalidTier(_) => ErrorKind::InvalidTier,
            Self::EngineNotFound { .. } => ErrorKind::EngineNotFound,
            Self::EngineExecution { .. } => ErrorKind::EngineExecution,
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::ImageError(_) => ErrorKind::Image,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub fn source_unreadable(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    pub fn destination_write(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::DestinationWrite {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    pub fn conversion(cause: ConversionCause, detail: impl Into<String>) -> Self {
        Self::Conversion {
            cause,
            detail: detail.into(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LegajoError>;
