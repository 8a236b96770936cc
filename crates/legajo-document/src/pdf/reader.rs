// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open and inspect existing PDF documents using the `lopdf`
// crate.

use std::path::{Path, PathBuf};

use legajo_core::error::{LegajoError, Result};
use lopdf::{Document, ObjectId};
use tracing::{debug, info, instrument};

/// Reads existing PDF files.
///
/// Owns the parsed `lopdf::Document`; the handle is released when the reader
/// is dropped.
pub struct PdfReader {
    document: Document,
    /// Source path, if opened from a file (used in error messages).
    source_path: Option<PathBuf>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("opening PDF");

        if !path_ref.is_file() {
            return Err(LegajoError::source_unreadable(path_ref, "file does not exist"));
        }

        let document = Document::load(path_ref)
            .map_err(|err| LegajoError::source_unreadable(path_ref, err))?;

        debug!(pages = document.get_pages().len(), version = %document.version, "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.to_path_buf()),
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }

    /// PDF header version, e.g. `"1.7"`.
    pub fn version(&self) -> &str {
        &self.document.version
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}
