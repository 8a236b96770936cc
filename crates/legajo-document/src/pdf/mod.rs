// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading, page selection, structural copy, page removal and
// writing.

pub mod copy;
pub mod reader;
pub mod remover;
pub mod selection;
pub mod writer;

pub use reader::PdfReader;
pub use remover::{RemovalSummary, remove_pages, remove_pages_with_progress};
pub use selection::{PageSelection, PageSelectionPlan};
pub use writer::{image_to_pdf, persist_document};
