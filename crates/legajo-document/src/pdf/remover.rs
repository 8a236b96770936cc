// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page removal — write a copy of a PDF without the selected pages.

use std::path::{Path, PathBuf};

use legajo_core::error::{LegajoError, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::copy::PageCopier;
use super::reader::PdfReader;
use super::selection::{PageSelection, PageSelectionPlan};
use super::writer::persist_document;

/// Share of the progress range spent copying pages; the rest is persistence.
const COPY_PROGRESS_SPAN: usize = 90;

/// What a successful removal produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalSummary {
    pub output_path: PathBuf,
    pub original_pages: usize,
    pub retained_pages: usize,
}

impl RemovalSummary {
    pub fn removed_pages(&self) -> usize {
        self.original_pages - self.retained_pages
    }
}

/// Remove `selection` from `input` and write the result to `output`.
pub fn remove_pages(input: &Path, output: &Path, selection: &PageSelection) -> Result<RemovalSummary> {
    remove_pages_with_progress(input, output, selection, &|_| {})
}

/// [`remove_pages`] with a progress callback receiving percentages.
///
/// The operation is all-or-nothing: on any error nothing is left at `output`
/// (a pre-existing file there is untouched). `output` may equal `input`; the
/// source is fully loaded before the replacement is renamed into place.
///
/// Progress: at most one value per copied page, scaled to 1..=90 and strictly
/// increasing, then 100 once the output is in place.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display(), selected = selection.len()))]
pub fn remove_pages_with_progress(
    input: &Path,
    output: &Path,
    selection: &PageSelection,
    progress: &dyn Fn(u8),
) -> Result<RemovalSummary> {
    let reader = PdfReader::open(input)?;
    let page_count = reader.page_count();

    let plan = PageSelectionPlan::compute(page_count, selection).inspect_err(|err| {
        warn!(%err, "page selection rejected");
    })?;

    if plan.is_empty() {
        warn!(page_count, "every page selected for removal");
        return Err(LegajoError::EmptyResult { page_count });
    }

    let page_ids = reader.page_ids();
    let retained: Vec<_> = plan.retained().iter().map(|index| page_ids[*index]).collect();

    let mut copier = PageCopier::new(reader.document(), &retained);
    let total = retained.len();
    let mut reported = 0u8;
    for (position, page_id) in retained.iter().enumerate() {
        copier.copy_page(*page_id).map_err(|err| {
            LegajoError::source_unreadable(input, format!("cannot copy page object {page_id:?}: {err}"))
        })?;
        let percent = ((position + 1) * COPY_PROGRESS_SPAN / total) as u8;
        if percent > reported {
            progress(percent);
            reported = percent;
        }
    }

    let mut document = copier.finish();
    drop(reader);

    persist_document(&mut document, output)?;
    progress(100);

    info!(
        original_pages = page_count,
        retained_pages = total,
        "pages removed"
    );

    Ok(RemovalSummary {
        output_path: output.to_path_buf(),
        original_pages: page_count,
        retained_pages: total,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use lopdf::Document;

    use super::*;
    use crate::test_support::write_sample_pdf;

    fn page_labels(path: &Path) -> Vec<String> {
        let doc = Document::load(path).unwrap();
        doc.get_pages()
            .into_values()
            .map(|id| {
                let content = doc.get_page_content(id).unwrap();
                let text = String::from_utf8_lossy(&content).into_owned();
                let start = text.find('(').unwrap() + 1;
                let end = text.find(')').unwrap();
                text[start..end].to_string()
            })
            .collect()
    }

    #[test]
    fn removes_selected_pages_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_pdf(&input, 5);

        let summary =
            remove_pages(&input, &output, &PageSelection::from_indices([1, 3])).unwrap();

        assert_eq!(summary.original_pages, 5);
        assert_eq!(summary.retained_pages, 3);
        assert_eq!(summary.removed_pages(), 2);
        assert_eq!(page_labels(&output), ["Page 1", "Page 3", "Page 5"]);
    }

    #[test]
    fn empty_selection_copies_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_pdf(&input, 3);

        remove_pages(&input, &output, &PageSelection::new()).unwrap();

        assert_eq!(page_labels(&output), ["Page 1", "Page 2", "Page 3"]);
    }

    #[test]
    fn inherited_media_box_survives() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_pdf(&input, 2);

        remove_pages(&input, &output, &PageSelection::from_indices([0])).unwrap();

        let doc = Document::load(&output).unwrap();
        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }

    #[test]
    fn removing_every_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_pdf(&input, 2);

        let result = remove_pages(&input, &output, &PageSelection::from_indices([0, 1]));

        assert!(matches!(result, Err(LegajoError::EmptyResult { page_count: 2 })));
        assert!(!output.exists());
    }

    #[test]
    fn out_of_range_index_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_pdf(&input, 3);

        let result = remove_pages(&input, &output, &PageSelection::from_indices([1, 7]));

        match result {
            Err(LegajoError::InvalidPageIndex { index, page_count }) => {
                assert_eq!(index, 7);
                assert_eq!(page_count, 3);
            }
            other => panic!("expected InvalidPageIndex, got {other:?}"),
        }
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_is_source_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = remove_pages(
            &dir.path().join("missing.pdf"),
            &dir.path().join("out.pdf"),
            &PageSelection::new(),
        );
        assert!(matches!(result, Err(LegajoError::SourceUnreadable { .. })));
    }

    #[test]
    fn unwritable_destination_is_destination_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("missing-dir").join("out.pdf");
        write_sample_pdf(&input, 2);

        let result = remove_pages(&input, &output, &PageSelection::from_indices([0]));

        assert!(matches!(result, Err(LegajoError::DestinationWrite { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn output_may_replace_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        write_sample_pdf(&path, 4);

        remove_pages(&path, &path, &PageSelection::from_indices([0])).unwrap();

        assert_eq!(page_labels(&path), ["Page 2", "Page 3", "Page 4"]);
    }

    #[test]
    fn progress_is_strictly_increasing_and_ends_at_100() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_pdf(&input, 6);

        let seen = RefCell::new(Vec::new());
        remove_pages_with_progress(
            &input,
            &output,
            &PageSelection::from_indices([2]),
            &|percent| seen.borrow_mut().push(percent),
        )
        .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 6);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]), "{seen:?}");
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn large_documents_report_each_percentage_once() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_pdf(&input, 150);

        let seen = RefCell::new(Vec::new());
        remove_pages_with_progress(
            &input,
            &output,
            &PageSelection::from_indices([0]),
            &|percent| seen.borrow_mut().push(percent),
        )
        .unwrap();

        let seen = seen.into_inner();
        let expected: Vec<u8> = (1..=90).chain([100]).collect();
        assert_eq!(seen, expected);
    }
}
