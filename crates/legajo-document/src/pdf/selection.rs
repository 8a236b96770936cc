// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page selection — which pages to drop, and the ordered list of pages that
// survive.

use std::collections::BTreeSet;

use legajo_core::PageIndex;
use legajo_core::error::{LegajoError, Result};

/// Set of zero-based page indices marked for removal.
///
/// Duplicates collapse; iteration is always ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    to_remove: BTreeSet<PageIndex>,
}

impl PageSelection {
    /// An empty selection (removes nothing).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_indices(indices: impl IntoIterator<Item = PageIndex>) -> Self {
        Self {
            to_remove: indices.into_iter().collect(),
        }
    }

    /// Parse a 1-based page expression such as `"1, 3, 5-7"` into zero-based
    /// indices.
    ///
    /// Accepted forms: single pages (`"5"`), inclusive ranges (`"5-10"`) and
    /// comma-separated mixtures of both. Empty parts between commas are
    /// ignored; an expression with no page at all is an error.
    pub fn parse_one_based(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(LegajoError::InvalidSelection(
                "page list cannot be empty".into(),
            ));
        }

        let mut to_remove = BTreeSet::new();

        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((start_str, end_str)) = part.split_once('-') {
                let start = parse_page_number(start_str)?;
                let end = parse_page_number(end_str)?;
                if start > end {
                    return Err(LegajoError::InvalidSelection(format!(
                        "range start ({start}) is after range end ({end})"
                    )));
                }
                to_remove.extend((start..=end).map(|page| page - 1));
            } else {
                to_remove.insert(parse_page_number(part)? - 1);
            }
        }

        if to_remove.is_empty() {
            return Err(LegajoError::InvalidSelection(format!(
                "'{trimmed}' does not name any page"
            )));
        }

        Ok(Self { to_remove })
    }

    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_remove.len()
    }

    pub fn contains(&self, index: PageIndex) -> bool {
        self.to_remove.contains(&index)
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.to_remove.iter().copied()
    }
}

impl FromIterator<PageIndex> for PageSelection {
    fn from_iter<I: IntoIterator<Item = PageIndex>>(iter: I) -> Self {
        Self::from_indices(iter)
    }
}

/// Parse one 1-based page number; zero is rejected.
fn parse_page_number(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    let page: usize = raw
        .parse()
        .map_err(|_| LegajoError::InvalidSelection(format!("invalid page number: '{raw}'")))?;
    if page == 0 {
        return Err(LegajoError::InvalidSelection(
            "page numbers start at 1".into(),
        ));
    }
    Ok(page)
}

/// The pages that remain after applying a [`PageSelection`] to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelectionPlan {
    page_count: usize,
    retained: Vec<PageIndex>,
}

impl PageSelectionPlan {
    /// Validate `selection` against `page_count` and list the survivors.
    ///
    /// Every index must be below `page_count`; the smallest offender is
    /// reported. Retained pages keep their original relative order. Selecting
    /// every page yields an empty plan, which is valid here; the removal
    /// pipeline decides whether an empty result may be written.
    pub fn compute(page_count: usize, selection: &PageSelection) -> Result<Self> {
        if let Some(index) = selection.iter().find(|index| *index >= page_count) {
            return Err(LegajoError::InvalidPageIndex { index, page_count });
        }

        let retained = (0..page_count)
            .filter(|index| !selection.contains(*index))
            .collect();

        Ok(Self {
            page_count,
            retained,
        })
    }

    /// Page count of the source document.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Surviving indices, ascending.
    pub fn retained(&self) -> &[PageIndex] {
        &self.retained
    }

    pub fn removed_count(&self) -> usize {
        self.page_count - self.retained.len()
    }

    /// True when no page survives.
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_keeps_everything() {
        let plan = PageSelectionPlan::compute(4, &PageSelection::new()).unwrap();
        assert_eq!(plan.retained(), &[0, 1, 2, 3]);
        assert_eq!(plan.removed_count(), 0);
    }

    #[test]
    fn single_removal_shifts_later_pages() {
        let plan = PageSelectionPlan::compute(5, &PageSelection::from_indices([2])).unwrap();
        assert_eq!(plan.retained(), &[0, 1, 3, 4]);
    }

    #[test]
    fn unordered_duplicate_indices_collapse() {
        let selection: PageSelection = [4, 0, 4, 2].into_iter().collect();
        assert_eq!(selection.len(), 3);
        let plan = PageSelectionPlan::compute(6, &selection).unwrap();
        assert_eq!(plan.retained(), &[1, 3, 5]);
    }

    #[test]
    fn selecting_every_page_gives_empty_plan() {
        let plan = PageSelectionPlan::compute(3, &PageSelection::from_indices(0..3)).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.removed_count(), 3);
    }

    #[test]
    fn out_of_range_reports_smallest_offender() {
        let err = PageSelectionPlan::compute(3, &PageSelection::from_indices([9, 1, 3])).unwrap_err();
        match err {
            LegajoError::InvalidPageIndex { index, page_count } => {
                assert_eq!(index, 3);
                assert_eq!(page_count, 3);
            }
            other => panic!("expected InvalidPageIndex, got {other}"),
        }
    }

    #[test]
    fn zero_page_document() {
        let plan = PageSelectionPlan::compute(0, &PageSelection::new()).unwrap();
        assert!(plan.is_empty());
        assert!(PageSelectionPlan::compute(0, &PageSelection::from_indices([0])).is_err());
    }

    #[test]
    fn parse_single_and_ranges() {
        let selection = PageSelection::parse_one_based("1, 3, 5-7").unwrap();
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![0, 2, 4, 5, 6]);
    }

    #[test]
    fn parse_ignores_empty_parts() {
        let selection = PageSelection::parse_one_based(" 2,, 4 ,").unwrap();
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", "   ", ",", "abc", "0", "3-1", "2-x", "1-0"] {
            assert!(
                matches!(
                    PageSelection::parse_one_based(bad),
                    Err(LegajoError::InvalidSelection(_))
                ),
                "'{bad}' should be rejected"
            );
        }
    }
}
