//! Pagination engine
//!
//! Turns an ordered sequence of screenplay lines into fixed-height pages.
//! Lines are grouped into blocks (dialogue, paragraphs, heading plus first
//! content), blocks are measured through the injected [`TextMeasurer`], and
//! blocks that do not fit are split according to screenplay conventions:
//! headings never end a page, dialogue continues with `(MORE)` and
//! `NAME (CONT'D)`, dual dialogue splits both columns or neither.
//!
//! [`TextMeasurer`]: crate::layout::TextMeasurer

mod block;
mod diff;
mod element;
mod engine;
mod page;
mod split;

pub use block::{Block, BlockLayout};
pub use diff::PaginationDiff;
pub use element::{Column, Element};
pub use engine::Paginator;
pub use page::{BreakReason, Page, PageBreak};
pub use split::BlockSplit;

use crate::layout::ExportSettings;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("pagination was cancelled")]
    Cancelled,
}

/// Cooperative cancellation flag shared with a running pagination pass
///
/// The pass checks the flag once per line and stops early, discarding
/// partial output.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Result of a pagination pass
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pages: Vec<Page>,
    breaks: Vec<PageBreak>,
    /// Source line index to the first page showing it
    page_of_line: FxHashMap<usize, usize>,
    settings: ExportSettings,
}

impl Pagination {
    pub(crate) fn new(pages: Vec<Page>, breaks: Vec<PageBreak>, settings: ExportSettings) -> Self {
        let mut page_of_line = FxHashMap::default();
        for (index, page) in pages.iter().enumerate() {
            for source in page.sources() {
                page_of_line.entry(source).or_insert(index);
            }
        }
        Self {
            pages,
            breaks,
            page_of_line,
            settings,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn breaks(&self) -> &[PageBreak] {
        &self.breaks
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Page on which a line first appears; `None` for lines that never print
    pub fn page_for_line(&self, line_index: usize) -> Option<usize> {
        self.page_of_line.get(&line_index).copied()
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Latest page that can be rebuilt from scratch after lines from
    /// `edited` onwards changed
    ///
    /// Returns the page index and the line its opening group starts at. The
    /// page qualifies only if everything read to build that group lies
    /// before the edit, so the pages before it are unaffected.
    pub(crate) fn restart_point(&self, edited: usize) -> Option<(usize, usize)> {
        self.pages.iter().enumerate().rev().find_map(|(index, page)| {
            let start = page.restart_index()?;
            let scan_end = page.restart_scan_end()?;
            (scan_end <= edited).then_some((index, start))
        })
    }
}
