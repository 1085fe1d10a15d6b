//! Screenplay pager: pagination engine for parsed screenplays
//!
//! This crate turns a sequence of typed screenplay lines into fixed-height
//! pages following screenplay conventions:
//! - Headings and shots never end a page
//! - Dialogue split across pages is closed with `(MORE)` and reopened with
//!   `NAME (CONT'D)`
//! - Dual dialogue splits both columns or moves as a whole
//! - Live re-pagination after an edit reuses the unaffected pages
//!
//! Text measurement and element styles are injected, so the same engine
//! serves print export, on-screen previews and WASM hosts.

pub mod layout;
pub mod pagination;
pub mod render;
pub mod screenplay;
pub mod style;
pub mod wasm;
pub mod worker;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use layout::{ExportSettings, FontMetrics, MonospaceMeasurer, PaperSize, TextMeasurer};
pub use pagination::{
    BreakReason, CancellationToken, Page, PageBreak, Pagination, PaginationDiff, PaginationError,
    Paginator,
};
pub use render::{page_views, LineView, PageView};
pub use screenplay::{Line, LineType, Screenplay};
pub use style::{RenderStyle, Styles, StylesheetError};
pub use worker::{PaginationRequest, PaginationResult, PaginationWorker};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_screenplay_json() {
        let json = r#"[
            {"text": "INT. KITCHEN - NIGHT", "type": "heading", "position": 0},
            {"text": "", "type": "empty", "position": 21},
            {"text": "Mary pours coffee.", "type": "action", "position": 22},
            {"text": "", "type": "empty", "position": 41},
            {"text": "MARY", "type": "character", "position": 42},
            {"text": "(tired)", "type": "parenthetical", "position": 47},
            {"text": "Another long night.", "type": "dialogue", "position": 55}
        ]"#;
        let screenplay = Screenplay::from_json(json).unwrap();
        let pagination = Paginator::default().paginate(screenplay.lines());

        assert_eq!(pagination.page_count(), 1);
        assert_eq!(pagination.pages()[0].lines().count(), 5);
        assert_eq!(pagination.pages()[0].represented_range(), Some(0..74));
        assert_eq!(screenplay.index_at_position(50), 5);
    }
}
