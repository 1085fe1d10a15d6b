//! WASM bindings for the paginator

use crate::layout::{ExportSettings, FontMetrics, MonospaceMeasurer};
use crate::pagination::{CancellationToken, Pagination, PaginationDiff, Paginator};
use crate::render::page_views;
use crate::screenplay::Line;
use crate::style::Styles;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exposed paginator holding the current lines and their pages
#[wasm_bindgen]
pub struct WasmPaginator {
    paginator: Paginator,
    lines: Vec<Line>,
    pagination: Pagination,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Paginator with default settings (US Letter, Courier 12pt)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_paginator(Paginator::default())
    }

    /// Paginator with settings given as JSON, e.g. `{"paperSize":"a4"}`
    #[wasm_bindgen(js_name = withSettings)]
    pub fn with_settings(settings_json: &str) -> Result<WasmPaginator, JsValue> {
        let settings = ExportSettings::from_json(settings_json).map_err(js_error)?;
        Ok(Self::with_paginator(Paginator::new(settings)))
    }

    /// Replace the monospace font metrics
    #[wasm_bindgen(js_name = setFontMetrics)]
    pub fn set_font_metrics(&mut self, line_height: f32, char_width: f32) {
        let measurer = MonospaceMeasurer::new(FontMetrics::monospace(line_height, char_width));
        self.paginator = self.paginator.clone().with_measurer(Arc::new(measurer));
        self.repaginate();
    }

    /// Replace the stylesheet
    #[wasm_bindgen(js_name = setStylesheet)]
    pub fn set_stylesheet(&mut self, source: &str) -> Result<(), JsValue> {
        let styles = Styles::from_stylesheet(source).map_err(js_error)?;
        self.paginator = self.paginator.clone().with_styles(Arc::new(styles));
        self.repaginate();
        Ok(())
    }

    /// Replace all lines (JSON array of lines) and paginate from scratch
    #[wasm_bindgen(js_name = setLines)]
    pub fn set_lines(&mut self, lines_json: &str) -> Result<usize, JsValue> {
        self.lines = serde_json::from_str(lines_json).map_err(js_error)?;
        self.repaginate();
        Ok(self.pagination.page_count())
    }

    /// Replace lines after an edit starting at `from_index`
    ///
    /// Returns the indices of pages that need redrawing.
    #[wasm_bindgen(js_name = editLines)]
    pub fn edit_lines(&mut self, lines_json: &str, from_index: usize) -> Result<js_sys::Uint32Array, JsValue> {
        let lines: Vec<Line> = serde_json::from_str(lines_json).map_err(js_error)?;
        let pagination = self
            .paginator
            .paginate_from(&lines, from_index, &self.pagination, &CancellationToken::new())
            .map_err(js_error)?;

        let diff = PaginationDiff::between(&self.pagination, &pagination);
        let mut redraw: Vec<u32> = diff.changed_pages.iter().map(|&p| p as u32).collect();
        let common = self.pagination.page_count().min(pagination.page_count());
        redraw.extend((common..pagination.page_count()).map(|p| p as u32));

        self.lines = lines;
        self.pagination = pagination;
        Ok(js_sys::Uint32Array::from(redraw.as_slice()))
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.pagination.page_count()
    }

    /// Used content height of every page
    #[wasm_bindgen(js_name = pageHeights)]
    pub fn page_heights(&self) -> js_sys::Float32Array {
        let heights: Vec<f32> = self.pagination.pages().iter().map(|p| p.height()).collect();
        js_sys::Float32Array::from(heights.as_slice())
    }

    /// Page showing a line, or -1 if the line never prints
    #[wasm_bindgen(js_name = pageForLine)]
    pub fn page_for_line(&self, line_index: usize) -> i32 {
        self.pagination
            .page_for_line(line_index)
            .map_or(-1, |p| p as i32)
    }

    /// Positioned page content as JSON
    #[wasm_bindgen(js_name = getPagesJson)]
    pub fn get_pages_json(&self) -> Result<String, JsValue> {
        let views = page_views(&self.pagination, self.paginator.styles());
        serde_json::to_string(&views).map_err(js_error)
    }

    /// Page breaks with their reasons as JSON
    #[wasm_bindgen(js_name = getBreaksJson)]
    pub fn get_breaks_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.pagination.breaks()).map_err(js_error)
    }
}

impl WasmPaginator {
    fn with_paginator(paginator: Paginator) -> Self {
        let pagination = paginator.paginate(&[]);
        Self {
            paginator,
            lines: Vec::new(),
            pagination,
        }
    }

    fn repaginate(&mut self) {
        self.pagination = self.paginator.paginate(&self.lines);
    }
}

impl Default for WasmPaginator {
    fn default() -> Self {
        Self::new()
    }
}
