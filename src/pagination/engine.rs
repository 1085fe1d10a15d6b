//! The pagination pass: grouping lines into blocks and placing them on pages

use crate::layout::{ExportSettings, MonospaceMeasurer, TextMeasurer, LAYOUT_EPSILON};
use crate::pagination::block::Block;
use crate::pagination::element::{Column, Element, Layouter};
use crate::pagination::page::{BreakReason, Page, PageBreak};
use crate::pagination::split::BlockSplit;
use crate::pagination::{CancellationToken, Pagination, PaginationError};
use crate::screenplay::{Line, LineType};
use crate::style::Styles;
use rustc_hash::FxHashSet;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Paginates screenplay lines with a fixed set of settings, styles and
/// text measurer
#[derive(Clone)]
pub struct Paginator {
    settings: ExportSettings,
    styles: Arc<Styles>,
    measurer: Option<Arc<dyn TextMeasurer>>,
}

impl fmt::Debug for Paginator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("settings", &self.settings)
            .field("has_measurer", &self.measurer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}

impl Paginator {
    /// Paginator with the bundled stylesheet and the Courier measurer
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            styles: Arc::new(Styles::default()),
            measurer: Some(Arc::new(MonospaceMeasurer::default())),
        }
    }

    pub fn with_styles(mut self, styles: Arc<Styles>) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = Some(measurer);
        self
    }

    /// Drop the measurer; every element then has zero height
    pub fn without_measurer(mut self) -> Self {
        self.measurer = None;
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn styles(&self) -> &Arc<Styles> {
        &self.styles
    }

    /// Paginate all lines from the start
    pub fn paginate(&self, lines: &[Line]) -> Pagination {
        let mut pass = self.pass(lines);
        pass.run(0, None);
        pass.finish()
    }

    /// Full pass that stops when `cancel` is triggered
    pub fn paginate_cancellable(
        &self,
        lines: &[Line],
        cancel: &CancellationToken,
    ) -> Result<Pagination, PaginationError> {
        let mut pass = self.pass(lines);
        if !pass.run(0, Some(cancel)) {
            return Err(PaginationError::Cancelled);
        }
        Ok(pass.finish())
    }

    /// Live pagination after an edit
    ///
    /// `from_index` is the first line that differs from the input `previous`
    /// was built from. Pages untouched by the edit are reused and the rest is
    /// paginated again; the result equals a full pass over `lines`.
    /// `previous` must come from a paginator with the same styles and
    /// measurer.
    pub fn paginate_from(
        &self,
        lines: &[Line],
        from_index: usize,
        previous: &Pagination,
        cancel: &CancellationToken,
    ) -> Result<Pagination, PaginationError> {
        if from_index == 0 || previous.settings() != &self.settings {
            return self.paginate_cancellable(lines, cancel);
        }
        let Some((page_index, start)) = previous.restart_point(from_index) else {
            return self.paginate_cancellable(lines, cancel);
        };
        if start >= lines.len() {
            return self.paginate_cancellable(lines, cancel);
        }

        tracing::debug!(from_index, page_index, start, "resuming pagination");
        let mut pass = self.pass(lines);
        pass.pages = previous.pages()[..page_index].to_vec();
        pass.breaks = previous
            .breaks()
            .iter()
            .filter(|b| b.page_index < page_index)
            .cloned()
            .collect();

        if !pass.run(start, Some(cancel)) {
            return Err(PaginationError::Cancelled);
        }
        Ok(pass.finish())
    }

    fn pass<'a>(&'a self, lines: &'a [Line]) -> PaginationPass<'a> {
        if self.measurer.is_none() {
            tracing::warn!("paginating without a text measurer, all elements have zero height");
        }
        let layouter = Layouter::new(&self.settings, &self.styles, self.measurer.as_deref());
        PaginationPass::new(lines, layouter)
    }
}

/// State of one run over the lines
struct PaginationPass<'a> {
    lines: &'a [Line],
    layouter: Layouter<'a>,
    pages: Vec<Page>,
    breaks: Vec<PageBreak>,
    current: Page,
    /// Lines already consumed by the group being placed
    queue: FxHashSet<usize>,
    /// One past the furthest line inspected for the current group
    scanned: usize,
    max_height: f32,
    print_notes: bool,
}

impl<'a> PaginationPass<'a> {
    fn new(lines: &'a [Line], layouter: Layouter<'a>) -> Self {
        let max_height = layouter.settings.content_height();
        let print_notes = layouter.settings.print_notes;
        Self {
            lines,
            layouter,
            pages: Vec::new(),
            breaks: Vec::new(),
            current: Page::new(max_height),
            queue: FxHashSet::default(),
            scanned: 0,
            max_height,
            print_notes,
        }
    }

    /// Place lines from `start`; false if cancelled
    fn run(&mut self, start: usize, cancel: Option<&CancellationToken>) -> bool {
        let lines = self.lines;
        for (i, line) in lines.iter().enumerate().skip(start) {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return false;
            }
            if !line.is_visible(self.print_notes) || self.queue.contains(&i) {
                continue;
            }
            self.queue.clear();
            self.scanned = i + 1;

            if line.kind == LineType::PageBreak {
                let element = self.layouter.element(line.clone(), Some(i), Column::Full);
                self.current
                    .push_group(vec![Block::new(vec![element])], Some(i..i + 1));
                self.close_page(BreakReason::Forced, Some(i));
                continue;
            }

            let indices = self.blocks_for(i);
            self.queue.extend(indices.iter().flatten().copied());
            let group: Vec<Block> = indices.iter().map(|block| self.make_block(block)).collect();
            self.place_group(group, i..self.scanned);
        }
        true
    }

    fn finish(mut self) -> Pagination {
        if !self.current.is_empty() || self.pages.is_empty() {
            let last = std::mem::replace(&mut self.current, Page::new(self.max_height));
            self.pages.push(last);
        }
        tracing::debug!(
            pages = self.pages.len(),
            breaks = self.breaks.len(),
            "pagination finished"
        );
        Pagination::new(self.pages, self.breaks, self.layouter.settings.clone())
    }

    fn close_page(&mut self, reason: BreakReason, line: Option<usize>) {
        let page = std::mem::replace(&mut self.current, Page::new(self.max_height));
        self.breaks.push(PageBreak {
            page_index: self.pages.len(),
            y: page.height(),
            line,
            reason,
        });
        self.pages.push(page);
    }

    fn place_group(&mut self, mut group: Vec<Block>, scan: Range<usize>) {
        let mut restart = Some(scan);

        loop {
            let height = self.current.group_height(&group);
            let remaining = self.current.remaining_space();
            if height <= remaining + LAYOUT_EPSILON {
                self.current.push_group(group, restart);
                return;
            }

            let first_line = group.iter().find_map(Block::first_source);
            if !self.current.is_empty() && remaining < self.layouter.line_height() {
                self.close_page(BreakReason::Overflow, first_line);
                continue;
            }

            let at_top = self.current.is_empty();
            let split = match group.as_slice() {
                [block] => self.layouter.split_block(block, remaining, at_top),
                blocks => self.layouter.split_group(blocks, remaining, at_top),
            };

            match split {
                BlockSplit::Fits => {
                    self.current.push_group(group, restart);
                    return;
                }
                BlockSplit::SplitAt {
                    this_page,
                    next_page,
                    reason,
                } => {
                    let next_line = next_page.iter().find_map(Block::first_source);
                    self.current.push_group(this_page, restart.take());
                    self.close_page(reason, next_line);
                    if next_page.is_empty() {
                        return;
                    }
                    group = next_page;
                }
                BlockSplit::Defer if at_top => {
                    tracing::warn!(
                        line = ?first_line,
                        height,
                        max_height = self.max_height,
                        "block taller than a page, placing it anyway"
                    );
                    self.current.push_group(group, restart);
                    self.close_page(BreakReason::Oversized, None);
                    return;
                }
                BlockSplit::Defer => self.close_page(BreakReason::Deferred, first_line),
            }
        }
    }

    /// Read a line, recording how far ahead the current group looked
    fn line(&mut self, index: usize) -> &'a Line {
        self.scanned = self.scanned.max(index + 1);
        let lines = self.lines;
        &lines[index]
    }

    fn next_visible(&mut self, from: usize) -> Option<usize> {
        let print_notes = self.print_notes;
        (from..self.lines.len()).find(|&j| self.line(j).is_visible(print_notes))
    }

    /// Line indices of the blocks that must be placed together with line `i`
    ///
    /// Headings and shots pull in the block that follows them, unless a
    /// page break comes first.
    fn blocks_for(&mut self, i: usize) -> Vec<Vec<usize>> {
        let mut group = vec![self.block_for(i)];
        loop {
            let last = match group.last() {
                Some(block) if block.len() == 1 => block[0],
                _ => break,
            };
            if !self.lines[last].kind.keeps_with_next() {
                break;
            }
            match self.next_visible(last + 1) {
                Some(next) if self.lines[next].kind != LineType::PageBreak => {
                    group.push(self.block_for(next));
                }
                _ => break,
            }
        }
        group
    }

    fn block_for(&mut self, i: usize) -> Vec<usize> {
        let kind = self.lines[i].kind;
        if kind.is_character() {
            self.dialogue_block(i)
        } else if matches!(kind, LineType::Action | LineType::Lyrics | LineType::Centered) {
            self.paragraph_block(i)
        } else {
            vec![i]
        }
    }

    /// Consecutive lines of the same paragraph type
    fn paragraph_block(&mut self, i: usize) -> Vec<usize> {
        let kind = self.lines[i].kind;
        let mut indices = vec![i];
        for j in i + 1..self.lines.len() {
            let line = self.line(j);
            if !line.is_visible(self.print_notes) || line.kind != kind || line.begins_new_visual_block {
                break;
            }
            indices.push(j);
        }
        indices
    }

    /// A character cue and everything spoken under it, including the right
    /// column of dual dialogue
    fn dialogue_block(&mut self, i: usize) -> Vec<usize> {
        let mut indices = vec![i];
        let mut left_column = !self.lines[i].kind.is_dual();

        for j in i + 1..self.lines.len() {
            let line = self.line(j);
            if line.kind == LineType::Empty || line.text.trim().is_empty() {
                let partner_follows = left_column
                    && self
                        .next_visible(j + 1)
                        .is_some_and(|n| self.lines[n].kind == LineType::DualDialogueCharacter);
                if partner_follows {
                    continue;
                }
                break;
            }
            if !line.is_visible(self.print_notes) {
                continue;
            }

            let absorbed = if left_column {
                match line.kind {
                    LineType::DualDialogueCharacter => {
                        left_column = false;
                        true
                    }
                    LineType::Dialogue | LineType::Parenthetical | LineType::More => true,
                    _ => false,
                }
            } else {
                matches!(
                    line.kind,
                    LineType::DualDialogueParenthetical
                        | LineType::DualDialogue
                        | LineType::DualDialogueMore
                )
            };
            if !absorbed {
                break;
            }
            indices.push(j);
        }
        indices
    }

    fn make_block(&self, indices: &[usize]) -> Block {
        let element = |i: usize, column: Column| {
            self.layouter.element(self.lines[i].clone(), Some(i), column)
        };
        let right_start = indices
            .iter()
            .skip(1)
            .position(|&i| self.lines[i].kind == LineType::DualDialogueCharacter)
            .map(|p| p + 1);

        match right_start {
            Some(split) => {
                let (left, right) = indices.split_at(split);
                Block::dual(
                    left.iter().map(|&i| element(i, Column::Left)).collect(),
                    right.iter().map(|&i| element(i, Column::Right)).collect(),
                )
            }
            None => {
                let mut elements: Vec<Element> =
                    indices.iter().map(|&i| element(i, Column::Full)).collect();
                // Lines of one paragraph run on without a gap
                if let Some((first, rest)) = elements.split_first_mut() {
                    let kind = first.kind();
                    if kind.is_paragraph() {
                        for continuation in rest.iter_mut().filter(|e| e.kind() == kind) {
                            continuation.spacing_before = 0.0;
                        }
                    }
                }
                Block::new(elements)
            }
        }
    }
}
