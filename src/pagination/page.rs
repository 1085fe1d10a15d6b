//! Pages and the record of where they break

use crate::pagination::block::Block;
use crate::pagination::element::Element;
use crate::screenplay::Line;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Why a page ended where it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakReason {
    /// An explicit page break line
    Forced,
    /// The next content did not fit
    Overflow,
    /// A block with no legal split point moved to the next page
    Deferred,
    /// An action-like paragraph continues on the next page
    ParagraphSplit,
    /// Dialogue continues with `(MORE)` / `(CONT'D)`
    DialogueSplit,
    /// Both dual dialogue columns continue on the next page
    DualDialogueSplit,
    /// A block taller than a whole page was placed alone
    Oversized,
}

impl fmt::Display for BreakReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            BreakReason::Forced => "forced page break",
            BreakReason::Overflow => "content overflow",
            BreakReason::Deferred => "block moved to next page",
            BreakReason::ParagraphSplit => "paragraph split",
            BreakReason::DialogueSplit => "dialogue split",
            BreakReason::DualDialogueSplit => "dual dialogue split",
            BreakReason::Oversized => "oversized block",
        };
        f.write_str(reason)
    }
}

/// A page boundary inserted during pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreak {
    /// Index of the page that ends at this break
    pub page_index: usize,
    /// Content height used on that page
    pub y: f32,
    /// Line that triggered the break: the page break line itself, or the
    /// first source line carried to the next page
    pub line: Option<usize>,
    pub reason: BreakReason,
}

/// A fixed-height page of blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    blocks: Vec<Block>,
    max_height: f32,
    height: f32,
    /// Lines read to build the group the page was opened with, when the
    /// page began with a fresh group rather than a continuation
    restart: Option<Range<usize>>,
}

impl Page {
    pub fn new(max_height: f32) -> Self {
        Self {
            blocks: Vec::new(),
            max_height,
            height: 0.0,
            restart: None,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.blocks.iter().flat_map(|b| b.elements())
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.elements().map(|e| &e.line)
    }

    /// Source indices of the non-synthetic lines on this page
    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        self.elements().filter_map(|e| e.source)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Content height in use
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn remaining_space(&self) -> f32 {
        self.max_height - self.height
    }

    /// Line the page was opened on, if it began with a fresh group
    pub fn restart_index(&self) -> Option<usize> {
        self.restart.as_ref().map(|r| r.start)
    }

    /// One past the last line inspected while building the opening group
    pub(crate) fn restart_scan_end(&self) -> Option<usize> {
        self.restart.as_ref().map(|r| r.end)
    }

    /// Source text range covered by the page's lines
    pub fn represented_range(&self) -> Option<Range<usize>> {
        self.elements()
            .filter(|e| !e.is_synthetic())
            .map(|e| e.line.range())
            .reduce(|a, b| a.start.min(b.start)..a.end.max(b.end))
    }

    /// Height the blocks would take if appended now
    pub(crate) fn group_height(&self, group: &[Block]) -> f32 {
        let at_top = self.is_empty();
        group
            .iter()
            .enumerate()
            .map(|(i, b)| b.height(at_top && i == 0))
            .sum()
    }

    pub(crate) fn push_group(&mut self, group: Vec<Block>, restart: Option<Range<usize>>) {
        if self.is_empty() {
            self.restart = restart;
        }
        for block in group {
            if block.is_empty() {
                continue;
            }
            self.height += block.height(self.is_empty());
            self.blocks.push(block);
        }
    }
}
