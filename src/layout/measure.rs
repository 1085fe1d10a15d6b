//! Text measurement: the collaborator that turns text into rendered lines

use crate::layout::font::FontMetrics;
use crate::style::RenderStyle;
use smallvec::SmallVec;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Slack for accumulated float error when comparing widths and heights
pub const LAYOUT_EPSILON: f32 = 0.01;

/// One rendered line of a measured text
#[derive(Debug, Clone, PartialEq)]
pub struct LineFragment {
    /// Byte range within the measured text
    pub range: Range<usize>,
    pub height: f32,
}

pub type Fragments = SmallVec<[LineFragment; 4]>;

/// Measures how text wraps within a column
///
/// Implementations are black boxes to the paginator: it only relies on the
/// fragment heights and the byte offsets where rendered lines begin.
pub trait TextMeasurer: Send + Sync {
    /// Break `text` into rendered lines no wider than `width` points
    fn measure(&self, text: &str, width: f32, style: &RenderStyle) -> Fragments;

    /// Height of a single rendered line, used for spacing and space checks
    fn line_height(&self) -> f32;
}

/// Greedy line breaker for fixed-advance fonts
#[derive(Debug, Clone, Default)]
pub struct MonospaceMeasurer {
    metrics: FontMetrics,
}

impl MonospaceMeasurer {
    pub fn new(metrics: FontMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    fn text_width(&self, text: &str) -> f32 {
        text.graphemes(true)
            .map(|g| self.metrics.grapheme_width(g))
            .sum()
    }

    /// Trailing whitespace hangs past the column edge
    fn fits(&self, text: &str, width: f32) -> bool {
        self.text_width(text.trim_end()) <= width + LAYOUT_EPSILON
    }

    /// Longest grapheme prefix of `text[start..]` that fits, at least one grapheme
    fn emergency_break(&self, text: &str, start: usize, width: f32) -> usize {
        let mut x = 0.0;
        for (idx, grapheme) in text[start..].grapheme_indices(true) {
            let w = self.metrics.grapheme_width(grapheme);
            if idx > 0 && x + w > width + LAYOUT_EPSILON {
                return start + idx;
            }
            x += w;
        }
        text.len()
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, width: f32, _style: &RenderStyle) -> Fragments {
        let height = self.metrics.line_height;
        let mut fragments = Fragments::new();
        let mut push = |range: Range<usize>| fragments.push(LineFragment { range, height });

        if text.is_empty() {
            push(0..0);
            return fragments;
        }

        let mut line_start = 0;
        let mut last_fit: Option<usize> = None;

        for (offset, opportunity) in linebreaks(text) {
            if !self.fits(&text[line_start..offset], width) {
                // Break at the last opportunity that still fit
                if let Some(fit) = last_fit.take() {
                    push(line_start..fit);
                    line_start = fit;
                }
                // A single word wider than the column
                while !self.fits(&text[line_start..offset], width) {
                    let end = self.emergency_break(text, line_start, width);
                    push(line_start..end);
                    line_start = end;
                }
            }

            match opportunity {
                BreakOpportunity::Mandatory => {
                    if line_start < offset {
                        push(line_start..offset);
                        line_start = offset;
                    }
                    last_fit = None;
                }
                BreakOpportunity::Allowed => last_fit = Some(offset),
            }
        }

        if line_start < text.len() {
            push(line_start..text.len());
        }
        fragments
    }

    fn line_height(&self) -> f32 {
        self.metrics.line_height
    }
}
