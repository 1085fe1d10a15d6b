//! Measured page elements and the layouter that produces them

use crate::layout::{ExportSettings, Fragments, TextMeasurer};
use crate::screenplay::{Line, LineType};
use crate::style::{RenderStyle, Styles};

/// Horizontal placement of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Column {
    #[default]
    Full,
    /// Left column of a dual dialogue block
    Left,
    /// Right column of a dual dialogue block
    Right,
}

/// A line placed into layout, with its measurement
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub line: Line,
    /// Index of the originating line; `None` for continuation markers
    pub source: Option<usize>,
    pub column: Column,
    /// Space above the element, dropped at the top of a page
    pub spacing_before: f32,
    pub fragments: Fragments,
}

impl Element {
    pub fn kind(&self) -> LineType {
        self.line.kind
    }

    /// Type whose style applies, accounting for the dual dialogue column
    pub fn style_kind(&self) -> LineType {
        match self.column {
            Column::Left => self.line.kind.dual_counterpart(),
            _ => self.line.kind,
        }
    }

    /// `(MORE)` markers and `(CONT'D)` cues
    pub fn is_synthetic(&self) -> bool {
        self.source.is_none()
    }

    pub fn text_height(&self) -> f32 {
        self.fragments.iter().map(|f| f.height).sum()
    }

    pub fn height(&self, at_top: bool) -> f32 {
        if at_top {
            self.text_height()
        } else {
            self.spacing_before + self.text_height()
        }
    }
}

/// Measures lines into elements using the injected styles and measurer
pub(crate) struct Layouter<'a> {
    pub settings: &'a ExportSettings,
    styles: &'a Styles,
    measurer: Option<&'a dyn TextMeasurer>,
}

impl<'a> Layouter<'a> {
    pub fn new(
        settings: &'a ExportSettings,
        styles: &'a Styles,
        measurer: Option<&'a dyn TextMeasurer>,
    ) -> Self {
        Self {
            settings,
            styles,
            measurer,
        }
    }

    /// Height of one rendered line; zero without a measurer
    pub fn line_height(&self) -> f32 {
        self.measurer.map(|m| m.line_height()).unwrap_or(0.0)
    }

    fn style(&self, kind: LineType, column: Column) -> &RenderStyle {
        match column {
            Column::Left => self.styles.style_for(kind.dual_counterpart()),
            _ => self.styles.style_for(kind),
        }
    }

    /// Measure text as it would render for an element of `kind`
    pub fn measure(&self, text: &str, kind: LineType, column: Column) -> Fragments {
        let style = self.style(kind, column);
        if style.hidden {
            return Fragments::new();
        }
        match self.measurer {
            Some(measurer) => measurer.measure(text, style.width(self.settings.paper_size), style),
            None => Fragments::new(),
        }
    }

    pub fn element(&self, line: Line, source: Option<usize>, column: Column) -> Element {
        let style = self.style(line.kind, column);
        let spacing_before = if style.hidden {
            0.0
        } else {
            style.spacing_before(self.line_height())
        };
        let fragments = self.measure(&line.text, line.kind, column);
        Element {
            line,
            source,
            column,
            spacing_before,
            fragments,
        }
    }

    /// `(MORE)` marker closing a dialogue column on the departing page
    pub fn more_marker(&self, column: Column) -> Element {
        let kind = match column {
            Column::Right => LineType::DualDialogueMore,
            _ => LineType::More,
        };
        let line = Line::new(kind, self.settings.more_text());
        self.element(line, None, column)
    }

    /// `NAME (CONT'D)` cue opening a dialogue column on the arriving page
    pub fn contd_cue(&self, cue: &Element) -> Element {
        let text = self.settings.contd_text(cue.line.character_name());
        let line = Line::at(cue.kind().character_type(), text, cue.line.position);
        self.element(line, None, cue.column)
    }
}
