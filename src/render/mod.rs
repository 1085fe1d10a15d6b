//! Render-ready page views
//!
//! Flattens paginated blocks into positioned rendered lines for external
//! renderers (PDF writers, print previews, the JS host). Coordinates are in
//! points from the top-left corner of the paper.

use crate::layout::ExportSettings;
use crate::pagination::{Block, BlockLayout, Column, Element, Page, Pagination};
use crate::screenplay::LineType;
use crate::style::{Styles, TextAlign, DUAL_COLUMN_OFFSET};
use serde::Serialize;

/// One rendered line of an element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: LineType,
    pub x: f32,
    pub y: f32,
    /// Column width available to the line
    pub width: f32,
    pub height: f32,
    pub align: TextAlign,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Originating line; `None` for `(MORE)` and `(CONT'D)` markers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// 1-based page number
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<LineView>,
}

impl PageView {
    pub fn build(index: usize, page: &Page, settings: &ExportSettings, styles: &Styles) -> Self {
        let mut builder = ViewBuilder {
            settings,
            styles,
            lines: Vec::new(),
        };
        let mut y = settings.margin_top;
        for (i, block) in page.blocks().iter().enumerate() {
            y += builder.block(block, y, i == 0);
        }

        Self {
            page_number: index + 1,
            width: settings.paper_size.width(),
            height: settings.paper_size.height(),
            lines: builder.lines,
        }
    }
}

/// Views of every page in a pagination
pub fn page_views(pagination: &Pagination, styles: &Styles) -> Vec<PageView> {
    pagination
        .pages()
        .iter()
        .enumerate()
        .map(|(i, page)| PageView::build(i, page, pagination.settings(), styles))
        .collect()
}

struct ViewBuilder<'a> {
    settings: &'a ExportSettings,
    styles: &'a Styles,
    lines: Vec<LineView>,
}

impl ViewBuilder<'_> {
    /// Emit a block starting at `top`; returns the height it advances
    fn block(&mut self, block: &Block, top: f32, at_top: bool) -> f32 {
        match block.layout() {
            BlockLayout::Single => self.column(block.elements(), top, at_top),
            BlockLayout::Dual { right_start } => {
                let (left, right) = block.elements().split_at(right_start);
                let left = self.column(left, top, at_top);
                let right = self.column(right, top, at_top);
                left.max(right)
            }
        }
    }

    fn column(&mut self, elements: &[Element], top: f32, at_top: bool) -> f32 {
        let mut y = top;
        for (i, element) in elements.iter().enumerate() {
            if !(at_top && i == 0) {
                y += element.spacing_before;
            }
            self.element(element, y);
            y += element.text_height();
        }
        y - top
    }

    fn element(&mut self, element: &Element, top: f32) {
        let style = self.styles.style_for(element.style_kind());
        if style.hidden {
            return;
        }

        let mut x = self.settings.margin_left + style.left_offset();
        if element.column == Column::Left {
            x -= DUAL_COLUMN_OFFSET;
        }
        let width = style.width(self.settings.paper_size);

        let mut y = top;
        for (i, fragment) in element.fragments.iter().enumerate() {
            let text = element
                .line
                .text
                .get(fragment.range.clone())
                .unwrap_or_default()
                .trim_end();
            let text = if element.kind().is_character() {
                text.trim_end_matches('^').trim_end()
            } else {
                text
            };
            let text = if style.uppercase {
                text.to_uppercase()
            } else {
                text.to_string()
            };
            let scene_number = (i == 0
                && self.settings.print_scene_numbers
                && element.kind() == LineType::Heading)
                .then(|| element.line.scene_number.clone())
                .flatten();

            self.lines.push(LineView {
                text,
                kind: element.kind(),
                x,
                y,
                width,
                height: fragment.height,
                align: style.text_align,
                bold: style.bold,
                italic: style.italic,
                underline: style.underline,
                source: element.source,
                scene_number,
            });
            y += fragment.height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Paginator;
    use crate::screenplay::Line;

    #[test]
    fn test_positions() {
        let mut heading = Line::new(LineType::Heading, "int. house - day");
        heading.scene_number = Some("1".into());
        let lines = vec![
            heading,
            Line::new(LineType::Empty, ""),
            Line::new(LineType::Character, "BOB"),
            Line::new(LineType::Dialogue, "Hi."),
        ];
        let paginator = Paginator::default();
        let pagination = paginator.paginate(&lines);
        let views = page_views(&pagination, paginator.styles());
        let page = &views[0];

        assert_eq!(page.page_number, 1);
        assert_eq!(page.lines.len(), 3);

        let heading = &page.lines[0];
        assert_eq!(heading.text, "INT. HOUSE - DAY");
        assert_eq!(heading.y, 72.0);
        assert_eq!(heading.x, 108.0);
        assert_eq!(heading.scene_number.as_deref(), Some("1"));
        assert!(heading.bold);

        let cue = &page.lines[1];
        assert_eq!(cue.y, 72.0 + 12.0 + 12.0);
        assert!((cue.x - (108.0 + 22.0 * 7.2)).abs() < 0.001);
        assert_eq!(page.lines[2].y, cue.y + 12.0);
    }

    #[test]
    fn test_paragraph_lines_are_adjacent() {
        let lines = vec![
            Line::new(LineType::Action, "He opens the door."),
            Line::new(LineType::Action, "Nobody is there."),
        ];
        let paginator = Paginator::default();
        let pagination = paginator.paginate(&lines);
        let views = page_views(&pagination, paginator.styles());
        let page = &views[0];

        assert_eq!(page.lines[0].y, 72.0);
        assert_eq!(page.lines[1].y, 72.0 + 12.0);
    }

    #[test]
    fn test_scene_numbers_can_be_hidden() {
        let mut heading = Line::new(LineType::Heading, "INT. HOUSE");
        heading.scene_number = Some("4A".into());
        let settings = ExportSettings {
            print_scene_numbers: false,
            ..ExportSettings::default()
        };
        let paginator = Paginator::new(settings);
        let pagination = paginator.paginate(&[heading]);
        let views = page_views(&pagination, paginator.styles());
        assert_eq!(views[0].lines[0].scene_number, None);
    }

    #[test]
    fn test_dual_columns_share_top() {
        let lines = vec![
            Line::new(LineType::Character, "BOB"),
            Line::new(LineType::Dialogue, "Left."),
            Line::new(LineType::DualDialogueCharacter, "ALICE ^"),
            Line::new(LineType::DualDialogue, "Right."),
        ];
        let paginator = Paginator::default();
        let pagination = paginator.paginate(&lines);
        let views = page_views(&pagination, paginator.styles());
        let page = &views[0];

        assert_eq!(page.lines.len(), 4);
        assert_eq!(page.lines[0].y, page.lines[2].y);
        assert!(page.lines[0].x < page.lines[2].x);
        assert_eq!(page.lines[2].text, "ALICE");
    }
}
