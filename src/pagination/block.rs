//! Blocks: groups of elements laid out as a unit

use crate::layout::LAYOUT_EPSILON;
use crate::pagination::element::Element;
use crate::screenplay::{Line, LineType};
use smallvec::{smallvec, SmallVec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    Single,
    /// Side-by-side columns; elements before `right_start` form the left one
    Dual { right_start: usize },
}

/// Contiguous elements that stay together unless split by the block rules
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    elements: Vec<Element>,
    layout: BlockLayout,
}

/// Height of elements stacked vertically
fn column_height(elements: &[Element], at_top: bool) -> f32 {
    elements
        .iter()
        .enumerate()
        .map(|(i, e)| e.height(at_top && i == 0))
        .sum()
}

impl Block {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            layout: BlockLayout::Single,
        }
    }

    /// Dual dialogue block; collapses to a single column when one side is empty
    pub fn dual(mut left: Vec<Element>, right: Vec<Element>) -> Self {
        if left.is_empty() {
            return Self::new(right);
        }
        if right.is_empty() {
            return Self::new(left);
        }
        let right_start = left.len();
        left.extend(right);
        Self {
            elements: left,
            layout: BlockLayout::Dual { right_start },
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.elements.iter().map(|e| &e.line)
    }

    /// First non-synthetic source line in the block
    pub fn first_source(&self) -> Option<usize> {
        self.elements.iter().find_map(|e| e.source)
    }

    pub fn height(&self, at_top: bool) -> f32 {
        match self.layout {
            BlockLayout::Single => column_height(&self.elements, at_top),
            BlockLayout::Dual { right_start } => {
                let (left, right) = self.elements.split_at(right_start);
                column_height(left, at_top).max(column_height(right, at_top))
            }
        }
    }

    /// Height of the elements before `index` in a single-column block
    pub fn height_before(&self, index: usize, at_top: bool) -> f32 {
        column_height(&self.elements[..index.min(self.elements.len())], at_top)
    }

    /// A character cue opens the block
    pub fn is_dialogue(&self) -> bool {
        self.elements
            .first()
            .is_some_and(|e| e.kind().is_character())
    }

    pub fn is_dual(&self) -> bool {
        matches!(self.layout, BlockLayout::Dual { .. })
    }

    /// A lone heading or shot that must not end a page
    pub fn keeps_with_next(&self) -> bool {
        self.elements.len() == 1 && self.elements[0].kind().keeps_with_next()
    }

    /// Element indices where the next page may begin
    ///
    /// Index 0 (move the whole block) is always present. Inside dialogue
    /// every speech or parenthetical after the first is a candidate, so a cue
    /// never ends a page alone. Nothing may follow a heading or shot directly.
    pub fn possible_page_break_indices(&self) -> SmallVec<[usize; 8]> {
        let mut indices: SmallVec<[usize; 8]> = smallvec![0];
        let mut seen_dialogue = false;

        for (i, element) in self.elements.iter().enumerate() {
            let kind = element.kind();
            let candidate = if kind.is_speech() || kind.is_parenthetical() {
                let first = !seen_dialogue;
                seen_dialogue = true;
                !first
            } else {
                kind.is_paragraph() || kind == LineType::Transition
            };

            if i == 0 || !candidate || self.elements[i - 1].kind().keeps_with_next() {
                continue;
            }
            indices.push(i);
        }
        indices
    }

    /// Index of the first element that does not fit in `remaining`
    pub fn overflow_index(&self, remaining: f32, at_top: bool) -> Option<usize> {
        let mut used = 0.0;
        for (i, element) in self.elements.iter().enumerate() {
            used += element.height(at_top && i == 0);
            if used > remaining + LAYOUT_EPSILON {
                return Some(i);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Fragments, LineFragment};
    use crate::pagination::element::Column;

    fn element(kind: LineType, lines: usize, spacing: f32) -> Element {
        let fragments: Fragments = (0..lines)
            .map(|i| LineFragment {
                range: i..i + 1,
                height: 12.0,
            })
            .collect();
        Element {
            line: Line::new(kind, "x".repeat(lines)),
            source: Some(0),
            column: Column::Full,
            spacing_before: spacing,
            fragments,
        }
    }

    #[test]
    fn test_heights() {
        let block = Block::new(vec![
            element(LineType::Character, 1, 12.0),
            element(LineType::Dialogue, 3, 0.0),
        ]);
        assert_eq!(block.height(false), 60.0);
        assert_eq!(block.height(true), 48.0);
        assert_eq!(block.height_before(1, false), 24.0);
    }

    #[test]
    fn test_dual_height_is_tallest_column() {
        let block = Block::dual(
            vec![
                element(LineType::Character, 1, 12.0),
                element(LineType::Dialogue, 2, 0.0),
            ],
            vec![
                element(LineType::DualDialogueCharacter, 1, 12.0),
                element(LineType::DualDialogue, 4, 0.0),
            ],
        );
        assert!(block.is_dual());
        assert_eq!(block.height(false), 72.0);
    }

    #[test]
    fn test_dual_collapses_when_column_empty() {
        let block = Block::dual(Vec::new(), vec![element(LineType::DualDialogue, 1, 0.0)]);
        assert_eq!(block.layout(), BlockLayout::Single);
    }

    #[test]
    fn test_dialogue_break_indices() {
        let block = Block::new(vec![
            element(LineType::Character, 1, 12.0),
            element(LineType::Parenthetical, 1, 0.0),
            element(LineType::Dialogue, 2, 0.0),
            element(LineType::Parenthetical, 1, 0.0),
            element(LineType::Dialogue, 2, 0.0),
        ]);
        assert_eq!(block.possible_page_break_indices().as_slice(), &[0, 2, 3, 4]);
    }

    #[test]
    fn test_no_break_after_heading() {
        let block = Block::new(vec![
            element(LineType::Heading, 1, 24.0),
            element(LineType::Action, 2, 12.0),
            element(LineType::Action, 2, 12.0),
        ]);
        assert_eq!(block.possible_page_break_indices().as_slice(), &[0, 2]);
    }

    #[test]
    fn test_overflow_index() {
        let block = Block::new(vec![
            element(LineType::Character, 1, 12.0),
            element(LineType::Dialogue, 2, 0.0),
            element(LineType::Dialogue, 2, 0.0),
        ]);
        assert_eq!(block.overflow_index(100.0, false), None);
        assert_eq!(block.overflow_index(40.0, false), Some(1));
        assert_eq!(block.overflow_index(40.0, true), Some(2));
        assert_eq!(block.overflow_index(10.0, false), Some(0));
    }
}
