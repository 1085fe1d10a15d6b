//! Splitting blocks across a page boundary

use crate::layout::LAYOUT_EPSILON;
use crate::pagination::block::{Block, BlockLayout};
use crate::pagination::element::{Element, Layouter};
use crate::pagination::page::BreakReason;
use regex::Regex;
use std::sync::LazyLock;

/// Terminal punctuation, optional closing quotes or brackets, then whitespace
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?…]+["'”’)\]]*\s+"#).expect("valid sentence regex"));

/// Rendered lines a paragraph must keep on each side of a split
pub(crate) const MIN_PARAGRAPH_LINES: usize = 2;

/// Outcome of fitting a block (or block group) into the space left on a page
#[derive(Debug, Clone, PartialEq)]
pub enum BlockSplit {
    /// Everything fits
    Fits,
    /// Part stays, the rest opens the next page
    SplitAt {
        this_page: Vec<Block>,
        next_page: Vec<Block>,
        reason: BreakReason,
    },
    /// Nothing can stay; move all of it to the next page
    Defer,
}

fn flatten(blocks: Vec<Block>) -> Vec<Element> {
    blocks.into_iter().flat_map(Block::into_elements).collect()
}

/// Number of leading fragments of `element` fitting in `space`
fn fitting_fragments(element: &Element, space: f32, at_top: bool) -> usize {
    let mut used = if at_top { 0.0 } else { element.spacing_before };
    let mut count = 0;
    for fragment in &element.fragments {
        if used + fragment.height > space + LAYOUT_EPSILON {
            break;
        }
        used += fragment.height;
        count += 1;
    }
    count
}

impl Layouter<'_> {
    /// Fit a group of blocks that should stay together
    ///
    /// Blocks before the overflowing one stay; the overflowing block is split
    /// on its own rules. A deferred block drags preceding headings and shots
    /// along with it.
    pub fn split_group(&self, group: &[Block], remaining: f32, at_top: bool) -> BlockSplit {
        let mut space = remaining;

        for (k, block) in group.iter().enumerate() {
            let top = at_top && k == 0;
            let height = block.height(top);
            if height <= space + LAYOUT_EPSILON {
                space -= height;
                continue;
            }

            match self.split_block(block, space, top) {
                BlockSplit::Fits => space -= height,
                BlockSplit::SplitAt {
                    this_page,
                    next_page,
                    reason,
                } => {
                    let mut this: Vec<Block> = group[..k].to_vec();
                    this.extend(this_page);
                    let mut next = next_page;
                    next.extend_from_slice(&group[k + 1..]);
                    return BlockSplit::SplitAt {
                        this_page: this,
                        next_page: next,
                        reason,
                    };
                }
                BlockSplit::Defer => {
                    let mut keep = k;
                    while keep > 0 && group[keep - 1].keeps_with_next() {
                        keep -= 1;
                    }
                    if keep == 0 {
                        return BlockSplit::Defer;
                    }
                    return BlockSplit::SplitAt {
                        this_page: group[..keep].to_vec(),
                        next_page: group[keep..].to_vec(),
                        reason: BreakReason::Deferred,
                    };
                }
            }
        }
        BlockSplit::Fits
    }

    /// Fit a single block into `remaining`
    pub fn split_block(&self, block: &Block, remaining: f32, at_top: bool) -> BlockSplit {
        if block.is_dual() {
            return self.split_dual(block, remaining, at_top);
        }
        let Some(spiller) = block.overflow_index(remaining, at_top) else {
            return BlockSplit::Fits;
        };

        let space = remaining - block.height_before(spiller, at_top);
        let kind = block.elements()[spiller].kind();
        let split = if kind.is_paragraph() {
            self.split_paragraph(block, spiller, space, at_top)
        } else if kind.is_speech() && block.is_dialogue() {
            self.split_speech(block, spiller, space, at_top)
        } else {
            None
        };

        split.unwrap_or_else(|| self.break_at_legal_index(block, spiller, remaining, at_top))
    }

    /// Break a paragraph element between rendered lines
    fn split_paragraph(
        &self,
        block: &Block,
        spiller: usize,
        space: f32,
        at_top: bool,
    ) -> Option<BlockSplit> {
        let element = &block.elements()[spiller];
        let top = at_top && spiller == 0;
        let total = element.fragments.len();
        if total < 2 * MIN_PARAGRAPH_LINES {
            return None;
        }

        let fit = fitting_fragments(element, space, top).min(total - MIN_PARAGRAPH_LINES);
        if fit < MIN_PARAGRAPH_LINES {
            return None;
        }

        let offset = element.fragments[fit].range.start;
        let (head, tail) = self.split_element(element, offset)?;
        if head.height(top) > space + LAYOUT_EPSILON {
            return None;
        }

        let mut this = block.elements()[..spiller].to_vec();
        this.push(head);
        let mut next = vec![tail];
        next.extend_from_slice(&block.elements()[spiller + 1..]);

        Some(BlockSplit::SplitAt {
            this_page: vec![Block::new(this)],
            next_page: vec![Block::new(next)],
            reason: BreakReason::ParagraphSplit,
        })
    }

    /// Break spoken dialogue inside its element, closing with `(MORE)`
    fn split_speech(
        &self,
        block: &Block,
        spiller: usize,
        space: f32,
        at_top: bool,
    ) -> Option<BlockSplit> {
        let elements = block.elements();
        let element = &elements[spiller];
        let top = at_top && spiller == 0;
        let more = self.more_marker(element.column);
        let available = space - more.height(false);
        if available <= 0.0 {
            return None;
        }

        let text = &element.line.text;
        let sentence_ends: Vec<usize> = SENTENCE_END
            .find_iter(text)
            .map(|m| m.end())
            .filter(|&end| end < text.len())
            .collect();

        let by_sentence = sentence_ends.into_iter().rev().find_map(|offset| {
            let (head, tail) = self.split_element(element, offset)?;
            (head.height(top) <= available + LAYOUT_EPSILON).then_some((head, tail))
        });

        let (head, tail) = match by_sentence {
            Some(parts) => parts,
            None => {
                let fit = fitting_fragments(element, available, top)
                    .min(element.fragments.len().saturating_sub(1));
                if fit == 0 {
                    return None;
                }
                self.split_element(element, element.fragments[fit].range.start)?
            }
        };

        let mut this = elements[..spiller].to_vec();
        this.push(head);
        this.push(more);
        let mut next = vec![self.contd_cue(&elements[0]), tail];
        next.extend_from_slice(&elements[spiller + 1..]);

        Some(BlockSplit::SplitAt {
            this_page: vec![Block::new(this)],
            next_page: vec![Block::new(next)],
            reason: BreakReason::DialogueSplit,
        })
    }

    /// Break between elements at the latest legal index that fits
    fn break_at_legal_index(
        &self,
        block: &Block,
        spiller: usize,
        remaining: f32,
        at_top: bool,
    ) -> BlockSplit {
        let elements = block.elements();
        let dialogue = block.is_dialogue();
        let column = elements[0].column;

        let indices = block.possible_page_break_indices();
        for &index in indices.iter().rev().filter(|&&i| i <= spiller) {
            if index == 0 {
                break;
            }

            let mut this = elements[..index].to_vec();
            let mut next = elements[index..].to_vec();
            if dialogue {
                this.push(self.more_marker(column));
                next.insert(0, self.contd_cue(&elements[0]));
            }

            let this = Block::new(this);
            if this.height(at_top) > remaining + LAYOUT_EPSILON {
                continue;
            }
            return BlockSplit::SplitAt {
                this_page: vec![this],
                next_page: vec![Block::new(next)],
                reason: if dialogue {
                    BreakReason::DialogueSplit
                } else {
                    BreakReason::Overflow
                },
            };
        }
        BlockSplit::Defer
    }

    /// Split both columns of a dual dialogue block
    ///
    /// Only commits when each column keeps something on this page;
    /// otherwise the whole block moves.
    fn split_dual(&self, block: &Block, remaining: f32, at_top: bool) -> BlockSplit {
        let BlockLayout::Dual { right_start } = block.layout() else {
            return self.split_block(block, remaining, at_top);
        };
        if block.height(at_top) <= remaining + LAYOUT_EPSILON {
            return BlockSplit::Fits;
        }

        let (left, right) = block.elements().split_at(right_start);
        let split_column = |elements: &[Element]| {
            let column = Block::new(elements.to_vec());
            match self.split_block(&column, remaining, at_top) {
                BlockSplit::Fits => Some((column.into_elements(), Vec::new())),
                BlockSplit::SplitAt {
                    this_page,
                    next_page,
                    ..
                } => Some((flatten(this_page), flatten(next_page))),
                BlockSplit::Defer => None,
            }
        };

        let (Some((left_this, left_next)), Some((right_this, right_next))) =
            (split_column(left), split_column(right))
        else {
            return BlockSplit::Defer;
        };
        if left_this.is_empty() || right_this.is_empty() {
            return BlockSplit::Defer;
        }

        BlockSplit::SplitAt {
            this_page: vec![Block::dual(left_this, right_this)],
            next_page: vec![Block::dual(left_next, right_next)],
            reason: BreakReason::DualDialogueSplit,
        }
    }

    /// Split an element's line at a byte offset and re-measure both halves
    ///
    /// The head keeps the element's spacing; the tail continues the same
    /// text and gets none.
    fn split_element(&self, element: &Element, offset: usize) -> Option<(Element, Element)> {
        let (head, tail) = element.line.split_at(offset);
        if head.text.is_empty() || tail.text.is_empty() {
            return None;
        }
        let mut head = self.element(head, element.source, element.column);
        head.spacing_before = element.spacing_before;
        let mut tail = self.element(tail, element.source, element.column);
        tail.spacing_before = 0.0;
        Some((head, tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ExportSettings, MonospaceMeasurer};
    use crate::pagination::element::Column;
    use crate::screenplay::{Line, LineType};
    use crate::style::Styles;

    struct Fixture {
        settings: ExportSettings,
        styles: Styles,
        measurer: MonospaceMeasurer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                settings: ExportSettings::default(),
                styles: Styles::default(),
                measurer: MonospaceMeasurer::default(),
            }
        }

        fn layouter(&self) -> Layouter<'_> {
            Layouter::new(&self.settings, &self.styles, Some(&self.measurer))
        }
    }

    fn block(layouter: &Layouter<'_>, lines: &[(LineType, &str)], column: Column) -> Block {
        Block::new(
            lines
                .iter()
                .enumerate()
                .map(|(i, (kind, text))| layouter.element(Line::new(*kind, *text), Some(i), column))
                .collect(),
        )
    }

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .flat_map(|b| b.lines().map(|l| l.text.clone()))
            .collect()
    }

    const SPEECH: &str = "This is the first sentence of a long speech. \
        Here is another one that keeps going for a while. \
        And a third sentence closes it out for good.";

    #[test]
    fn test_fits() {
        let fixture = Fixture::new();
        let layouter = fixture.layouter();
        let block = block(&layouter, &[(LineType::Action, "Bob sits.")], Column::Full);
        assert_eq!(layouter.split_block(&block, 100.0, false), BlockSplit::Fits);
    }

    #[test]
    fn test_dialogue_splits_on_sentence() {
        let fixture = Fixture::new();
        let layouter = fixture.layouter();
        let block = block(
            &layouter,
            &[(LineType::Character, "BOB"), (LineType::Dialogue, SPEECH)],
            Column::Full,
        );
        // cue (12 + 12) leaves room for three speech lines plus (MORE)
        let split = layouter.split_block(&block, 24.0 + 48.0, false);
        let BlockSplit::SplitAt {
            this_page,
            next_page,
            reason,
        } = split
        else {
            panic!("expected split, got {split:?}");
        };

        assert_eq!(reason, BreakReason::DialogueSplit);
        let this = texts(&this_page);
        let next = texts(&next_page);
        assert_eq!(this.last().map(String::as_str), Some("(MORE)"));
        assert!(this[1].ends_with('.'));
        assert_eq!(next[0], "BOB (CONT'D)");
        assert!(next[1].starts_with("And a third"));
        assert!(next_page[0].elements()[0].is_synthetic());
    }

    #[test]
    fn test_dialogue_without_room_defers() {
        let fixture = Fixture::new();
        let layouter = fixture.layouter();
        let block = block(
            &layouter,
            &[(LineType::Character, "BOB"), (LineType::Dialogue, SPEECH)],
            Column::Full,
        );
        assert_eq!(layouter.split_block(&block, 30.0, false), BlockSplit::Defer);
    }

    #[test]
    fn test_paragraph_keeps_two_lines_each_side() {
        let fixture = Fixture::new();
        let layouter = fixture.layouter();
        let text = "word ".repeat(12 * 5).trim_end().to_string();
        let block = block(&layouter, &[(LineType::Action, text.as_str())], Column::Full);
        assert_eq!(block.elements()[0].fragments.len(), 5);

        // Four lines would fit, but only three may stay
        let split = layouter.split_block(&block, 12.0 + 48.0, false);
        let BlockSplit::SplitAt {
            this_page,
            next_page,
            reason,
        } = split
        else {
            panic!("expected split, got {split:?}");
        };
        assert_eq!(reason, BreakReason::ParagraphSplit);
        assert_eq!(this_page[0].elements()[0].fragments.len(), 3);
        assert_eq!(next_page[0].elements()[0].fragments.len(), 2);

        // A single line is not enough to stay behind
        assert_eq!(layouter.split_block(&block, 24.0, false), BlockSplit::Defer);
    }

    #[test]
    fn test_group_pulls_heading_along() {
        let fixture = Fixture::new();
        let layouter = fixture.layouter();
        let action = block(&layouter, &[(LineType::Action, "Short.")], Column::Full);
        let heading = block(&layouter, &[(LineType::Heading, "INT. HOUSE")], Column::Full);
        let speech = block(
            &layouter,
            &[(LineType::Character, "BOB"), (LineType::Dialogue, "Hi.")],
            Column::Full,
        );
        let group = vec![action, heading, speech];

        // action (24) and heading (36) fit; the dialogue does not
        let split = layouter.split_group(&group, 70.0, false);
        let BlockSplit::SplitAt {
            this_page,
            next_page,
            reason,
        } = split
        else {
            panic!("expected split, got {split:?}");
        };
        assert_eq!(reason, BreakReason::Deferred);
        assert_eq!(texts(&this_page), vec!["Short."]);
        assert_eq!(texts(&next_page), vec!["INT. HOUSE", "BOB", "Hi."]);
    }

    #[test]
    fn test_dual_moves_when_one_column_cannot_split() {
        let fixture = Fixture::new();
        let layouter = fixture.layouter();
        let left = block(
            &layouter,
            &[(LineType::Character, "BOB"), (LineType::Dialogue, SPEECH)],
            Column::Left,
        );
        let right = block(
            &layouter,
            &[(LineType::DualDialogueCharacter, "ALICE ^"), (LineType::DualDialogue, "No.")],
            Column::Right,
        );
        let dual = Block::dual(left.into_elements(), right.into_elements());

        assert_eq!(layouter.split_block(&dual, 30.0, false), BlockSplit::Defer);
    }

    #[test]
    fn test_dual_splits_both_columns() {
        let fixture = Fixture::new();
        let layouter = fixture.layouter();
        let left = block(
            &layouter,
            &[(LineType::Character, "BOB"), (LineType::Dialogue, SPEECH)],
            Column::Left,
        );
        let right = block(
            &layouter,
            &[(LineType::DualDialogueCharacter, "ALICE ^"), (LineType::DualDialogue, SPEECH)],
            Column::Right,
        );
        let dual = Block::dual(left.into_elements(), right.into_elements());

        let split = layouter.split_block(&dual, 72.0, false);
        let BlockSplit::SplitAt {
            this_page,
            next_page,
            reason,
        } = split
        else {
            panic!("expected split, got {split:?}");
        };
        assert_eq!(reason, BreakReason::DualDialogueSplit);
        assert!(this_page[0].is_dual());
        assert!(this_page[0].height(false) <= 72.0 + LAYOUT_EPSILON);

        let next = texts(&next_page);
        assert!(next.contains(&"BOB (CONT'D)".to_string()));
        assert!(next.contains(&"ALICE (CONT'D)".to_string()));
    }
}
