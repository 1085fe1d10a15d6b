//! Screenplay lines and their semantic types

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Semantic type of a parsed screenplay line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineType {
    Empty,
    Heading,
    Shot,
    Action,
    Character,
    Parenthetical,
    Dialogue,
    DualDialogueCharacter,
    DualDialogueParenthetical,
    DualDialogue,
    More,
    DualDialogueMore,
    Transition,
    Lyrics,
    Centered,
    PageBreak,
    Section,
    Synopsis,
    Note,
}

impl LineType {
    /// Character cue in either dialogue column
    pub fn is_character(self) -> bool {
        matches!(self, LineType::Character | LineType::DualDialogueCharacter)
    }

    /// Dialogue content (not the cue) in either column
    pub fn is_dialogue_element(self) -> bool {
        matches!(
            self,
            LineType::Dialogue
                | LineType::Parenthetical
                | LineType::More
                | LineType::DualDialogue
                | LineType::DualDialogueParenthetical
                | LineType::DualDialogueMore
        )
    }

    /// Right-hand column of a dual dialogue pair
    pub fn is_dual(self) -> bool {
        matches!(
            self,
            LineType::DualDialogueCharacter
                | LineType::DualDialogueParenthetical
                | LineType::DualDialogue
                | LineType::DualDialogueMore
        )
    }

    /// Spoken text, as opposed to cues, parentheticals and markers
    pub fn is_speech(self) -> bool {
        matches!(self, LineType::Dialogue | LineType::DualDialogue)
    }

    pub fn is_parenthetical(self) -> bool {
        matches!(
            self,
            LineType::Parenthetical | LineType::DualDialogueParenthetical
        )
    }

    /// Elements that must never end a page
    pub fn keeps_with_next(self) -> bool {
        matches!(self, LineType::Heading | LineType::Shot)
    }

    /// Free-flowing text that can be broken between rendered lines
    pub fn is_paragraph(self) -> bool {
        matches!(
            self,
            LineType::Action | LineType::Lyrics | LineType::Centered | LineType::Note
        )
    }

    /// Whether the type ever reaches paper
    pub fn is_printable(self, print_notes: bool) -> bool {
        match self {
            LineType::Empty | LineType::Section | LineType::Synopsis => false,
            LineType::Note => print_notes,
            _ => true,
        }
    }

    /// Cue type opening a dialogue column of this type
    pub fn character_type(self) -> LineType {
        if self.is_dual() {
            LineType::DualDialogueCharacter
        } else {
            LineType::Character
        }
    }

    /// Right-column type with the same role, used to style left dual columns
    pub fn dual_counterpart(self) -> LineType {
        match self {
            LineType::Character => LineType::DualDialogueCharacter,
            LineType::Parenthetical => LineType::DualDialogueParenthetical,
            LineType::Dialogue => LineType::DualDialogue,
            LineType::More => LineType::DualDialogueMore,
            other => other,
        }
    }

    /// Selector used for this type in stylesheets
    pub fn style_name(self) -> &'static str {
        match self {
            LineType::Empty => "empty",
            LineType::Heading => "heading",
            LineType::Shot => "shot",
            LineType::Action => "action",
            LineType::Character => "character",
            LineType::Parenthetical => "parenthetical",
            LineType::Dialogue => "dialogue",
            LineType::DualDialogueCharacter => "dualdialoguecharacter",
            LineType::DualDialogueParenthetical => "dualdialogueparenthetical",
            LineType::DualDialogue => "dualdialogue",
            LineType::More => "more",
            LineType::DualDialogueMore => "dualdialoguemore",
            LineType::Transition => "transition",
            LineType::Lyrics => "lyrics",
            LineType::Centered => "centered",
            LineType::PageBreak => "pagebreak",
            LineType::Section => "section",
            LineType::Synopsis => "synopsis",
            LineType::Note => "note",
        }
    }

    /// All types that can be printed, in stylesheet order
    pub const PRINTABLE: [LineType; 16] = [
        LineType::Heading,
        LineType::Shot,
        LineType::Action,
        LineType::Character,
        LineType::Parenthetical,
        LineType::Dialogue,
        LineType::DualDialogueCharacter,
        LineType::DualDialogueParenthetical,
        LineType::DualDialogue,
        LineType::More,
        LineType::DualDialogueMore,
        LineType::Transition,
        LineType::Lyrics,
        LineType::Centered,
        LineType::PageBreak,
        LineType::Note,
    ];
}

/// A single parsed screenplay line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: LineType,
    /// Byte offset in the source document
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub omitted: bool,
    #[serde(default)]
    pub begins_new_visual_block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_number: Option<String>,
}

impl Line {
    pub fn new(kind: LineType, text: impl Into<String>) -> Self {
        Self::at(kind, text, 0)
    }

    /// Create a line at a source offset
    pub fn at(kind: LineType, text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            position,
            omitted: false,
            begins_new_visual_block: false,
            scene_number: None,
        }
    }

    /// Source range covered by this line
    pub fn range(&self) -> Range<usize> {
        self.position..self.position + self.text.len()
    }

    /// Whether the line takes part in printed output
    pub fn is_visible(&self, print_notes: bool) -> bool {
        if self.omitted || !self.kind.is_printable(print_notes) {
            return false;
        }
        self.kind == LineType::PageBreak || !self.text.trim().is_empty()
    }

    /// Cue name without force markers and extensions, e.g. `BOB` for `@Bob (V.O.) ^`
    pub fn character_name(&self) -> &str {
        let text = self.text.trim();
        let text = text.strip_prefix('@').unwrap_or(text);
        let text = text.trim_end().trim_end_matches('^');
        let name = match text.find('(') {
            Some(paren) => &text[..paren],
            None => text,
        };
        name.trim()
    }

    /// Split the text at a byte offset into two fragments of the same type
    ///
    /// The head is right-trimmed and the tail left-trimmed; the tail keeps its
    /// position in the source document.
    pub fn split_at(&self, offset: usize) -> (Line, Line) {
        let offset = offset.min(self.text.len());
        let (head, tail) = self.text.split_at(offset);
        let trimmed_tail = tail.trim_start();
        let skipped = tail.len() - trimmed_tail.len();

        let mut first = self.clone();
        first.text = head.trim_end().to_string();

        let mut second = self.clone();
        second.text = trimmed_tail.to_string();
        second.position = self.position + offset + skipped;
        second.begins_new_visual_block = false;
        second.scene_number = None;

        (first, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_name() {
        assert_eq!(Line::new(LineType::Character, "BOB").character_name(), "BOB");
        assert_eq!(
            Line::new(LineType::Character, "BOB (V.O.)").character_name(),
            "BOB"
        );
        assert_eq!(
            Line::new(LineType::DualDialogueCharacter, "@McCoy ^").character_name(),
            "McCoy"
        );
    }

    #[test]
    fn test_visibility() {
        assert!(Line::new(LineType::Action, "He runs.").is_visible(false));
        assert!(!Line::new(LineType::Action, "   ").is_visible(false));
        assert!(!Line::new(LineType::Section, "# ACT ONE").is_visible(false));
        assert!(!Line::new(LineType::Note, "[[fix]]").is_visible(false));
        assert!(Line::new(LineType::Note, "[[fix]]").is_visible(true));
        assert!(Line::new(LineType::PageBreak, "").is_visible(false));

        let mut omitted = Line::new(LineType::Action, "Gone.");
        omitted.omitted = true;
        assert!(!omitted.is_visible(false));
    }

    #[test]
    fn test_split_at() {
        let line = Line::at(LineType::Dialogue, "Hello there. General Kenobi.", 100);
        let (head, tail) = line.split_at(12);
        assert_eq!(head.text, "Hello there.");
        assert_eq!(tail.text, "General Kenobi.");
        assert_eq!(tail.position, 113);
        assert_eq!(tail.kind, LineType::Dialogue);
    }

    #[test]
    fn test_deserialize() {
        let line: Line =
            serde_json::from_str(r#"{"text":"BOB ^","type":"dualDialogueCharacter"}"#).unwrap();
        assert_eq!(line.kind, LineType::DualDialogueCharacter);
        assert_eq!(line.position, 0);
        assert!(!line.omitted);
    }
}
