//! Screenplay model: the ordered line sequence produced by the parser

mod line;

pub use line::{Line, LineType};

/// An ordered, read-only sequence of parsed lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Screenplay {
    lines: Vec<Line>,
}

impl Screenplay {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Load a screenplay from a JSON array of lines
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let lines: Vec<Line> = serde_json::from_str(json)?;
        Ok(Self::new(lines))
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the line containing a source offset
    ///
    /// Offsets between lines resolve to the preceding line; offsets past the
    /// end resolve to the last line.
    pub fn index_at_position(&self, offset: usize) -> usize {
        match self.lines.binary_search_by(|line| line.position.cmp(&offset)) {
            Ok(index) => index,
            Err(insert_at) => insert_at.saturating_sub(1),
        }
    }
}

impl From<Vec<Line>> for Screenplay {
    fn from(lines: Vec<Line>) -> Self {
        Self::new(lines)
    }
}
