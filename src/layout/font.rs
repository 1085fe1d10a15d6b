//! Font metrics for text measurement

use super::settings::COURIER_CHAR_WIDTH;

/// Screenplay line height for 12pt Courier
pub const COURIER_LINE_HEIGHT: f32 = 12.0;

/// Metrics needed for text measurement
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Line height in points
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::monospace(COURIER_LINE_HEIGHT, COURIER_CHAR_WIDTH)
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Metrics where every character has the same advance
    pub fn monospace(line_height: f32, char_width: f32) -> Self {
        Self::new(line_height, vec![char_width; 128], char_width)
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of a grapheme cluster
    pub fn grapheme_width(&self, grapheme: &str) -> f32 {
        if grapheme == "\t" {
            self.default_width * 4.0
        } else if grapheme.chars().all(|c| c.is_control()) {
            0.0
        } else {
            // Combining marks share the base character's cell
            grapheme.chars().next().map(|c| self.width(c)).unwrap_or(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_defaults() {
        let metrics = FontMetrics::default();
        assert_eq!(metrics.line_height, 12.0);
        assert_eq!(metrics.width('A'), 7.2);
        assert_eq!(metrics.width('é'), 7.2);
    }

    #[test]
    fn test_grapheme_width() {
        let metrics = FontMetrics::monospace(10.0, 5.0);
        assert_eq!(metrics.grapheme_width("a"), 5.0);
        assert_eq!(metrics.grapheme_width("e\u{301}"), 5.0);
        assert_eq!(metrics.grapheme_width("\t"), 20.0);
        assert_eq!(metrics.grapheme_width("\u{7}"), 0.0);
    }
}
