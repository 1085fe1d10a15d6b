//! Paper sizes and export settings

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed advance of a 12pt Courier character in points
pub const COURIER_CHAR_WIDTH: f32 = 7.2;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid export settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("margins leave no room for content on {paper:?} paper")]
    NoContentArea { paper: PaperSize },
}

/// Supported paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaperSize {
    A4,
    #[default]
    UsLetter,
}

impl PaperSize {
    /// Page width in points
    pub fn width(self) -> f32 {
        match self {
            PaperSize::A4 => 595.0,
            PaperSize::UsLetter => 612.0,
        }
    }

    /// Page height in points
    pub fn height(self) -> f32 {
        match self {
            PaperSize::A4 => 842.0,
            PaperSize::UsLetter => 792.0,
        }
    }
}

/// Settings affecting how pages are produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub paper_size: PaperSize,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Print `[[notes]]` as their own elements
    pub print_notes: bool,
    pub print_scene_numbers: bool,
    /// Marker closing a dialogue block that continues on the next page
    pub more_label: String,
    /// Cue extension opening a continued dialogue block
    pub contd_label: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::UsLetter,
            margin_top: 72.0, // 1 inch
            margin_bottom: 72.0,
            margin_left: 108.0, // 1.5 inch binding side
            margin_right: 72.0,
            print_notes: false,
            print_scene_numbers: true,
            more_label: "MORE".to_string(),
            contd_label: "CONT'D".to_string(),
        }
    }
}

impl ExportSettings {
    pub fn with_paper_size(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            ..Self::default()
        }
    }

    /// Parse settings from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.content_height() <= 0.0 || self.content_width() <= 0.0 {
            return Err(SettingsError::NoContentArea {
                paper: self.paper_size,
            });
        }
        Ok(())
    }

    /// Usable content width per page
    pub fn content_width(&self) -> f32 {
        self.paper_size.width() - self.margin_left - self.margin_right
    }

    /// Maximum content height per page
    pub fn content_height(&self) -> f32 {
        self.paper_size.height() - self.margin_top - self.margin_bottom
    }

    /// `(MORE)` marker text
    pub fn more_text(&self) -> String {
        format!("({})", self.more_label)
    }

    /// `NAME (CONT'D)` cue text
    pub fn contd_text(&self, name: &str) -> String {
        format!("{} ({})", name, self.contd_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_area() {
        let settings = ExportSettings::default();
        assert_eq!(settings.content_height(), 648.0); // 792 - 72 - 72
        assert_eq!(settings.content_width(), 432.0); // 612 - 108 - 72

        let a4 = ExportSettings::with_paper_size(PaperSize::A4);
        assert_eq!(a4.content_height(), 698.0);
    }

    #[test]
    fn test_from_json_defaults() {
        let settings =
            ExportSettings::from_json(r#"{"paperSize":"a4","printNotes":true}"#).unwrap();
        assert_eq!(settings.paper_size, PaperSize::A4);
        assert!(settings.print_notes);
        assert_eq!(settings.more_label, "MORE");
    }

    #[test]
    fn test_from_json_rejects_margins() {
        let err = ExportSettings::from_json(r#"{"marginTop":500,"marginBottom":500}"#).unwrap_err();
        assert!(matches!(err, SettingsError::NoContentArea { .. }));
    }

    #[test]
    fn test_continuation_labels() {
        let settings = ExportSettings::default();
        assert_eq!(settings.more_text(), "(MORE)");
        assert_eq!(settings.contd_text("BOB"), "BOB (CONT'D)");
    }
}
