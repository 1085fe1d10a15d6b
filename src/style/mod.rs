//! Element styles and the stylesheet they are loaded from

pub mod stylesheet;

pub use stylesheet::StylesheetError;

use crate::layout::{PaperSize, COURIER_CHAR_WIDTH, COURIER_LINE_HEIGHT};
use crate::screenplay::LineType;
use rustc_hash::FxHashMap;
use serde::Serialize;
use stylesheet::{Declaration, Unit, Value};

/// Stylesheet bundled with the crate
pub const DEFAULT_STYLESHEET: &str = include_str!("screenplay.css");

/// Horizontal distance between the left and right dual dialogue columns
pub const DUAL_COLUMN_OFFSET: f32 = 32.0 * COURIER_CHAR_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Resolved style of one element type
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub name: String,
    /// Column width on A4 paper, in character cells
    pub width_a4: f32,
    /// Column width on US Letter paper, in character cells
    pub width_us: f32,
    /// Space above the element, in lines
    pub margin_top: f32,
    /// Indent from the left content edge, in character cells
    pub margin_left: f32,
    pub text_align: TextAlign,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub uppercase: bool,
    /// Takes no space and is never drawn
    pub hidden: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            width_a4: 59.0,
            width_us: 61.0,
            margin_top: 1.0,
            margin_left: 0.0,
            text_align: TextAlign::Left,
            bold: false,
            italic: false,
            underline: false,
            uppercase: false,
            hidden: false,
        }
    }
}

impl RenderStyle {
    /// Column width in points for the given paper
    pub fn width(&self, paper: PaperSize) -> f32 {
        let chars = match paper {
            PaperSize::A4 => self.width_a4,
            PaperSize::UsLetter => self.width_us,
        };
        chars * COURIER_CHAR_WIDTH
    }

    /// Vertical space above the element in points
    pub fn spacing_before(&self, line_height: f32) -> f32 {
        self.margin_top * line_height
    }

    /// Left indent in points
    pub fn left_offset(&self) -> f32 {
        self.margin_left * COURIER_CHAR_WIDTH
    }

    fn apply(&mut self, decl: &Declaration) -> Result<(), StylesheetError> {
        let invalid = || StylesheetError::InvalidValue {
            property: decl.property.clone(),
            value: decl.raw.clone(),
        };
        let chars = |value: &Value| match *value {
            Value::Length(n, Unit::Chars) | Value::Number(n) => Some(n),
            Value::Length(n, Unit::Points) => Some(n / COURIER_CHAR_WIDTH),
            _ => None,
        };
        let lines = |value: &Value| match *value {
            Value::Length(n, Unit::Lines) | Value::Number(n) => Some(n),
            Value::Length(n, Unit::Points) => Some(n / COURIER_LINE_HEIGHT),
            _ => None,
        };
        let flag = |value: &Value, on: &str, off: &str| match value {
            Value::Bool(b) => Some(*b),
            Value::Ident(s) if s.eq_ignore_ascii_case(on) => Some(true),
            Value::Ident(s) if s.eq_ignore_ascii_case(off) => Some(false),
            _ => None,
        };

        let value = &decl.value;
        match decl.property.as_str() {
            "width" => {
                let w = chars(value).ok_or_else(invalid)?;
                self.width_a4 = w;
                self.width_us = w;
            }
            "width-a4" => self.width_a4 = chars(value).ok_or_else(invalid)?,
            "width-us" => self.width_us = chars(value).ok_or_else(invalid)?,
            "margin-top" => self.margin_top = lines(value).ok_or_else(invalid)?,
            "margin-left" => self.margin_left = chars(value).ok_or_else(invalid)?,
            "text-align" => {
                self.text_align = match value {
                    Value::Ident(s) if s.eq_ignore_ascii_case("left") => TextAlign::Left,
                    Value::Ident(s) if s.eq_ignore_ascii_case("center") => TextAlign::Center,
                    Value::Ident(s) if s.eq_ignore_ascii_case("right") => TextAlign::Right,
                    _ => return Err(invalid()),
                }
            }
            "font-weight" | "bold" => self.bold = flag(value, "bold", "normal").ok_or_else(invalid)?,
            "font-style" | "italic" => {
                self.italic = flag(value, "italic", "normal").ok_or_else(invalid)?
            }
            "text-decoration" | "underline" => {
                self.underline = flag(value, "underline", "none").ok_or_else(invalid)?
            }
            "text-transform" | "uppercase" => {
                self.uppercase = flag(value, "uppercase", "none").ok_or_else(invalid)?
            }
            "display" => self.hidden = !flag(value, "block", "none").ok_or_else(invalid)?,
            other => {
                tracing::debug!(property = other, style = %self.name, "ignoring unknown style property");
            }
        }
        Ok(())
    }
}

/// Normalize a selector to the key used by `LineType::style_name`
fn style_key(selector: &str) -> String {
    selector
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Style lookup by element type
#[derive(Debug, Clone)]
pub struct Styles {
    styles: FxHashMap<String, RenderStyle>,
    fallback: RenderStyle,
}

impl Default for Styles {
    fn default() -> Self {
        Self::from_stylesheet(DEFAULT_STYLESHEET).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "bundled stylesheet failed to load, using fallback styles");
            Self::empty()
        })
    }
}

impl Styles {
    /// Styles with no entries; every lookup resolves to the fallback
    pub fn empty() -> Self {
        Self {
            styles: FxHashMap::default(),
            fallback: RenderStyle::default(),
        }
    }

    /// Build styles from stylesheet source
    ///
    /// Rules apply in source order, so later rules refine earlier ones.
    pub fn from_stylesheet(source: &str) -> Result<Self, StylesheetError> {
        let rules = stylesheet::parse(source)?;
        let mut styles = Self::empty();

        for rule in &rules {
            for selector in &rule.selectors {
                let key = style_key(selector);
                let style = styles.styles.entry(key.clone()).or_insert_with(|| RenderStyle {
                    name: key,
                    ..RenderStyle::default()
                });
                for decl in &rule.declarations {
                    style.apply(decl)?;
                }
            }
        }

        for kind in LineType::PRINTABLE {
            if !styles.styles.contains_key(kind.style_name()) {
                tracing::warn!(
                    element = kind.style_name(),
                    "stylesheet has no style for element, falling back to default"
                );
            }
        }
        Ok(styles)
    }

    /// Style for an element type, or the fallback style when missing
    pub fn style_for(&self, kind: LineType) -> &RenderStyle {
        self.styles.get(kind.style_name()).unwrap_or(&self.fallback)
    }

    pub fn get(&self, name: &str) -> Option<&RenderStyle> {
        self.styles.get(&style_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_default_styles_cover_printable_types() {
        let styles = Styles::from_stylesheet(DEFAULT_STYLESHEET).unwrap();
        for kind in LineType::PRINTABLE {
            assert!(styles.get(kind.style_name()).is_some(), "{kind:?}");
        }
    }

    #[test]
    fn test_later_rules_refine() {
        let styles = Styles::default();
        let character = styles.style_for(LineType::Character);
        let more = styles.style_for(LineType::More);
        assert_eq!(character.margin_top, 1.0);
        assert_eq!(more.margin_top, 0.0);
        assert_eq!(more.margin_left, character.margin_left);
        assert!(styles.style_for(LineType::PageBreak).hidden);
    }

    #[test]
    fn test_widths() {
        let styles = Styles::default();
        let action = styles.style_for(LineType::Action);
        assert!((action.width(PaperSize::UsLetter) - 61.0 * 7.2).abs() < 0.001);
        assert!((action.width(PaperSize::A4) - 59.0 * 7.2).abs() < 0.001);
        let dual = styles.style_for(LineType::DualDialogue);
        assert_eq!(dual.width_a4, dual.width_us);
    }

    #[test]
    fn test_invalid_value() {
        let err = Styles::from_stylesheet("Action { text-align: sideways; }").unwrap_err();
        assert_eq!(
            err,
            StylesheetError::InvalidValue {
                property: "text-align".into(),
                value: "sideways".into(),
            }
        );
    }

    #[traced_test]
    #[test]
    fn test_missing_style_falls_back() {
        let styles = Styles::from_stylesheet("Action { margin-top: 3l; }").unwrap();
        assert_eq!(styles.style_for(LineType::Action).margin_top, 3.0);
        assert_eq!(styles.style_for(LineType::Dialogue).name, "default");
        assert!(logs_contain("stylesheet has no style for element"));
    }
}
