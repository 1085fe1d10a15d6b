//! Layout collaborators: fonts, text measurement and page geometry

pub mod font;
mod measure;
mod settings;

pub use font::{FontMetrics, COURIER_LINE_HEIGHT};
pub use measure::{Fragments, LineFragment, MonospaceMeasurer, TextMeasurer, LAYOUT_EPSILON};
pub use settings::{ExportSettings, PaperSize, SettingsError, COURIER_CHAR_WIDTH};
