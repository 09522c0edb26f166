//! Canvas, fonts and the label/value banner every KPI is drawn with.

pub mod banner;
pub mod canvas;
pub mod fonts;

pub use banner::{draw_banner, BannerFootprint};
pub use canvas::{Canvas, Color, Element};
pub use fonts::{FontBook, FontFace, FontSpec, TextMeasure, TextSize};
