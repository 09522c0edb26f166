use super::canvas::{Canvas, Color};
use super::fonts::{FontFace, FontSpec, TextMeasure, TextSize};

/// Measured extent of a drawn banner, used to place the next element.
pub type BannerFootprint = TextSize;

/// Horizontal inset between the anchor and the label.
pub const BANNER_INSET: f32 = 10.0;

/// Draw a `label value` pair: accented label, white value right after it.
///
/// The label goes down twice: first in the inverted face in black as an
/// outline underlay, then in the normal face in orange on top. The returned
/// footprint is the measured size of `"{label} {value}"`.
pub fn draw_banner(
    canvas: &mut Canvas,
    metrics: &dyn TextMeasure,
    x: f32,
    y: f32,
    label: &str,
    value: impl std::fmt::Display,
) -> BannerFootprint {
    let normal = FontSpec::banner();
    let inverted = FontSpec::new(FontFace::Inverted, FontSpec::BANNER_SIZE);
    let value = value.to_string();

    canvas.draw_text(x + BANNER_INSET, y, label, inverted, Color::Black);
    let label_size = metrics.measure(label, inverted);
    canvas.draw_text(x + label_size.width + BANNER_INSET, y, value.as_str(), normal, Color::White);
    canvas.draw_text(x + BANNER_INSET, y, label, normal, Color::Orange);

    metrics.measure(&format!("{} {}", label, value), normal)
}
