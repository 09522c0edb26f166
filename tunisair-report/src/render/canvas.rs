//! Report canvas
//!
//! Drawing calls append elements to an in-memory scene; the scene is turned
//! into an SVG document and rasterized with resvg only when the report is
//! saved, so a failed build never leaves a half-drawn file behind.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use resvg::tiny_skia::{self, Pixmap};
use resvg::usvg::{fontdb::Database, Options, Tree};

use super::fonts::{FontFace, FontSpec};
use crate::config::FontFamilies;
use crate::error::{BuildResult, ReportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
    Orange,
}

impl Color {
    pub fn as_svg(&self) -> &'static str {
        match self {
            Color::White => "#FFFFFF",
            Color::Black => "#000000",
            Color::Orange => "#FFA500",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `(x, y)` is the top-left of the text line
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontSpec,
        color: Color,
    },
    Rect {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        fill: Color,
    },
    RoundedRect {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        radius: f32,
        outline: Color,
    },
    Image {
        x: f32,
        y: f32,
        width: u32,
        height: u32,
        png: Vec<u8>,
    },
}

/// Fixed-size drawing surface owned by exactly one report build.
pub struct Canvas {
    width: u32,
    height: u32,
    background: Color,
    families: FontFamilies,
    elements: Vec<Element>,
}

impl Canvas {
    pub const WIDTH: u32 = 1080;
    pub const HEIGHT: u32 = 720;

    pub fn new(families: FontFamilies, background: Color) -> Self {
        Self::with_size(Self::WIDTH, Self::HEIGHT, families, background)
    }

    pub fn with_size(width: u32, height: u32, families: FontFamilies, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            families,
            elements: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn draw_text(&mut self, x: f32, y: f32, text: impl Into<String>, font: FontSpec, color: Color) {
        self.elements.push(Element::Text {
            x,
            y,
            text: text.into(),
            font,
            color,
        });
    }

    pub fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, fill: Color) {
        self.elements.push(Element::Rect { x0, y0, x1, y1, fill });
    }

    pub fn rounded_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, radius: f32, outline: Color) {
        self.elements.push(Element::RoundedRect {
            x0,
            y0,
            x1,
            y1,
            radius,
            outline,
        });
    }

    /// Paste an encoded PNG with its top-left corner at `(x, y)`.
    /// Returns the pasted size.
    pub fn paste_png(&mut self, x: f32, y: f32, png: Vec<u8>) -> Result<(u32, u32), String> {
        let decoded = Pixmap::decode_png(&png).map_err(|e| e.to_string())?;
        let (width, height) = (decoded.width(), decoded.height());
        self.elements.push(Element::Image {
            x,
            y,
            width,
            height,
            png,
        });
        Ok((width, height))
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            svg,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width,
            self.height,
            self.background.as_svg()
        );

        for element in &self.elements {
            match element {
                Element::Text { x, y, text, font, color } => {
                    let _ = writeln!(
                        svg,
                        r#"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="{}" fill="{}" dominant-baseline="text-before-edge" xml:space="preserve">{}</text>"#,
                        x,
                        y,
                        escape_xml(self.family(font.face)),
                        font.size,
                        color.as_svg(),
                        escape_xml(text)
                    );
                }
                Element::Rect { x0, y0, x1, y1, fill } => {
                    let _ = writeln!(
                        svg,
                        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                        x0,
                        y0,
                        x1 - x0,
                        y1 - y0,
                        fill.as_svg()
                    );
                }
                Element::RoundedRect {
                    x0,
                    y0,
                    x1,
                    y1,
                    radius,
                    outline,
                } => {
                    let _ = writeln!(
                        svg,
                        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{r}" ry="{r}" fill="none" stroke="{}" stroke-width="1"/>"#,
                        x0,
                        y0,
                        x1 - x0,
                        y1 - y0,
                        outline.as_svg(),
                        r = radius
                    );
                }
                Element::Image {
                    x,
                    y,
                    width,
                    height,
                    png,
                } => {
                    let _ = writeln!(
                        svg,
                        r#"<image x="{:.1}" y="{:.1}" width="{}" height="{}" xlink:href="data:image/png;base64,{}"/>"#,
                        x,
                        y,
                        width,
                        height,
                        STANDARD.encode(png)
                    );
                }
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    pub fn rasterize(&self, fontdb: Arc<Database>) -> BuildResult<Pixmap> {
        render_svg(&self.to_svg(), fontdb)
    }

    /// Rasterize and write the PNG; the only point where the report touches disk.
    pub fn save_png(&self, output_path: &Path, fontdb: Arc<Database>) -> BuildResult<()> {
        let pixmap = self.rasterize(fontdb)?;
        pixmap
            .save_png(output_path)
            .map_err(|e| ReportError::Render(format!("failed to save {:?}: {}", output_path, e)))
    }

    fn family(&self, face: FontFace) -> &str {
        match face {
            FontFace::Normal => &self.families.normal,
            FontFace::Inverted => &self.families.inverted,
            FontFace::Glyph => &self.families.glyph,
        }
    }
}

/// Render an SVG document to a pixmap of the document's size.
pub fn render_svg(svg_content: &str, fontdb: Arc<Database>) -> BuildResult<Pixmap> {
    let mut options = Options::default();
    options.fontdb = fontdb;

    let tree = Tree::from_str(svg_content, &options)
        .map_err(|e| ReportError::Render(format!("failed to parse SVG: {}", e)))?;

    let size = tree.size();
    let mut pixmap = Pixmap::new(size.width() as u32, size.height() as u32)
        .ok_or_else(|| ReportError::Render("failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap)
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_png(width: u32, height: u32) -> Vec<u8> {
        Pixmap::new(width, height).unwrap().encode_png().unwrap()
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("TUN -----> CDG"), "TUN -----&gt; CDG");
        assert_eq!(escape_xml("a & 'b'"), "a &amp; &apos;b&apos;");
    }

    #[test]
    fn test_paste_png_reports_size() {
        let mut canvas = Canvas::new(FontFamilies::default(), Color::White);
        let size = canvas.paste_png(15.0, 290.0, blank_png(40, 20)).unwrap();

        assert_eq!(size, (40, 20));
        assert!(matches!(canvas.elements()[0], Element::Image { width: 40, height: 20, .. }));
    }

    #[test]
    fn test_paste_garbage_fails() {
        let mut canvas = Canvas::new(FontFamilies::default(), Color::White);
        assert!(canvas.paste_png(0.0, 0.0, b"not a png".to_vec()).is_err());
        assert!(canvas.elements().is_empty());
    }

    #[test]
    fn test_rasterize_shapes_without_fonts() {
        let mut canvas = Canvas::new(FontFamilies::default(), Color::White);
        canvas.fill_rect(0.0, 80.0, 1080.0, 720.0, Color::Black);
        canvas.rounded_rect(15.0, 290.0, 1060.0, 705.0, 20.0, Color::Orange);
        canvas.draw_text(10.0, 10.0, "TUN -----> CDG", FontSpec::banner(), Color::White);

        let pixmap = canvas.rasterize(Arc::new(Database::new())).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (Canvas::WIDTH, Canvas::HEIGHT));

        let top = pixmap.pixel(5, 5).unwrap();
        let bottom = pixmap.pixel(5, 700).unwrap();
        assert_eq!((top.red(), top.green(), top.blue()), (255, 255, 255));
        assert_eq!((bottom.red(), bottom.green(), bottom.blue()), (0, 0, 0));
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        let canvas = Canvas::with_size(64, 32, FontFamilies::default(), Color::Black);

        canvas.save_png(&path, Arc::new(Database::new())).unwrap();
        let decoded = Pixmap::load_png(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }
}
