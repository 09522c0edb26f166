//! Font resolution and text measurement.
//!
//! Fonts are discovered in the configured fonts directory with `fontdb` (the
//! same database later handed to resvg for rasterization), and measured with
//! `fontdue` so that layout and rendering agree on glyph advances.

use std::path::Path;
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use resvg::usvg::fontdb::{self, Database, Family};
use tracing::{debug, info};

use crate::config::FontFamilies;
use crate::error::{BuildResult, ReportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Normal,
    /// Outline weight drawn under accent labels
    Inverted,
    /// Pictogram font, used for the plane glyphs
    Glyph,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub face: FontFace,
    pub size: f32,
}

impl FontSpec {
    pub const BANNER_SIZE: f32 = 15.0;

    pub const fn new(face: FontFace, size: f32) -> Self {
        Self { face, size }
    }

    pub const fn normal(size: f32) -> Self {
        Self::new(FontFace::Normal, size)
    }

    pub const fn banner() -> Self {
        Self::normal(Self::BANNER_SIZE)
    }
}

/// Rendered size of a string in pixels; `height` includes the descent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

/// Deterministic text measurement.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: FontSpec) -> TextSize;
}

struct LoadedFace {
    family: String,
    font: Font,
}

/// The three faces a report uses, plus the database they were found in.
pub struct FontBook {
    database: Arc<Database>,
    normal: LoadedFace,
    inverted: LoadedFace,
    glyph: LoadedFace,
}

impl FontBook {
    /// Load every font under `fonts_dir` and resolve the configured families.
    pub fn load(fonts_dir: impl AsRef<Path>, families: &FontFamilies) -> BuildResult<Self> {
        let fonts_dir = fonts_dir.as_ref();
        if !fonts_dir.is_dir() {
            return Err(ReportError::resource(
                format!("fonts directory {:?}", fonts_dir),
                "not a directory",
            ));
        }

        let mut database = Database::new();
        database.load_fonts_dir(fonts_dir);
        debug!("Loaded {} font faces from {:?}", database.len(), fonts_dir);

        let normal = resolve_face(&database, &families.normal)?;
        let inverted = resolve_face(&database, &families.inverted)?;
        let glyph = resolve_face(&database, &families.glyph)?;
        info!(
            "Fonts resolved: normal '{}', inverted '{}', glyph '{}'",
            normal.family, inverted.family, glyph.family
        );

        Ok(Self {
            database: Arc::new(database),
            normal,
            inverted,
            glyph,
        })
    }

    pub fn database(&self) -> Arc<Database> {
        self.database.clone()
    }

    fn face(&self, face: FontFace) -> &LoadedFace {
        match face {
            FontFace::Normal => &self.normal,
            FontFace::Inverted => &self.inverted,
            FontFace::Glyph => &self.glyph,
        }
    }
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, spec: FontSpec) -> TextSize {
        let font = &self.face(spec.face).font;
        let px = spec.size;

        let (ascent, descent) = font
            .horizontal_line_metrics(px)
            .map(|m| (m.ascent, -m.descent))
            .unwrap_or((px, 0.0));

        let mut width = 0.0f32;
        let mut ink_bottom = 0.0f32;
        let mut previous: Option<char> = None;
        for ch in text.chars() {
            if let Some(prev) = previous {
                width += font.horizontal_kern(prev, ch, px).unwrap_or(0.0);
            }
            let metrics = font.metrics(ch, px);
            width += metrics.advance_width;
            ink_bottom = ink_bottom.max(ascent - metrics.ymin as f32);
            previous = Some(ch);
        }

        TextSize {
            width: width.ceil(),
            height: (ink_bottom + descent).ceil(),
        }
    }
}

fn resolve_face(database: &Database, family: &str) -> BuildResult<LoadedFace> {
    let families = [Family::Name(family)];
    let query = fontdb::Query {
        families: &families,
        ..fontdb::Query::default()
    };

    let id = database
        .query(&query)
        .ok_or_else(|| ReportError::resource(format!("font '{}'", family), "family not found"))?;

    let font = database
        .with_face_data(id, |data, index| {
            Font::from_bytes(
                data,
                FontSettings {
                    collection_index: index,
                    ..FontSettings::default()
                },
            )
        })
        .ok_or_else(|| ReportError::resource(format!("font '{}'", family), "face data unavailable"))?
        .map_err(|e| ReportError::resource(format!("font '{}'", family), e))?;

    Ok(LoadedFace {
        family: family.to_string(),
        font,
    })
}
