//! Chart images
//!
//! Charts are produced by a [`ChartRenderer`] as PNG files and handed over as
//! [`ChartArtifact`]s. An artifact is consumed by [`embed_chart`], which pastes
//! it and deletes the file; since the artifact is moved in, the same file can
//! never be embedded twice.

pub mod svg;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;
use tunisair_common::Direction;

use crate::error::{BuildResult, ReportError};
use crate::render::Canvas;

pub use svg::SvgChartRenderer;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub date: NaiveDate,
    /// `None` asks for the arrival/departure overview
    pub direction: Option<Direction>,
    pub from_region: Option<String>,
    pub to_region: Option<String>,
}

impl ChartRequest {
    pub fn overview(date: NaiveDate) -> Self {
        Self {
            date,
            direction: None,
            from_region: None,
            to_region: None,
        }
    }

    pub fn route(date: NaiveDate, direction: Direction, from: &str, to: &str) -> Self {
        Self {
            date,
            direction: Some(direction),
            from_region: Some(from.to_string()),
            to_region: Some(to.to_string()),
        }
    }
}

/// A rendered chart file waiting to be embedded.
#[derive(Debug)]
pub struct ChartArtifact {
    path: PathBuf,
}

impl ChartArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub trait ChartRenderer {
    fn render_chart(&self, request: &ChartRequest) -> BuildResult<ChartArtifact>;
}

/// Paste `artifact` with its top-left corner at `(x, y)`, then delete it.
pub fn embed_chart(canvas: &mut Canvas, x: f32, y: f32, artifact: ChartArtifact) -> BuildResult<()> {
    let path = artifact.path;
    let png = std::fs::read(&path).map_err(|e| ReportError::artifact(&path, e))?;
    let (width, height) = canvas
        .paste_png(x, y, png)
        .map_err(|e| ReportError::artifact(&path, e))?;

    std::fs::remove_file(&path).map_err(|e| ReportError::artifact(&path, format!("cannot delete: {}", e)))?;
    debug!("Embedded chart {:?} ({}x{}) at ({}, {})", path, width, height, x, y);
    Ok(())
}
