//! Report layout
//!
//! Every step takes the [`LayoutCursor`] produced by the step before it and
//! returns the one the next step starts from. A banner's width is always
//! measured before the cursor moves past it, which is what keeps adjacent
//! elements from overlapping.

pub mod kpi;
pub mod status;
pub mod titles;
pub mod worst;

pub use kpi::{draw_kpi_blocks, KpiSummary};
pub use status::draw_status_strip;
pub use titles::draw_titles;
pub use worst::{draw_worst_flight, select_worst_flight, WorstFlight, ON_TIME_PLACEHOLDER};

/// Left edge of the departure panel, the status strip and the charts.
pub const LEFT_MARGIN: f32 = 15.0;
/// Left edge of the arrival panel.
pub const ARRIVAL_PANEL_X: f32 = 580.0;
/// Top of the black KPI area.
pub const KPI_TOP: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub x: f32,
    pub y: f32,
}

impl LayoutCursor {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn advance(self, dx: f32) -> Self {
        Self::new(self.x + dx, self.y)
    }

    pub fn down(self, dy: f32) -> Self {
        Self::new(self.x, self.y + dy)
    }
}
