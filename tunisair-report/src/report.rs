//! Daily report composition
//!
//! One call to [`ReportComposer::build`] draws the whole report onto a fresh
//! canvas in a fixed order and writes the PNG as its very last step.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use resvg::usvg::fontdb::Database;
use serde::{Deserialize, Serialize};
use tracing::info;
use tunisair_common::{airline_name, Direction};

use crate::aggregate::AggregationClient;
use crate::charts::{embed_chart, ChartRenderer, ChartRequest};
use crate::config::ReportConfig;
use crate::error::{BuildResult, ReportError};
use crate::layout::{
    draw_kpi_blocks, draw_status_strip, draw_titles, draw_worst_flight, select_worst_flight, LayoutCursor,
    KPI_TOP, LEFT_MARGIN,
};
use crate::render::{Canvas, Color, FontBook, TextMeasure};
use crate::store::FlightStore;

const LOGO_POSITION: (f32, f32) = (25.0, 7.0);
const CHART_TOP: f32 = 290.0;
const ROUTE_CHART_TOP: f32 = 470.0;
const ROUTE_CHART_RIGHT_X: f32 = 530.0;

/// Outcome of one build, consumed by whatever announces the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub path: PathBuf,
    pub delayed_arrivals: i64,
    pub delayed_departures: i64,
    pub max_arrival_delay: i64,
    pub worst_flight: String,
}

/// `{reports_dir}/{YYYY-MM}/{YYYY_MM_DD}_report.png`
pub fn report_path(reports_dir: &Path, date: NaiveDate) -> PathBuf {
    reports_dir
        .join(date.format("%Y-%m").to_string())
        .join(format!("{}_report.png", date.format("%Y_%m_%d")))
}

/// Charts in the order they are embedded, with their top-left corners.
pub fn chart_plan(date: NaiveDate) -> [(ChartRequest, (f32, f32)); 3] {
    [
        (ChartRequest::overview(date), (LEFT_MARGIN, CHART_TOP)),
        (
            ChartRequest::route(date, Direction::Departure, "TUNISIA", "FRANCE"),
            (LEFT_MARGIN, ROUTE_CHART_TOP),
        ),
        (
            ChartRequest::route(date, Direction::Arrival, "FRANCE", "TUNISIA"),
            (ROUTE_CHART_RIGHT_X, ROUTE_CHART_TOP),
        ),
    ]
}

pub struct ReportComposer<'a> {
    config: &'a ReportConfig,
    store: &'a dyn FlightStore,
    charts: &'a dyn ChartRenderer,
    metrics: &'a dyn TextMeasure,
    fontdb: Arc<Database>,
}

impl<'a> ReportComposer<'a> {
    pub fn new(
        config: &'a ReportConfig,
        store: &'a dyn FlightStore,
        charts: &'a dyn ChartRenderer,
        fonts: &'a FontBook,
    ) -> Self {
        Self::with_metrics(config, store, charts, fonts, fonts.database())
    }

    /// Compose with any text measurer; `fontdb` is what the final
    /// rasterization resolves font families against.
    pub fn with_metrics(
        config: &'a ReportConfig,
        store: &'a dyn FlightStore,
        charts: &'a dyn ChartRenderer,
        metrics: &'a dyn TextMeasure,
        fontdb: Arc<Database>,
    ) -> Self {
        Self {
            config,
            store,
            charts,
            metrics,
            fontdb,
        }
    }

    /// Build the report for the day of `when`; `when` also stamps the
    /// "last update" line.
    pub fn build(&self, when: NaiveDateTime) -> BuildResult<ReportResult> {
        let date = when.date();

        // resources first, so nothing is drawn for a build that cannot finish
        let output_path = self.prepare_output(date)?;
        let logo = std::fs::read(&self.config.logo_path)
            .map_err(|e| ReportError::resource(format!("logo {:?}", self.config.logo_path), e))?;

        let mut canvas = Canvas::new(self.config.fonts.clone(), Color::White);
        canvas
            .paste_png(LOGO_POSITION.0, LOGO_POSITION.1, logo)
            .map_err(|e| ReportError::resource(format!("logo {:?}", self.config.logo_path), e))?;

        draw_titles(&mut canvas, when, airline_name(&self.config.airline));
        canvas.fill_rect(
            0.0,
            KPI_TOP,
            canvas.width() as f32,
            canvas.height() as f32,
            Color::Black,
        );

        let client = AggregationClient::new(self.store, self.config.airline.clone());
        let cursor = draw_status_strip(
            &mut canvas,
            self.metrics,
            &client,
            date,
            LayoutCursor::new(LEFT_MARGIN, KPI_TOP),
        )?;
        let kpi = draw_kpi_blocks(&mut canvas, self.metrics, &client, date, cursor)?;

        let worst = select_worst_flight(&client, kpi.max_arrival_delay, date)?;
        let worst_flight = draw_worst_flight(&mut canvas, self.metrics, &worst, kpi.max_arrival_delay, kpi.cursor);

        for (request, (x, y)) in chart_plan(date) {
            let artifact = self.charts.render_chart(&request)?;
            embed_chart(&mut canvas, x, y, artifact)?;
        }
        canvas.rounded_rect(
            LEFT_MARGIN,
            CHART_TOP,
            canvas.width() as f32 - 20.0,
            canvas.height() as f32 - 15.0,
            20.0,
            Color::Orange,
        );

        canvas.save_png(&output_path, self.fontdb.clone())?;
        info!("Daily report created for {}", date.format("%Y_%m_%d"));

        Ok(ReportResult {
            path: output_path,
            delayed_arrivals: kpi.delayed_arrivals,
            delayed_departures: kpi.delayed_departures,
            max_arrival_delay: kpi.max_arrival_delay,
            worst_flight,
        })
    }

    fn prepare_output(&self, date: NaiveDate) -> BuildResult<PathBuf> {
        let path = report_path(&self.config.reports_dir, date);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ReportError::resource(format!("report directory {:?}", dir), e))?;
        }
        Ok(path)
    }
}
