//! Default chart renderer: bar charts drawn as SVG and rasterized to PNG.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use resvg::usvg::fontdb::Database;
use tracing::info;
use tunisair_common::{is_delayed, Direction, FlightRecord};

use super::{ChartArtifact, ChartRenderer, ChartRequest};
use crate::aggregate::AggregationClient;
use crate::config::ReportConfig;
use crate::error::{BuildResult, ReportError};
use crate::render::canvas::{escape_xml, render_svg};
use crate::render::Color;
use crate::store::FlightStore;

pub const OVERVIEW_SIZE: (u32, u32) = (1040, 175);
pub const ROUTE_SIZE: (u32, u32) = (510, 230);

const MAX_OVERVIEW_FLIGHTS: usize = 24;
const MAX_ROUTES: usize = 8;
const DEPARTURE_FILL: &str = "#4FA3E0";

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewBar {
    pub flight: String,
    pub arrival: f64,
    pub departure: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteBar {
    pub route: String,
    pub average: f64,
    pub flights: usize,
}

/// Per-flight arrival and departure delays of the most delayed flights,
/// ordered by flight number. No-delay values plot as zero.
pub fn overview_bars(rows: &[FlightRecord]) -> Vec<OverviewBar> {
    let plotted = |delay: Option<f64>| if is_delayed(delay) { delay.unwrap_or(0.0).max(0.0) } else { 0.0 };

    let mut bars: Vec<OverviewBar> = rows
        .iter()
        .filter(|r| is_delayed(r.arrival_delay) || is_delayed(r.departure_delay))
        .map(|r| OverviewBar {
            flight: format!("{}{}", r.airline, r.flight_number),
            arrival: plotted(r.arrival_delay),
            departure: plotted(r.departure_delay),
        })
        .collect();

    bars.sort_by(|a, b| {
        b.arrival
            .max(b.departure)
            .total_cmp(&a.arrival.max(a.departure))
    });
    bars.truncate(MAX_OVERVIEW_FLIGHTS);
    bars.sort_by(|a, b| a.flight.cmp(&b.flight));
    bars
}

/// Average `direction` delay per airport pair for flights leaving one of
/// `from` for one of `to`, most delayed route first.
pub fn route_bars(rows: &[FlightRecord], direction: Direction, from: &[String], to: &[String]) -> Vec<RouteBar> {
    let mut routes: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for record in rows {
        if !from.contains(&record.departure_airport) || !to.contains(&record.arrival_airport) {
            continue;
        }
        let delay = record.delay(direction);
        if !is_delayed(delay) {
            continue;
        }
        let Some(delay) = delay else { continue };
        let entry = routes
            .entry(format!("{}-{}", record.departure_airport, record.arrival_airport))
            .or_insert((0.0, 0));
        entry.0 += delay;
        entry.1 += 1;
    }

    let mut bars: Vec<RouteBar> = routes
        .into_iter()
        .map(|(route, (total, flights))| RouteBar {
            route,
            average: total / flights as f64,
            flights,
        })
        .collect();
    bars.sort_by(|a, b| b.average.total_cmp(&a.average).then_with(|| a.route.cmp(&b.route)));
    bars.truncate(MAX_ROUTES);
    bars
}

/// Renders the three report charts from the flight store.
pub struct SvgChartRenderer<'a> {
    store: &'a dyn FlightStore,
    config: &'a ReportConfig,
    fontdb: Arc<Database>,
}

impl<'a> SvgChartRenderer<'a> {
    pub fn new(store: &'a dyn FlightStore, config: &'a ReportConfig, fontdb: Arc<Database>) -> Self {
        Self { store, config, fontdb }
    }

    fn client(&self) -> AggregationClient<'a> {
        AggregationClient::new(self.store, self.config.airline.clone())
    }

    fn output_path(&self, request: &ChartRequest) -> BuildResult<PathBuf> {
        std::fs::create_dir_all(&self.config.charts_dir)
            .map_err(|e| ReportError::resource(format!("charts directory {:?}", self.config.charts_dir), e))?;

        let slug = match (&request.direction, &request.from_region, &request.to_region) {
            (Some(direction), Some(from), Some(to)) => format!("{}_{}_{}", direction, from, to).to_lowercase(),
            _ => "overview".to_string(),
        };
        Ok(self
            .config
            .charts_dir
            .join(format!("{}_{}.png", request.date.format("%Y_%m_%d"), slug)))
    }

    fn overview_svg(&self, date: NaiveDate, bars: &[OverviewBar]) -> String {
        let (width, height) = OVERVIEW_SIZE;
        let (left, right, top, bottom) = (40.0, width as f32 - 10.0, 40.0, height as f32 - 22.0);
        let mut body = String::new();

        let _ = write!(
            body,
            r#"<text x="10" y="18" class="title">DELAYS OF {} (MINUTES)</text><rect x="{}" y="8" width="10" height="10" fill="{}"/><text x="{}" y="18" class="label">ARRIVAL</text><rect x="{}" y="8" width="10" height="10" fill="{}"/><text x="{}" y="18" class="label">DEPARTURE</text>"#,
            date.format("%d/%m/%Y"),
            right - 170.0,
            Color::Orange.as_svg(),
            right - 155.0,
            right - 90.0,
            DEPARTURE_FILL,
            right - 75.0,
        );

        if bars.is_empty() {
            let _ = write!(
                body,
                r#"<text x="{}" y="{}" class="title" text-anchor="middle">NO DELAYED FLIGHTS</text>"#,
                width / 2,
                height / 2 + 10
            );
            return self.document(width, height, &body);
        }

        let scale = bars
            .iter()
            .map(|b| b.arrival.max(b.departure))
            .fold(1.0, f64::max) as f32;
        let slot = (right - left) / bars.len() as f32;
        let bar_width = slot * 0.35;

        let _ = write!(
            body,
            r#"<line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" class="axis"/><text x="{}" y="{}" class="label" text-anchor="end">{:.0}</text>"#,
            left - 4.0,
            top + 4.0,
            scale,
        );

        for (i, bar) in bars.iter().enumerate() {
            let x = left + i as f32 * slot + slot * 0.15;
            for (offset, value, fill) in [
                (0.0, bar.arrival, Color::Orange.as_svg()),
                (bar_width, bar.departure, DEPARTURE_FILL),
            ] {
                let bar_height = (value as f32 / scale) * (bottom - top);
                let _ = write!(
                    body,
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                    x + offset,
                    bottom - bar_height,
                    bar_width,
                    bar_height,
                    fill
                );
            }
            let _ = write!(
                body,
                r#"<text x="{:.1}" y="{:.1}" class="label" text-anchor="middle">{}</text>"#,
                x + bar_width,
                bottom + 14.0,
                escape_xml(&bar.flight)
            );
        }

        self.document(width, height, &body)
    }

    fn route_svg(&self, request: &ChartRequest, direction: Direction, bars: &[RouteBar]) -> String {
        let (width, height) = ROUTE_SIZE;
        let (left, right, top, bottom) = (90.0, width as f32 - 50.0, 36.0, height as f32 - 10.0);
        let mut body = String::new();

        let _ = write!(
            body,
            r#"<text x="10" y="20" class="title">{} DELAYS {} TO {}</text>"#,
            direction,
            escape_xml(request.from_region.as_deref().unwrap_or("")),
            escape_xml(request.to_region.as_deref().unwrap_or("")),
        );

        if bars.is_empty() {
            let _ = write!(
                body,
                r#"<text x="{}" y="{}" class="title" text-anchor="middle">NO DELAYED FLIGHTS</text>"#,
                width / 2,
                height / 2 + 10
            );
            return self.document(width, height, &body);
        }

        let scale = bars.iter().map(|b| b.average).fold(1.0, f64::max) as f32;
        let row = ((bottom - top) / bars.len() as f32).min(24.0);
        let fill = match direction {
            Direction::Arrival => Color::Orange.as_svg(),
            Direction::Departure => DEPARTURE_FILL,
        };

        for (i, bar) in bars.iter().enumerate() {
            let y = top + i as f32 * row;
            let bar_width = (bar.average as f32 / scale) * (right - left);
            let _ = write!(
                body,
                r#"<text x="{:.1}" y="{:.1}" class="label" text-anchor="end">{}</text><rect x="{left}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{fill}"/><text x="{:.1}" y="{:.1}" class="label">{:.0}M ({})</text>"#,
                left - 6.0,
                y + row * 0.65,
                escape_xml(&bar.route),
                y + row * 0.15,
                bar_width,
                row * 0.7,
                left + bar_width + 4.0,
                y + row * 0.65,
                bar.average,
                bar.flights,
            );
        }

        self.document(width, height, &body)
    }

    fn document(&self, width: u32, height: u32, body: &str) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
<style>
.title {{ font-family: '{family}'; font-size: 14px; fill: #FFFFFF; }}
.label {{ font-family: '{family}'; font-size: 10px; fill: #FFFFFF; }}
.axis {{ stroke: #FFFFFF; stroke-width: 1; }}
</style>
<rect x="0" y="0" width="{width}" height="{height}" fill="#000000"/>
{body}
</svg>
"##,
            family = escape_xml(&self.config.fonts.normal),
        )
    }
}

impl ChartRenderer for SvgChartRenderer<'_> {
    fn render_chart(&self, request: &ChartRequest) -> BuildResult<ChartArtifact> {
        let client = self.client();
        let filter = client.day(request.date).excluding_cancelled();

        let svg = match (request.direction, &request.from_region, &request.to_region) {
            (Some(direction), Some(from), Some(to)) => {
                let rows = client.rows(filter.delayed(direction))?;
                let bars = route_bars(
                    &rows,
                    direction,
                    self.config.region_airports(from),
                    self.config.region_airports(to),
                );
                self.route_svg(request, direction, &bars)
            }
            _ => {
                let rows = client.rows(filter)?;
                self.overview_svg(request.date, &overview_bars(&rows))
            }
        };

        let path = self.output_path(request)?;
        render_svg(&svg, self.fontdb.clone())?
            .save_png(&path)
            .map_err(|e| ReportError::Render(format!("failed to save chart {:?}: {}", path, e)))?;

        info!("Rendered chart {:?}", path);
        Ok(ChartArtifact::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use resvg::tiny_skia::Pixmap;
    use tunisair_common::FlightStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 14).unwrap()
    }

    fn flight(number: &str, from: &str, to: &str, arrival: Option<f64>, departure: Option<f64>) -> FlightRecord {
        FlightRecord {
            departure_airport: from.to_string(),
            arrival_airport: to.to_string(),
            flight_number: number.to_string(),
            airline: "TU".to_string(),
            departure_date: date(),
            arrival_delay: arrival,
            departure_delay: departure,
            flight_status: FlightStatus::Landed,
        }
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_overview_bars_skip_on_time_flights() {
        let rows = vec![
            flight("9", "TUN", "CDG", Some(30.0), Some(0.0)),
            flight("1", "TUN", "ORY", None, None),
            flight("5", "DJE", "ORY", None, Some(12.0)),
        ];
        let bars = overview_bars(&rows);

        assert_eq!(
            bars,
            vec![
                OverviewBar { flight: "TU5".to_string(), arrival: 0.0, departure: 12.0 },
                OverviewBar { flight: "TU9".to_string(), arrival: 30.0, departure: 0.0 },
            ]
        );
    }

    #[test]
    fn test_route_bars_average_by_pair() {
        let rows = vec![
            flight("1", "TUN", "CDG", None, Some(10.0)),
            flight("2", "TUN", "CDG", None, Some(30.0)),
            flight("3", "DJE", "ORY", None, Some(50.0)),
            flight("4", "TUN", "FCO", None, Some(90.0)),
            flight("5", "CDG", "TUN", None, Some(70.0)),
        ];
        let bars = route_bars(
            &rows,
            Direction::Departure,
            &codes(&["TUN", "DJE"]),
            &codes(&["CDG", "ORY"]),
        );

        assert_eq!(
            bars,
            vec![
                RouteBar { route: "DJE-ORY".to_string(), average: 50.0, flights: 1 },
                RouteBar { route: "TUN-CDG".to_string(), average: 20.0, flights: 2 },
            ]
        );
    }

    #[test]
    fn test_render_chart_writes_sized_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ReportConfig {
            charts_dir: dir.path().join("charts"),
            ..ReportConfig::default()
        };
        let store = MemoryStore::new(vec![
            flight("123", "TUN", "CDG", Some(45.0), Some(20.0)),
            flight("456", "ORY", "TUN", Some(15.0), None),
        ]);
        let renderer = SvgChartRenderer::new(&store, &config, Arc::new(Database::new()));

        let overview = renderer.render_chart(&ChartRequest::overview(date())).unwrap();
        let route = renderer
            .render_chart(&ChartRequest::route(date(), Direction::Arrival, "FRANCE", "TUNISIA"))
            .unwrap();

        let overview_png = Pixmap::load_png(overview.path()).unwrap();
        assert_eq!((overview_png.width(), overview_png.height()), OVERVIEW_SIZE);
        assert!(route.path().ends_with("2023_03_14_arrival_france_tunisia.png"));
        let route_png = Pixmap::load_png(route.path()).unwrap();
        assert_eq!((route_png.width(), route_png.height()), ROUTE_SIZE);
    }
}
