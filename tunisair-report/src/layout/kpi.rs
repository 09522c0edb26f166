use chrono::NaiveDate;
use tracing::debug;
use tunisair_common::{Direction, StatisticOp};

use super::{LayoutCursor, ARRIVAL_PANEL_X, LEFT_MARGIN};
use crate::aggregate::AggregationClient;
use crate::error::BuildResult;
use crate::render::{draw_banner, Canvas, Color, TextMeasure};

const PANEL_WIDTH: f32 = 480.0;
const PANEL_RADIUS: f32 = 20.0;

/// What the rest of the build needs from the KPI panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSummary {
    pub cursor: LayoutCursor,
    pub max_arrival_delay: i64,
    pub delayed_arrivals: i64,
    pub delayed_departures: i64,
}

pub fn panel_x(direction: Direction) -> f32 {
    match direction {
        Direction::Arrival => ARRIVAL_PANEL_X,
        Direction::Departure => LEFT_MARGIN,
    }
}

/// Two outlined panels, one per direction, each holding a delayed-flights
/// counter and a MIN / MAX / AVG row chained by measured width.
///
/// `cursor.y` is the top of the status strip row; the returned cursor keeps
/// that `y` and carries the `x` reached by the last statistic drawn.
pub fn draw_kpi_blocks(
    canvas: &mut Canvas,
    metrics: &dyn TextMeasure,
    client: &AggregationClient<'_>,
    date: NaiveDate,
    cursor: LayoutCursor,
) -> BuildResult<KpiSummary> {
    for direction in Direction::ALL {
        let x = panel_x(direction);
        canvas.rounded_rect(
            x,
            cursor.y + 35.0,
            x + PANEL_WIDTH,
            cursor.y + 115.0,
            PANEL_RADIUS,
            Color::Orange,
        );
    }

    let mut summary = KpiSummary {
        cursor,
        max_arrival_delay: 0,
        delayed_arrivals: 0,
        delayed_departures: 0,
    };

    for direction in Direction::ALL {
        let mut row = LayoutCursor::new(panel_x(direction) + 50.0, cursor.y + 45.0);

        let count = client.statistic(StatisticOp::Count, direction, date)?;
        match direction {
            Direction::Arrival => summary.delayed_arrivals = count,
            Direction::Departure => summary.delayed_departures = count,
        }
        draw_banner(canvas, metrics, row.x + 30.0, row.y, &format!("DELAYED {}:", direction), count);

        row.y = cursor.y + 85.0;
        for op in StatisticOp::KPI_ROW {
            let value = client.statistic(op, direction, date)?;
            if op == StatisticOp::Max && direction == Direction::Arrival {
                summary.max_arrival_delay = value;
            }
            let footprint = draw_banner(canvas, metrics, row.x, row.y, &format!("{}:", op), format!("{}M", value));
            row = row.advance(footprint.width);
        }

        summary.cursor = LayoutCursor::new(row.x, cursor.y);
    }

    debug!(
        "KPI on {}: {} delayed arrivals (max {}M), {} delayed departures",
        date, summary.delayed_arrivals, summary.max_arrival_delay, summary.delayed_departures
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontFamilies;
    use crate::render::fonts::testing::FixedAdvance;
    use crate::render::{Element, FontSpec};
    use crate::store::MemoryStore;
    use tunisair_common::{FlightRecord, FlightStatus};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 14).unwrap()
    }

    fn flight(arrival: Option<f64>, departure: Option<f64>) -> FlightRecord {
        FlightRecord {
            departure_airport: "TUN".to_string(),
            arrival_airport: "CDG".to_string(),
            flight_number: "123".to_string(),
            airline: "TU".to_string(),
            departure_date: date(),
            arrival_delay: arrival,
            departure_delay: departure,
            flight_status: FlightStatus::Landed,
        }
    }

    fn white_texts(canvas: &Canvas) -> Vec<(f32, f32, String)> {
        canvas
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::Text {
                    x,
                    y,
                    text,
                    color: Color::White,
                    ..
                } => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect()
    }

    fn build(store: &MemoryStore) -> (Canvas, KpiSummary) {
        let client = AggregationClient::new(store, "TU");
        let mut canvas = Canvas::new(FontFamilies::default(), Color::Black);
        let summary = draw_kpi_blocks(&mut canvas, &FixedAdvance, &client, date(), LayoutCursor::new(700.0, 95.0)).unwrap();
        (canvas, summary)
    }

    #[test]
    fn test_no_delays_render_zeroes() {
        let store = MemoryStore::new(vec![flight(Some(0.0), None), flight(None, Some(0.0))]);
        let (canvas, summary) = build(&store);

        let values: Vec<String> = white_texts(&canvas).into_iter().map(|(_, _, t)| t).collect();
        assert_eq!(values, vec!["0", "0M", "0M", "0M", "0", "0M", "0M", "0M"]);
        assert_eq!(summary.max_arrival_delay, 0);
        assert_eq!(summary.delayed_arrivals, 0);
        assert_eq!(summary.delayed_departures, 0);
    }

    #[test]
    fn test_statistics_chain_by_measured_width() {
        let store = MemoryStore::new(vec![
            flight(Some(45.0), Some(10.0)),
            flight(Some(5.0), None),
        ]);
        let (canvas, summary) = build(&store);
        let advance = FixedAdvance::advance(FontSpec::banner());

        assert_eq!(summary.max_arrival_delay, 45);
        assert_eq!(summary.delayed_arrivals, 2);
        assert_eq!(summary.delayed_departures, 1);

        let arrival_labels: Vec<(f32, f32)> = canvas
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::Text {
                    x,
                    y,
                    text,
                    color: Color::Orange,
                    ..
                } if text.ends_with(':') && !text.starts_with("DELAYED") => Some((*x, *y)),
                _ => None,
            })
            .take(3)
            .collect();

        // "MIN: 5M" then "MAX: 45M" measured before the next label is placed
        let min_x = ARRIVAL_PANEL_X + 50.0 + 10.0;
        let max_x = min_x + 7.0 * advance;
        let avg_x = max_x + 8.0 * advance;
        assert_eq!(arrival_labels, vec![(min_x, 180.0), (max_x, 180.0), (avg_x, 180.0)]);

        // departure row ends after "MIN: 10M", "MAX: 10M", "AVG: 10M"
        let end_x = LEFT_MARGIN + 50.0 + 3.0 * 8.0 * advance;
        assert_eq!(summary.cursor, LayoutCursor::new(end_x, 95.0));
    }

    #[test]
    fn test_panels_and_counters_positions() {
        let store = MemoryStore::new(vec![flight(Some(12.0), None)]);
        let (canvas, _) = build(&store);

        let panels: Vec<f32> = canvas
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::RoundedRect { x0, y0, y1, .. } => {
                    assert_eq!((*y0, *y1), (130.0, 210.0));
                    Some(*x0)
                }
                _ => None,
            })
            .collect();
        assert_eq!(panels, vec![ARRIVAL_PANEL_X, LEFT_MARGIN]);

        let counter = white_texts(&canvas)[0].clone();
        let advance = FixedAdvance::advance(FontSpec::banner());
        // "DELAYED ARRIVAL:" anchored 30 px into the row, plus the banner inset
        assert_eq!(counter, (ARRIVAL_PANEL_X + 50.0 + 30.0 + 10.0 + 16.0 * advance, 140.0, "1".to_string()));
    }

    #[test]
    fn test_layout_is_repeatable() {
        let store = MemoryStore::new(vec![flight(Some(33.0), Some(7.0))]);
        let (first, a) = build(&store);
        let (second, b) = build(&store);

        assert_eq!(a, b);
        assert_eq!(first.elements(), second.elements());
    }
}
