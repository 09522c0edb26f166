use chrono::NaiveDate;
use tracing::info;
use tunisair_common::{airline_name, FlightRecord};

use super::LayoutCursor;
use crate::aggregate::AggregationClient;
use crate::error::{BuildResult, ReportError};
use crate::render::{draw_banner, Canvas, Color, FontFace, FontSpec, TextMeasure};

pub const ON_TIME_BANNER: &str = "ALL FLIGHTS ARE ON TIME";
pub const ON_TIME_PLACEHOLDER: &str = "----------";

/// Plane glyphs drawn either side of the worst-flight route line.
const DEPARTURE_GLYPH: &str = "Q";
const ARRIVAL_GLYPH: &str = "P";

#[derive(Debug, Clone, PartialEq)]
pub enum WorstFlight {
    None,
    Found(FlightRecord),
}

/// Look up the flight behind the day's maximum arrival delay.
///
/// Nothing is queried when the maximum is zero. Several flights may share the
/// maximum; whichever one the backend returns first is used.
pub fn select_worst_flight(
    client: &AggregationClient<'_>,
    max_arrival_delay: i64,
    date: NaiveDate,
) -> BuildResult<WorstFlight> {
    if max_arrival_delay <= 0 {
        return Ok(WorstFlight::None);
    }

    match client.worst_arrival(max_arrival_delay, date)? {
        Some(record) => Ok(WorstFlight::Found(record)),
        None => Err(ReportError::data(format!(
            "no {} flight on {} with an arrival delay of {}M",
            client.airline(),
            date,
            max_arrival_delay
        ))),
    }
}

pub fn route_line(record: &FlightRecord, delay: i64) -> String {
    format!(
        "{} -----Delay of {}M----> {}",
        record.departure_airport, delay, record.arrival_airport
    )
}

/// Centered worst-flight highlight, 125 px below `cursor`. Returns the
/// description handed back to the caller.
pub fn draw_worst_flight(
    canvas: &mut Canvas,
    metrics: &dyn TextMeasure,
    worst: &WorstFlight,
    max_arrival_delay: i64,
    cursor: LayoutCursor,
) -> String {
    let top = cursor.y + 125.0;
    let font = FontSpec::banner();
    let canvas_width = canvas.width() as f32;

    match worst {
        WorstFlight::None => {
            let label = metrics.measure(ON_TIME_BANNER, font);
            draw_banner(canvas, metrics, (canvas_width - label.width) / 2.0, top, ON_TIME_BANNER, "");

            let placeholder = metrics.measure(ON_TIME_PLACEHOLDER, font);
            canvas.draw_text(
                (canvas_width - placeholder.width) / 2.0,
                top + label.height + 10.0,
                ON_TIME_PLACEHOLDER,
                font,
                Color::White,
            );
            info!("No delayed arrival, all flights on time");
            ON_TIME_PLACEHOLDER.to_string()
        }
        WorstFlight::Found(record) => {
            let flight = format!("{} {}", airline_name(&record.airline), record.flight_number);
            let label = metrics.measure(&format!("WORST FLIGHT: {}", flight), font);
            draw_banner(canvas, metrics, (canvas_width - label.width) / 2.0, top, "WORST FLIGHT:", &flight);

            let line = route_line(record, max_arrival_delay);
            let line_size = metrics.measure(&line, font);
            let x = (canvas_width - line_size.width) / 2.0;
            let y = top + label.height + 15.0;
            let glyph = FontSpec::new(FontFace::Glyph, FontSpec::BANNER_SIZE);

            canvas.draw_text(x - 40.0, y, DEPARTURE_GLYPH, glyph, Color::White);
            canvas.draw_text(x, y, line.as_str(), font, Color::White);
            canvas.draw_text(x + line_size.width + 10.0, y, ARRIVAL_GLYPH, glyph, Color::White);

            info!("Worst flight: {} ({})", flight, line);
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontFamilies;
    use crate::render::fonts::testing::FixedAdvance;
    use crate::render::Element;
    use crate::store::MemoryStore;
    use tunisair_common::FlightStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 14).unwrap()
    }

    fn flight(number: &str, from: &str, to: &str, arrival: Option<f64>, status: FlightStatus) -> FlightRecord {
        FlightRecord {
            departure_airport: from.to_string(),
            arrival_airport: to.to_string(),
            flight_number: number.to_string(),
            airline: "TU".to_string(),
            departure_date: date(),
            arrival_delay: arrival,
            departure_delay: None,
            flight_status: status,
        }
    }

    fn texts(canvas: &Canvas) -> Vec<String> {
        canvas
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_zero_delay_is_on_time_without_querying() {
        let store = MemoryStore::default();
        let client = AggregationClient::new(&store, "TU");
        let worst = select_worst_flight(&client, 0, date()).unwrap();
        assert_eq!(worst, WorstFlight::None);

        let mut canvas = Canvas::new(FontFamilies::default(), Color::Black);
        let description = draw_worst_flight(&mut canvas, &FixedAdvance, &worst, 0, LayoutCursor::new(0.0, 95.0));

        assert_eq!(description, ON_TIME_PLACEHOLDER);
        let drawn = texts(&canvas);
        assert!(drawn.iter().any(|t| t == ON_TIME_BANNER));
        assert_eq!(drawn.last().map(String::as_str), Some(ON_TIME_PLACEHOLDER));
    }

    #[test]
    fn test_worst_flight_description() {
        let store = MemoryStore::new(vec![
            flight("123", "TUN", "CDG", Some(45.0), FlightStatus::Landed),
            flight("124", "TUN", "ORY", Some(80.0), FlightStatus::Cancelled),
        ]);
        let client = AggregationClient::new(&store, "TU");
        let worst = select_worst_flight(&client, 45, date()).unwrap();

        let mut canvas = Canvas::new(FontFamilies::default(), Color::Black);
        let description = draw_worst_flight(&mut canvas, &FixedAdvance, &worst, 45, LayoutCursor::new(0.0, 95.0));

        assert_eq!(description, "TUN -----Delay of 45M----> CDG");
        let drawn = texts(&canvas);
        assert!(drawn.contains(&"TUNISAIR 123".to_string()));
    }

    #[test]
    fn test_glyphs_flank_centered_route_line() {
        let record = flight("123", "TUN", "CDG", Some(45.0), FlightStatus::Landed);
        let mut canvas = Canvas::new(FontFamilies::default(), Color::Black);
        let line = draw_worst_flight(
            &mut canvas,
            &FixedAdvance,
            &WorstFlight::Found(record),
            45,
            LayoutCursor::new(0.0, 95.0),
        );

        let width = FixedAdvance.measure(&line, FontSpec::banner()).width;
        let x = (Canvas::WIDTH as f32 - width) / 2.0;
        let tail: Vec<(f32, String, FontFace)> = canvas.elements()[canvas.elements().len() - 3..]
            .iter()
            .map(|e| match e {
                Element::Text { x, text, font, .. } => (*x, text.clone(), font.face),
                other => panic!("unexpected element {:?}", other),
            })
            .collect();

        assert_eq!(
            tail,
            vec![
                (x - 40.0, "Q".to_string(), FontFace::Glyph),
                (x, line.clone(), FontFace::Normal),
                (x + width + 10.0, "P".to_string(), FontFace::Glyph),
            ]
        );
    }

    #[test]
    fn test_tied_maximum_selects_exactly_one() {
        let store = MemoryStore::new(vec![
            flight("123", "TUN", "CDG", Some(45.0), FlightStatus::Landed),
            flight("777", "DJE", "ORY", Some(45.0), FlightStatus::Landed),
        ]);
        let client = AggregationClient::new(&store, "TU");

        match select_worst_flight(&client, 45, date()).unwrap() {
            WorstFlight::Found(record) => assert!(["123", "777"].contains(&record.flight_number.as_str())),
            WorstFlight::None => panic!("expected a worst flight"),
        }
    }

    #[test]
    fn test_positive_maximum_without_record_is_error() {
        let store = MemoryStore::new(vec![flight("123", "TUN", "CDG", Some(10.0), FlightStatus::Landed)]);
        let client = AggregationClient::new(&store, "TU");

        let result = select_worst_flight(&client, 45, date());
        assert!(matches!(result, Err(ReportError::DataAccess(_))));
    }
}
