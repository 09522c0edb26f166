use chrono::NaiveDate;
use tunisair_common::{airline_name, FlightStatus};

use super::LayoutCursor;
use crate::aggregate::AggregationClient;
use crate::error::BuildResult;
use crate::render::{draw_banner, Canvas, TextMeasure};

/// Gap between two banners of the strip.
pub const STRIP_GAP: f32 = 10.0;

/// One `status: count` banner per flight status, left to right, 15 px below
/// `cursor`. Returns the cursor just past the last banner.
pub fn draw_status_strip(
    canvas: &mut Canvas,
    metrics: &dyn TextMeasure,
    client: &AggregationClient<'_>,
    date: NaiveDate,
    cursor: LayoutCursor,
) -> BuildResult<LayoutCursor> {
    let mut cursor = cursor.down(15.0);

    let title = format!("{} FLIGHTS", airline_name(client.airline()));
    let footprint = draw_banner(canvas, metrics, cursor.x, cursor.y, &title, "");
    cursor = cursor.advance(footprint.width + STRIP_GAP);

    for status in FlightStatus::ALL {
        let count = client.status_count(status, date)?;
        let footprint = draw_banner(canvas, metrics, cursor.x, cursor.y, &format!("{}:", status), count);
        cursor = cursor.advance(footprint.width + STRIP_GAP);
    }

    Ok(cursor)
}
