use chrono::NaiveDateTime;

use crate::render::{Canvas, Color, FontSpec};

pub const SCOPE_SUBTITLE: &str = "SCOPE FROM/TO Tunis-Carthage International Airport";

/// Header in the white band above the KPI area.
pub fn draw_titles(canvas: &mut Canvas, when: NaiveDateTime, airline_name: &str) {
    canvas.draw_text(
        55.0,
        60.0,
        format!("LAST UPDATE AT {}", when.format("%H:%M")),
        FontSpec::normal(9.0),
        Color::Black,
    );
    canvas.draw_text(
        260.0,
        10.0,
        format!("{} DAILY INGEST {}", airline_name, when.format("%d/%m/%Y")),
        FontSpec::normal(25.0),
        Color::Black,
    );
    canvas.draw_text(260.0, 50.0, SCOPE_SUBTITLE, FontSpec::normal(15.0), Color::Black);
}
