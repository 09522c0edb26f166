use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the flight-records table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FlightRecord {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub flight_number: String,
    pub airline: String,
    /// `DD/MM/YYYY` in the table export; ISO dates are accepted too
    #[serde(with = "departure_date_format")]
    pub departure_date: NaiveDate,
    /// Minutes; `None` when the source column was blank
    pub arrival_delay: Option<f64>,
    pub departure_delay: Option<f64>,
    pub flight_status: FlightStatus,
}

impl FlightRecord {
    pub fn is_cancelled(&self) -> bool {
        self.flight_status == FlightStatus::Cancelled
    }

    /// Delay column selected by `direction`.
    pub fn delay(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Arrival => self.arrival_delay,
            Direction::Departure => self.departure_delay,
        }
    }
}

mod departure_date_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .map_err(|e| de::Error::custom(format!("invalid departure date '{}': {}", raw, e)))
    }
}

/// A delay only counts when it is present and non-zero. Zero and blank both
/// mean "no delay" and must never enter an aggregate.
pub fn is_delayed(delay: Option<f64>) -> bool {
    matches!(delay, Some(v) if v != 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Arrival,
    Departure,
}

impl Direction {
    /// Panel order on the canvas.
    pub const ALL: [Direction; 2] = [Direction::Arrival, Direction::Departure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Arrival => "ARRIVAL",
            Direction::Departure => "DEPARTURE",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    Scheduled,
    Active,
    Landed,
    Cancelled,
}

impl FlightStatus {
    /// Order used by the status strip.
    pub const ALL: [FlightStatus; 4] = [
        FlightStatus::Scheduled,
        FlightStatus::Active,
        FlightStatus::Landed,
        FlightStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Active => "active",
            FlightStatus::Landed => "landed",
            FlightStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown flight status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatisticOp {
    Count,
    Min,
    Max,
    Avg,
}

impl StatisticOp {
    /// Statistics shown under each delayed counter, left to right.
    pub const KPI_ROW: [StatisticOp; 3] = [StatisticOp::Min, StatisticOp::Max, StatisticOp::Avg];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticOp::Count => "COUNT",
            StatisticOp::Min => "MIN",
            StatisticOp::Max => "MAX",
            StatisticOp::Avg => "AVG",
        }
    }
}

impl std::fmt::Display for StatisticOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display name for an IATA airline code, falling back to the code itself.
pub fn airline_name(code: &str) -> &str {
    match code {
        "TU" => "TUNISAIR",
        "BJ" => "NOUVELAIR",
        "UG" => "TUNISAIR EXPRESS",
        "AF" => "AIR FRANCE",
        _ => code,
    }
}
