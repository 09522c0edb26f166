//! Flight-records backend
//!
//! The report engine never touches rows directly for its KPIs: it sends a
//! parameterized [`Query`] to a [`FlightStore`] and gets a scalar or a single
//! row back. Charts are the only consumer of raw rows ([`Query::Select`]).

pub mod csv_store;
pub mod memory;

use chrono::NaiveDate;
use tunisair_common::{is_delayed, Direction, FlightRecord, FlightStatus, StatisticOp};

use crate::error::BuildResult;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

/// Row filter shared by every query.
///
/// When `direction` is set only records with a real delay in that direction
/// match (blank and zero delays are dropped), and that direction's delay
/// column is the one aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightFilter {
    pub date: NaiveDate,
    pub airline: String,
    pub direction: Option<Direction>,
    pub status: Option<FlightStatus>,
    pub exclude_cancelled: bool,
}

impl FlightFilter {
    /// Every flight of `airline` departing on `date`.
    pub fn for_day(date: NaiveDate, airline: impl Into<String>) -> Self {
        Self {
            date,
            airline: airline.into(),
            direction: None,
            status: None,
            exclude_cancelled: false,
        }
    }

    /// Non-cancelled flights actually delayed in `direction`.
    pub fn delayed(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self.exclude_cancelled = true;
        self
    }

    pub fn excluding_cancelled(mut self) -> Self {
        self.exclude_cancelled = true;
        self
    }

    pub fn with_status(mut self, status: FlightStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, record: &FlightRecord) -> bool {
        if record.departure_date != self.date || record.airline != self.airline {
            return false;
        }
        if self.exclude_cancelled && record.is_cancelled() {
            return false;
        }
        if let Some(status) = self.status {
            if record.flight_status != status {
                return false;
            }
        }
        match self.direction {
            Some(direction) => is_delayed(record.delay(direction)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Single scalar over the filtered rows. MIN/MAX/AVG read the delay
    /// column of `filter.direction` and require it to be set.
    Aggregate { op: StatisticOp, filter: FlightFilter },
    /// First filtered row whose delay (in `filter.direction`) rounds to `delay`.
    FindOne { filter: FlightFilter, delay: i64 },
    /// All filtered rows, in store order.
    Select { filter: FlightFilter },
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// `None` is the SQL NULL of an aggregate over zero rows
    Scalar(Option<f64>),
    Row(Option<FlightRecord>),
    Rows(Vec<FlightRecord>),
}

/// Query executor backing a report build.
///
/// Implementations may be shared read-only between concurrent builds.
pub trait FlightStore: Send + Sync {
    fn execute(&self, query: &Query) -> BuildResult<QueryOutput>;
}
