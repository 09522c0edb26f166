//! Aggregation client: typed KPI queries on top of a [`FlightStore`].

use chrono::NaiveDate;
use tracing::debug;
use tunisair_common::{Direction, FlightRecord, FlightStatus, StatisticOp};

use crate::error::{BuildResult, ReportError};
use crate::store::{FlightFilter, FlightStore, Query, QueryOutput};

/// Issues the report's queries for one operator airline.
pub struct AggregationClient<'a> {
    store: &'a dyn FlightStore,
    airline: String,
}

impl<'a> AggregationClient<'a> {
    pub fn new(store: &'a dyn FlightStore, airline: impl Into<String>) -> Self {
        Self {
            store,
            airline: airline.into(),
        }
    }

    pub fn airline(&self) -> &str {
        &self.airline
    }

    pub fn day(&self, date: NaiveDate) -> FlightFilter {
        FlightFilter::for_day(date, self.airline.clone())
    }

    /// `op` over the delays of non-cancelled flights delayed in `direction`,
    /// rounded; an empty aggregate is 0.
    pub fn statistic(&self, op: StatisticOp, direction: Direction, date: NaiveDate) -> BuildResult<i64> {
        let filter = self.day(date).delayed(direction);
        let value = self.scalar(Query::Aggregate { op, filter })?;
        debug!("{}({}) on {} = {}", op, direction, date, value);
        Ok(value)
    }

    /// Number of flights in `status` on `date`, cancelled ones included.
    pub fn status_count(&self, status: FlightStatus, date: NaiveDate) -> BuildResult<i64> {
        let filter = self.day(date).with_status(status);
        self.scalar(Query::Aggregate {
            op: StatisticOp::Count,
            filter,
        })
    }

    /// Any one non-cancelled flight whose arrival delay is `max_arrival_delay`.
    pub fn worst_arrival(&self, max_arrival_delay: i64, date: NaiveDate) -> BuildResult<Option<FlightRecord>> {
        let filter = self.day(date).delayed(Direction::Arrival);
        match self.store.execute(&Query::FindOne {
            filter,
            delay: max_arrival_delay,
        })? {
            QueryOutput::Row(row) => Ok(row),
            other => Err(unexpected("row", &other)),
        }
    }

    /// Raw rows for chart rendering.
    pub fn rows(&self, filter: FlightFilter) -> BuildResult<Vec<FlightRecord>> {
        match self.store.execute(&Query::Select { filter })? {
            QueryOutput::Rows(rows) => Ok(rows),
            other => Err(unexpected("rows", &other)),
        }
    }

    fn scalar(&self, query: Query) -> BuildResult<i64> {
        match self.store.execute(&query)? {
            QueryOutput::Scalar(value) => Ok(normalize(value)),
            other => Err(unexpected("scalar", &other)),
        }
    }
}

/// NULL becomes 0, everything else rounds half away from zero.
pub fn normalize(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() => v.round() as i64,
        _ => 0,
    }
}

fn unexpected(wanted: &str, got: &QueryOutput) -> ReportError {
    ReportError::data(format!("backend returned {:?} where a {} was expected", got, wanted))
}
