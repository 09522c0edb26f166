use tunisair_common::{FlightRecord, StatisticOp};

use super::{FlightFilter, FlightStore, Query, QueryOutput};
use crate::error::{BuildResult, ReportError};

/// In-memory flight table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<FlightRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<FlightRecord>) -> Self {
        Self { records }
    }

    fn select<'a>(&'a self, filter: &'a FlightFilter) -> impl Iterator<Item = &'a FlightRecord> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    fn aggregate(&self, op: StatisticOp, filter: &FlightFilter) -> BuildResult<Option<f64>> {
        let delays = || -> BuildResult<Vec<f64>> {
            let direction = filter.direction.ok_or_else(|| {
                ReportError::data(format!("{} aggregate needs a delay direction", op))
            })?;
            Ok(self.select(filter).filter_map(|r| r.delay(direction)).collect())
        };

        let value = match op {
            StatisticOp::Count => Some(self.select(filter).count() as f64),
            StatisticOp::Min => delays()?.into_iter().reduce(f64::min),
            StatisticOp::Max => delays()?.into_iter().reduce(f64::max),
            StatisticOp::Avg => {
                let values = delays()?;
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
            }
        };
        Ok(value)
    }

    fn find_one(&self, filter: &FlightFilter, delay: i64) -> BuildResult<Option<FlightRecord>> {
        let direction = filter
            .direction
            .ok_or_else(|| ReportError::data("row lookup by delay needs a delay direction"))?;

        Ok(self
            .select(filter)
            .find(|r| r.delay(direction).map(|d| d.round() as i64) == Some(delay))
            .cloned())
    }
}

impl FlightStore for MemoryStore {
    fn execute(&self, query: &Query) -> BuildResult<QueryOutput> {
        match query {
            Query::Aggregate { op, filter } => self.aggregate(*op, filter).map(QueryOutput::Scalar),
            Query::FindOne { filter, delay } => self.find_one(filter, *delay).map(QueryOutput::Row),
            Query::Select { filter } => Ok(QueryOutput::Rows(self.select(filter).cloned().collect())),
        }
    }
}
