use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use tunisair_common::FlightRecord;

use super::{FlightStore, MemoryStore, Query, QueryOutput};
use crate::error::{BuildResult, ReportError};

/// Flight table loaded from a CSV export.
///
/// Header names follow the table columns (`DEPARTURE_AIRPORT`,
/// `ARRIVAL_DELAY`, ...); blank delay cells load as no delay.
pub struct CsvStore {
    path: PathBuf,
    table: MemoryStore,
}

impl CsvStore {
    pub fn open(path: impl AsRef<Path>) -> BuildResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path)
            .map_err(|e| ReportError::data(format!("cannot open flight table {:?}: {}", path, e)))?;

        let records = read_records(file)
            .map_err(|e| ReportError::data(format!("{:?}: {}", path, e)))?;
        info!("Loaded {} flight records from {:?}", records.len(), path);

        Ok(Self {
            path,
            table: MemoryStore::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FlightStore for CsvStore {
    fn execute(&self, query: &Query) -> BuildResult<QueryOutput> {
        debug!("Executing {:?} against {:?}", query, self.path);
        self.table.execute(query)
    }
}

/// Parse every row; the first malformed row fails the whole load.
pub fn read_records(reader: impl Read) -> Result<Vec<FlightRecord>, csv::Error> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use crate::store::FlightFilter;
    use chrono::NaiveDate;
    use tunisair_common::FlightStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 14).unwrap()
    }

    const HEADER: &str = "DEPARTURE_AIRPORT,ARRIVAL_AIRPORT,FLIGHT_NUMBER,AIRLINE,DEPARTURE_DATE,ARRIVAL_DELAY,DEPARTURE_DELAY,FLIGHT_STATUS";

    #[test]
    fn test_read_records_blank_delay_is_none() {
        let data = format!(
            "{}\nTUN,CDG,123,TU,2023-03-14,45,,landed\nDJE,ORY,8,TU,2023-03-14,,12.5,cancelled\n",
            HEADER
        );
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].arrival_delay, Some(45.0));
        assert_eq!(records[0].departure_delay, None);
        assert_eq!(records[1].flight_status, FlightStatus::Cancelled);
        assert_eq!(records[1].departure_delay, Some(12.5));
    }

    #[test]
    fn test_unknown_status_fails_load() {
        let data = format!("{}\nTUN,CDG,123,TU,2023-03-14,45,,boarding\n", HEADER);
        assert!(read_records(data.as_bytes()).is_err());
    }

    #[test]
    fn test_open_missing_file_is_data_error() {
        let result = CsvStore::open("/nonexistent/flights.csv");
        assert!(matches!(result, Err(ReportError::DataAccess(_))));
    }

    #[test]
    fn test_open_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "TUN,CDG,123,TU,2023-03-14,45,3,landed").unwrap();

        let store = CsvStore::open(file.path()).unwrap();
        assert_eq!(store.path(), file.path());
        match store.execute(&Query::Select { filter: FlightFilter::for_day(date(), "TU") }).unwrap() {
            QueryOutput::Rows(rows) => assert_eq!(rows.len(), 1),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_read_records_day_first_dates() {
        let data = format!(
            "{}\nTUN,CDG,123,TU,14/03/2023,45,,landed\nDJE,ORY,8,TU,01/12/2023,,5,scheduled\n",
            HEADER
        );
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records[0].departure_date, date());
        assert_eq!(records[1].departure_date, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
    }

    #[test]
    fn test_read_records_bad_date_fails_load() {
        let data = format!("{}\nTUN,CDG,123,TU,14.03.2023,45,,landed\n", HEADER);
        assert!(read_records(data.as_bytes()).is_err());
    }
}
