pub mod types;

pub use types::{airline_name, is_delayed, Direction, FlightRecord, FlightStatus, StatisticOp};
