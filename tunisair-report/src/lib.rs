//! Daily Tunisair delay report: KPI banners, worst flight and charts composed
//! onto a single 1080×720 PNG.

pub mod aggregate;
pub mod charts;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod render;
pub mod report;
pub mod store;

pub use error::{BuildResult, ReportError};
pub use report::{ReportComposer, ReportResult};
