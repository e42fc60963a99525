//! # edm-report: text rendering of demand analytics
//!
//! [`ReportPrinter`] turns the results of [`edm_metrics::MetricsEngine`]
//! into aligned plain-text tables and summary lines. Rounding happens here
//! under a [`DisplayPolicy`]; nothing is written to stdout by this crate.

pub mod policy;
pub mod printer;

pub use policy::DisplayPolicy;
pub use printer::{ReportPrinter, FULL_SAMPLE_ROWS, HEAD_SAMPLE_ROWS};
