//! # edm-core: shared types for electricity demand metrics
//!
//! The other crates in the workspace depend on three things from here:
//!
//! - [`Table`]: a dataset loaded under a registry key, backed by a polars
//!   `DataFrame`, with column accessors that name the dataset on failure.
//! - [`EdmError`] / [`EdmResult`]: one error type for loading, schema checks
//!   and metric computation.
//! - [`units`]: newtypes for MU, MW, Rs/unit and crores.
//!
//! ```
//! use edm_core::Table;
//! use polars::prelude::*;
//!
//! let frame = df!["Year" => &[2020i64, 2021], "Demand_MU" => &[100.0, 110.0]].unwrap();
//! let table = Table::new("historical", frame);
//! assert_eq!(table.f64_required("Demand_MU").unwrap(), vec![100.0, 110.0]);
//! ```

pub mod error;
pub mod table;
pub mod units;

pub use error::{EdmError, EdmResult};
pub use table::{Scalar, Table};
pub use units::{Crores, Megawatts, MillionUnits, RupeesPerUnit};
