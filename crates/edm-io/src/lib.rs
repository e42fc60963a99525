//! # edm-io: dataset catalog and table store
//!
//! Reads the demand CSV files into a [`TableStore`] and writes computed
//! tables back out. A missing file is not an error for the run as a whole:
//! [`TableStore::load_all`] logs it and leaves the key out of the registry.

pub mod catalog;
pub mod store;

pub use catalog::{schema_for, Catalog, CatalogEntry, DatasetSchema, SCHEMAS};
pub use store::{export_csv, read_table, TableStore};
