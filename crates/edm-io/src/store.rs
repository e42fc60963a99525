use crate::catalog::{schema_for, Catalog};
use edm_core::{EdmError, EdmResult, Table};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Dataset registry: one [`Table`] per key, kept in load order.
#[derive(Debug, Default, Clone)]
pub struct TableStore {
    tables: Vec<Table>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `source` under `key` and registers it.
    ///
    /// A missing file yields [`EdmError::MissingSource`] and leaves the
    /// registry untouched. A file that lacks a required column for a known
    /// key yields [`EdmError::MissingColumn`].
    pub fn load(&mut self, key: &str, source: &Path) -> EdmResult<&Table> {
        let table = read_table(key, source)?;
        Ok(self.insert(table))
    }

    /// Loads every catalog entry, skipping files that do not exist or cannot
    /// be read.
    ///
    /// Only a schema violation aborts the whole load.
    pub fn load_all(catalog: &Catalog) -> EdmResult<Self> {
        let mut store = Self::new();
        for entry in catalog.entries() {
            match store.load(&entry.key, &entry.path) {
                Ok(table) => info!(
                    "Loaded {} - shape ({}, {})",
                    entry.path.display(),
                    table.height(),
                    table.width()
                ),
                Err(EdmError::MissingSource { path, .. }) => {
                    warn!("{} not found, skipping dataset '{}'", path, entry.key);
                }
                Err(err @ EdmError::MissingColumn { .. }) => return Err(err),
                Err(err) => {
                    error!(
                        "failed to load dataset '{}' from {}: {}",
                        entry.key,
                        entry.path.display(),
                        err
                    );
                }
            }
        }
        info!("Successfully loaded {} datasets", store.len());
        Ok(store)
    }

    /// Registers a table under its own name, replacing any previous entry.
    pub fn insert(&mut self, table: Table) -> &Table {
        let index = match self.tables.iter().position(|t| t.name() == table.name()) {
            Some(index) => {
                debug!("replacing dataset '{}'", table.name());
                self.tables[index] = table;
                index
            }
            None => {
                self.tables.push(table);
                self.tables.len() - 1
            }
        };
        &self.tables[index]
    }

    pub fn get(&self, key: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == key)
    }

    /// Like [`TableStore::get`] but reports absence as [`EdmError::Unavailable`].
    pub fn require(&self, key: &str) -> EdmResult<&Table> {
        self.get(key)
            .ok_or_else(|| EdmError::Unavailable(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(Table::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Reads one CSV file into a [`Table`] named `key`.
pub fn read_table(key: &str, path: &Path) -> EdmResult<Table> {
    if !path.exists() {
        return Err(EdmError::MissingSource {
            dataset: key.to_string(),
            path: path.display().to_string(),
        });
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if extension != "csv" {
        return Err(EdmError::Other(format!(
            "unsupported file extension '{}' for {}; use .csv",
            extension,
            path.display()
        )));
    }

    let mut file = File::open(path)?;
    let frame = CsvReader::new(&mut file).has_header(true).finish()?;
    let table = Table::new(key, frame);
    if let Some(schema) = schema_for(key) {
        table.require_columns(schema.required_columns)?;
    }
    Ok(table)
}

/// Writes a table, computed columns included, as CSV.
pub fn export_csv(table: &Table, path: &Path) -> EdmResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut frame = table.frame().clone();
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut frame)?;
    debug!("exported '{}' to {}", table.name(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, HISTORICAL, SECTOR_WISE, WEATHER};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    const HISTORICAL_CSV: &str = "Year,Demand_MU,Cost_Rs_per_unit,Peak_Demand_MW\n\
2020,100,4.0,3000\n2021,110,4.2,3100\n2022,121,4.4,3300\n";

    #[test]
    fn test_missing_file_is_missing_source() {
        let dir = tempdir().unwrap();
        let mut store = TableStore::new();
        let err = store
            .load(HISTORICAL, &dir.path().join("absent.csv"))
            .unwrap_err();
        assert!(matches!(err, EdmError::MissingSource { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_registers_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        fs::write(&path, HISTORICAL_CSV).unwrap();
        let mut store = TableStore::new();
        let table = store.load(HISTORICAL, &path).unwrap();
        assert_eq!(table.height(), 3);
        assert!(store.contains(HISTORICAL));
        assert_eq!(store.require(HISTORICAL).unwrap().width(), 4);
    }

    #[test]
    fn test_schema_violation_names_column_and_dataset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        fs::write(&path, "Year,Demand_MU\n2020,100\n").unwrap();
        let err = read_table(HISTORICAL, &path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("historical"));
        assert!(msg.contains("Cost_Rs_per_unit"));
    }

    #[test]
    fn test_load_all_skips_missing_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("chennai_electricity_historical_2020_2024.csv"),
            HISTORICAL_CSV,
        )
        .unwrap();
        let store = TableStore::load_all(&Catalog::standard(dir.path())).unwrap();
        assert_eq!(store.len(), 1);
        assert!(matches!(
            store.require(SECTOR_WISE),
            Err(EdmError::Unavailable(_))
        ));
    }

    #[test]
    fn test_load_all_skips_unreadable_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("chennai_electricity_historical_2020_2024.csv"),
            HISTORICAL_CSV,
        )
        .unwrap();
        let mut weather = b"Date,Condition\n2023-01-01,".to_vec();
        weather.extend_from_slice(&[0xff, 0xfe, 0xfd, b'\n']);
        fs::write(dir.path().join("chennai_weather_data_2023_2025.csv"), weather).unwrap();
        let store = TableStore::load_all(&Catalog::standard(dir.path())).unwrap();
        assert!(store.contains(HISTORICAL));
        assert!(!store.contains(WEATHER));
    }

    #[test]
    fn test_load_all_skips_unsupported_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("weather.txt"), "Date\n2023-01-01\n").unwrap();
        let files = BTreeMap::from([(WEATHER.to_string(), "weather.txt".to_string())]);
        let catalog = Catalog::standard(dir.path()).with_overrides(dir.path(), &files);
        let store = TableStore::load_all(&catalog).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_all_fails_fast_on_schema_violation() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("chennai_electricity_historical_2020_2024.csv"),
            "Year,Demand_MU\n2020,100\n",
        )
        .unwrap();
        let err = TableStore::load_all(&Catalog::standard(dir.path())).unwrap_err();
        assert!(matches!(err, EdmError::MissingColumn { .. }));
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        fs::write(&path, HISTORICAL_CSV).unwrap();
        let mut store = TableStore::new();
        store.load(HISTORICAL, &path).unwrap();
        store.load(HISTORICAL, &path).unwrap();
        assert_eq!(store.keys().collect::<Vec<_>>(), vec![HISTORICAL]);
    }

    #[test]
    fn test_export_keeps_computed_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        fs::write(&path, HISTORICAL_CSV).unwrap();
        let table = read_table(HISTORICAL, &path)
            .unwrap()
            .with_computed_column("Demand_Growth_%", vec![None, Some(10.0), Some(10.0)])
            .unwrap();
        let out = dir.path().join("exports").join("historical.csv");
        export_csv(&table, &out).unwrap();
        let reread = read_table("exported", &out).unwrap();
        assert_eq!(reread.column_names(), table.column_names());
        assert_eq!(reread.height(), 3);
    }

    #[test]
    fn test_rejects_non_csv_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist.parquet");
        fs::write(&path, "not really parquet").unwrap();
        assert!(read_table(HISTORICAL, &path).is_err());
    }
}
