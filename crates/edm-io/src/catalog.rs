//! Known datasets, their default file names and required columns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const HISTORICAL: &str = "historical";
pub const MONTHLY_DETAILED: &str = "monthly_detailed";
pub const PROJECTIONS: &str = "projections";
pub const SECTOR_WISE: &str = "sector_wise";
pub const DAILY_LOAD: &str = "daily_load";
pub const INFRASTRUCTURE: &str = "infrastructure";
pub const ECONOMIC: &str = "economic";
pub const WEATHER: &str = "weather";
pub const TARIFF: &str = "tariff";

/// Column contract for one dataset.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSchema {
    pub key: &'static str,
    pub default_file: &'static str,
    pub required_columns: &'static [&'static str],
}

/// Datasets in the order they are loaded and summarised.
pub const SCHEMAS: &[DatasetSchema] = &[
    DatasetSchema {
        key: HISTORICAL,
        default_file: "chennai_electricity_historical_2020_2024.csv",
        required_columns: &["Year", "Demand_MU", "Cost_Rs_per_unit", "Peak_Demand_MW"],
    },
    DatasetSchema {
        key: MONTHLY_DETAILED,
        default_file: "chennai_electricity_monthly_detailed_2023_2025.csv",
        required_columns: &["Year", "Month", "Month_Num", "Demand_MU"],
    },
    DatasetSchema {
        key: PROJECTIONS,
        default_file: "chennai_electricity_projections_2025_2030.csv",
        required_columns: &["Year", "Demand_MU", "Cost_Rs_per_unit"],
    },
    DatasetSchema {
        key: SECTOR_WISE,
        default_file: "chennai_electricity_sector_wise_2025_2030.csv",
        required_columns: &["Year", "Sector", "Demand_MU", "Share_%"],
    },
    DatasetSchema {
        key: DAILY_LOAD,
        default_file: "chennai_electricity_daily_load_profile.csv",
        required_columns: &["Day", "Hour", "Demand_MW"],
    },
    DatasetSchema {
        key: INFRASTRUCTURE,
        default_file: "chennai_electricity_infrastructure_2025_2030.csv",
        required_columns: &[
            "Year",
            "Generation_Capacity_MW",
            "Renewable_Capacity_MW",
            "Smart_Meters_Deployed",
            "T_D_Losses_%",
        ],
    },
    DatasetSchema {
        key: ECONOMIC,
        default_file: "chennai_economic_demographic_factors_2020_2030.csv",
        required_columns: &[],
    },
    DatasetSchema {
        key: WEATHER,
        default_file: "chennai_weather_data_2023_2025.csv",
        required_columns: &[],
    },
    DatasetSchema {
        key: TARIFF,
        default_file: "chennai_electricity_tariff_structure_2025_2030.csv",
        required_columns: &[],
    },
];

pub fn schema_for(key: &str) -> Option<&'static DatasetSchema> {
    SCHEMAS.iter().find(|schema| schema.key == key)
}

/// One dataset key bound to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub path: PathBuf,
}

/// The set of files a run tries to load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Every known dataset under `data_dir` with its default file name.
    pub fn standard(data_dir: &Path) -> Self {
        let entries = SCHEMAS
            .iter()
            .map(|schema| CatalogEntry {
                key: schema.key.to_string(),
                path: data_dir.join(schema.default_file),
            })
            .collect();
        Self { entries }
    }

    /// Replace file names for some keys; unknown keys are appended.
    pub fn with_overrides(mut self, data_dir: &Path, files: &BTreeMap<String, String>) -> Self {
        for (key, file) in files {
            let path = data_dir.join(file);
            match self.entries.iter_mut().find(|entry| &entry.key == key) {
                Some(entry) => entry.path = path,
                None => self.entries.push(CatalogEntry {
                    key: key.clone(),
                    path,
                }),
            }
        }
        self
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
