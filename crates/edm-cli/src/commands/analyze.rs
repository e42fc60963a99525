use std::path::PathBuf;

use anyhow::{Context, Result};
use edm_cli::{DataArgs, EdmConfig};
use edm_core::{EdmError, EdmResult, Table};
use edm_io::{catalog, export_csv, Catalog, TableStore};
use edm_metrics::MetricsEngine;
use edm_report::ReportPrinter;
use tracing::{error, info, warn};

/// One independently reported part of the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Summary,
    Historical,
    Seasonal,
    Sectors,
    LoadProfile,
    Infrastructure,
    Outlook,
    Indicators,
}

impl Step {
    pub const REPORT: [Step; 8] = [
        Step::Summary,
        Step::Historical,
        Step::Seasonal,
        Step::Sectors,
        Step::LoadProfile,
        Step::Infrastructure,
        Step::Outlook,
        Step::Indicators,
    ];

    fn title(self) -> &'static str {
        match self {
            Step::Summary => "Dataset summary",
            Step::Historical => "Historical trends",
            Step::Seasonal => "Seasonal patterns",
            Step::Sectors => "Sector-wise consumption",
            Step::LoadProfile => "Daily load profile",
            Step::Infrastructure => "Infrastructure",
            Step::Outlook => "Projection outlook",
            Step::Indicators => "Key performance indicators",
        }
    }
}

pub fn handle(steps: &[Step], data: &DataArgs, config: &EdmConfig) -> Result<()> {
    let session = Session::open(data, config)?;
    let failed = session.run(steps);
    if failed > 0 {
        info!("{failed} of {} steps did not complete", steps.len());
    }
    Ok(())
}

struct Session {
    store: TableStore,
    engine: MetricsEngine,
    printer: ReportPrinter,
    export_dir: Option<PathBuf>,
}

impl Session {
    fn open(data: &DataArgs, config: &EdmConfig) -> Result<Self> {
        let data_dir = data
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.data.data_dir));
        let export_dir = data
            .export_dir
            .clone()
            .or_else(|| config.data.export_dir.as_ref().map(PathBuf::from));

        let catalog = Catalog::standard(&data_dir).with_overrides(&data_dir, &config.data.files);
        info!("Loading {} datasets from {}", catalog.len(), data_dir.display());
        let store = TableStore::load_all(&catalog)
            .with_context(|| format!("loading datasets from {}", data_dir.display()))?;
        if store.is_empty() {
            warn!("no datasets found in {}", data_dir.display());
        }

        Ok(Self {
            store,
            engine: MetricsEngine::new(config.analysis.clone()),
            printer: ReportPrinter::new(config.display.clone()),
            export_dir,
        })
    }

    /// Prints each step, continuing past failures. Returns how many failed.
    fn run(&self, steps: &[Step]) -> usize {
        let mut failed = 0;
        for step in steps {
            match self.render(*step) {
                Ok(text) => print!("{text}"),
                Err(err) => {
                    failed += 1;
                    if !matches!(err, EdmError::Unavailable(_)) {
                        error!("{} failed: {err}", step.title());
                    }
                    print!("{}", self.printer.unavailable(step.title(), &err));
                }
            }
        }
        failed
    }

    fn render(&self, step: Step) -> EdmResult<String> {
        match step {
            Step::Summary => {
                let mut out = self.printer.section("DATASET SUMMARY");
                if self.store.is_empty() {
                    out.push_str("No datasets loaded\n");
                }
                for table in self.store.iter() {
                    out.push_str(&self.printer.dataset_summary(table)?);
                    out.push('\n');
                }
                Ok(out)
            }
            Step::Historical => {
                let table = self.store.require(catalog::HISTORICAL)?;
                let trends = self.engine.historical_trends(table)?;
                let text = self.printer.historical(&trends)?;
                self.export(&trends.table, "historical_trends.csv");
                Ok(text)
            }
            Step::Seasonal => {
                let table = self.store.require(catalog::MONTHLY_DETAILED)?;
                let patterns = self.engine.seasonal_patterns(table)?;
                let text = self.printer.seasonal(&patterns)?;
                self.export(&patterns.table, "seasonal_index.csv");
                if let Some(heatmap) = &patterns.heatmap {
                    match heatmap.to_table("seasonal_heatmap") {
                        Ok(heatmap) => self.export(&heatmap, "seasonal_heatmap.csv"),
                        Err(err) => error!("could not build the seasonal heatmap table: {err}"),
                    }
                }
                Ok(text)
            }
            Step::Sectors => {
                let table = self.store.require(catalog::SECTOR_WISE)?;
                let breakdown = self.engine.sector_breakdown(table)?;
                let text = self.printer.sectors(&breakdown)?;
                if self.export_dir.is_some() {
                    match breakdown.growth.to_table(
                        "sector_growth",
                        "Sector",
                        &format!("Demand_MU_{}", breakdown.year_a),
                        &format!("Demand_MU_{}", breakdown.year_b),
                    ) {
                        Ok(growth) => self.export(&growth, "sector_growth.csv"),
                        Err(err) => error!("could not build the sector growth table: {err}"),
                    }
                }
                Ok(text)
            }
            Step::LoadProfile => {
                let table = self.store.require(catalog::DAILY_LOAD)?;
                let load = self.engine.daily_load(table)?;
                let text = self.printer.daily_load(&load)?;
                self.export(&load.table, "daily_load_profile.csv");
                Ok(text)
            }
            Step::Infrastructure => {
                let table = self.store.require(catalog::INFRASTRUCTURE)?;
                let infra = self.engine.infrastructure(table)?;
                let text = self.printer.infrastructure(&infra)?;
                self.export(&infra.table, "infrastructure_summary.csv");
                Ok(text)
            }
            Step::Outlook => {
                let table = self.store.require(catalog::PROJECTIONS)?;
                let outlook = self.engine.projection_outlook(table)?;
                let text = self.printer.projection_outlook(&outlook)?;
                self.export(&outlook.table, "projection_outlook.csv");
                Ok(text)
            }
            Step::Indicators => {
                let projections = self.store.require(catalog::PROJECTIONS)?;
                let kpis = self.engine.key_indicators(
                    projections,
                    self.store.get(catalog::MONTHLY_DETAILED),
                    self.store.get(catalog::SECTOR_WISE),
                )?;
                self.printer.key_indicators(&kpis)
            }
        }
    }

    /// Writes a computed table when an export directory is set. A failed
    /// export is logged and does not affect the printed step.
    fn export(&self, table: &Table, file_name: &str) {
        let Some(dir) = &self.export_dir else {
            return;
        };
        let path = dir.join(file_name);
        match export_csv(table, &path) {
            Ok(()) => info!("Exported {} rows to {}", table.height(), path.display()),
            Err(err) => error!("could not export {}: {err}", path.display()),
        }
    }
}
