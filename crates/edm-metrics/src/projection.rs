//! Synthetic projection datasets from base-year values and growth rates.
//!
//! Produces the four tables the key indicators are computed from:
//! yearly projections, sector split, monthly pattern and 2030-style
//! scenarios. Stored values are rounded to two decimals (shares to one) the
//! same way the published CSVs are.

use edm_core::units::{MillionUnits, RupeesPerUnit};
use edm_core::{EdmError, EdmResult, Table};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorShare {
    pub sector: String,
    /// Fraction of total demand, 0.35 for 35%.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub demand_mu: f64,
    pub cost_rs_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    pub base_year: i64,
    pub horizon_year: i64,
    pub base_demand_mu: f64,
    pub base_cost_rs_per_unit: f64,
    /// Percent per year.
    pub demand_cagr_pct: f64,
    /// Percent per year.
    pub cost_cagr_pct: f64,
    pub load_factor: f64,
    pub sector_shares: Vec<SectorShare>,
    /// One factor per calendar month, January first.
    pub seasonal_factors: Vec<f64>,
    pub scenarios: Vec<Scenario>,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        let share = |sector: &str, share: f64| SectorShare {
            sector: sector.to_string(),
            share,
        };
        let scenario = |name: &str, demand_mu: f64, cost_rs_per_unit: f64| Scenario {
            name: name.to_string(),
            demand_mu,
            cost_rs_per_unit,
        };
        Self {
            base_year: 2025,
            horizon_year: 2030,
            base_demand_mu: 21361.0,
            base_cost_rs_per_unit: 4.80,
            demand_cagr_pct: 4.14,
            cost_cagr_pct: 3.5,
            load_factor: 0.75,
            sector_shares: vec![
                share("Domestic", 0.35),
                share("Commercial", 0.25),
                share("Industrial", 0.30),
                share("Agriculture", 0.05),
                share("Others", 0.05),
            ],
            seasonal_factors: vec![
                0.85, 0.82, 0.95, 1.15, 1.25, 1.20, 1.10, 1.05, 1.00, 0.95, 0.88, 0.90,
            ],
            scenarios: vec![
                scenario("Conservative", 25370.0, 5.43),
                scenario("Base Case", 26164.0, 5.70),
                scenario("Aggressive", 27263.0, 5.98),
            ],
        }
    }
}

impl ProjectionParams {
    pub fn validate(&self) -> EdmResult<()> {
        if self.horizon_year < self.base_year {
            return Err(EdmError::Config(format!(
                "horizon year {} precedes base year {}",
                self.horizon_year, self.base_year
            )));
        }
        if self.seasonal_factors.len() != MONTHS.len() {
            return Err(EdmError::Config(format!(
                "expected {} seasonal factors, found {}",
                MONTHS.len(),
                self.seasonal_factors.len()
            )));
        }
        if self.load_factor <= 0.0 || self.load_factor > 1.0 {
            return Err(EdmError::Config(format!(
                "load factor must be in (0, 1], found {}",
                self.load_factor
            )));
        }
        let share_total: f64 = self.sector_shares.iter().map(|s| s.share).sum();
        if (share_total - 1.0).abs() > 1e-6 {
            warn!("sector shares sum to {share_total:.4}, not 1.0");
        }
        Ok(())
    }
}

/// The generated tables, named by their registry key.
#[derive(Debug, Clone)]
pub struct GeneratedDatasets {
    pub projections: Table,
    pub sector: Table,
    pub monthly: Table,
    pub scenarios: Table,
}

impl GeneratedDatasets {
    /// Tables paired with the file names they are exported under.
    pub fn exports(&self) -> [(&Table, &'static str); 4] {
        [
            (&self.projections, "generated_projections.csv"),
            (&self.sector, "generated_sector_data.csv"),
            (&self.monthly, "generated_monthly_data.csv"),
            (&self.scenarios, "generated_scenarios.csv"),
        ]
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn generate(params: &ProjectionParams) -> EdmResult<GeneratedDatasets> {
    params.validate()?;
    let projections = projections_table(params)?;
    let sector = sector_table(params, &projections)?;
    let monthly = monthly_table(params)?;
    let scenarios = scenarios_table(params)?;
    info!(
        "generated {} projection years, {} sector rows, {} months, {} scenarios",
        projections.height(),
        sector.height(),
        monthly.height(),
        scenarios.height()
    );
    Ok(GeneratedDatasets {
        projections,
        sector,
        monthly,
        scenarios,
    })
}

fn projections_table(params: &ProjectionParams) -> EdmResult<Table> {
    let years: Vec<i64> = (params.base_year..=params.horizon_year).collect();
    let mut demand = Vec::with_capacity(years.len());
    let mut cost = Vec::with_capacity(years.len());
    let mut market_value = Vec::with_capacity(years.len());
    let mut peak = Vec::with_capacity(years.len());
    for year in &years {
        let elapsed = (year - params.base_year) as i32;
        let d = MillionUnits(
            params.base_demand_mu * (1.0 + params.demand_cagr_pct / 100.0).powi(elapsed),
        );
        let c = RupeesPerUnit(
            params.base_cost_rs_per_unit * (1.0 + params.cost_cagr_pct / 100.0).powi(elapsed),
        );
        demand.push(round_to(d.value(), 2));
        cost.push(round_to(c.value(), 2));
        market_value.push(round_to(d.market_value(c).value(), 2));
        peak.push(round_to(d.implied_peak(params.load_factor).value(), 2));
    }
    Table::from_series(
        "projections",
        vec![
            Series::new("Year", years),
            Series::new("Demand_MU", demand),
            Series::new("Cost_Rs_per_unit", cost),
            Series::new("Market_Value_Cr", market_value),
            Series::new("Peak_MW", peak),
        ],
    )
}

fn sector_table(params: &ProjectionParams, projections: &Table) -> EdmResult<Table> {
    let years = projections.i64_values("Year")?;
    let totals = projections.f64_required("Demand_MU")?;
    let mut year_col = Vec::new();
    let mut sector_col = Vec::new();
    let mut demand_col = Vec::new();
    let mut share_col = Vec::new();
    for (year, total) in years.into_iter().zip(totals) {
        let year = year.ok_or_else(|| EdmError::Computation("null projection year".into()))?;
        for share in &params.sector_shares {
            year_col.push(year);
            sector_col.push(share.sector.clone());
            demand_col.push(round_to(total * share.share, 2));
            share_col.push(round_to(share.share * 100.0, 1));
        }
    }
    Table::from_series(
        "sector",
        vec![
            Series::new("Year", year_col),
            Series::new("Sector", sector_col),
            Series::new("Demand_MU", demand_col),
            Series::new("Share_%", share_col),
        ],
    )
}

fn monthly_table(params: &ProjectionParams) -> EdmResult<Table> {
    let per_month = params.base_demand_mu / MONTHS.len() as f64;
    let demand: Vec<f64> = params
        .seasonal_factors
        .iter()
        .map(|factor| round_to(per_month * factor, 2))
        .collect();
    Table::from_series(
        "monthly",
        vec![
            Series::new("Month", MONTHS.to_vec()),
            Series::new("Month_Num", (1..=MONTHS.len() as i64).collect::<Vec<_>>()),
            Series::new("Demand_MU", demand),
            Series::new("Seasonal_Factor", params.seasonal_factors.clone()),
        ],
    )
}

fn scenarios_table(params: &ProjectionParams) -> EdmResult<Table> {
    let names: Vec<String> = params.scenarios.iter().map(|s| s.name.clone()).collect();
    let demand: Vec<f64> = params.scenarios.iter().map(|s| s.demand_mu).collect();
    let cost: Vec<f64> = params.scenarios.iter().map(|s| s.cost_rs_per_unit).collect();
    Table::from_series(
        "scenarios",
        vec![
            Series::new("Scenario", names),
            Series::new(&format!("Demand_MU_{}", params.horizon_year), demand),
            Series::new(&format!("Cost_Rs_per_unit_{}", params.horizon_year), cost),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projection_shape() {
        let data = generate(&ProjectionParams::default()).unwrap();
        assert_eq!(data.projections.height(), 6);
        assert_eq!(data.sector.height(), 30);
        assert_eq!(data.monthly.height(), 12);
        assert_eq!(data.scenarios.height(), 3);
        assert_eq!(
            data.scenarios.column_names(),
            vec!["Scenario", "Demand_MU_2030", "Cost_Rs_per_unit_2030"]
        );
    }

    #[test]
    fn test_base_year_values() {
        let data = generate(&ProjectionParams::default()).unwrap();
        let demand = data.projections.f64_required("Demand_MU").unwrap();
        let market = data.projections.f64_required("Market_Value_Cr").unwrap();
        let peak = data.projections.f64_required("Peak_MW").unwrap();
        assert_eq!(demand[0], 21361.0);
        assert_eq!(market[0], 1_025_328.0);
        assert!((peak[0] - 3251.29).abs() < 1e-9);
        assert!((demand[1] - 22245.35).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_pattern_follows_factors() {
        let data = generate(&ProjectionParams::default()).unwrap();
        let demand = data.monthly.f64_required("Demand_MU").unwrap();
        let may = demand[4];
        assert!((may - round_to(21361.0 / 12.0 * 1.25, 2)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = ProjectionParams::default();
        params.seasonal_factors.pop();
        assert!(matches!(generate(&params), Err(EdmError::Config(_))));

        let mut params = ProjectionParams::default();
        params.horizon_year = 2020;
        assert!(matches!(generate(&params), Err(EdmError::Config(_))));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3251.2937, 2), 3251.29);
        assert_eq!(round_to(35.04, 1), 35.0);
    }
}
