//! Analysis steps over the standard demand datasets.
//!
//! Each step takes one (or a few) tables from the registry and returns a
//! typed result. Column names follow the published CSV schemas. A step fails
//! as a whole only for schema or ordering problems; a metric that divides by
//! zero is recorded as [`Metric::Omitted`] and the step still returns.

use crate::growth::{
    column_cagr, column_change, column_total_growth, cumulative_growth_index, ensure_chronological,
    with_growth_column,
};
use crate::metric::Metric;
use crate::profile::{weekday_weekend_profile, HourBucket, LoadProfile, DEFAULT_WEEKEND_DAYS};
use crate::seasonal::{ensure_unique_keys, pivot, seasonal_index_with, GroupAverage, Pivot, SeasonalIndex, DEFAULT_TOP_N};
use crate::sector::{filter_eq, largest, sector_growth, sector_shares, SectorGrowth, Share};
use edm_core::units::{MillionUnits, RupeesPerUnit};
use edm_core::{EdmError, EdmResult, Scalar, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Tunables shared by the analysis steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Peak and low groups listed by the seasonal analysis.
    pub top_n: usize,
    pub weekend_days: Vec<String>,
    /// First and second year compared by the sector analysis.
    pub sector_years: [i64; 2],
    /// Used to derive peak demand when a projection table has none.
    pub load_factor: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            weekend_days: DEFAULT_WEEKEND_DAYS.iter().map(|d| d.to_string()).collect(),
            sector_years: [2025, 2030],
            load_factor: 0.75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoricalTrends {
    /// Input rows with `Demand_Growth_%` and `Cost_Growth_%` appended.
    pub table: Table,
    pub first_year: Option<i64>,
    pub last_year: Option<i64>,
    pub demand_cagr: Metric<f64>,
    pub cost_cagr: Metric<f64>,
    /// Last minus first `Peak_Demand_MW`.
    pub peak_demand_change_mw: Metric<f64>,
}

#[derive(Debug, Clone)]
pub struct SeasonalPatterns {
    pub index: SeasonalIndex,
    pub table: Table,
    /// Year x Month_Num demand, when both columns exist.
    pub heatmap: Option<Pivot>,
    pub variation_pct: Metric<f64>,
}

#[derive(Debug, Clone)]
pub struct SectorBreakdown {
    pub year_a: i64,
    pub year_b: i64,
    /// `Sector | Demand_MU | Share_%` for each year.
    pub breakdown_a: Table,
    pub breakdown_b: Table,
    /// Each sector's share of its year's total demand.
    pub shares_a: Metric<Vec<Share>>,
    pub shares_b: Metric<Vec<Share>>,
    pub growth: SectorGrowth,
}

#[derive(Debug, Clone)]
pub struct DailyLoad {
    pub profile: LoadProfile,
    pub table: Table,
    pub weekday_peak: Option<HourBucket>,
    pub weekend_peak: Option<HourBucket>,
}

#[derive(Debug, Clone)]
pub struct InfrastructureSummary {
    /// Input rows with `Renewable_Share_%` appended.
    pub table: Table,
    pub first_year: Option<i64>,
    pub last_year: Option<i64>,
    pub capacity_cagr: Metric<f64>,
    pub renewable_cagr: Metric<f64>,
    /// First minus last `T_D_Losses_%`, in percentage points.
    pub loss_reduction_pp: Metric<f64>,
    pub smart_meters_total: f64,
}

#[derive(Debug, Clone)]
pub struct ProjectionOutlook {
    /// Projections with growth and growth-index columns appended.
    pub table: Table,
    pub demand_cagr: Metric<f64>,
    pub cost_cagr: Metric<f64>,
}

#[derive(Debug, Clone)]
pub struct KeyIndicators {
    pub first_year: Option<i64>,
    pub last_year: Option<i64>,
    pub total_demand_growth: Metric<f64>,
    pub total_cost_increase: Metric<f64>,
    pub market_value_cagr: Metric<f64>,
    pub market_value_first: Metric<f64>,
    pub market_value_last: Metric<f64>,
    pub peak_demand_growth_mw: Metric<f64>,
    pub peak_month: Option<GroupAverage>,
    pub low_month: Option<GroupAverage>,
    pub seasonal_variation_pct: Metric<f64>,
    pub largest_sector: Option<Share>,
}

/// Stateless calculator for the demand analyses.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    options: AnalysisOptions,
}

impl MetricsEngine {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Year-over-year growth, CAGR and peak change for the historical table.
    pub fn historical_trends(&self, table: &Table) -> EdmResult<HistoricalTrends> {
        table.require_columns(&["Year", "Demand_MU", "Cost_Rs_per_unit", "Peak_Demand_MW"])?;
        ensure_chronological(table, "Year")?;
        let (first_year, last_year) = year_span(table)?;

        let enriched = with_growth_column(table.clone(), "Demand_MU", "Demand_Growth_%")?;
        let enriched = with_growth_column(enriched, "Cost_Rs_per_unit", "Cost_Growth_%")?;

        Ok(HistoricalTrends {
            demand_cagr: Metric::capture("demand CAGR", column_cagr(table, "Demand_MU"))?,
            cost_cagr: Metric::capture("cost CAGR", column_cagr(table, "Cost_Rs_per_unit"))?,
            peak_demand_change_mw: Metric::capture(
                "peak demand growth",
                column_change(table, "Peak_Demand_MW"),
            )?,
            table: enriched,
            first_year,
            last_year,
        })
    }

    /// Seasonal index by month across years, plus the Year x Month heatmap.
    pub fn seasonal_patterns(&self, table: &Table) -> EdmResult<SeasonalPatterns> {
        table.require_columns(&["Month", "Demand_MU"])?;
        if table.has_column("Year") {
            ensure_unique_keys(table, &["Year", "Month"])?;
        } else {
            ensure_unique_keys(table, &["Month"])?;
        }
        let index = seasonal_index_with(table, "Month", "Demand_MU", self.options.top_n)?;
        let index_table = index.to_table("seasonal_index", "Month", "Demand_MU")?;
        let heatmap = if table.has_column("Year") && table.has_column("Month_Num") {
            Some(pivot(table, "Year", "Month_Num", "Demand_MU")?)
        } else {
            debug!("'{}' has no Year/Month_Num, skipping heatmap", table.name());
            None
        };
        let variation_pct = Metric::capture("seasonal variation", index.variation_pct())?;
        Ok(SeasonalPatterns {
            index,
            table: index_table,
            heatmap,
            variation_pct,
        })
    }

    /// Sector split for the two configured years and growth between them.
    pub fn sector_breakdown(&self, table: &Table) -> EdmResult<SectorBreakdown> {
        table.require_columns(&["Year", "Sector", "Demand_MU"])?;
        let [year_a, year_b] = self.options.sector_years;
        let slice_a = year_slice(table, year_a)?;
        let slice_b = year_slice(table, year_b)?;

        let shares_a = Metric::capture(
            &format!("sector shares {year_a}"),
            sector_shares(&slice_a, "Sector", "Demand_MU"),
        )?;
        let shares_b = Metric::capture(
            &format!("sector shares {year_b}"),
            sector_shares(&slice_b, "Sector", "Demand_MU"),
        )?;
        let growth = sector_growth(&slice_a, &slice_b, "Sector", "Demand_MU")?;
        info!(
            "sector growth {}-{}: {} sectors compared, {} excluded",
            year_a,
            year_b,
            growth.rows.len(),
            growth.excluded.len()
        );

        Ok(SectorBreakdown {
            year_a,
            year_b,
            breakdown_a: breakdown_columns(&slice_a)?,
            breakdown_b: breakdown_columns(&slice_b)?,
            shares_a,
            shares_b,
            growth,
        })
    }

    /// Weekday and weekend hourly demand.
    pub fn daily_load(&self, table: &Table) -> EdmResult<DailyLoad> {
        let weekend: Vec<&str> = self.options.weekend_days.iter().map(String::as_str).collect();
        let profile = weekday_weekend_profile(table, "Day", "Hour", "Demand_MW", &weekend)?;
        Ok(DailyLoad {
            table: profile.to_table("daily_load_profile", "Hour", "Demand_MW")?,
            weekday_peak: profile.weekday.peak(),
            weekend_peak: profile.weekend.peak(),
            profile,
        })
    }

    /// Capacity growth, renewable share and loss reduction.
    pub fn infrastructure(&self, table: &Table) -> EdmResult<InfrastructureSummary> {
        table.require_columns(&[
            "Year",
            "Generation_Capacity_MW",
            "Renewable_Capacity_MW",
            "Smart_Meters_Deployed",
            "T_D_Losses_%",
        ])?;
        ensure_chronological(table, "Year")?;
        let (first_year, last_year) = year_span(table)?;

        let total = table.f64_values("Generation_Capacity_MW")?;
        let renewable = table.f64_values("Renewable_Capacity_MW")?;
        let share: Vec<Option<f64>> = total
            .iter()
            .zip(&renewable)
            .map(|(t, r)| match (t, r) {
                (Some(t), Some(r)) if *t != 0.0 => Some(r / t * 100.0),
                _ => None,
            })
            .collect();
        let smart_meters_total = table
            .f64_values("Smart_Meters_Deployed")?
            .into_iter()
            .flatten()
            .sum();

        Ok(InfrastructureSummary {
            capacity_cagr: Metric::capture(
                "generation capacity CAGR",
                column_cagr(table, "Generation_Capacity_MW"),
            )?,
            renewable_cagr: Metric::capture(
                "renewable capacity CAGR",
                column_cagr(table, "Renewable_Capacity_MW"),
            )?,
            loss_reduction_pp: Metric::capture(
                "T&D loss reduction",
                column_change(table, "T_D_Losses_%").map(|change| -change),
            )?,
            table: table.clone().with_computed_column("Renewable_Share_%", share)?,
            first_year,
            last_year,
            smart_meters_total,
        })
    }

    /// Growth columns, growth indices (first year = 100) and CAGRs for a
    /// projection table.
    pub fn projection_outlook(&self, table: &Table) -> EdmResult<ProjectionOutlook> {
        table.require_columns(&["Year", "Demand_MU", "Cost_Rs_per_unit"])?;
        ensure_chronological(table, "Year")?;
        let enriched = self.with_derived_projection_columns(table)?;
        let enriched = with_growth_column(enriched, "Demand_MU", "Demand_Growth_%")?;
        let enriched = with_growth_column(enriched, "Cost_Rs_per_unit", "Cost_Growth_%")?;
        let demand_index = Metric::capture(
            "demand index",
            cumulative_growth_index(&enriched, "Demand_MU", 100.0),
        )?;
        let cost_index = Metric::capture(
            "cost index",
            cumulative_growth_index(&enriched, "Cost_Rs_per_unit", 100.0),
        )?;
        let mut enriched = enriched;
        if let Metric::Value(index) = demand_index {
            enriched = enriched.with_computed_column("Demand_Index", index)?;
        }
        if let Metric::Value(index) = cost_index {
            enriched = enriched.with_computed_column("Cost_Index", index)?;
        }
        Ok(ProjectionOutlook {
            demand_cagr: Metric::capture("projected demand CAGR", column_cagr(table, "Demand_MU"))?,
            cost_cagr: Metric::capture(
                "projected cost CAGR",
                column_cagr(table, "Cost_Rs_per_unit"),
            )?,
            table: enriched,
        })
    }

    /// Headline indicators over projections, optionally enriched with a
    /// monthly pattern and a sector split.
    pub fn key_indicators(
        &self,
        projections: &Table,
        monthly: Option<&Table>,
        sectors: Option<&Table>,
    ) -> EdmResult<KeyIndicators> {
        projections.require_columns(&["Year", "Demand_MU", "Cost_Rs_per_unit"])?;
        ensure_chronological(projections, "Year")?;
        let (first_year, last_year) = year_span(projections)?;
        let projections = self.with_derived_projection_columns(projections)?;

        let market = projections.f64_values("Market_Value_Cr")?;
        let endpoint = |values: &[Option<f64>], last: bool, name: &str| -> EdmResult<f64> {
            let value = if last { values.last() } else { values.first() };
            value.copied().flatten().ok_or_else(|| EdmError::InsufficientData {
                metric: name.to_string(),
                needed: 1,
                found: 0,
            })
        };

        let (peak_month, low_month, seasonal_variation_pct) = match monthly {
            Some(monthly) => match self.seasonal_patterns(monthly) {
                Ok(patterns) => (
                    patterns.index.peak().cloned(),
                    patterns.index.low().cloned(),
                    patterns.variation_pct,
                ),
                Err(err) => {
                    warn!("monthly pattern left out of indicators: {err}");
                    (None, None, Metric::Omitted(err.to_string()))
                }
            },
            None => (
                None,
                None,
                Metric::Omitted("monthly data not available".into()),
            ),
        };

        let largest_sector = match sectors {
            Some(sectors) => {
                sectors.require_columns(&["Year", "Sector", "Demand_MU"])?;
                let first_year_sectors = match first_year {
                    Some(year) => filter_eq(sectors, "Year", &Scalar::Int(year))?,
                    None => sectors.clone(),
                };
                match sector_shares(&first_year_sectors, "Sector", "Demand_MU") {
                    Ok(shares) => largest(&shares).cloned(),
                    Err(err) if err.is_metric_local() => None,
                    Err(err) => return Err(err),
                }
            }
            None => None,
        };

        Ok(KeyIndicators {
            first_year,
            last_year,
            total_demand_growth: Metric::capture(
                "total demand growth",
                column_total_growth(&projections, "Demand_MU"),
            )?,
            total_cost_increase: Metric::capture(
                "total cost increase",
                column_total_growth(&projections, "Cost_Rs_per_unit"),
            )?,
            market_value_cagr: Metric::capture(
                "market value CAGR",
                column_cagr(&projections, "Market_Value_Cr"),
            )?,
            market_value_first: Metric::capture(
                "first market value",
                endpoint(market.as_slice(), false, "first market value"),
            )?,
            market_value_last: Metric::capture(
                "last market value",
                endpoint(market.as_slice(), true, "last market value"),
            )?,
            peak_demand_growth_mw: Metric::capture(
                "peak demand growth",
                column_change(&projections, "Peak_MW"),
            )?,
            peak_month,
            low_month,
            seasonal_variation_pct,
            largest_sector,
        })
    }

    /// Adds `Market_Value_Cr` and `Peak_MW` when a projection table lacks them.
    fn with_derived_projection_columns(&self, table: &Table) -> EdmResult<Table> {
        let mut table = table.clone();
        let demand = table.f64_values("Demand_MU")?;
        if !table.has_column("Market_Value_Cr") {
            let cost = table.f64_values("Cost_Rs_per_unit")?;
            let value = demand
                .iter()
                .zip(&cost)
                .map(|(d, c)| match (d, c) {
                    (Some(d), Some(c)) => {
                        Some(MillionUnits(*d).market_value(RupeesPerUnit(*c)).value())
                    }
                    _ => None,
                })
                .collect();
            table = table.with_computed_column("Market_Value_Cr", value)?;
        }
        if !table.has_column("Peak_MW") {
            let peak = demand
                .iter()
                .map(|d| d.map(|d| MillionUnits(d).implied_peak(self.options.load_factor).value()))
                .collect();
            table = table.with_computed_column("Peak_MW", peak)?;
        }
        Ok(table)
    }
}

fn year_span(table: &Table) -> EdmResult<(Option<i64>, Option<i64>)> {
    let years = table.i64_values("Year")?;
    Ok((
        years.first().copied().flatten(),
        years.last().copied().flatten(),
    ))
}

fn year_slice(table: &Table, year: i64) -> EdmResult<Table> {
    let slice = filter_eq(table, "Year", &Scalar::Int(year))?;
    if slice.is_empty() {
        return Err(EdmError::InsufficientData {
            metric: format!("sector data for {year}"),
            needed: 1,
            found: 0,
        });
    }
    Ok(slice)
}

fn breakdown_columns(slice: &Table) -> EdmResult<Table> {
    if slice.has_column("Share_%") {
        slice.select(&["Sector", "Demand_MU", "Share_%"])
    } else {
        slice.select(&["Sector", "Demand_MU"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sector::ExclusionReason;
    use polars::prelude::*;

    fn historical() -> Table {
        Table::new(
            "historical",
            df![
                "Year" => &[2020i64, 2021, 2022],
                "Demand_MU" => &[100.0, 110.0, 121.0],
                "Cost_Rs_per_unit" => &[4.0, 4.0, 4.0],
                "Peak_Demand_MW" => &[3000.0, 3100.0, 3350.0],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_historical_trends() {
        let trends = MetricsEngine::default().historical_trends(&historical()).unwrap();
        assert!((trends.demand_cagr.get().unwrap() - 10.0).abs() < 1e-9);
        assert!(trends.cost_cagr.get().unwrap().abs() < 1e-12);
        assert_eq!(trends.peak_demand_change_mw.get(), Some(350.0));
        assert_eq!(trends.first_year, Some(2020));
        assert_eq!(trends.last_year, Some(2022));
        assert!(trends.table.has_column("Demand_Growth_%"));
        assert!(trends.table.has_column("Cost_Growth_%"));
    }

    #[test]
    fn test_historical_zero_cost_omits_only_cost_cagr() {
        let table = Table::new(
            "historical",
            df![
                "Year" => &[2020i64, 2021],
                "Demand_MU" => &[100.0, 110.0],
                "Cost_Rs_per_unit" => &[0.0, 4.0],
                "Peak_Demand_MW" => &[3000.0, 3100.0],
            ]
            .unwrap(),
        );
        let trends = MetricsEngine::default().historical_trends(&table).unwrap();
        assert!(trends.cost_cagr.is_omitted());
        assert!(trends.demand_cagr.get().is_some());
    }

    #[test]
    fn test_historical_missing_column_fails() {
        let table = Table::new(
            "historical",
            df!["Year" => &[2020i64], "Demand_MU" => &[1.0]].unwrap(),
        );
        assert!(matches!(
            MetricsEngine::default().historical_trends(&table),
            Err(EdmError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_sector_breakdown_missing_year() {
        let table = Table::new(
            "sector_wise",
            df![
                "Year" => &[2025i64],
                "Sector" => &["Domestic"],
                "Demand_MU" => &[7000.0],
            ]
            .unwrap(),
        );
        let err = MetricsEngine::default().sector_breakdown(&table).unwrap_err();
        assert!(matches!(err, EdmError::InsufficientData { .. }));
    }

    #[test]
    fn test_sector_breakdown_zero_first_year_omits_shares() {
        let table = Table::new(
            "sector_wise",
            df![
                "Year" => &[2025i64, 2025, 2030, 2030],
                "Sector" => &["Domestic", "Industrial", "Domestic", "Industrial"],
                "Demand_MU" => &[0.0, 0.0, 8000.0, 6000.0],
            ]
            .unwrap(),
        );
        let breakdown = MetricsEngine::default().sector_breakdown(&table).unwrap();
        assert!(breakdown.shares_a.is_omitted());
        let shares_b = breakdown.shares_b.value().unwrap();
        assert_eq!(shares_b[0].key, "Domestic");
        assert!((shares_b[0].share_pct - 8000.0 / 14000.0 * 100.0).abs() < 1e-9);
        assert!(breakdown.growth.rows.is_empty());
        assert_eq!(breakdown.growth.excluded.len(), 2);
        assert!(breakdown
            .growth
            .excluded
            .iter()
            .all(|e| e.reason == ExclusionReason::ZeroBaseline));
    }

    #[test]
    fn test_key_indicators_tolerate_bad_monthly_data() {
        let projections = Table::new(
            "projections",
            df![
                "Year" => &[2025i64, 2026],
                "Demand_MU" => &[21361.0, 22245.35],
                "Cost_Rs_per_unit" => &[4.8, 4.97],
            ]
            .unwrap(),
        );
        let monthly = Table::new(
            "monthly_detailed",
            df![
                "Year" => &[2023i64, 2023],
                "Month" => &["January", "January"],
                "Demand_MU" => &[1700.0, 1750.0],
            ]
            .unwrap(),
        );
        let kpis = MetricsEngine::default()
            .key_indicators(&projections, Some(&monthly), None)
            .unwrap();
        assert!(kpis.peak_month.is_none());
        assert!(kpis.low_month.is_none());
        assert!(kpis.seasonal_variation_pct.is_omitted());
        assert!(kpis.total_demand_growth.get().is_some());
    }

    #[test]
    fn test_projection_outlook_derives_columns() {
        let table = Table::new(
            "projections",
            df![
                "Year" => &[2025i64, 2026],
                "Demand_MU" => &[21361.0, 22245.35],
                "Cost_Rs_per_unit" => &[4.8, 4.97],
            ]
            .unwrap(),
        );
        let outlook = MetricsEngine::default().projection_outlook(&table).unwrap();
        for column in ["Market_Value_Cr", "Peak_MW", "Demand_Index", "Cost_Index"] {
            assert!(outlook.table.has_column(column), "missing {column}");
        }
        assert!((outlook.demand_cagr.get().unwrap() - 4.14).abs() < 1e-3);
    }
}
