//! # edm-metrics: demand analytics
//!
//! Growth rates, seasonal indices, sector comparisons and load profiles
//! over [`edm_core::Table`]s, plus the [`MetricsEngine`] that runs them
//! against the standard demand datasets and the synthetic projection
//! generator.
//!
//! ```
//! use edm_metrics::compound_annual_growth_rate;
//!
//! let rate = compound_annual_growth_rate(100.0, 121.0, 2).unwrap();
//! assert!((rate - 10.0).abs() < 1e-9);
//! ```

pub mod analysis;
pub mod growth;
pub mod metric;
pub mod profile;
pub mod projection;
pub mod seasonal;
pub mod sector;

pub use analysis::{
    AnalysisOptions, DailyLoad, HistoricalTrends, InfrastructureSummary, KeyIndicators,
    MetricsEngine, ProjectionOutlook, SeasonalPatterns, SectorBreakdown,
};
pub use growth::{
    column_cagr, column_change, column_total_growth, compound_annual_growth_rate,
    cumulative_growth_index, ensure_chronological, period_over_period_growth, total_growth,
    with_growth_column,
};
pub use metric::Metric;
pub use profile::{weekday_weekend_profile, HourBucket, HourlyProfile, LoadProfile};
pub use projection::{generate, GeneratedDatasets, ProjectionParams, Scenario, SectorShare};
pub use seasonal::{ensure_unique_keys, pivot, seasonal_index, seasonal_index_with, GroupAverage, Pivot, SeasonalIndex};
pub use sector::{filter_eq, largest, sector_growth, sector_shares, ExcludedKey, ExclusionReason, KeyGrowth, SectorGrowth, Share};
