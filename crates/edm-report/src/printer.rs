use crate::policy::DisplayPolicy;
use edm_core::{EdmError, EdmResult, Scalar, Table};
use edm_metrics::{
    DailyLoad, HistoricalTrends, HourBucket, InfrastructureSummary, KeyIndicators, Metric,
    ProjectionOutlook, SeasonalPatterns, SectorBreakdown, Share,
};
use std::fmt::Write as _;
use std::io::Write;
use tabwriter::TabWriter;

/// Tables with at most this many rows are printed in full by
/// [`ReportPrinter::dataset_summary`].
pub const FULL_SAMPLE_ROWS: usize = 10;
/// Rows shown for larger tables.
pub const HEAD_SAMPLE_ROWS: usize = 3;

/// Renders analysis results as plain text.
///
/// Every method returns the text instead of printing it, so the caller
/// decides where it goes.
#[derive(Debug, Clone, Default)]
pub struct ReportPrinter {
    policy: DisplayPolicy,
}

impl ReportPrinter {
    pub fn new(policy: DisplayPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DisplayPolicy {
        &self.policy
    }

    pub fn section(&self, title: &str) -> String {
        let rule = "=".repeat(title.len().max(40));
        format!("\n{rule}\n{title}\n{rule}\n")
    }

    /// Notice printed in place of a step whose input is missing or broken.
    pub fn unavailable(&self, step: &str, err: &EdmError) -> String {
        format!("{step}: unavailable ({err})\n")
    }

    /// `label: value` or `label: omitted (reason)`.
    pub fn metric(&self, label: &str, metric: &Metric<f64>, render: impl Fn(f64) -> String) -> String {
        match metric {
            Metric::Value(value) => format!("{label}: {}\n", render(*value)),
            Metric::Omitted(reason) => format!("{label}: omitted ({reason})\n"),
        }
    }

    /// Shape, columns and a sample of rows.
    pub fn dataset_summary(&self, table: &Table) -> EdmResult<String> {
        let mut out = String::new();
        let _ = writeln!(out, "Dataset: {}", table.name());
        let _ = writeln!(out, "Shape: {} rows x {} columns", table.height(), table.width());
        let _ = writeln!(out, "Columns: {}", table.column_names().join(", "));
        let sample = if table.height() <= FULL_SAMPLE_ROWS {
            table.clone()
        } else {
            table.head(HEAD_SAMPLE_ROWS)
        };
        if sample.height() < table.height() {
            let _ = writeln!(out, "First {} rows:", sample.height());
        }
        out.push_str(&self.table(&sample)?);
        Ok(out)
    }

    /// Every row of a table, tab-aligned. Floats follow the display policy.
    pub fn table(&self, table: &Table) -> EdmResult<String> {
        let header = table.column_names();
        let columns = header
            .iter()
            .map(|name| table.scalars(name))
            .collect::<EdmResult<Vec<_>>>()?;
        let rows = (0..table.height())
            .map(|row| columns.iter().map(|column| self.cell(&column[row])).collect())
            .collect();
        grid(&header, rows)
    }

    pub fn historical(&self, trends: &HistoricalTrends) -> EdmResult<String> {
        let span = year_span(trends.first_year, trends.last_year);
        let mut out = self.section(&format!("HISTORICAL TRENDS {span}"));
        out.push_str(&self.table(&trends.table)?);
        out.push('\n');
        out.push_str(&self.metric(&format!("Demand CAGR {span}"), &trends.demand_cagr, |v| {
            self.policy.percent(v)
        }));
        out.push_str(&self.metric(&format!("Cost CAGR {span}"), &trends.cost_cagr, |v| {
            self.policy.percent(v)
        }));
        out.push_str(&self.metric("Peak demand change", &trends.peak_demand_change_mw, |v| {
            format!("{} MW", self.policy.signed(v))
        }));
        Ok(out)
    }

    pub fn seasonal(&self, patterns: &SeasonalPatterns) -> EdmResult<String> {
        let mut out = self.section("SEASONAL PATTERNS");
        out.push_str(&self.table(&patterns.table)?);
        out.push('\n');
        let list = |groups: &[edm_metrics::GroupAverage]| {
            groups
                .iter()
                .map(|g| format!("{} ({} MU)", g.group, self.policy.number(g.mean)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "Peak months: {}", list(patterns.index.top.as_slice()));
        let _ = writeln!(out, "Low months: {}", list(patterns.index.bottom.as_slice()));
        out.push_str(&self.metric("Seasonal variation", &patterns.variation_pct, |v| {
            self.policy.percent(v)
        }));
        if let Some(heatmap) = &patterns.heatmap {
            out.push_str("\nDemand by year and month (MU):\n");
            out.push_str(&self.table(&heatmap.to_table("heatmap")?)?);
        }
        Ok(out)
    }

    pub fn sectors(&self, breakdown: &SectorBreakdown) -> EdmResult<String> {
        let (a, b) = (breakdown.year_a, breakdown.year_b);
        let mut out = self.section(&format!("SECTOR-WISE CONSUMPTION {a} vs {b}"));
        let _ = writeln!(out, "{a}:");
        out.push_str(&self.table(&breakdown.breakdown_a)?);
        out.push_str(&self.shares(&breakdown.shares_a));
        let _ = writeln!(out, "\n{b}:");
        out.push_str(&self.table(&breakdown.breakdown_b)?);
        out.push_str(&self.shares(&breakdown.shares_b));

        let _ = writeln!(out, "\nSector growth {a}-{b}:");
        let growth = breakdown.growth.to_table(
            "sector_growth",
            "Sector",
            &format!("Demand_MU_{a}"),
            &format!("Demand_MU_{b}"),
        )?;
        out.push_str(&self.table(&growth)?);
        for excluded in &breakdown.growth.excluded {
            let _ = writeln!(out, "Excluded {}: {}", excluded.key, excluded.reason);
        }
        Ok(out)
    }

    fn shares(&self, shares: &Metric<Vec<Share>>) -> String {
        match shares {
            Metric::Value(shares) => {
                let parts: Vec<String> = shares
                    .iter()
                    .map(|share| format!("{} {}", share.key, self.policy.percent(share.share_pct)))
                    .collect();
                format!("Shares: {}\n", parts.join(", "))
            }
            Metric::Omitted(reason) => format!("Shares: omitted ({reason})\n"),
        }
    }

    pub fn daily_load(&self, load: &DailyLoad) -> EdmResult<String> {
        let mut out = self.section("DAILY LOAD PROFILE");
        out.push_str(&self.table(&load.table)?);
        out.push('\n');
        let peak = |bucket: Option<HourBucket>| match bucket {
            Some(b) => format!("{:02}:00 ({} MW)", b.hour, self.policy.number(b.mean)),
            None => "no data".to_string(),
        };
        let _ = writeln!(out, "Weekday peak: {}", peak(load.weekday_peak));
        let _ = writeln!(out, "Weekend peak: {}", peak(load.weekend_peak));
        Ok(out)
    }

    pub fn infrastructure(&self, infra: &InfrastructureSummary) -> EdmResult<String> {
        let span = year_span(infra.first_year, infra.last_year);
        let mut out = self.section(&format!("INFRASTRUCTURE {span}"));
        out.push_str(&self.table(&infra.table)?);
        out.push('\n');
        out.push_str(&self.metric("Generation capacity CAGR", &infra.capacity_cagr, |v| {
            self.policy.percent(v)
        }));
        out.push_str(&self.metric("Renewable capacity CAGR", &infra.renewable_cagr, |v| {
            self.policy.percent(v)
        }));
        out.push_str(&self.metric("T&D loss reduction", &infra.loss_reduction_pp, |v| {
            format!("{} pp", self.policy.number(v))
        }));
        let _ = writeln!(out, "Smart meters deployed: {:.0}", infra.smart_meters_total);
        Ok(out)
    }

    pub fn projection_outlook(&self, outlook: &ProjectionOutlook) -> EdmResult<String> {
        let mut out = self.section("PROJECTION OUTLOOK");
        out.push_str(&self.table(&outlook.table)?);
        out.push('\n');
        out.push_str(&self.metric("Projected demand CAGR", &outlook.demand_cagr, |v| {
            self.policy.percent(v)
        }));
        out.push_str(&self.metric("Projected cost CAGR", &outlook.cost_cagr, |v| {
            self.policy.percent(v)
        }));
        Ok(out)
    }

    pub fn key_indicators(&self, kpis: &KeyIndicators) -> EdmResult<String> {
        let span = year_span(kpis.first_year, kpis.last_year);
        let mut out = self.section(&format!("KEY PERFORMANCE INDICATORS {span}"));
        let p = &self.policy;
        out.push_str(&self.metric("Total demand growth", &kpis.total_demand_growth, |v| {
            p.percent(v)
        }));
        out.push_str(&self.metric("Total cost increase", &kpis.total_cost_increase, |v| {
            p.percent(v)
        }));
        out.push_str(&self.metric("Market value CAGR", &kpis.market_value_cagr, |v| {
            p.percent(v)
        }));
        out.push_str(&self.metric(
            &format!("Market value {}", year_label(kpis.first_year)),
            &kpis.market_value_first,
            |v| p.money(v, " Cr"),
        ));
        out.push_str(&self.metric(
            &format!("Market value {}", year_label(kpis.last_year)),
            &kpis.market_value_last,
            |v| p.money(v, " Cr"),
        ));
        out.push_str(&self.metric("Peak demand growth", &kpis.peak_demand_growth_mw, |v| {
            format!("{} MW", p.signed(v))
        }));
        match (&kpis.peak_month, &kpis.low_month) {
            (Some(peak), Some(low)) => {
                let _ = writeln!(
                    out,
                    "Peak month: {} ({} MU), low month: {} ({} MU)",
                    peak.group,
                    p.number(peak.mean),
                    low.group,
                    p.number(low.mean)
                );
            }
            _ => out.push_str("Peak/low month: unavailable\n"),
        }
        out.push_str(&self.metric("Seasonal variation", &kpis.seasonal_variation_pct, |v| {
            p.percent(v)
        }));
        match &kpis.largest_sector {
            Some(share) => {
                let _ = writeln!(
                    out,
                    "Largest consumer sector: {} ({})",
                    share.key,
                    p.percent(share.share_pct)
                );
            }
            None => out.push_str("Largest consumer sector: unavailable\n"),
        }
        Ok(out)
    }

    fn cell(&self, scalar: &Scalar) -> String {
        match scalar {
            Scalar::Null => "-".to_string(),
            Scalar::Float(v) => self.policy.number(*v),
            other => other.to_string(),
        }
    }
}

fn year_label(year: Option<i64>) -> String {
    year.map_or_else(|| "?".to_string(), |y| y.to_string())
}

fn year_span(first: Option<i64>, last: Option<i64>) -> String {
    format!("({}-{})", year_label(first), year_label(last))
}

fn grid(header: &[String], rows: Vec<Vec<String>>) -> EdmResult<String> {
    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "{}", header.join("\t"))?;
    for row in rows {
        writeln!(writer, "{}", row.join("\t"))?;
    }
    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|err| EdmError::Other(format!("flushing table: {err}")))?;
    String::from_utf8(bytes).map_err(|err| EdmError::Other(format!("table text: {err}")))
}
