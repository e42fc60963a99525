//! Seasonal indices and period pivots.

use edm_core::{EdmError, EdmResult, Scalar, Table};
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

/// Number of peak and low groups reported when not configured.
pub const DEFAULT_TOP_N: usize = 3;

pub const SEASONAL_INDEX_COLUMN: &str = "Seasonal_Index";

#[derive(Debug, Clone, PartialEq)]
pub struct GroupAverage {
    pub group: String,
    pub mean: f64,
    pub index: f64,
}

/// Per-group averages normalised by the mean of those averages.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalIndex {
    /// Groups in order of first appearance.
    pub groups: Vec<GroupAverage>,
    pub top: Vec<GroupAverage>,
    pub bottom: Vec<GroupAverage>,
    pub overall_mean: f64,
}

impl SeasonalIndex {
    /// `group_column | value_column (mean) | Seasonal_Index`
    pub fn to_table(&self, name: &str, group_column: &str, value_column: &str) -> EdmResult<Table> {
        Self::rows_to_table(&self.groups, name, group_column, value_column)
    }

    pub fn rows_to_table(
        rows: &[GroupAverage],
        name: &str,
        group_column: &str,
        value_column: &str,
    ) -> EdmResult<Table> {
        let groups: Vec<String> = rows.iter().map(|g| g.group.clone()).collect();
        let means: Vec<f64> = rows.iter().map(|g| g.mean).collect();
        let indices: Vec<f64> = rows.iter().map(|g| g.index).collect();
        Table::from_series(
            name,
            vec![
                Series::new(group_column, groups),
                Series::new(value_column, means),
                Series::new(SEASONAL_INDEX_COLUMN, indices),
            ],
        )
    }

    pub fn peak(&self) -> Option<&GroupAverage> {
        self.top.first()
    }

    pub fn low(&self) -> Option<&GroupAverage> {
        self.bottom.first()
    }

    /// Peak-to-low spread in percent, `(peak / low - 1) * 100`.
    pub fn variation_pct(&self) -> EdmResult<f64> {
        match (self.peak(), self.low()) {
            (Some(peak), Some(low)) if low.mean != 0.0 => Ok((peak.mean / low.mean - 1.0) * 100.0),
            (Some(_), Some(_)) => Err(EdmError::DivisionByZero("seasonal variation".into())),
            _ => Err(EdmError::InsufficientData {
                metric: "seasonal variation".into(),
                needed: 1,
                found: 0,
            }),
        }
    }
}

/// [`seasonal_index_with`] reporting [`DEFAULT_TOP_N`] peak and low groups.
pub fn seasonal_index(table: &Table, group_column: &str, value_column: &str) -> EdmResult<SeasonalIndex> {
    seasonal_index_with(table, group_column, value_column, DEFAULT_TOP_N)
}

/// Average of `value_column` per `group_column`, divided by the mean of the
/// group averages. Null keys and null values are ignored.
pub fn seasonal_index_with(
    table: &Table,
    group_column: &str,
    value_column: &str,
    top_n: usize,
) -> EdmResult<SeasonalIndex> {
    let keys = table.str_values(group_column)?;
    let values = table.f64_values(value_column)?;

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        let (Some(key), Some(value)) = (key, value) else {
            continue;
        };
        let entry = sums.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (0.0, 0)
        });
        entry.0 += value;
        entry.1 += 1;
    }
    if order.is_empty() {
        return Err(EdmError::InsufficientData {
            metric: format!("seasonal index of {value_column} by {group_column}"),
            needed: 1,
            found: 0,
        });
    }

    let means: Vec<(String, f64)> = order
        .into_iter()
        .map(|key| {
            let (sum, count) = sums[&key];
            (key, sum / count as f64)
        })
        .collect();
    let overall_mean = means.iter().map(|(_, mean)| mean).sum::<f64>() / means.len() as f64;
    if overall_mean == 0.0 {
        return Err(EdmError::DivisionByZero(format!(
            "seasonal index of {value_column}"
        )));
    }

    let groups: Vec<GroupAverage> = means
        .into_iter()
        .map(|(group, mean)| GroupAverage {
            group,
            mean,
            index: mean / overall_mean,
        })
        .collect();

    let mut ranked = groups.clone();
    ranked.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(Ordering::Equal));
    let top = ranked.into_iter().take(top_n).collect();
    let mut ranked = groups.clone();
    ranked.sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap_or(Ordering::Equal));
    let bottom = ranked.into_iter().take(top_n).collect();

    Ok(SeasonalIndex {
        groups,
        top,
        bottom,
        overall_mean,
    })
}

/// Fails with [`EdmError::DuplicateKey`] if any combination of `key_columns`
/// occurs more than once.
pub fn ensure_unique_keys(table: &Table, key_columns: &[&str]) -> EdmResult<()> {
    let columns = key_columns
        .iter()
        .map(|column| table.str_values(column))
        .collect::<EdmResult<Vec<_>>>()?;
    let mut seen = HashMap::new();
    for row in 0..table.height() {
        let key = columns
            .iter()
            .map(|values| values[row].clone().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("/");
        if let Some(first) = seen.insert(key.clone(), row) {
            warn!(
                "'{}' rows {} and {} share key {}",
                table.name(),
                first,
                row,
                key
            );
            return Err(EdmError::DuplicateKey {
                dataset: table.name().to_string(),
                key,
            });
        }
    }
    Ok(())
}

/// Wide layout of one value per (row, column) pair, e.g. Year x Month.
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub row_column: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Pivot {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        self.cells[r][c]
    }

    pub fn to_table(&self, name: &str) -> EdmResult<Table> {
        let mut columns = vec![Series::new(&self.row_column, self.row_labels.clone())];
        for (c, label) in self.column_labels.iter().enumerate() {
            let values: Vec<Option<f64>> = self.cells.iter().map(|row| row[c]).collect();
            columns.push(Series::new(label, values));
        }
        Table::from_series(name, columns)
    }
}

/// Pivots `value_column` into rows of `row_column` and columns of
/// `column_column`, both sorted. Duplicate pairs are rejected.
pub fn pivot(table: &Table, row_column: &str, column_column: &str, value_column: &str) -> EdmResult<Pivot> {
    ensure_unique_keys(table, &[row_column, column_column])?;
    let rows = table.scalars(row_column)?;
    let cols = table.scalars(column_column)?;
    let values = table.f64_values(value_column)?;

    let row_labels = sorted_labels(&rows);
    let column_labels = sorted_labels(&cols);
    let mut cells = vec![vec![None; column_labels.len()]; row_labels.len()];
    for ((row, col), value) in rows.iter().zip(&cols).zip(values) {
        if row.is_null() || col.is_null() {
            continue;
        }
        let r = row_labels.iter().position(|l| *l == row.to_string());
        let c = column_labels.iter().position(|l| *l == col.to_string());
        if let (Some(r), Some(c)) = (r, c) {
            cells[r][c] = value;
        }
    }

    Ok(Pivot {
        row_column: row_column.to_string(),
        row_labels,
        column_labels,
        cells,
    })
}

fn sorted_labels(cells: &[Scalar]) -> Vec<String> {
    let mut distinct: Vec<&Scalar> = Vec::new();
    for cell in cells.iter().filter(|c| !c.is_null()) {
        if !distinct.contains(&cell) {
            distinct.push(cell);
        }
    }
    distinct.sort_by(|a, b| match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    });
    distinct.into_iter().map(Scalar::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly() -> Table {
        Table::new(
            "monthly_detailed",
            df![
                "Year" => &[2023i64, 2023, 2023, 2024, 2024, 2024],
                "Month" => &["Jan", "May", "Dec", "Jan", "May", "Dec"],
                "Month_Num" => &[1i64, 5, 12, 1, 5, 12],
                "Demand_MU" => &[1500.0, 2200.0, 1600.0, 1600.0, 2400.0, 1700.0],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let index = seasonal_index(&monthly(), "Month", "Demand_MU").unwrap();
        let names: Vec<_> = index.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["Jan", "May", "Dec"]);
        assert_eq!(index.groups[1].mean, 2300.0);
    }

    #[test]
    fn test_indices_average_to_one() {
        let index = seasonal_index(&monthly(), "Month", "Demand_MU").unwrap();
        let mean = index.groups.iter().map(|g| g.index).sum::<f64>() / index.groups.len() as f64;
        assert!((mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_and_bottom_by_raw_average() {
        let index = seasonal_index_with(&monthly(), "Month", "Demand_MU", 1).unwrap();
        assert_eq!(index.peak().unwrap().group, "May");
        assert_eq!(index.low().unwrap().group, "Jan");
        assert_eq!(index.top.len(), 1);
        let variation = index.variation_pct().unwrap();
        assert!((variation - (2300.0 / 1550.0 - 1.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_values_is_division_error() {
        let table = Table::new(
            "monthly_detailed",
            df!["Month" => &["Jan", "Feb"], "Demand_MU" => &[0.0, 0.0]].unwrap(),
        );
        assert!(matches!(
            seasonal_index(&table, "Month", "Demand_MU"),
            Err(EdmError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_duplicate_period_group_is_rejected() {
        let table = Table::new(
            "monthly_detailed",
            df!["Year" => &[2023i64, 2023], "Month" => &["Jan", "Jan"], "Demand_MU" => &[1.0, 2.0]]
                .unwrap(),
        );
        assert!(matches!(
            ensure_unique_keys(&table, &["Year", "Month"]),
            Err(EdmError::DuplicateKey { .. })
        ));
        assert!(ensure_unique_keys(&monthly(), &["Year", "Month"]).is_ok());
    }

    #[test]
    fn test_pivot_sorts_numeric_labels() {
        let pivot = pivot(&monthly(), "Year", "Month_Num", "Demand_MU").unwrap();
        assert_eq!(pivot.row_labels, vec!["2023", "2024"]);
        assert_eq!(pivot.column_labels, vec!["1", "5", "12"]);
        assert_eq!(pivot.get("2024", "5"), Some(2400.0));
        let table = pivot.to_table("heatmap").unwrap();
        assert_eq!(table.width(), 4);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_index_table_columns() {
        let index = seasonal_index(&monthly(), "Month", "Demand_MU").unwrap();
        let table = index.to_table("seasonal", "Month", "Demand_MU").unwrap();
        assert_eq!(
            table.column_names(),
            vec!["Month", "Demand_MU", SEASONAL_INDEX_COLUMN]
        );
    }
}
