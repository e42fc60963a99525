//! Named tables over a polars [`DataFrame`].
//!
//! A [`Table`] is what every other crate passes around: the dataset key it
//! was loaded under plus the frame itself. Column access goes through typed
//! helpers that report a missing column together with the dataset name, so
//! schema problems read the same no matter which analysis hit them.

use crate::error::{EdmError, EdmResult};
use polars::prelude::*;
use std::fmt;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// A dataset held in memory under its registry key.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    frame: DataFrame,
}

impl Table {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    /// Build a table from already-constructed columns.
    pub fn from_series(name: impl Into<String>, columns: Vec<Series>) -> EdmResult<Self> {
        Ok(Self::new(name, DataFrame::new(columns)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.frame.get_column_names().contains(&column)
    }

    /// Fails with [`EdmError::MissingColumn`] on the first absent column.
    pub fn require_columns(&self, columns: &[&str]) -> EdmResult<()> {
        for column in columns {
            if !self.has_column(column) {
                return Err(self.missing(column));
            }
        }
        Ok(())
    }

    fn missing(&self, column: &str) -> EdmError {
        EdmError::MissingColumn {
            dataset: self.name.clone(),
            column: column.to_string(),
        }
    }

    fn series(&self, column: &str) -> EdmResult<&Series> {
        self.frame.column(column).map_err(|_| self.missing(column))
    }

    /// Numeric column as `f64`, integer columns are widened.
    pub fn f64_values(&self, column: &str) -> EdmResult<Vec<Option<f64>>> {
        let series = self.series(column)?.cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().collect())
    }

    /// Numeric column with nulls rejected.
    pub fn f64_required(&self, column: &str) -> EdmResult<Vec<f64>> {
        self.f64_values(column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| {
                    EdmError::Computation(format!(
                        "null value in '{}'.'{}' at row {}",
                        self.name, column, row
                    ))
                })
            })
            .collect()
    }

    pub fn i64_values(&self, column: &str) -> EdmResult<Vec<Option<i64>>> {
        let series = self.series(column)?.cast(&DataType::Int64)?;
        Ok(series.i64()?.into_iter().collect())
    }

    /// Any column rendered as text, useful for grouping keys.
    pub fn str_values(&self, column: &str) -> EdmResult<Vec<Option<String>>> {
        Ok(self
            .scalars(column)?
            .into_iter()
            .map(|cell| match cell {
                Scalar::Null => None,
                other => Some(other.to_string()),
            })
            .collect())
    }

    /// Column as typed cells, keeping integers and floats apart.
    pub fn scalars(&self, column: &str) -> EdmResult<Vec<Scalar>> {
        let series = self.series(column)?;
        let cells = match series.dtype() {
            DataType::Utf8 => series
                .utf8()?
                .into_iter()
                .map(|v| v.map_or(Scalar::Null, |s| Scalar::Text(s.to_string())))
                .collect(),
            DataType::Float32 | DataType::Float64 => series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.map_or(Scalar::Null, Scalar::Float))
                .collect(),
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => series
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|v| v.map_or(Scalar::Null, Scalar::Int))
                .collect(),
            _ => series
                .cast(&DataType::Utf8)?
                .utf8()?
                .into_iter()
                .map(|v| v.map_or(Scalar::Null, |s| Scalar::Text(s.to_string())))
                .collect(),
        };
        Ok(cells)
    }

    /// Appends (or replaces) a computed float column.
    pub fn with_computed_column(mut self, column: &str, values: Vec<Option<f64>>) -> EdmResult<Self> {
        if values.len() != self.height() {
            return Err(EdmError::Computation(format!(
                "computed column '{}' has {} values for {} rows",
                column,
                values.len(),
                self.height()
            )));
        }
        self.frame.with_column(Series::new(column, values))?;
        Ok(self)
    }

    /// Subset of rows in the given order, under a new name.
    pub fn take_rows(&self, name: impl Into<String>, rows: &[usize]) -> EdmResult<Table> {
        let indices: Vec<IdxSize> = rows.iter().map(|&row| row as IdxSize).collect();
        let idx_ca = IdxCa::new("row_idx", indices.as_slice());
        Ok(Table::new(name, self.frame.take(&idx_ca)?))
    }

    /// Keeps only the named columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> EdmResult<Table> {
        self.require_columns(columns)?;
        Ok(Table::new(self.name.clone(), self.frame.select(columns.iter().copied())?))
    }

    pub fn head(&self, rows: usize) -> Table {
        Table::new(self.name.clone(), self.frame.head(Some(rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn historical() -> Table {
        let frame = df![
            "Year" => &[2020i64, 2021, 2022],
            "Demand_MU" => &[100.0f64, 110.0, 121.0],
            "Zone" => &["north", "south", "north"],
        ]
        .unwrap();
        Table::new("historical", frame)
    }

    #[test]
    fn test_missing_column_reports_dataset() {
        let table = historical();
        let err = table.f64_values("Peak_Demand_MW").unwrap_err();
        match err {
            EdmError::MissingColumn { dataset, column } => {
                assert_eq!(dataset, "historical");
                assert_eq!(column, "Peak_Demand_MW");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_integer_columns_widen_to_f64() {
        let years = historical().f64_values("Year").unwrap();
        assert_eq!(years, vec![Some(2020.0), Some(2021.0), Some(2022.0)]);
    }

    #[test]
    fn test_scalars_keep_types() {
        let table = historical();
        assert_eq!(table.scalars("Year").unwrap()[0], Scalar::Int(2020));
        assert_eq!(table.scalars("Demand_MU").unwrap()[1], Scalar::Float(110.0));
        assert_eq!(
            table.scalars("Zone").unwrap()[2],
            Scalar::Text("north".to_string())
        );
    }

    #[test]
    fn test_computed_column_is_appended() {
        let table = historical()
            .with_computed_column("Growth_%", vec![None, Some(10.0), Some(10.0)])
            .unwrap();
        assert_eq!(table.width(), 4);
        assert_eq!(table.f64_values("Growth_%").unwrap()[0], None);
    }

    #[test]
    fn test_computed_column_length_mismatch() {
        let err = historical()
            .with_computed_column("Growth_%", vec![None])
            .unwrap_err();
        assert!(matches!(err, EdmError::Computation(_)));
    }

    #[test]
    fn test_take_rows_preserves_order() {
        let subset = historical().take_rows("north", &[2, 0]).unwrap();
        assert_eq!(subset.name(), "north");
        assert_eq!(
            subset.f64_values("Demand_MU").unwrap(),
            vec![Some(121.0), Some(100.0)]
        );
    }

    #[test]
    fn test_scalar_display_precision() {
        assert_eq!(format!("{:.2}", Scalar::Float(3.14159)), "3.14");
        assert_eq!(format!("{:.2}", Scalar::Int(7)), "7");
        assert_eq!(Scalar::Null.to_string(), "");
    }
}
