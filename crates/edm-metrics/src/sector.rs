//! Keyed comparisons between periods and shares of a total.

use crate::seasonal::ensure_unique_keys;
use edm_core::{EdmError, EdmResult, Scalar, Table};
use polars::prelude::*;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Rows of `table` where `column` equals `value`. Numbers compare by value,
/// so `Scalar::Int(2025)` matches a float column holding `2025.0`.
pub fn filter_eq(table: &Table, column: &str, value: &Scalar) -> EdmResult<Table> {
    let cells = table.scalars(column)?;
    let rows: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| match (cell.as_f64(), value.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => *cell == value,
        })
        .map(|(row, _)| row)
        .collect();
    table.take_rows(table.name(), &rows)
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyGrowth {
    pub key: String,
    pub value_a: f64,
    pub value_b: f64,
    pub growth_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    OnlyInFirst,
    OnlyInSecond,
    ZeroBaseline,
    MissingValue,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExclusionReason::OnlyInFirst => "absent from second period",
            ExclusionReason::OnlyInSecond => "absent from first period",
            ExclusionReason::ZeroBaseline => "zero in first period",
            ExclusionReason::MissingValue => "null value",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedKey {
    pub key: String,
    pub reason: ExclusionReason,
}

/// Growth per key between two periods plus the keys that could not be compared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectorGrowth {
    pub rows: Vec<KeyGrowth>,
    pub excluded: Vec<ExcludedKey>,
}

impl SectorGrowth {
    pub fn get(&self, key: &str) -> Option<&KeyGrowth> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// `key_column | value_a | value_b | Growth_%`
    pub fn to_table(&self, name: &str, key_column: &str, label_a: &str, label_b: &str) -> EdmResult<Table> {
        Table::from_series(
            name,
            vec![
                Series::new(key_column, self.rows.iter().map(|r| r.key.clone()).collect::<Vec<_>>()),
                Series::new(label_a, self.rows.iter().map(|r| r.value_a).collect::<Vec<_>>()),
                Series::new(label_b, self.rows.iter().map(|r| r.value_b).collect::<Vec<_>>()),
                Series::new("Growth_%", self.rows.iter().map(|r| r.growth_pct).collect::<Vec<_>>()),
            ],
        )
    }
}

/// `(value_b / value_a - 1) * 100` for every key present in both tables.
///
/// Keys found in only one period, with a null value, or with a zero first
/// value are listed in [`SectorGrowth::excluded`] and logged. Each table must
/// hold a key at most once.
pub fn sector_growth(
    table_year_a: &Table,
    table_year_b: &Table,
    key_column: &str,
    value_column: &str,
) -> EdmResult<SectorGrowth> {
    ensure_unique_keys(table_year_a, &[key_column])?;
    ensure_unique_keys(table_year_b, &[key_column])?;
    let a = keyed_values(table_year_a, key_column, value_column)?;
    let b = keyed_values(table_year_b, key_column, value_column)?;
    let b_lookup: HashMap<&str, Option<f64>> = b.iter().map(|(k, v)| (k.as_str(), *v)).collect();

    let mut result = SectorGrowth::default();
    for (key, value_a) in &a {
        let excluded = match (b_lookup.get(key.as_str()), value_a) {
            (None, _) => Some(ExclusionReason::OnlyInFirst),
            (Some(None), _) | (Some(_), None) => Some(ExclusionReason::MissingValue),
            (Some(Some(_)), Some(va)) if *va == 0.0 => Some(ExclusionReason::ZeroBaseline),
            (Some(Some(vb)), Some(va)) => {
                result.rows.push(KeyGrowth {
                    key: key.clone(),
                    value_a: *va,
                    value_b: *vb,
                    growth_pct: (vb / va - 1.0) * 100.0,
                });
                None
            }
        };
        if let Some(reason) = excluded {
            result.excluded.push(ExcludedKey {
                key: key.clone(),
                reason,
            });
        }
    }
    for (key, _) in &b {
        if !a.iter().any(|(k, _)| k == key) {
            result.excluded.push(ExcludedKey {
                key: key.clone(),
                reason: ExclusionReason::OnlyInSecond,
            });
        }
    }
    for excluded in &result.excluded {
        warn!(
            "'{}' excluded from {} growth: {}",
            excluded.key, value_column, excluded.reason
        );
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub key: String,
    pub value: f64,
    pub share_pct: f64,
}

/// Each key's share of the column total in percent. Repeated keys are summed.
pub fn sector_shares(table: &Table, key_column: &str, value_column: &str) -> EdmResult<Vec<Share>> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for (key, value) in keyed_values(table, key_column, value_column)? {
        let Some(value) = value else { continue };
        match totals.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += value,
            None => totals.push((key, value)),
        }
    }
    let grand_total: f64 = totals.iter().map(|(_, v)| v).sum();
    if grand_total == 0.0 {
        return Err(EdmError::DivisionByZero(format!(
            "share of {value_column} by {key_column}"
        )));
    }
    Ok(totals
        .into_iter()
        .map(|(key, value)| Share {
            key,
            value,
            share_pct: value / grand_total * 100.0,
        })
        .collect())
}

/// The key with the largest value, first one wins on ties.
pub fn largest<'a>(shares: &'a [Share]) -> Option<&'a Share> {
    shares.iter().fold(None, |best: Option<&Share>, share| match best {
        Some(b) if b.value >= share.value => Some(b),
        _ => Some(share),
    })
}

fn keyed_values(table: &Table, key_column: &str, value_column: &str) -> EdmResult<Vec<(String, Option<f64>)>> {
    let keys = table.str_values(key_column)?;
    let values = table.f64_values(value_column)?;
    Ok(keys
        .into_iter()
        .zip(values)
        .filter_map(|(key, value)| key.map(|k| (k, value)))
        .collect())
}
