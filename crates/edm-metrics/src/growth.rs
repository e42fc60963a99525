//! Growth rates over chronologically ordered rows.

use edm_core::{EdmError, EdmResult, Table};
use tracing::warn;

/// Percentage change of `value_column` against the previous row.
///
/// Rows must already be in period order (see [`ensure_chronological`]).
/// The first row has no predecessor and is `None`; so is any row whose own
/// value or predecessor is null, or whose predecessor is zero.
pub fn period_over_period_growth(table: &Table, value_column: &str) -> EdmResult<Vec<Option<f64>>> {
    let values = table.f64_values(value_column)?;
    let mut growth = Vec::with_capacity(values.len());
    for (row, value) in values.iter().enumerate() {
        if row == 0 {
            growth.push(None);
            continue;
        }
        let change = match (values[row - 1], *value) {
            (Some(prev), Some(_)) if prev == 0.0 => {
                warn!(
                    "'{}'.'{}' row {} follows a zero value; growth left undefined",
                    table.name(),
                    value_column,
                    row
                );
                None
            }
            (Some(prev), Some(current)) => Some((current - prev) / prev * 100.0),
            _ => None,
        };
        growth.push(change);
    }
    Ok(growth)
}

/// Appends the period-over-period growth of `value_column` as `new_column`.
pub fn with_growth_column(table: Table, value_column: &str, new_column: &str) -> EdmResult<Table> {
    let growth = period_over_period_growth(&table, value_column)?;
    table.with_computed_column(new_column, growth)
}

/// `((last / first) ^ (1 / num_periods) - 1) * 100`
pub fn compound_annual_growth_rate(first_value: f64, last_value: f64, num_periods: u32) -> EdmResult<f64> {
    if first_value == 0.0 {
        return Err(EdmError::DivisionByZero(
            "compound annual growth rate (first value is zero)".into(),
        ));
    }
    if num_periods == 0 {
        return Err(EdmError::DivisionByZero(
            "compound annual growth rate (zero periods)".into(),
        ));
    }
    let ratio = last_value / first_value;
    if ratio < 0.0 {
        return Err(EdmError::Computation(format!(
            "compound annual growth rate undefined for ratio {ratio}"
        )));
    }
    let rate = (ratio.powf(1.0 / f64::from(num_periods)) - 1.0) * 100.0;
    if !rate.is_finite() {
        return Err(EdmError::Computation(format!(
            "compound annual growth rate is not finite ({first_value} -> {last_value})"
        )));
    }
    Ok(rate)
}

/// CAGR between the first and last row of a column, over `rows - 1` periods.
pub fn column_cagr(table: &Table, value_column: &str) -> EdmResult<f64> {
    let (first, last, periods) = endpoints(table, value_column)?;
    compound_annual_growth_rate(first, last, periods)
}

/// `(last / first - 1) * 100`
pub fn total_growth(first_value: f64, last_value: f64) -> EdmResult<f64> {
    if first_value == 0.0 {
        return Err(EdmError::DivisionByZero("total growth".into()));
    }
    Ok((last_value / first_value - 1.0) * 100.0)
}

/// Total growth between the first and last row of a column.
pub fn column_total_growth(table: &Table, value_column: &str) -> EdmResult<f64> {
    let (first, last, _) = endpoints(table, value_column)?;
    total_growth(first, last)
}

/// Absolute change between the first and last row of a column.
pub fn column_change(table: &Table, value_column: &str) -> EdmResult<f64> {
    let (first, last, _) = endpoints(table, value_column)?;
    Ok(last - first)
}

/// Each value rescaled so the first row equals `base` (2025 = 100 style).
pub fn cumulative_growth_index(table: &Table, value_column: &str, base: f64) -> EdmResult<Vec<Option<f64>>> {
    let values = table.f64_values(value_column)?;
    let first = match values.first() {
        Some(Some(first)) => *first,
        Some(None) => {
            return Err(EdmError::Computation(format!(
                "growth index base of '{}'.'{}' is null",
                table.name(),
                value_column
            )))
        }
        None => {
            return Err(EdmError::InsufficientData {
                metric: format!("growth index of {value_column}"),
                needed: 1,
                found: 0,
            })
        }
    };
    if first == 0.0 {
        return Err(EdmError::DivisionByZero(format!(
            "growth index of {value_column}"
        )));
    }
    Ok(values
        .into_iter()
        .map(|value| value.map(|v| v / first * base))
        .collect())
}

/// Checks that `period_column` is strictly increasing.
pub fn ensure_chronological(table: &Table, period_column: &str) -> EdmResult<()> {
    let periods = table.f64_required(period_column)?;
    for (row, pair) in periods.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(EdmError::NotChronological {
                dataset: table.name().to_string(),
                column: period_column.to_string(),
                row: row + 1,
            });
        }
    }
    Ok(())
}

fn endpoints(table: &Table, value_column: &str) -> EdmResult<(f64, f64, u32)> {
    let values = table.f64_required(value_column)?;
    if values.len() < 2 {
        return Err(EdmError::InsufficientData {
            metric: format!("growth of {value_column}"),
            needed: 2,
            found: values.len(),
        });
    }
    let periods = u32::try_from(values.len() - 1)
        .map_err(|_| EdmError::Computation("too many periods".into()))?;
    Ok((values[0], values[values.len() - 1], periods))
}
