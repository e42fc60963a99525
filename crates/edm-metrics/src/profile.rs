//! Hourly load profiles split into weekday and weekend days.

use edm_core::{EdmError, EdmResult, Table};
use polars::prelude::*;
use std::collections::BTreeMap;

pub const DEFAULT_WEEKEND_DAYS: [&str; 2] = ["Saturday", "Sunday"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourBucket {
    pub hour: i64,
    pub mean: f64,
    pub count: usize,
}

/// Mean value per hour for one partition, ordered by hour.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HourlyProfile {
    pub buckets: Vec<HourBucket>,
}

impl HourlyProfile {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn get(&self, hour: i64) -> Option<f64> {
        self.buckets.iter().find(|b| b.hour == hour).map(|b| b.mean)
    }

    /// Bucket with the highest mean, earliest hour on ties.
    pub fn peak(&self) -> Option<HourBucket> {
        self.buckets.iter().copied().fold(None, |best, bucket| match best {
            Some(b) if b.mean >= bucket.mean => Some(b),
            _ => Some(bucket),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadProfile {
    pub weekday: HourlyProfile,
    pub weekend: HourlyProfile,
}

impl LoadProfile {
    /// `hour_column | Weekday_<value> | Weekend_<value>` over the union of hours.
    pub fn to_table(&self, name: &str, hour_column: &str, value_column: &str) -> EdmResult<Table> {
        let mut hours: Vec<i64> = self
            .weekday
            .buckets
            .iter()
            .chain(&self.weekend.buckets)
            .map(|b| b.hour)
            .collect();
        hours.sort_unstable();
        hours.dedup();
        let weekday: Vec<Option<f64>> = hours.iter().map(|h| self.weekday.get(*h)).collect();
        let weekend: Vec<Option<f64>> = hours.iter().map(|h| self.weekend.get(*h)).collect();
        Table::from_series(
            name,
            vec![
                Series::new(hour_column, hours),
                Series::new(&format!("Weekday_{value_column}"), weekday),
                Series::new(&format!("Weekend_{value_column}"), weekend),
            ],
        )
    }
}

#[derive(Default)]
struct BucketStats {
    count: usize,
    sum: f64,
}

/// Splits rows on whether `day_column` is one of `weekend_days` and averages
/// `value_column` per `hour_column` inside each half. Rows with a null day,
/// hour or value are skipped.
pub fn weekday_weekend_profile(
    table: &Table,
    day_column: &str,
    hour_column: &str,
    value_column: &str,
    weekend_days: &[&str],
) -> EdmResult<LoadProfile> {
    let days = table.str_values(day_column)?;
    let hours = table.i64_values(hour_column)?;
    let values = table.f64_values(value_column)?;

    let mut weekday: BTreeMap<i64, BucketStats> = BTreeMap::new();
    let mut weekend: BTreeMap<i64, BucketStats> = BTreeMap::new();
    for ((day, hour), value) in days.into_iter().zip(hours).zip(values) {
        let (Some(day), Some(hour), Some(value)) = (day, hour, value) else {
            continue;
        };
        let target = if weekend_days.contains(&day.as_str()) {
            &mut weekend
        } else {
            &mut weekday
        };
        let entry = target.entry(hour).or_default();
        entry.count += 1;
        entry.sum += value;
    }

    if weekday.is_empty() && weekend.is_empty() {
        return Err(EdmError::InsufficientData {
            metric: format!("load profile of {value_column}"),
            needed: 1,
            found: 0,
        });
    }

    Ok(LoadProfile {
        weekday: into_profile(weekday),
        weekend: into_profile(weekend),
    })
}

fn into_profile(buckets: BTreeMap<i64, BucketStats>) -> HourlyProfile {
    HourlyProfile {
        buckets: buckets
            .into_iter()
            .map(|(hour, stats)| HourBucket {
                hour,
                mean: stats.sum / stats.count as f64,
                count: stats.count,
            })
            .collect(),
    }
}
