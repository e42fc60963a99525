use edm_core::EdmResult;
use tracing::warn;

/// Outcome of a single derived metric inside a larger analysis.
///
/// Division by zero and similar problems only knock out the metric they
/// occur in; the rest of the analysis still reports.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric<T> {
    Value(T),
    Omitted(String),
}

impl<T> Metric<T> {
    /// Metric-local errors become [`Metric::Omitted`]; anything else, such
    /// as a missing column, is returned as an error.
    pub fn capture(name: &str, result: EdmResult<T>) -> EdmResult<Self> {
        match result {
            Ok(value) => Ok(Metric::Value(value)),
            Err(err) if err.is_metric_local() => {
                warn!("{name} omitted: {err}");
                Ok(Metric::Omitted(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Value(value) => Some(value),
            Metric::Omitted(_) => None,
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, Metric::Omitted(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Value(value) => Metric::Value(f(value)),
            Metric::Omitted(reason) => Metric::Omitted(reason),
        }
    }
}

impl<T: Copy> Metric<T> {
    pub fn get(&self) -> Option<T> {
        self.value().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_core::EdmError;

    #[test]
    fn test_division_error_is_omitted() {
        let metric: Metric<f64> =
            Metric::capture("demand CAGR", Err(EdmError::DivisionByZero("cagr".into()))).unwrap();
        assert!(metric.is_omitted());
        assert_eq!(metric.get(), None);
    }

    #[test]
    fn test_schema_error_propagates() {
        let result: EdmResult<Metric<f64>> = Metric::capture(
            "demand CAGR",
            Err(EdmError::MissingColumn {
                dataset: "historical".into(),
                column: "Demand_MU".into(),
            }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_value_maps() {
        let metric = Metric::capture("x", Ok(2.0)).unwrap().map(|v| v * 2.0);
        assert_eq!(metric, Metric::Value(4.0));
    }
}
