use serde::{Deserialize, Serialize};

/// How numbers are shown. Values are rounded here only; the metrics keep
/// full precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPolicy {
    pub decimals: usize,
    pub currency_symbol: String,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            decimals: 2,
            currency_symbol: "Rs".to_string(),
        }
    }
}

impl DisplayPolicy {
    pub fn number(&self, value: f64) -> String {
        format!("{:.*}", self.decimals, value)
    }

    /// Number with an explicit sign, for changes.
    pub fn signed(&self, value: f64) -> String {
        format!("{:+.*}", self.decimals, value)
    }

    pub fn percent(&self, value: f64) -> String {
        format!("{:.*}%", self.decimals, value)
    }

    pub fn money(&self, value: f64, suffix: &str) -> String {
        format!("{} {:.*}{}", self.currency_symbol, self.decimals, value, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = DisplayPolicy::default();
        assert_eq!(policy.number(4.14159), "4.14");
        assert_eq!(policy.signed(350.0), "+350.00");
        assert_eq!(policy.percent(22.487), "22.49%");
        assert_eq!(policy.money(4.8, "/unit"), "Rs 4.80/unit");
    }

    #[test]
    fn test_custom_decimals_and_symbol() {
        let policy = DisplayPolicy {
            decimals: 0,
            currency_symbol: "INR".into(),
        };
        assert_eq!(policy.money(1025328.4, " Cr"), "INR 1025328 Cr");
    }
}
