//! Unit newtypes for electricity demand quantities.
//!
//! Demand tables mix energy (MU), power (MW), tariffs (Rs/unit) and money
//! (crores). Wrapping them keeps a peak-demand delta from being added to an
//! energy total by accident.
//!
//! ```
//! use edm_core::units::{MillionUnits, Megawatts};
//!
//! let demand = MillionUnits(21361.0) + MillionUnits(884.0);
//! let peak = Megawatts(3800.0);
//! // let wrong = demand + peak; // does not compile
//! assert_eq!(demand.value(), 22245.0);
//! assert_eq!(peak.value(), 3800.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*} {}", p, self.0, $unit_name),
                    None => write!(f, "{:.2} {}", self.0, $unit_name),
                }
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }
    };
}

/// Energy in million units (GWh).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MillionUnits(pub f64);
impl_unit_ops!(MillionUnits, "MU");

/// Power in megawatts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);
impl_unit_ops!(Megawatts, "MW");

/// Tariff in rupees per unit (kWh).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RupeesPerUnit(pub f64);
impl_unit_ops!(RupeesPerUnit, "Rs/unit");

/// Money in crores of rupees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Crores(pub f64);
impl_unit_ops!(Crores, "Cr");

/// Hours in a non-leap year, used to convert annual energy to average power.
pub const HOURS_PER_YEAR: f64 = 365.0 * 24.0;

impl MillionUnits {
    /// Peak power implied by an annual energy total at a given load factor.
    ///
    /// 1 MU = 1000 MWh, so `MU * 1000 / (hours * load_factor)` gives MW.
    pub fn implied_peak(self, load_factor: f64) -> Megawatts {
        Megawatts(self.0 * 1000.0 / (HOURS_PER_YEAR * load_factor))
    }

    /// Market value at a tariff, using the crore convention of the source data.
    pub fn market_value(self, tariff: RupeesPerUnit) -> Crores {
        Crores(self.0 * tariff.0 * 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_unit_arithmetic() {
        let total = MillionUnits(100.0) + MillionUnits(21.0);
        assert_eq!(total, MillionUnits(121.0));
        assert!((total / MillionUnits(100.0) - 1.21).abs() < 1e-12);
    }

    #[test]
    fn test_display_respects_precision() {
        assert_eq!(format!("{}", Megawatts(3120.456)), "3120.46 MW");
        assert_eq!(format!("{:.0}", Megawatts(3120.456)), "3120 MW");
    }

    #[test]
    fn test_implied_peak_and_market_value() {
        let demand = MillionUnits(21361.0);
        let peak = demand.implied_peak(0.75);
        assert!((peak.value() - 3251.29).abs() < 0.01);
        let value = demand.market_value(RupeesPerUnit(4.80));
        assert!((value.value() - 1_025_328.0).abs() < 1e-6);
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&MillionUnits(3.5)).unwrap();
        assert_eq!(json, "3.5");
    }
}
