//! Unit newtypes for protection-study quantities.
//!
//! Zone ratings, feeder distances and fault currents travel through the
//! engine next to plain per-unit settings. Wrapping the physical ones keeps
//! amperes from being compared against a per-unit pickup by accident: the
//! simulator has to go through the base current explicitly.
//!
//! All types are `#[repr(transparent)]` and serialize as bare numbers.
//!
//! ```
//! use gat_core::units::{Amperes, Kilovolts};
//!
//! let fault = Amperes(10_000.0);
//! let base = Amperes(1_000.0);
//! assert_eq!(fault / base, 10.0);
//!
//! let kv = Kilovolts(13.8);
//! assert_eq!(format!("{kv}"), "13.8000 kV");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

/// Scaling, same-unit ratios and `{:.4} unit` display for a newtype over f64.
macro_rules! quantity {
    ($(#[$doc:meta])* $name:ident, $symbol:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(pub f64);

        impl $name {
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, factor: f64) -> Self {
                $name(self.0 * factor)
            }
        }

        impl Div<f64> for $name {
            type Output = Self;
            fn div(self, divisor: f64) -> Self {
                $name(self.0 / divisor)
            }
        }

        /// Ratio of two quantities of the same unit.
        impl Div for $name {
            type Output = f64;
            fn div(self, other: Self) -> f64 {
                self.0 / other.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.4} {}", self.0, $symbol)
            }
        }
    };
}

quantity!(
    /// Current in amperes (A). Fault currents and the simulator base current.
    Amperes,
    "A"
);
quantity!(
    /// Voltage in kilovolts (kV).
    Kilovolts,
    "kV"
);
quantity!(
    /// Apparent power in megavolt-amperes (MVA). Transformer ratings.
    MegavoltAmperes,
    "MVA"
);
quantity!(
    /// Distance in kilometres, measured from the zone transformer to the relay.
    Kilometers,
    "km"
);

impl MegavoltAmperes {
    /// Rated three-phase current at `voltage`: I = S / (√3 · V).
    pub fn rated_current(self, voltage: Kilovolts) -> Amperes {
        Amperes(self.0 * 1000.0 / (3f64.sqrt() * voltage.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_of_same_unit_is_scalar() {
        let ratio = Amperes(4500.0) / Amperes(1500.0);
        assert!((ratio - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaling() {
        assert_eq!(Amperes(100.0) * 2.5, Amperes(250.0));
        assert_eq!(Kilometers(3.0) / 2.0, Kilometers(1.5));
        assert_eq!(format!("{}", Amperes(1045.9)), "1045.9000 A");
    }

    #[test]
    fn test_rated_current_25mva_at_13_8kv() {
        let current = MegavoltAmperes(25.0).rated_current(Kilovolts(13.8));
        assert!((current.value() - 1045.9).abs() < 0.1);
    }

    #[test]
    fn test_transparent_serde() {
        let json = serde_json::to_string(&Amperes(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let back: Kilovolts = serde_json::from_str("13.8").unwrap();
        assert_eq!(back, Kilovolts(13.8));
    }
}
