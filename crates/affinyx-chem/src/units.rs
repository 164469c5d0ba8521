//! Potency-unit conversion.
//!
//! Bioactivity sources report IC50 values against a small set of
//! concentration units. Normalization maps (value, unit) onto the pIC50
//! scale: −log₁₀ of the concentration in molar. Higher pIC50 = more potent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChemError;

/// The enumerated set of concentration units accepted for potency values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    NanoMolar,
    MicroMolar,
    MilliMolar,
    Molar,
}

impl ConcentrationUnit {
    /// Multiplier taking a value in this unit to molar.
    pub fn to_molar(self) -> f64 {
        match self {
            ConcentrationUnit::NanoMolar => 1e-9,
            ConcentrationUnit::MicroMolar => 1e-6,
            ConcentrationUnit::MilliMolar => 1e-3,
            ConcentrationUnit::Molar => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConcentrationUnit::NanoMolar => "nM",
            ConcentrationUnit::MicroMolar => "µM",
            ConcentrationUnit::MilliMolar => "mM",
            ConcentrationUnit::Molar => "M",
        }
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ConcentrationUnit {
    type Err = ChemError;

    /// Symbols are matched exactly, except micromolar which is accepted in
    /// both its Unicode and ASCII spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nM" => Ok(ConcentrationUnit::NanoMolar),
            "µM" | "uM" => Ok(ConcentrationUnit::MicroMolar),
            "mM" => Ok(ConcentrationUnit::MilliMolar),
            "M" => Ok(ConcentrationUnit::Molar),
            other => Err(ChemError::UnsupportedUnit(other.to_string())),
        }
    }
}

/// Convert an IC50 measurement to pIC50.
///
/// Fails when the value is not strictly positive (the log transform is
/// undefined there); unit errors are produced by [`ConcentrationUnit`]'s
/// `FromStr` before this point.
pub fn ic50_to_pic50(value: f64, unit: ConcentrationUnit) -> Result<f64, ChemError> {
    if !(value > 0.0) {
        return Err(ChemError::NonPositivePotency(value));
    }
    Ok(-(value * unit.to_molar()).log10())
}

/// Convert from a raw (value, unit-symbol) pair as it arrives off the wire.
pub fn pic50_from_raw(value: f64, unit: &str) -> Result<f64, ChemError> {
    ic50_to_pic50(value, unit.parse()?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_molar_1e_minus_7_is_exactly_7() {
        let pic50 = ic50_to_pic50(1e-7, ConcentrationUnit::Molar).unwrap();
        assert_eq!(pic50, 7.0);
    }

    #[test]
    fn test_nanomolar_conversion() {
        let pic50 = ic50_to_pic50(1.0, ConcentrationUnit::NanoMolar).unwrap();
        assert_eq!(pic50, 9.0);
    }

    #[test]
    fn test_strictly_decreasing_in_value() {
        let a = ic50_to_pic50(10.0, ConcentrationUnit::NanoMolar).unwrap();
        let b = ic50_to_pic50(100.0, ConcentrationUnit::NanoMolar).unwrap();
        let c = ic50_to_pic50(1000.0, ConcentrationUnit::NanoMolar).unwrap();
        assert!(a > b && b > c);
    }

    #[test]
    fn test_micromolar_spellings_agree() {
        let unicode: ConcentrationUnit = "µM".parse().unwrap();
        let ascii: ConcentrationUnit = "uM".parse().unwrap();
        assert_eq!(unicode, ascii);
        assert_eq!(pic50_from_raw(1.0, "uM").unwrap(), 6.0);
    }

    #[test]
    fn test_unsupported_unit_names_offender() {
        let err = pic50_from_raw(5.0, "ppm").unwrap_err();
        assert!(err.to_string().contains("ppm"));
    }

    #[test]
    fn test_non_positive_values_rejected() {
        assert!(ic50_to_pic50(0.0, ConcentrationUnit::NanoMolar).is_err());
        assert!(ic50_to_pic50(-4.2, ConcentrationUnit::Molar).is_err());
        assert!(ic50_to_pic50(f64::NAN, ConcentrationUnit::Molar).is_err());
    }
}
