//! Unit conversion for the four supported kinds of quantity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::UnitLabels;
use crate::error::{MathError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Temperature,
    Length,
    Speed,
    Mass,
}

impl UnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Temperature => "temperature",
            UnitKind::Length => "length",
            UnitKind::Speed => "speed",
            UnitKind::Mass => "mass",
        }
    }

    /// The configured base unit for this kind.
    pub fn base_unit(self, labels: &UnitLabels) -> &str {
        match self {
            UnitKind::Temperature => &labels.temperature,
            UnitKind::Length => &labels.length,
            UnitKind::Speed => &labels.speed,
            UnitKind::Mass => &labels.mass,
        }
    }

    /// `(unit, scale, offset)` with `canonical = value * scale + offset`. The canonical
    /// units are °C, m, m/s and kg.
    fn table(self) -> &'static [(&'static str, f64, f64)] {
        match self {
            UnitKind::Temperature => &[
                ("°C", 1.0, 0.0),
                ("°F", 5.0 / 9.0, -160.0 / 9.0),
                ("K", 1.0, -273.15),
            ],
            UnitKind::Length => &[
                ("m", 1.0, 0.0),
                ("km", 1000.0, 0.0),
                ("cm", 0.01, 0.0),
                ("mm", 0.001, 0.0),
                ("in", 0.0254, 0.0),
                ("ft", 0.3048, 0.0),
                ("yd", 0.9144, 0.0),
                ("mi", 1609.344, 0.0),
            ],
            UnitKind::Speed => &[
                ("m/s", 1.0, 0.0),
                ("km/h", 1.0 / 3.6, 0.0),
                ("mph", 0.44704, 0.0),
                ("kn", 1852.0 / 3600.0, 0.0),
            ],
            UnitKind::Mass => &[
                ("kg", 1.0, 0.0),
                ("g", 0.001, 0.0),
                ("mg", 1e-6, 0.0),
                ("t", 1000.0, 0.0),
                ("lb", 0.453_592_37, 0.0),
                ("oz", 0.028_349_523_125, 0.0),
            ],
        }
    }

    pub fn units(self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(name, _, _)| *name)
    }

    fn affine(self, unit: &str) -> Result<(f64, f64)> {
        self.table()
            .iter()
            .find(|(name, _, _)| *name == unit)
            .map(|(_, scale, offset)| (*scale, *offset))
            .ok_or_else(|| MathError::UnknownUnit {
                kind: self.as_str().to_string(),
                unit: unit.to_string(),
            })
    }

    pub fn check_unit(self, unit: &str) -> Result<()> {
        self.affine(unit).map(|_| ())
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "temperature" => Ok(UnitKind::Temperature),
            "length" => Ok(UnitKind::Length),
            "speed" => Ok(UnitKind::Speed),
            "mass" => Ok(UnitKind::Mass),
            other => Err(MathError::UnsupportedUnitType(other.to_string())),
        }
    }
}

fn between(kind: UnitKind, value: f64, from: &str, to: &str) -> Result<f64> {
    let (from_scale, from_offset) = kind.affine(from)?;
    let (to_scale, to_offset) = kind.affine(to)?;
    let canonical = value * from_scale + from_offset;
    Ok((canonical - to_offset) / to_scale)
}

/// Convert `value` from one unit to another, passing through the configured base unit.
pub fn convert_unit(value: f64, from: &str, to: &str, kind: UnitKind, labels: &UnitLabels) -> Result<f64> {
    let base = kind.base_unit(labels);
    let in_base = between(kind, value, from, base)?;
    between(kind, in_base, base, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_to_kelvin() {
        let kelvin = convert_unit(212.0, "°F", "K", UnitKind::Temperature, &UnitLabels::default()).unwrap();
        assert!((kelvin - 373.15).abs() < 1e-9);
    }

    #[test]
    fn unknown_unit_names_kind() {
        let err = convert_unit(1.0, "parsec", "m", UnitKind::Length, &UnitLabels::default()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown unit `parsec` for length");
    }
}
