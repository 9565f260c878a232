//! Unit conversion within and across the mass, energy and volume dimensions.
//!
//! Each dimension table stores how many base units one unit holds (kg for
//! mass, MJ for energy, m3 for volume, mi for length). Crossing dimensions goes
//! through the resource's density (kg/m3) or lower heating value (MJ/kg).

mod properties;

pub use properties::{PropertyTable, ResourceProperties};

use crate::domain::{LcaError, LcaResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Mass,
    Energy,
    Volume,
    Length,
}

impl Dimension {
    pub const fn base_unit(self) -> &'static str {
        match self {
            Self::Mass => "kg",
            Self::Energy => "MJ",
            Self::Volume => "m3",
            Self::Length => "mi",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Mass => "mass",
            Self::Energy => "energy",
            Self::Volume => "volume",
            Self::Length => "length",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UnitTables {
    mass: BTreeMap<String, f64>,
    energy: BTreeMap<String, f64>,
    volume: BTreeMap<String, f64>,
    #[serde(default)]
    length: BTreeMap<String, f64>,
}

impl UnitTables {
    pub fn new(
        mass: BTreeMap<String, f64>,
        energy: BTreeMap<String, f64>,
        volume: BTreeMap<String, f64>,
        length: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            mass,
            energy,
            volume,
            length,
        }
    }

    /// Checks that every dimension defines its base unit as exactly 1 and
    /// that no factor is zero, negative, or non-finite.
    pub fn validate(&self) -> Result<(), String> {
        for dimension in [
            Dimension::Mass,
            Dimension::Energy,
            Dimension::Volume,
            Dimension::Length,
        ] {
            let table = self.table(dimension);
            match table.get(dimension.base_unit()) {
                Some(factor) if *factor == 1.0 => {}
                _ => {
                    return Err(format!(
                        "{} table must define base unit '{}' with factor 1",
                        dimension,
                        dimension.base_unit()
                    ));
                }
            }
            if let Some((unit, factor)) = table
                .iter()
                .find(|(_, factor)| !factor.is_finite() || **factor <= 0.0)
            {
                return Err(format!(
                    "{} unit '{}' has invalid factor {}",
                    dimension, unit, factor
                ));
            }
        }
        Ok(())
    }

    fn table(&self, dimension: Dimension) -> &BTreeMap<String, f64> {
        match dimension {
            Dimension::Mass => &self.mass,
            Dimension::Energy => &self.energy,
            Dimension::Volume => &self.volume,
            Dimension::Length => &self.length,
        }
    }

    fn lookup(&self, dimension: Dimension, unit: &str) -> Option<f64> {
        let table = self.table(dimension);
        let unit = unit.trim();
        table.get(unit).copied().or_else(|| {
            table
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(unit))
                .map(|(_, factor)| *factor)
        })
    }

    pub fn dimension_of(&self, unit: &str) -> Option<Dimension> {
        [
            Dimension::Mass,
            Dimension::Energy,
            Dimension::Volume,
            Dimension::Length,
        ]
        .into_iter()
        .find(|dimension| self.lookup(*dimension, unit).is_some())
    }

    pub fn units_of(&self, dimension: Dimension) -> impl Iterator<Item = &str> {
        self.table(dimension).keys().map(String::as_str)
    }

    /// How many `to` units one `from` unit holds, both in `dimension`.
    pub fn factor(&self, dimension: Dimension, from: &str, to: &str) -> LcaResult<f64> {
        let from_base = self
            .lookup(dimension, from)
            .ok_or_else(|| unknown_unit(dimension, from))?;
        let to_base = self
            .lookup(dimension, to)
            .ok_or_else(|| unknown_unit(dimension, to))?;
        Ok(from_base / to_base)
    }

    /// Converts `amount` of `from` into `to`, crossing dimensions through the
    /// resource's density or LHV when needed.
    pub fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        properties: &ResourceProperties,
    ) -> LcaResult<f64> {
        let source = self.require_dimension(from)?;
        let target = self.require_dimension(to)?;

        if source == target {
            return Ok(amount * self.factor(source, from, to)?);
        }

        match (source, target) {
            (Dimension::Mass, Dimension::Volume) => {
                let density = require_density(properties, from, to)?;
                let m3 = amount * self.factor(Dimension::Mass, from, "kg")? / density;
                Ok(m3 * self.factor(Dimension::Volume, "m3", to)?)
            }
            (Dimension::Volume, Dimension::Mass | Dimension::Energy) => {
                let density = require_density(properties, from, to)?;
                let kg = amount * self.factor(Dimension::Volume, from, "m3")? * density;
                if target == Dimension::Mass {
                    Ok(kg * self.factor(Dimension::Mass, "kg", to)?)
                } else {
                    let lhv = require_lhv(properties, from, to)?;
                    Ok(kg * lhv * self.factor(Dimension::Energy, "MJ", to)?)
                }
            }
            (Dimension::Mass, Dimension::Energy) => {
                let lhv = require_lhv(properties, from, to)?;
                let mj = amount * self.factor(Dimension::Mass, from, "kg")? * lhv;
                Ok(mj * self.factor(Dimension::Energy, "MJ", to)?)
            }
            (Dimension::Energy, Dimension::Mass) => {
                let lhv = require_lhv(properties, from, to)?;
                let kg = amount * self.factor(Dimension::Energy, from, "MJ")? / lhv;
                Ok(kg * self.factor(Dimension::Mass, "kg", to)?)
            }
            _ => Err(LcaError::incompatible_units(
                "UNITS.INCOMPATIBLE",
                format!(
                    "cannot convert '{}' ({}) to '{}' ({})",
                    from, source, to, target
                ),
            )),
        }
    }

    fn require_dimension(&self, unit: &str) -> LcaResult<Dimension> {
        self.dimension_of(unit).ok_or_else(|| {
            LcaError::incompatible_units(
                "UNITS.UNKNOWN_UNIT",
                format!("unit '{}' is not defined in any conversion table", unit),
            )
        })
    }
}

fn unknown_unit(dimension: Dimension, unit: &str) -> LcaError {
    LcaError::incompatible_units(
        "UNITS.UNKNOWN_UNIT",
        format!("unit '{}' is not a {} unit", unit, dimension),
    )
}

fn require_density(properties: &ResourceProperties, from: &str, to: &str) -> LcaResult<f64> {
    positive_property(properties.density, "density", from, to)
}

fn require_lhv(properties: &ResourceProperties, from: &str, to: &str) -> LcaResult<f64> {
    positive_property(properties.lhv, "LHV", from, to)
}

fn positive_property(value: Option<f64>, name: &str, from: &str, to: &str) -> LcaResult<f64> {
    match value {
        Some(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(LcaError::incompatible_units(
            "UNITS.MISSING_PROPERTY",
            format!(
                "converting '{}' to '{}' requires a positive {} for the resource",
                from, to, name
            ),
        )),
    }
}
