//! Background emission factors: per-resource production burdens, grid mixes,
//! end-use (combustion) increments and fuel-distribution urban increments.
//!
//! Source factors are tabulated per arbitrary functional unit. At load time
//! they are rescaled to per g (mass), per mmBTU (energy) or per gal (volume)
//! so that they line up with [`crate::domain::Category::primary_unit`].

use crate::common::{Metric, MetricVector};
use crate::units::{Dimension, UnitTables};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSection {
    #[default]
    Production,
    Chemicals,
    Feedstock,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFactorRecord {
    pub functional_unit: String,
    #[serde(default)]
    pub section: BackgroundSection,
    #[serde(default)]
    pub factors: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBackgroundTables {
    #[serde(default)]
    pub resources: BTreeMap<String, RawFactorRecord>,
    #[serde(default)]
    pub grid_mixes: BTreeMap<String, RawFactorRecord>,
    #[serde(default)]
    pub end_use: BTreeMap<String, BTreeMap<String, RawFactorRecord>>,
    #[serde(default)]
    pub fuel_distribution: BTreeMap<String, RawFactorRecord>,
}

#[derive(Debug, Clone, PartialEq)]
struct ResourceFactor {
    section: BackgroundSection,
    factors: MetricVector,
}

/// Read-only lookup of burden vectors, keyed by lower-case resource names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackgroundTables {
    resources: HashMap<String, ResourceFactor>,
    grid_mixes: HashMap<String, MetricVector>,
    end_use: HashMap<(String, String), MetricVector>,
    fuel_distribution: HashMap<String, MetricVector>,
}

impl BackgroundTables {
    pub fn from_raw(raw: RawBackgroundTables, units: &UnitTables) -> Result<Self, String> {
        let mut tables = Self::default();

        for (resource, record) in raw.resources {
            let mut factors = rescale(&record, units, &resource)?;
            // Production tables carry no biogenic carbon.
            factors[Metric::BiogenicCo2] = 0.0;
            tables.resources.insert(
                key(&resource),
                ResourceFactor {
                    section: record.section,
                    factors,
                },
            );
        }

        for (mix, record) in raw.grid_mixes {
            let factors = rescale(&record, units, &format!("electricity_{mix}"))?;
            tables.grid_mixes.insert(key(&mix), factors);
        }

        for (resource, uses) in raw.end_use {
            for (end_use, record) in uses {
                let label = format!("{resource}_{end_use}");
                let mut factors = rescale(&record, units, &label)?;
                for metric in Metric::ALL {
                    if let Some(urban) = metric.urban_counterpart() {
                        factors[urban] = factors[metric];
                    }
                }
                tables
                    .end_use
                    .insert((key(&resource), key(&end_use)), factors);
            }
        }

        for (resource, record) in raw.fuel_distribution {
            let factors = rescale(&record, units, &format!("{resource}_fuel distribution"))?;
            tables.fuel_distribution.insert(key(&resource), factors);
        }

        Ok(tables)
    }

    pub fn resource_factor(&self, resource: &str) -> Option<&MetricVector> {
        self.resources.get(&key(resource)).map(|entry| &entry.factors)
    }

    pub fn section_of(&self, resource: &str) -> Option<BackgroundSection> {
        self.resources.get(&key(resource)).map(|entry| entry.section)
    }

    pub fn grid_mix(&self, mix: &str) -> Option<&MetricVector> {
        self.grid_mixes.get(&key(mix))
    }

    pub fn end_use_factor(&self, resource: &str, end_use: &str) -> Option<&MetricVector> {
        self.end_use.get(&(key(resource), key(end_use)))
    }

    pub fn fuel_distribution_factor(&self, resource: &str) -> Option<&MetricVector> {
        self.fuel_distribution.get(&key(resource))
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn rescale(
    record: &RawFactorRecord,
    units: &UnitTables,
    label: &str,
) -> Result<MetricVector, String> {
    let mut factors = MetricVector::zero();
    for (name, value) in &record.factors {
        let metric = Metric::from_name(name)
            .ok_or_else(|| format!("'{}' lists unknown metric '{}'", label, name))?;
        if metric.is_composite() {
            return Err(format!(
                "'{}' lists derived metric '{}'; it is computed, not loaded",
                label, name
            ));
        }
        factors[metric] = *value;
    }

    let unit = record.functional_unit.trim();
    let per_unit = match units.dimension_of(unit) {
        Some(Dimension::Mass) => units.factor(Dimension::Mass, unit, "g"),
        Some(Dimension::Energy) => units.factor(Dimension::Energy, unit, "mmBTU"),
        Some(Dimension::Volume) => units.factor(Dimension::Volume, unit, "gal"),
        _ => {
            return Err(format!(
                "'{}' has unsupported functional unit '{}'",
                label, unit
            ));
        }
    }
    .map_err(|error| format!("'{}': {}", label, error.message()))?;

    Ok(factors.scaled(1.0 / per_unit))
}
