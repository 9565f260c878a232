//! Conversion of transportation distance rows into truck diesel consumption.

use crate::common::constants::{
    BTU_PER_MMBTU, TRANSPORT_EMPTY_LEG, TRANSPORT_FUEL, TRANSPORT_LOADED_LEG,
};
use crate::context::EngineContext;
use crate::domain::{Category, EntryType, LcaError, LcaResult, LciEntry};
use crate::units::Dimension;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Truck fuel use per mile for each leg of a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEconomy {
    /// Btu per mile from product origin to destination.
    pub loaded_btu_per_mile: f64,
    /// Btu per mile from destination back to origin.
    pub empty_btu_per_mile: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportTables {
    pub default_vehicle: String,
    pub vehicles: BTreeMap<String, FuelEconomy>,
}

impl TransportTables {
    pub fn single(vehicle: impl Into<String>, economy: FuelEconomy) -> Self {
        let vehicle = vehicle.into();
        let mut vehicles = BTreeMap::new();
        vehicles.insert(vehicle.clone(), economy);
        Self {
            default_vehicle: vehicle,
            vehicles,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.vehicles.contains_key(&self.default_vehicle) {
            return Err(format!(
                "default vehicle '{}' has no fuel economy entry",
                self.default_vehicle
            ));
        }
        for (vehicle, economy) in &self.vehicles {
            let valid = |value: f64| value.is_finite() && value >= 0.0;
            if !valid(economy.loaded_btu_per_mile) || !valid(economy.empty_btu_per_mile) {
                return Err(format!("vehicle '{}' has invalid fuel economy", vehicle));
            }
        }
        Ok(())
    }

    pub fn default_economy(&self) -> Option<FuelEconomy> {
        self.vehicles.get(&self.default_vehicle).copied()
    }
}

/// Transportation rows given as fuel energy are already expanded legs.
fn is_distance_row(entry: &LciEntry, context: &EngineContext) -> bool {
    entry.category == Category::Transportation
        && context.units.dimension_of(&entry.unit) != Some(Dimension::Energy)
}

/// Replaces every transportation row with a loaded and an empty diesel row.
///
/// Fuel use is per dry ton moved, scaled by the tons of the transported
/// resource that the process consumes. Non-transport rows keep their order and
/// the derived rows are appended after them.
pub fn expand_transport(
    process: &str,
    entries: Vec<LciEntry>,
    context: &EngineContext,
) -> LcaResult<Vec<LciEntry>> {
    let (transport, mut expanded): (Vec<LciEntry>, Vec<LciEntry>) = entries
        .into_iter()
        .partition(|entry| is_distance_row(entry, context));

    if transport.is_empty() {
        return Ok(expanded);
    }

    let economy = context.transport.default_economy().ok_or_else(|| {
        LcaError::internal(
            "DATA.TRANSPORT_VEHICLE",
            format!(
                "no fuel economy for vehicle '{}'",
                context.transport.default_vehicle
            ),
        )
    })?;
    let units = &context.units;

    let mut derived = Vec::with_capacity(transport.len() * 2);
    for row in &transport {
        let distance_mi = row.amount * units.factor(Dimension::Length, &row.unit, "mi")?;
        let (payload, payload_unit) = match (row.payload, row.payload_unit.as_deref()) {
            (Some(payload), Some(unit)) if payload > 0.0 => (payload, unit),
            _ => {
                return Err(LcaError::validation(
                    "INPUT.TRANSPORT_PAYLOAD",
                    format!(
                        "Transportation of \"{}\" in process \"{}\" must specify a positive payload and payload unit.",
                        row.resource, process
                    ),
                ));
            }
        };
        let payload_ton = payload * units.factor(Dimension::Mass, payload_unit, "ton")?;

        let loaded_per_ton = economy.loaded_btu_per_mile / payload_ton * distance_mi / BTU_PER_MMBTU;
        let empty_per_ton = economy.empty_btu_per_mile / payload_ton * distance_mi / BTU_PER_MMBTU;

        let mut transported_ton = 0.0;
        for moved in expanded.iter().filter(|entry| {
            !matches!(entry.entry_type, EntryType::MainProduct | EntryType::Coproduct)
                && entry.resource == row.resource
        }) {
            let properties = context.properties.properties_for(&moved.resource);
            transported_ton += units.convert(moved.amount, &moved.unit, "ton", &properties)?;
        }

        for (leg, per_ton) in [
            (TRANSPORT_LOADED_LEG, loaded_per_ton),
            (TRANSPORT_EMPTY_LEG, empty_per_ton),
        ] {
            let mut fuel = LciEntry::new(
                row.entry_type,
                row.category,
                TRANSPORT_FUEL,
                "mmBTU",
                per_ton * transported_ton,
            )
            .with_stage(row.stage.clone())
            .with_end_use(leg)
            .with_urban_share(row.urban_share);
            fuel.product_train = row.product_train;
            derived.push(fuel);
        }
    }

    expanded.extend(derived);
    Ok(expanded)
}
