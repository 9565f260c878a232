//! Physical and accounting constants shared by the engine stages.

/// Carbon mass fraction of CO2.
pub const CO2_CARBON: f64 = 12.0 / 44.0;
/// Carbon mass fraction of CO.
pub const CO_CARBON: f64 = 12.0 / 28.0;
/// Carbon mass fraction assumed for VOC.
pub const VOC_CARBON: f64 = 0.85;

pub const CO2_GWP: f64 = 1.0;
pub const CH4_GWP: f64 = 30.0;
pub const N2O_GWP: f64 = 265.0;

/// Loss factor applied to renewable diesel delivered through fuel distribution.
pub const RENEWABLE_DIESEL_DISTRIBUTION_LOSS: f64 = 1.00004514306778;

/// Btu per mmBtu; transport fuel use is tabulated in Btu per mile.
pub const BTU_PER_MMBTU: f64 = 1.0e6;

pub const ELECTRICITY: &str = "electricity";
pub const NATURAL_GAS: &str = "natural gas";
pub const RENEWABLE_NATURAL_GAS: &str = "renewable natural gas";
pub const RENEWABLE_ELECTRICITY_MIX: &str = "renewable";
pub const DEFAULT_GRID_MIX: &str = "u.s. mix";
pub const FUEL_DISTRIBUTION: &str = "fuel distribution";
pub const TRANSPORT_FUEL: &str = "diesel";
pub const TRANSPORT_LOADED_LEG: &str = "loaded";
pub const TRANSPORT_EMPTY_LEG: &str = "empty";
