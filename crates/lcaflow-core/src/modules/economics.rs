//! Carbon credit and abatement cost derived from pathway results.

use crate::common::numerics::linear_grid;
use crate::context::EngineContext;
use crate::domain::{Category, LcaError, LcaResult};
use crate::units::Dimension;
use serde::Serialize;

/// Unit of the GHG metric totals.
const GHG_UNIT: &str = "g";
const ABATEMENT_GRID_POINTS: usize = 5;

/// Strips the leading currency marker of a price unit, e.g. "$/ton" -> "ton".
fn priced_unit(price_unit: &str) -> LcaResult<&str> {
    price_unit
        .trim()
        .strip_prefix("$/")
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .ok_or_else(|| {
            LcaError::validation(
                "INPUT.PRICE_UNIT",
                format!("Price unit \"{}\" must have the form \"$/<unit>\".", price_unit),
            )
        })
}

/// Credit earned per functional unit at carbon price `price` (given per
/// `price_unit` of CO2e), from the GHG totals of the incumbent and the
/// modeled pathway. Process fuels are credited per GGE, everything else per
/// display unit.
pub fn carbon_credit(
    price: f64,
    price_unit: &str,
    main_category: Category,
    fossil_ghg: f64,
    modeled_ghg: f64,
    context: &EngineContext,
) -> LcaResult<f64> {
    let unit = priced_unit(price_unit)?;
    let per_gram = price * context.units.factor(Dimension::Mass, GHG_UNIT, unit)?;

    let credit = per_gram * (fossil_ghg - modeled_ghg);
    if main_category == Category::ProcessFuel {
        return Ok(credit * context.units.factor(Dimension::Energy, "GGE", "MJ")?);
    }
    Ok(credit)
}

/// A user-supplied price interval, e.g. 2.5 to 4 $/gal.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
    /// Resource whose density or heating value converts the priced unit.
    pub resource: String,
}

impl PriceRange {
    pub fn new(min: f64, max: f64, unit: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            min,
            max,
            unit: unit.into(),
            resource: resource.into(),
        }
    }

    /// How many display units one priced unit holds.
    fn display_ratio(&self, display_unit: &str, context: &EngineContext) -> LcaResult<f64> {
        let unit = priced_unit(&self.unit)?;
        let properties = context.properties.properties_for(&self.resource);
        context.units.convert(1.0, unit, display_unit, &properties)
    }
}

/// One point of the abatement grid, prices as supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AbatementPoint {
    pub fossil_cost: f64,
    pub biofuel_cost: f64,
    /// Dollars per g of the metric avoided.
    pub abatement_cost: f64,
}

/// Abatement cost over a grid of fossil and biofuel prices with the
/// default resolution.
pub fn abatement_cost(
    fossil: &PriceRange,
    biofuel: &PriceRange,
    main_category: Category,
    fossil_metric: f64,
    biofuel_metric: f64,
    context: &EngineContext,
) -> LcaResult<Vec<AbatementPoint>> {
    abatement_grid(
        fossil,
        biofuel,
        main_category,
        fossil_metric,
        biofuel_metric,
        ABATEMENT_GRID_POINTS,
        context,
    )
}

/// Abatement cost on an `points` x `points` price grid, fossil prices in
/// the outer order.
pub fn abatement_grid(
    fossil: &PriceRange,
    biofuel: &PriceRange,
    main_category: Category,
    fossil_metric: f64,
    biofuel_metric: f64,
    points: usize,
    context: &EngineContext,
) -> LcaResult<Vec<AbatementPoint>> {
    let avoided = biofuel_metric - fossil_metric;
    if avoided == 0.0 || !avoided.is_finite() {
        return Err(LcaError::validation(
            "INPUT.ABATEMENT_METRIC",
            "Abatement cost is undefined when the modeled and incumbent results are equal.",
        ));
    }

    let display_unit = main_category.display_unit();
    let fossil_ratio = fossil.display_ratio(display_unit, context)?;
    let biofuel_ratio = biofuel.display_ratio(display_unit, context)?;

    let fossil_prices = linear_grid(fossil.min, fossil.max, points);
    let biofuel_prices = linear_grid(biofuel.min, biofuel.max, points);

    let mut grid = Vec::with_capacity(fossil_prices.len() * biofuel_prices.len());
    for fossil_cost in &fossil_prices {
        for biofuel_cost in &biofuel_prices {
            let spread = fossil_cost / fossil_ratio - biofuel_cost / biofuel_ratio;
            grid.push(AbatementPoint {
                fossil_cost: *fossil_cost,
                biofuel_cost: *biofuel_cost,
                abatement_cost: spread / avoided,
            });
        }
    }
    Ok(grid)
}
