//! Cleans one raw process table into a single-main-product table normalized
//! to one unit of that main product.

use super::allocation::allocation_ratio;
use super::transport::expand_transport;
use crate::common::numerics::stable_sum;
use crate::context::EngineContext;
use crate::domain::{AllocationBasis, Category, EntryType, LcaError, LcaResult, LciEntry};
use crate::units::ResourceProperties;
use tracing::debug;

/// Normalizes `entries` of process `process`.
///
/// `basis` selects how several main-product rows are combined: `None` sums
/// them (displacement), otherwise all but the first are treated as
/// co-products for an allocation over the main-product rows only.
pub fn format_input(
    process: &str,
    entries: &[LciEntry],
    basis: Option<AllocationBasis>,
    context: &EngineContext,
) -> LcaResult<Vec<LciEntry>> {
    let mut entries: Vec<LciEntry> = entries.iter().cloned().map(normalize_text).collect();

    for entry in &mut entries {
        apply_moisture(process, entry)?;
    }

    let mut entries = expand_transport(process, entries, context)?;

    for entry in &mut entries {
        join_properties(entry, context);
    }

    let entries = consolidate_main_products(process, entries, basis, context)?;
    normalize_to_main_product(process, entries)
}

fn normalize_text(mut entry: LciEntry) -> LciEntry {
    entry.resource = clean(&entry.resource);
    entry.end_use = clean(&entry.end_use);
    entry.incumbent_product = clean(&entry.incumbent_product);
    entry.incumbent_end_use = clean(&entry.incumbent_end_use);
    if let Some(stage) = entry.previous_stage.as_mut() {
        *stage = stage.trim().to_string();
    }
    entry
}

fn clean(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Converts wet amounts to dry ones. Transport distances are given per dry
/// ton moved and so scale the other way. The row is dry afterwards.
fn apply_moisture(process: &str, entry: &mut LciEntry) -> LcaResult<()> {
    let moisture = entry.moisture;
    if moisture == 0.0 {
        return Ok(());
    }

    if entry.category == Category::Transportation {
        if moisture >= 1.0 {
            return Err(LcaError::validation(
                "INPUT.MOISTURE_RANGE",
                format!(
                    "Moisture content of transported \"{}\" in process \"{}\" must be below 1.",
                    entry.resource, process
                ),
            ));
        }
        entry.amount /= 1.0 - moisture;
    } else {
        entry.amount *= 1.0 - moisture;
    }
    entry.moisture = 0.0;
    Ok(())
}

fn join_properties(entry: &mut LciEntry, context: &EngineContext) {
    let Some(table) = context.properties.lookup(&entry.resource) else {
        return;
    };
    let ResourceProperties {
        density,
        lhv,
        market_price,
        market_price_unit,
        surrogate_for,
    } = table.clone();

    let properties = &mut entry.properties;
    properties.density = properties.density.or(density);
    properties.lhv = properties.lhv.or(lhv);
    properties.market_price = properties.market_price.or(market_price);
    properties.market_price_unit = properties.market_price_unit.take().or(market_price_unit);
    properties.surrogate_for = properties.surrogate_for.take().or(surrogate_for);

    if entry.market_price.is_none() && entry.market_price_unit.is_none() {
        entry.market_price = properties.market_price;
        entry.market_price_unit = properties.market_price_unit.clone();
    }
}

fn consolidate_main_products(
    process: &str,
    entries: Vec<LciEntry>,
    basis: Option<AllocationBasis>,
    context: &EngineContext,
) -> LcaResult<Vec<LciEntry>> {
    let (mut main_products, mut others): (Vec<LciEntry>, Vec<LciEntry>) = entries
        .into_iter()
        .partition(|entry| entry.is(EntryType::MainProduct));

    if main_products.is_empty() {
        return Err(missing_main_product(process));
    }
    if main_products.len() == 1 {
        others.extend(main_products);
        return Ok(others);
    }

    debug!(
        process,
        count = main_products.len(),
        basis = basis.map(AllocationBasis::as_str),
        "consolidating main products"
    );

    match basis {
        None => {
            let combination_unit = main_products[0].category.combination_basis();
            let mut converted = Vec::with_capacity(main_products.len());
            for product in &main_products {
                converted.push(context.units.convert(
                    product.amount,
                    &product.unit,
                    combination_unit,
                    &product.properties,
                )?);
            }
            let mut combined = main_products.swap_remove(0);
            combined.amount = stable_sum(converted);
            combined.unit = combination_unit.to_string();
            others.push(combined);
        }
        Some(basis) => {
            for demoted in main_products.iter_mut().skip(1) {
                demoted.entry_type = EntryType::Coproduct;
                demoted.always_displacement = false;
            }
            let ratio = allocation_ratio(process, &main_products, basis, context)?;
            for entry in &mut others {
                entry.amount *= ratio;
            }
            others.push(main_products.swap_remove(0));
        }
    }

    Ok(others)
}

fn normalize_to_main_product(process: &str, mut entries: Vec<LciEntry>) -> LcaResult<Vec<LciEntry>> {
    let main_amount = stable_sum(
        entries
            .iter()
            .filter(|entry| entry.is(EntryType::MainProduct))
            .map(|entry| entry.amount),
    );
    if main_amount == 0.0 || !main_amount.is_finite() {
        return Err(LcaError::validation(
            "INPUT.MAIN_PRODUCT_AMOUNT",
            format!(
                "The main product amount of process \"{}\" must be a nonzero number.",
                process
            ),
        ));
    }

    for entry in &mut entries {
        entry.amount /= main_amount;
    }
    Ok(entries)
}

pub(crate) fn missing_main_product(process: &str) -> LcaError {
    LcaError::validation(
        "INPUT.MAIN_PRODUCT_MISSING",
        format!("Please specify the main product of process \"{}\".", process),
    )
}
