//! Co-product handling: allocation ratios, ratio application, and the
//! displacement sign flip.

use crate::common::numerics::stable_sum;
use crate::context::EngineContext;
use crate::domain::{AllocationBasis, EntryType, LcaResult, LciEntry, ProductTrain};
use tracing::{debug, warn};

/// Rows that share the process burden: main products plus positive
/// co-products not forced onto displacement. A negative co-product has
/// already been credited by displacement.
fn is_allocatable(entry: &LciEntry) -> bool {
    entry.is(EntryType::MainProduct)
        || (entry.is(EntryType::Coproduct) && !entry.always_displacement && entry.amount > 0.0)
}

/// Share of the process burden carried by its main product(s).
///
/// Value allocation needs a market price and price unit on every
/// allocatable row; without them the ratio falls back to 1.
pub fn allocation_ratio(
    process: &str,
    entries: &[LciEntry],
    basis: AllocationBasis,
    context: &EngineContext,
) -> LcaResult<f64> {
    let products: Vec<&LciEntry> = entries.iter().filter(|entry| is_allocatable(entry)).collect();

    let mut main_amounts = Vec::new();
    let mut all_amounts = Vec::with_capacity(products.len());
    for product in products {
        let amount = match basis.unit() {
            Some(unit) => {
                context
                    .units
                    .convert(product.amount, &product.unit, unit, &product.properties)?
            }
            None => match value_of(product, context) {
                Some(value) => value,
                None => {
                    warn!(
                        process,
                        resource = %product.resource,
                        "market price unavailable; value allocation ratio falls back to 1"
                    );
                    return Ok(1.0);
                }
            },
        };
        if product.is(EntryType::MainProduct) {
            main_amounts.push(amount);
        }
        all_amounts.push(amount);
    }

    let total = stable_sum(all_amounts);
    if total == 0.0 || !total.is_finite() {
        return Ok(1.0);
    }
    Ok(stable_sum(main_amounts) / total)
}

fn value_of(product: &LciEntry, context: &EngineContext) -> Option<f64> {
    let price = product.market_price.filter(|price| price.is_finite())?;
    let (_, unit) = product.market_price_unit.as_deref()?.split_once('/')?;
    let amount = context
        .units
        .convert(product.amount, &product.unit, unit.trim(), &product.properties)
        .ok()?;
    Some(amount * price)
}

/// Applies process-level allocation on `basis` to a normalized table.
///
/// Every non-allocatable row is scaled by its product-train factor (ratio
/// for `Both`, 0 for `Co-product`, 1 for `Main Product`) and dropped when
/// that leaves it at exactly zero. Positive co-products left afterwards are
/// turned into credits. Allocatable co-products leave the table; main
/// products are kept unchanged at the end.
pub fn allocate(
    process: &str,
    entries: Vec<LciEntry>,
    basis: AllocationBasis,
    context: &EngineContext,
) -> LcaResult<Vec<LciEntry>> {
    let ratio = allocation_ratio(process, &entries, basis, context)?;
    debug!(process, %basis, ratio, "allocating process burden");

    let (products, rest): (Vec<LciEntry>, Vec<LciEntry>) =
        entries.into_iter().partition(is_allocatable);

    let mut allocated: Vec<LciEntry> = rest
        .into_iter()
        .filter_map(|mut entry| {
            entry.amount *= match entry.product_train.unwrap_or_default() {
                ProductTrain::Both => ratio,
                ProductTrain::Coproduct => 0.0,
                ProductTrain::MainProduct => 1.0,
            };
            (entry.amount != 0.0).then_some(entry)
        })
        .collect();

    for entry in allocated
        .iter_mut()
        .filter(|entry| entry.is(EntryType::Coproduct) && entry.amount > 0.0)
    {
        entry.amount = -entry.amount;
    }

    allocated.extend(
        products
            .into_iter()
            .filter(|entry| entry.is(EntryType::MainProduct)),
    );
    Ok(allocated)
}

/// Displacement: every co-product becomes a credit of the same magnitude.
pub fn apply_displacement(entries: &mut [LciEntry]) {
    for entry in entries
        .iter_mut()
        .filter(|entry| entry.is(EntryType::Coproduct))
    {
        entry.amount = -entry.amount;
    }
}
