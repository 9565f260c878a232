//! End-to-end computation: validation, per-process co-product handling,
//! cross-stage resolution, optional system allocation, and aggregation.

use super::aggregate::{ResultTable, calculate_lca};
use super::allocation::{allocate, apply_displacement};
use super::normalize::format_input;
use super::postprocess::postprocess;
use super::resolver::resolve_network;
use super::sensitivity::{renewable_electricity, renewable_natural_gas};
use super::validation::validate_network;
use crate::common::constants::RENEWABLE_DIESEL_DISTRIBUTION_LOSS;
use crate::context::EngineContext;
use crate::domain::{
    AllocationBasis, AllocationLevel, EntryType, LcaError, LcaResult, LciEntry, ProcessNetwork,
    ProcessTable, ProductTrain,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Knobs of one computation request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunOptions {
    /// Adds the incumbent comparison row.
    pub include_incumbent: bool,
    /// Applies the renewable-diesel distribution loss factor.
    pub apply_distribution_loss: bool,
    /// Fraction of electricity inputs moved to the renewable mix.
    pub renewable_electricity_share: f64,
    /// Fraction of natural gas inputs replaced by renewable natural gas.
    pub renewable_natural_gas_share: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            include_incumbent: true,
            apply_distribution_loss: true,
            renewable_electricity_share: 0.0,
            renewable_natural_gas_share: 0.0,
        }
    }
}

/// The resolved inventory of a pathway's final process, per unit of its
/// main product.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalLci {
    pub final_process: String,
    pub entries: Vec<LciEntry>,
}

/// Validates `network` and resolves it into one inventory.
pub fn generate_final_lci(
    network: &ProcessNetwork,
    options: &RunOptions,
    context: &EngineContext,
) -> LcaResult<FinalLci> {
    validate_network(network, context)?;

    let mut system_basis: Option<(AllocationBasis, &str)> = None;
    let mut processes = Vec::with_capacity(network.len());
    for process in &network.processes {
        let name = process.name.as_str();
        let basis = process.method.basis();
        let mut entries = format_input(name, &process.entries, basis, context)?;

        match (process.method.level(), basis) {
            (Some(AllocationLevel::Process), Some(basis)) => {
                entries = allocate(name, entries, basis, context)?;
            }
            (Some(AllocationLevel::System), Some(basis)) => match system_basis {
                None => system_basis = Some((basis, name)),
                Some((chosen, first)) if chosen != basis => {
                    warn!(
                        process = name,
                        basis = %basis,
                        chosen = %chosen,
                        first_process = first,
                        "conflicting system allocation bases; keeping the first"
                    );
                }
                Some(_) => {}
            },
            _ => apply_displacement(&mut entries),
        }

        debug!(process = name, method = %process.method, rows = entries.len(), "prepared process");
        processes.push(ProcessTable {
            name: process.name.clone(),
            method: process.method,
            is_final: process.is_final,
            entries,
        });
    }

    resolve_network(&mut processes, context)?;

    let final_table = processes
        .into_iter()
        .find(|process| process.is_final)
        .ok_or_else(|| {
            LcaError::validation(
                "INPUT.FINAL_PROCESS_MISSING",
                "The process producing the end product must be specified.",
            )
        })?;
    let final_process = final_table.name;
    let mut entries = final_table.entries;

    if let Some((basis, _)) = system_basis {
        for entry in &mut entries {
            entry.product_train = Some(ProductTrain::Both);
        }
        entries = allocate(&final_process, entries, basis, context)?;
    }

    if options.apply_distribution_loss {
        apply_distribution_loss(&mut entries);
    }

    Ok(FinalLci {
        final_process,
        entries,
    })
}

/// Renewable diesel delivered through distribution loses a small share in
/// transit, so every other flow is scaled up to deliver one unit.
fn apply_distribution_loss(entries: &mut [LciEntry]) {
    let applies = entries
        .iter()
        .find(|entry| entry.is(EntryType::MainProduct))
        .is_some_and(|main| {
            main.resource.contains("renewable diesel") && main.end_use.contains("distribution")
        });
    if !applies {
        return;
    }

    debug!(factor = RENEWABLE_DIESEL_DISTRIBUTION_LOSS, "applying distribution loss");
    for entry in entries
        .iter_mut()
        .filter(|entry| !entry.is(EntryType::MainProduct))
    {
        entry.amount *= RENEWABLE_DIESEL_DISTRIBUTION_LOSS;
    }
}

/// Runs the whole computation and returns the presentation-ready table.
pub fn run_lca(
    network: &ProcessNetwork,
    options: &RunOptions,
    context: &EngineContext,
) -> LcaResult<ResultTable> {
    let final_lci = generate_final_lci(network, options, context)?;

    let entries = renewable_electricity(final_lci.entries, options.renewable_electricity_share)?;
    let entries = renewable_natural_gas(entries, options.renewable_natural_gas_share)?;

    let table = calculate_lca(&entries, options.include_incumbent, context)?;
    info!(
        final_process = %final_lci.final_process,
        rows = table.rows.len(),
        functional_unit = %table.functional_unit,
        "pathway computed"
    );
    Ok(postprocess(table, &context.properties))
}

fn is_analyzed_coproduct(entry: &LciEntry) -> bool {
    entry.is(EntryType::Coproduct) && !entry.always_displacement
}

/// Recasts `network` so that the co-products of its first co-producing
/// process become the functional unit. Returns `None` when no process has a
/// co-product outside forced displacement.
pub fn coproduct_network(network: &ProcessNetwork) -> Option<ProcessNetwork> {
    let source = network
        .processes
        .iter()
        .find(|process| process.entries.iter().any(is_analyzed_coproduct))?;

    let processes = network
        .processes
        .iter()
        .map(|process| {
            let mut process = process.clone();
            process.is_final = process.name == source.name;
            if process.is_final {
                process.entries = recast_coproducts(&process);
            }
            process
        })
        .collect();

    Some(ProcessNetwork::new(processes))
}

fn recast_coproducts(process: &ProcessTable) -> Vec<LciEntry> {
    if process.method.level().is_none() {
        // Under displacement the end-use burden already sits with the main
        // product's results.
        return process
            .entries
            .iter()
            .filter(|entry| is_analyzed_coproduct(entry))
            .map(|entry| {
                let mut entry = entry.clone();
                entry.entry_type = EntryType::MainProduct;
                entry.end_use.clear();
                entry
            })
            .collect();
    }

    process
        .entries
        .iter()
        .map(|entry| {
            let mut entry = entry.clone();
            if is_analyzed_coproduct(&entry) {
                entry.entry_type = EntryType::MainProduct;
            } else if entry.is(EntryType::MainProduct) {
                entry.entry_type = EntryType::Coproduct;
                entry.always_displacement = false;
            }
            entry.product_train = entry.product_train.map(ProductTrain::swapped);
            entry
        })
        .collect()
}

/// Runs the pathway with its co-products as the functional unit.
pub fn run_coproduct_lca(
    network: &ProcessNetwork,
    options: &RunOptions,
    context: &EngineContext,
) -> LcaResult<Option<ResultTable>> {
    match coproduct_network(network) {
        Some(recast) => {
            debug!("running co-product analysis");
            run_lca(&recast, options, context).map(Some)
        }
        None => Ok(None),
    }
}
