//! Network-wide input checks run before any normalization or resolution.

use super::normalize::missing_main_product;
use crate::common::constants::ELECTRICITY;
use crate::context::EngineContext;
use crate::domain::{
    AllocationLevel, Category, EntryType, LcaError, LcaResult, LciEntry, ProcessNetwork,
    ProcessTable,
};
use crate::units::{Dimension, ResourceProperties};
use tracing::debug;

/// Checks the invariants every pathway must satisfy, reporting the first
/// violation found with the offending process named.
pub fn validate_network(network: &ProcessNetwork, context: &EngineContext) -> LcaResult<()> {
    if network.is_empty() {
        return Err(LcaError::validation(
            "INPUT.EMPTY_PATHWAY",
            "The pathway contains no process sheets.",
        ));
    }

    for process in &network.processes {
        check_main_product(process)?;
        check_fractions(process)?;
        check_previous_stages(process, network)?;
        check_electricity_mix(process)?;
        check_units(process, network, context)?;
    }

    check_final_process(network)?;
    check_allocation_levels(network)?;

    debug!(processes = network.len(), "pathway passed validation");
    Ok(())
}

fn check_main_product(process: &ProcessTable) -> LcaResult<()> {
    let mut categories: Vec<Category> = Vec::new();
    for entry in process.entries_of(EntryType::MainProduct) {
        if !categories.contains(&entry.category) {
            categories.push(entry.category);
        }
    }

    match categories.len() {
        0 => Err(missing_main_product(&process.name)),
        1 => Ok(()),
        count => Err(LcaError::validation(
            "INPUT.MAIN_PRODUCT_CATEGORIES",
            format!(
                "Main products of different categories cannot be combined. Process \"{}\" contains {} categories of main products: {}.",
                process.name,
                count,
                categories
                    .iter()
                    .map(|category| category.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
    }
}

fn check_fractions(process: &ProcessTable) -> LcaResult<()> {
    let in_unit_interval = |value: f64| (0.0..=1.0).contains(&value);

    if !process
        .entries
        .iter()
        .all(|entry| in_unit_interval(entry.moisture))
    {
        return Err(LcaError::validation(
            "INPUT.MOISTURE_RANGE",
            format!(
                "Moisture content must be between 0 and 1. Please correct moisture specifications for Process \"{}\".",
                process.name
            ),
        ));
    }

    if !process
        .entries
        .iter()
        .all(|entry| in_unit_interval(entry.urban_share))
    {
        return Err(LcaError::validation(
            "INPUT.URBAN_SHARE_RANGE",
            format!(
                "Urban share must be between 0 and 1. Please correct urban share specifications for Process \"{}\".",
                process.name
            ),
        ));
    }
    Ok(())
}

fn check_previous_stages(process: &ProcessTable, network: &ProcessNetwork) -> LcaResult<()> {
    for entry in process.entries_of(EntryType::InputFromAnotherStage) {
        let known = entry
            .previous_stage
            .as_deref()
            .is_some_and(|stage| network.get(stage).is_some());
        if !known {
            return Err(LcaError::validation(
                "INPUT.UNKNOWN_STAGE",
                format!(
                    "The process from which \"{}\" in Process \"{}\" is produced either is not specified or does not exist.",
                    entry.resource, process.name
                ),
            ));
        }
    }
    Ok(())
}

fn check_electricity_mix(process: &ProcessTable) -> LcaResult<()> {
    let unspecified = process.entries_of(EntryType::Input).any(|entry| {
        entry.resource.trim().eq_ignore_ascii_case(ELECTRICITY) && entry.end_use.trim().is_empty()
    });
    if unspecified {
        return Err(LcaError::validation(
            "INPUT.ELECTRICITY_MIX",
            format!(
                "Please check Process \"{}\": Electricity mix must be specified in the \"End Use\" column.",
                process.name
            ),
        ));
    }
    Ok(())
}

/// Every row's unit must be known and reach the unit its amount is carried
/// in downstream: the upstream main product's unit for cross-stage rows, the
/// category's primary unit otherwise.
fn check_units(
    process: &ProcessTable,
    network: &ProcessNetwork,
    context: &EngineContext,
) -> LcaResult<()> {
    for entry in &process.entries {
        let Some(dimension) = context.units.dimension_of(&entry.unit) else {
            return Err(LcaError::incompatible_units(
                "UNITS.UNKNOWN_UNIT",
                format!(
                    "Unit \"{}\" of \"{}\" in Process \"{}\" is not a recognized unit.",
                    entry.unit, entry.resource, process.name
                ),
            ));
        };

        let target = if entry.is(EntryType::InputFromAnotherStage) {
            match entry
                .previous_stage
                .as_deref()
                .and_then(|stage| network.get(stage))
                .and_then(ProcessTable::main_product)
            {
                Some(upstream) => upstream.unit.as_str(),
                None => continue,
            }
        } else if entry.category == Category::Transportation
            && matches!(dimension, Dimension::Length | Dimension::Energy)
        {
            continue;
        } else {
            entry.category.primary_unit()
        };

        let properties = effective_properties(entry, context);
        context
            .units
            .convert(1.0, &entry.unit, target, &properties)
            .map_err(|error| {
                LcaError::new(
                    error.category(),
                    error.placeholder(),
                    format!(
                        "Please check \"{}\" in Process \"{}\": {}",
                        entry.resource,
                        process.name,
                        error.message()
                    ),
                )
            })?;
    }
    Ok(())
}

/// Row properties backed by the property table, as normalization joins them.
fn effective_properties(entry: &LciEntry, context: &EngineContext) -> ResourceProperties {
    let mut properties = entry.properties.clone();
    if let Some(table) = context.properties.lookup(&entry.resource) {
        properties.density = properties.density.or(table.density);
        properties.lhv = properties.lhv.or(table.lhv);
    }
    properties
}

fn check_final_process(network: &ProcessNetwork) -> LcaResult<()> {
    match network.final_processes().count() {
        0 => Err(LcaError::validation(
            "INPUT.FINAL_PROCESS_MISSING",
            "The process producing the end product must be specified.",
        )),
        1 => Ok(()),
        _ => Err(LcaError::validation(
            "INPUT.FINAL_PROCESS_MULTIPLE",
            "More than one processes produce the end product. Only one is allowed.",
        )),
    }
}

fn check_allocation_levels(network: &ProcessNetwork) -> LcaResult<()> {
    let first_at = |level: AllocationLevel| {
        network
            .processes
            .iter()
            .find(|process| process.method.level() == Some(level))
    };

    if let (Some(process_level), Some(system_level)) = (
        first_at(AllocationLevel::Process),
        first_at(AllocationLevel::System),
    ) {
        return Err(LcaError::validation(
            "INPUT.MIXED_ALLOCATION_LEVELS",
            format!(
                "System-level allocation (Process \"{}\") and process-level allocation (Process \"{}\") should not be used at the same time.",
                system_level.name, process_level.name
            ),
        ));
    }
    Ok(())
}
