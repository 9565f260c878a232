//! Renewable-share perturbations applied to a resolved inventory.

use crate::common::constants::{
    ELECTRICITY, NATURAL_GAS, RENEWABLE_ELECTRICITY_MIX, RENEWABLE_NATURAL_GAS,
};
use crate::domain::{EntryType, LcaError, LcaResult, LciEntry};
use tracing::debug;

/// Moves `fraction` of every `resource` input onto a renewable variant.
///
/// Matching input rows keep `1 - fraction` of their amount; a copy holding
/// the remaining `fraction`, re-tagged by `retag`, is appended for each.
pub fn split_renewable<F>(
    entries: Vec<LciEntry>,
    resource: &str,
    fraction: f64,
    retag: F,
) -> LcaResult<Vec<LciEntry>>
where
    F: Fn(&mut LciEntry),
{
    if !(0.0..=1.0).contains(&fraction) {
        return Err(LcaError::validation(
            "INPUT.RENEWABLE_SHARE",
            format!(
                "The renewable share for {} must be between 0 and 1, got {}.",
                resource, fraction
            ),
        ));
    }
    if fraction == 0.0 {
        return Ok(entries);
    }

    let mut entries = entries;
    let mut renewable = Vec::new();
    for entry in entries
        .iter_mut()
        .filter(|entry| entry.is(EntryType::Input) && entry.resource == resource)
    {
        let mut copy = entry.clone();
        copy.amount = entry.amount * fraction;
        retag(&mut copy);
        renewable.push(copy);
        entry.amount *= 1.0 - fraction;
    }

    debug!(resource, fraction, rows = renewable.len(), "split renewable share");
    entries.extend(renewable);
    Ok(entries)
}

/// Routes `share` of electricity inputs to the renewable generation mix.
pub fn renewable_electricity(entries: Vec<LciEntry>, share: f64) -> LcaResult<Vec<LciEntry>> {
    split_renewable(entries, ELECTRICITY, share, |entry| {
        entry.end_use = RENEWABLE_ELECTRICITY_MIX.to_string();
    })
}

/// Replaces `share` of natural gas inputs with renewable natural gas.
pub fn renewable_natural_gas(entries: Vec<LciEntry>, share: f64) -> LcaResult<Vec<LciEntry>> {
    split_renewable(entries, NATURAL_GAS, share, |entry| {
        entry.resource = RENEWABLE_NATURAL_GAS.to_string();
    })
}
