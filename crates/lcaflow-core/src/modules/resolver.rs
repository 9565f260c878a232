//! Substitutes "input from another stage" rows with the scaled inventory of
//! the process they come from, sweeping the network until no such row is left.

use super::normalize::missing_main_product;
use crate::context::EngineContext;
use crate::domain::{EntryType, LcaError, LcaResult, LciEntry, ProcessTable};
use std::collections::HashMap;
use tracing::debug;

/// Upstream row types carried into the consuming process.
const CARRIED: [EntryType; 3] = [
    EntryType::Input,
    EntryType::Coproduct,
    EntryType::IntermediateProduct,
];

/// Resolves every cross-stage reference in `processes` in place.
///
/// A process is substituted once every process it references is itself free
/// of cross-stage rows. Each sweep resolves at least one process or the
/// network is cyclic, so at most one sweep per process is run.
pub fn resolve_network(processes: &mut [ProcessTable], context: &EngineContext) -> LcaResult<()> {
    let index: HashMap<String, usize> = processes
        .iter()
        .enumerate()
        .map(|(position, process)| (process.name.clone(), position))
        .collect();

    for process in processes.iter() {
        for reference in process.upstream_references() {
            if !index.contains_key(reference) {
                return Err(unknown_stage(&process.name, reference));
            }
        }
    }

    for sweep in 1..=processes.len() {
        let pending: Vec<usize> = (0..processes.len())
            .filter(|position| processes[*position].has_external_inputs())
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let mut progressed = false;
        for position in pending {
            let ready = processes[position]
                .upstream_references()
                .iter()
                .all(|reference| !processes[index[*reference]].has_external_inputs());
            if !ready {
                continue;
            }

            let resolved = substitute(&processes[position], processes, &index, context)?;
            debug!(
                sweep,
                process = %processes[position].name,
                rows = resolved.len(),
                "resolved cross-stage inputs"
            );
            processes[position].entries = resolved;
            progressed = true;
        }

        if !progressed {
            break;
        }
    }

    let cyclic = processes_on_cycles(processes, &index);
    if cyclic.is_empty() {
        Ok(())
    } else {
        Err(LcaError::cyclic_dependency(&cyclic))
    }
}

/// Names of the unresolved processes that reach themselves through their
/// cross-stage references. Processes that merely sit downstream of a cycle
/// are left out.
fn processes_on_cycles(
    processes: &[ProcessTable],
    index: &HashMap<String, usize>,
) -> Vec<String> {
    let unresolved = |position: usize| processes[position].has_external_inputs();
    let references = |position: usize| -> Vec<usize> {
        processes[position]
            .upstream_references()
            .into_iter()
            .filter_map(|reference| index.get(reference).copied())
            .filter(|upstream| unresolved(*upstream))
            .collect()
    };

    (0..processes.len())
        .filter(|start| unresolved(*start))
        .filter(|start| {
            let mut visited = vec![false; processes.len()];
            let mut stack = references(*start);
            while let Some(position) = stack.pop() {
                if position == *start {
                    return true;
                }
                if !std::mem::replace(&mut visited[position], true) {
                    stack.extend(references(position));
                }
            }
            false
        })
        .map(|position| processes[position].name.clone())
        .collect()
}

fn substitute(
    process: &ProcessTable,
    processes: &[ProcessTable],
    index: &HashMap<String, usize>,
    context: &EngineContext,
) -> LcaResult<Vec<LciEntry>> {
    let mut resolved = Vec::with_capacity(process.entries.len());

    for entry in &process.entries {
        if !entry.is(EntryType::InputFromAnotherStage) {
            resolved.push(entry.clone());
            continue;
        }

        let reference = entry.previous_stage.as_deref().unwrap_or_default();
        let upstream = index
            .get(reference)
            .map(|position| &processes[*position])
            .ok_or_else(|| unknown_stage(&process.name, reference))?;
        let main_unit = &upstream
            .main_product()
            .ok_or_else(|| missing_main_product(&upstream.name))?
            .unit;

        let factor = context
            .units
            .convert(entry.amount, &entry.unit, main_unit, &entry.properties)?;

        resolved.extend(
            upstream
                .entries
                .iter()
                .filter(|row| CARRIED.contains(&row.entry_type))
                .map(|row| {
                    let mut row = row.clone();
                    row.amount *= factor;
                    row
                }),
        );
    }

    Ok(resolved)
}

fn unknown_stage(process: &str, reference: &str) -> LcaError {
    LcaError::validation(
        "INPUT.UNKNOWN_STAGE",
        format!(
            "Process \"{}\" uses inputs from \"{}\", which is not a process in this pathway.",
            process, reference
        ),
    )
}
