pub mod aggregate;
pub mod allocation;
pub mod economics;
pub mod emission;
pub mod normalize;
pub mod pipeline;
pub mod postprocess;
pub mod resolver;
pub mod sensitivity;
pub mod serialization;
pub mod transport;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{ResultRow, ResultTable, calculate_lca};
pub use pipeline::{FinalLci, RunOptions, coproduct_network, generate_final_lci, run_coproduct_lca, run_lca};
pub use serialization::{ReportFormat, render_report, write_text_artifact};
