//! Life-cycle assessment engine for multi-stage biofuel production pathways.
//!
//! A pathway is a [`domain::ProcessNetwork`] of process inventories linked by
//! "input from another stage" rows. [`modules::run_lca`] validates and
//! normalizes each process, applies its co-product method, resolves the
//! cross-stage references and aggregates background emission factors into a
//! result table per functional unit.

pub mod background;
pub mod common;
pub mod context;
pub mod domain;
pub mod input;
pub mod modules;
pub mod units;

pub use context::EngineContext;
pub use domain::{LcaError, LcaErrorCategory, LcaResult};
