pub mod constants;
pub mod metrics;
pub mod numerics;

pub use metrics::{METRIC_COUNT, Metric, MetricVector};
