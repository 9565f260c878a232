use super::CliError;
use anyhow::Context;
use lcaflow_core::EngineContext;
use lcaflow_core::common::Metric;
use lcaflow_core::domain::ProcessNetwork;
use lcaflow_core::input::Workbook;
use lcaflow_core::modules::serialization::format_fixed_f64;
use lcaflow_core::modules::{ReportFormat, ResultTable, render_report, write_text_artifact};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub(super) const LOG_ENV: &str = "LCAFLOW_LOG";

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum OutputFormat {
    Json,
    Csv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Csv => Self::Csv,
        }
    }
}

/// Installs the stderr subscriber once; later calls keep the first one.
pub(super) fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(super) fn load_network(path: &Path) -> Result<ProcessNetwork, CliError> {
    let workbook = Workbook::load(path).map_err(|error| CliError::Compute(error.into()))?;
    Ok(workbook.into_network()?)
}

pub(super) fn load_context(data_dir: &Path) -> Result<EngineContext, CliError> {
    EngineContext::load(data_dir).map_err(|error| CliError::Compute(error.into()))
}

pub(super) fn resolve_format(requested: Option<OutputFormat>, output: &Path) -> ReportFormat {
    requested
        .map(ReportFormat::from)
        .or_else(|| ReportFormat::from_extension(output))
        .unwrap_or_default()
}

pub(super) fn write_report(
    table: &ResultTable,
    format: ReportFormat,
    output: &Path,
) -> Result<(), CliError> {
    let content = render_report(table, format).context("failed to render result table")?;
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    write_text_artifact(output, &content)
        .with_context(|| format!("failed to write report '{}'", output.display()))?;
    Ok(())
}

pub(super) fn render_ghg_summary(table: &ResultTable) -> String {
    let mut lines = vec![format!("GHG, g per {}:", table.functional_unit)];
    for (pathway, total) in table.pathway_totals(Metric::Ghg) {
        lines.push(format!("  {:<40}{}", pathway, format_fixed_f64(total, 16, 4)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{OutputFormat, resolve_format};
    use lcaflow_core::modules::ReportFormat;
    use std::path::Path;

    #[test]
    fn explicit_format_wins_over_extension() {
        assert_eq!(
            resolve_format(Some(OutputFormat::Json), Path::new("out.csv")),
            ReportFormat::Json
        );
        assert_eq!(
            resolve_format(None, Path::new("out.CSV")),
            ReportFormat::Csv
        );
        assert_eq!(
            resolve_format(None, Path::new("results")),
            ReportFormat::Json
        );
    }
}
