use super::CliError;
use super::helpers::*;
use lcaflow_core::modules::validation::validate_network;
use lcaflow_core::modules::{RunOptions, run_coproduct_lca, run_lca};
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Pathway workbook (JSON)
    #[arg(value_name = "WORKBOOK")]
    workbook: PathBuf,

    /// Directory holding the background data tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Leave the incumbent product out of the results
    #[arg(long)]
    no_incumbent: bool,

    /// Skip the renewable diesel distribution loss
    #[arg(long)]
    no_distribution_loss: bool,

    /// Share of grid electricity replaced by renewable electricity
    #[arg(long, value_name = "SHARE", default_value_t = 0.0)]
    renewable_electricity: f64,

    /// Share of natural gas replaced by renewable natural gas
    #[arg(long, value_name = "SHARE", default_value_t = 0.0)]
    renewable_natural_gas: f64,

    /// Analyze the first co-product instead of the main product
    #[arg(long)]
    coproduct: bool,

    /// Result table output path
    #[arg(long, default_value = "lcaflow-results.json")]
    output: PathBuf,

    /// Result table format; inferred from the output extension when omitted
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Log debug detail of every engine stage
    #[arg(long)]
    verbose: bool,
}

impl RunArgs {
    fn options(&self) -> RunOptions {
        RunOptions {
            include_incumbent: !self.no_incumbent,
            apply_distribution_loss: !self.no_distribution_loss,
            renewable_electricity_share: self.renewable_electricity,
            renewable_natural_gas_share: self.renewable_natural_gas,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct ValidateArgs {
    /// Pathway workbook (JSON)
    #[arg(value_name = "WORKBOOK")]
    workbook: PathBuf,

    /// Directory holding the unit and property tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Log debug detail while loading
    #[arg(long)]
    verbose: bool,
}

pub(super) fn run_pathway_command(args: RunArgs) -> Result<i32, CliError> {
    init_logging(args.verbose);

    let network = load_network(&args.workbook)?;
    let context = load_context(&args.data_dir)?;
    let options = args.options();

    let table = if args.coproduct {
        match run_coproduct_lca(&network, &options, &context)? {
            Some(table) => table,
            None => {
                println!(
                    "No co-product in '{}' can be analyzed as a functional unit.",
                    args.workbook.display()
                );
                return Ok(0);
            }
        }
    } else {
        run_lca(&network, &options, &context)?
    };

    let format = resolve_format(args.format, &args.output);
    write_report(&table, format, &args.output)?;
    info!(output = %args.output.display(), rows = table.rows.len(), "report written");

    println!("{}", render_ghg_summary(&table));
    println!("Report: {}", args.output.display());
    Ok(0)
}

pub(super) fn run_validate_command(args: ValidateArgs) -> Result<i32, CliError> {
    init_logging(args.verbose);

    let network = load_network(&args.workbook)?;
    let context = load_context(&args.data_dir)?;
    validate_network(&network, &context)?;
    println!("OK");
    Ok(0)
}
