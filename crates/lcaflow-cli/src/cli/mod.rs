mod commands;
mod helpers;

use clap::Parser;
use lcaflow_core::domain::LcaError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let lca_error = error.as_lca_error();
            eprintln!("{}", lca_error.diagnostic_line());
            if let Some(summary_line) = lca_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            lca_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("lcaflow".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "lcaflow",
    version,
    about = "Life-cycle assessment of multi-stage biofuel pathways"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Compute the life-cycle results of a pathway workbook
    Run(commands::RunArgs),
    /// Load and validate a pathway workbook without computing it
    Validate(commands::ValidateArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Run(args) => commands::run_pathway_command(args),
        CliCommand::Validate(args) => commands::run_validate_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(LcaError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<LcaError> for CliError {
    fn from(error: LcaError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    pub fn as_lca_error(&self) -> LcaError {
        match self {
            Self::Usage(message) => LcaError::validation("INPUT.CLI_USAGE", message.trim_end()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => LcaError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
