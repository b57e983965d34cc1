mod commands;
mod table;

use clap::Parser;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(error) => {
            eprintln!("error: {error}");
            error.exit_code()
        }
    }
}

/// Parse and execute; returns the rendered stdout payload.
pub fn run<I, S>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("exspy-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    let cli = match Cli::try_parse_from(&full_args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                return Ok(err.to_string());
            }
            _ => return Err(CliError::Usage(err.to_string())),
        },
    };
    commands::dispatch(cli.command)
}

#[derive(Parser)]
#[command(name = "exspy-rs", about = "EELS/EDS spectroscopy analysis toolbox")]
struct Cli {
    #[command(subcommand)]
    command: commands::CliCommand,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Invalid(_) => 2,
            Self::Internal(_) => 1,
        }
    }
}

pub(crate) fn invalid(error: impl std::fmt::Display) -> CliError {
    CliError::Invalid(error.to_string())
}
