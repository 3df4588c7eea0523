mod commands;
mod dispatch;
mod helpers;

use clap::Parser;
use dispatch::command_alias_from_program_name;
use tunnelkit_core::domain::TunnelError;

pub fn run_from_env() -> i32 {
    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| "tunnelkit".to_string());
    let remaining: Vec<String> = args.collect();

    match run_with_program_name(&program_name, remaining) {
        Ok(code) => code,
        Err(error) => {
            let tunnel_error = error.as_tunnel_error();
            eprintln!("{}", tunnel_error.diagnostic_line());
            if let Some(summary_line) = tunnel_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            tunnel_error.exit_code()
        }
    }
}

fn run_with_program_name(program_name: &str, args: Vec<String>) -> Result<i32, CliError> {
    let alias_command = command_alias_from_program_name(program_name);
    let full_args = std::iter::once("tunnelkit".to_string())
        .chain(alias_command.map(str::to_string))
        .chain(args)
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
    name = "tunnelkit",
    version,
    about = "Quantum tunnelling and resonance calculators"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Search Aharonov-Bohm shape-resonance poles
    Poles(commands::PolesArgs),
    /// Compare exact and WKB transmission through a 1D barrier
    Barrier(commands::BarrierArgs),
    /// Estimate phase-escape rates from a tilted washboard potential
    Washboard(commands::WashboardArgs),
    /// Tabulate SU(2)/SU(3) spectral-gap certificates
    GapCertificates(commands::GapCertificateArgs),
    /// Write a SHA-256 manifest of the primary tables
    Checksums(commands::ChecksumArgs),
    /// Run every calculator and the checksum manifest in sequence
    All(commands::AllArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Poles(args) => commands::run_poles_command(args),
        CliCommand::Barrier(args) => commands::run_barrier_command(args),
        CliCommand::Washboard(args) => commands::run_washboard_command(args),
        CliCommand::GapCertificates(args) => commands::run_gap_certificates_command(args),
        CliCommand::Checksums(args) => commands::run_checksums_command(args),
        CliCommand::All(args) => commands::run_all_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(TunnelError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_tunnel_error(&self) -> TunnelError {
        match self {
            Self::Usage(message) => {
                TunnelError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => TunnelError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
