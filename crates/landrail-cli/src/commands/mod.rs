//! CLI command definitions and dispatch.

pub mod abi;
pub mod run;

use clap::{Parser, Subcommand};

/// landrail: run programs inside a Landlock sandbox.
#[derive(Parser, Debug)]
#[command(name = "landrail", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the kernel's Landlock ABI, errata, and supported rights.
    Abi(abi::AbiArgs),
    /// Run a command inside a sandbox.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Abi(args) => abi::execute(&args),
        Command::Run(args) => run::execute(args),
    }
}
