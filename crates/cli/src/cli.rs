//! CLI argument parsing and command dispatch.
//!
//! Uses clap derive macros, with global options that can also come from the
//! environment.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use rolesweep_observability::{LogFormat, LogOptions};

use crate::commands::remove_user::RemoveUserCommand;

/// Maintenance commands for project role bindings.
#[derive(Debug, Parser)]
#[command(name = "rolesweep")]
#[command(version)]
#[command(about = "Maintenance commands for project role bindings")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global options available to all commands.
#[derive(Debug, Args, Clone)]
pub struct GlobalOptions {
    /// Client config file (defaults to the per-user config location).
    #[arg(long, env = "ROLESWEEP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log output format (overrides "log_format" in the client config).
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormatArg>,

    /// Suppress all logging output.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalOptions {
    /// Logging options, falling back to the configured format.
    pub fn log_options(&self, configured: Option<LogFormat>) -> LogOptions {
        let format = match self.log_format {
            Some(arg) => arg.into(),
            None => configured.unwrap_or_default(),
        };
        LogOptions {
            format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove users from every role binding in the current project.
    #[command(name = "remove-user", override_usage = "rolesweep remove-user <user> [user]...")]
    RemoveUser(RemoveUserCommand),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::RemoveUser(cmd) => cmd.run(&self.global),
        }
    }
}
