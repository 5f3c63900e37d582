use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use rolesweep_authz::RemoveUserError;
use rolesweep_cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(RemoveUserError::Usage) = err.downcast_ref::<RemoveUserError>() {
                let mut cmd = Cli::command()
                    .find_subcommand("remove-user")
                    .cloned()
                    .unwrap_or_else(Cli::command);
                cmd.error(ErrorKind::MissingRequiredArgument, err.to_string()).exit();
            }

            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
