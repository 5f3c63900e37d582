//! `rolesweep-cli` — operator commands over the authorization store.
//!
//! The binary is a thin wrapper; everything here is reachable from tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod factory;

pub use cli::{Cli, Commands, GlobalOptions};
pub use factory::Factory;
