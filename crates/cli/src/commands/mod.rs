//! Command implementations.

pub mod remove_user;
