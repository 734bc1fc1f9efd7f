//! Command-line interface
//!
//! Operator commands for deploying wallets and driving the
//! propose/confirm/execute lifecycle from the terminal.

pub mod commands;

pub use commands::*;
