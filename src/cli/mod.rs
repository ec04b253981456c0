//! CLI module for toolbroker - command-line interface and subcommands.
//!
//! Provides diagnostic subcommands over a broker built from configuration.

pub mod commands;

pub use commands::Cli;
