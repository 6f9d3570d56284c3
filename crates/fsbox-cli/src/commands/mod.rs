//! Command implementations for the fsbox CLI.
//!
//! The six sandbox subcommands all go through [`operation::run`]; the raw
//! `call` subcommand goes through [`call::run`]. Both print the response in
//! the requested format and return the exit code.

pub mod call;
pub mod common;
pub mod completions;
pub mod operation;
