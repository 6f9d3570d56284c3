//! fsbox CLI library.
//!
//! This library provides the core functionality for the `fsbox` binary,
//! exposing modules for commands and formatters that can be tested.

#![allow(clippy::missing_errors_doc)]

pub mod commands;
pub mod formatters;
