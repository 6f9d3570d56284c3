//! Runs one sandbox operation and reports the result.

use crate::formatters::format_response;
use anyhow::Result;
use fsbox_core::cli::{ExitCode, OutputFormat};
use fsbox_files::{Dispatcher, Operation, Outcome, Response};

/// Executes `operation` and prints the response.
///
/// Success goes to stdout. In pretty mode a failure goes to stderr; in JSON
/// and text modes it goes to stdout so scripts can parse it.
///
/// # Errors
///
/// Returns an error only if the response cannot be serialized. Sandbox
/// failures are reported through the exit code.
pub fn run(
    dispatcher: &Dispatcher,
    operation: &Operation,
    format: OutputFormat,
) -> Result<ExitCode> {
    report(dispatcher.execute(operation), format)
}

/// Prints a sandbox result and maps it to an exit code.
///
/// # Errors
///
/// Returns an error if the response cannot be serialized.
pub fn report(result: fsbox_core::Result<Outcome>, format: OutputFormat) -> Result<ExitCode> {
    let exit_code = result
        .as_ref()
        .err()
        .map_or(ExitCode::SUCCESS, ExitCode::for_error);
    let response = Response::from_result(result);
    let output = format_response(&response, format)?;

    if response.ok || format != OutputFormat::Pretty {
        println!("{output}");
    } else {
        eprintln!("{output}");
    }
    Ok(exit_code)
}
