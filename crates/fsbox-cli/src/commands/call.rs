//! Raw request command: an operation name plus JSON arguments.
//!
//! Mirrors what an MCP client sends, which makes it handy for scripting and
//! for reproducing a client's request from the shell.

use crate::commands::operation::report;
use anyhow::Result;
use fsbox_core::Error;
use fsbox_core::cli::{ExitCode, OutputFormat};
use fsbox_files::Dispatcher;
use serde_json::Value;

/// Decodes `args` as JSON and dispatches `name`.
///
/// Missing `args` means no arguments. Malformed JSON is reported as an
/// `invalid_arguments` failure, the same as a well-formed object with the
/// wrong fields.
///
/// # Errors
///
/// Returns an error only if the response cannot be serialized.
pub fn run(
    dispatcher: &Dispatcher,
    name: &str,
    args: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let result = parse_args(name, args).and_then(|args| dispatcher.handle(name, args));
    report(result, format)
}

fn parse_args(name: &str, args: Option<&str>) -> fsbox_core::Result<Value> {
    match args {
        None => Ok(Value::Null),
        Some(raw) => serde_json::from_str(raw).map_err(|e| Error::InvalidArguments {
            operation: name.to_string(),
            reason: format!("arguments are not valid JSON: {e}"),
        }),
    }
}
