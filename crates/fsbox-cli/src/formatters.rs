//! Output formatters for CLI commands.
//!
//! Every subcommand prints a [`Response`] envelope. JSON and text modes
//! print the envelope itself; pretty mode renders each outcome the way a
//! person would want to read it (file content verbatim, listings one entry
//! per line, trees with box-drawing guides).

use anyhow::Result;
use colored::Colorize;
use fsbox_core::cli::OutputFormat;
use fsbox_core::{EntryKind, TreeNode};
use fsbox_files::{Failure, Outcome, Response};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Renders a response according to the specified output format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use fsbox_cli::formatters::format_response;
/// use fsbox_core::cli::OutputFormat;
/// use fsbox_files::{Outcome, Response};
///
/// let response = Response::success(Outcome::Done {
///     message: "Successfully deleted notes".to_string(),
/// });
///
/// let output = format_response(&response, OutputFormat::Text)?;
/// assert_eq!(output, r#"{"ok":true,"result":{"message":"Successfully deleted notes"}}"#);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_response(response: &Response, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Text => Ok(serde_json::to_string(response)?),
        OutputFormat::Pretty => Ok(pretty::format(response)),
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{BTreeMap, Colorize, EntryKind, Failure, Outcome, Response, TreeNode, Write};

    /// Formats a response for terminal reading.
    #[must_use]
    pub fn format(response: &Response) -> String {
        match (&response.result, &response.error) {
            (Some(outcome), _) => format_outcome(outcome),
            (None, Some(failure)) => format_failure(failure),
            (None, None) => String::new(),
        }
    }

    /// Formats a successful outcome.
    #[must_use]
    pub fn format_outcome(outcome: &Outcome) -> String {
        match outcome {
            Outcome::Content { content } => {
                content.strip_suffix('\n').unwrap_or(content).to_string()
            }
            Outcome::Listing { entries, types } => entries
                .iter()
                .map(|name| match types.get(name) {
                    Some(EntryKind::Directory) => format!("{}/", name.blue().bold()),
                    _ => name.clone(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Outcome::Tree { tree } => {
                let mut out = ".".blue().bold().to_string();
                write_tree(tree, "", &mut out);
                out
            }
            Outcome::Done { message } => format!("{} {message}", "✓".green().bold()),
            Outcome::Patched { message, output } => {
                let mut out = format!("{} {message}", "✓".green().bold());
                if !output.is_empty() {
                    out.push('\n');
                    out.push_str(&output.dimmed().to_string());
                }
                out
            }
        }
    }

    /// Formats a failure as `error[kind]: message`.
    #[must_use]
    pub fn format_failure(failure: &Failure) -> String {
        format!(
            "{}{}{} {}",
            "error[".red().bold(),
            failure.kind.as_str().red().bold(),
            "]:".red().bold(),
            failure.message
        )
    }

    fn write_tree(children: &BTreeMap<String, TreeNode>, prefix: &str, out: &mut String) {
        let count = children.len();
        for (i, (name, node)) in children.iter().enumerate() {
            let last = i + 1 == count;
            let branch = if last { "└── " } else { "├── " };
            match node {
                TreeNode::File => {
                    let _ = write!(out, "\n{prefix}{branch}{name}");
                }
                TreeNode::Directory { children } => {
                    let _ = write!(out, "\n{prefix}{branch}{}/", name.blue().bold());
                    let guide = if last { "    " } else { "│   " };
                    write_tree(children, &format!("{prefix}{guide}"), out);
                }
            }
        }
    }
}
