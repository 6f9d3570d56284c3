//! Input helpers shared by commands.

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

/// Resolves command input from an inline value, a host file, or stdin.
///
/// The first source present wins. With neither `inline` nor `file`, all of
/// stdin is read.
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read as UTF-8 text.
///
/// # Examples
///
/// ```
/// use fsbox_cli::commands::common::read_input;
///
/// let text = read_input(Some("hello".to_string()), None).unwrap();
/// assert_eq!(text, "hello");
/// ```
pub fn read_input(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = inline {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}
