//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::core::collection::Collection;
use crate::core::config::Config;
use crate::core::identity::EntityId;
use crate::core::shortid::ShortIdIndex;
use crate::yaml::YamlError;

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Assign short IDs to `ids` and persist the index
///
/// Failure to save is only a warning; the command itself has succeeded.
pub fn register_short_ids<'a>(
    collection: &Collection,
    ids: impl IntoIterator<Item = &'a EntityId>,
) -> ShortIdIndex {
    let mut index = ShortIdIndex::load(collection);
    for id in ids {
        index.add(id);
    }
    if let Err(e) = index.save(collection) {
        eprintln!("{} Failed to save short IDs: {}", style("!").yellow(), e);
    }
    index
}

/// Warn about record files that could not be parsed and were skipped
pub fn report_skipped(errors: &[(PathBuf, YamlError)]) {
    for (path, error) in errors {
        eprintln!(
            "{} Skipping {}: {}",
            style("!").yellow(),
            path.display(),
            error
        );
    }
}

/// Open a record file in the configured editor
pub fn open_in_editor(config: &Config, path: &Path) -> Result<()> {
    let editor = config.editor();
    println!("Opening in {}...", style(&editor).yellow());

    let status = std::process::Command::new(&editor)
        .arg(path)
        .status()
        .into_diagnostic()?;
    if !status.success() {
        return Err(miette::miette!("{} exited with {}", editor, status));
    }
    Ok(())
}

/// Ask for confirmation unless `assume_yes` is set
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}
