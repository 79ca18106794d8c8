//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;

/// Print a serializable value as YAML or JSON
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Print rows as TSV or CSV with a header line
pub fn print_delimited(header: &[&str], rows: &[Vec<String>], format: OutputFormat) {
    match format {
        OutputFormat::Csv => {
            println!("{}", header.join(","));
            for row in rows {
                let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        _ => {
            println!("{}", header.join("\t"));
            for row in rows {
                let cells: Vec<String> = row.iter().map(|c| c.replace('\t', " ")).collect();
                println!("{}", cells.join("\t"));
            }
        }
    }
}

/// Print rows as an aligned table for the terminal
///
/// Every column but the last is padded (and truncated) to its width.
pub fn print_table(columns: &[(&str, usize)], rows: &[Vec<String>]) {
    let last = columns.len().saturating_sub(1);
    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, (name, width))| {
            if i == last {
                name.to_string()
            } else {
                format!("{:<width$}", name, width = *width)
            }
        })
        .collect();
    println!("{}", style(header.join(" ")).bold());

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(columns)
            .enumerate()
            .map(|(i, (cell, (_, width)))| {
                if i == last {
                    cell.clone()
                } else {
                    format!("{:<width$}", truncate_str(cell, *width), width = *width)
                }
            })
            .collect();
        println!("{}", cells.join(" ").trim_end());
    }
}

/// Print rows in a tabular format: a table for `auto`, otherwise TSV/CSV
pub fn print_rows(columns: &[(&str, usize)], rows: &[Vec<String>], format: OutputFormat) {
    match format {
        OutputFormat::Auto => print_table(columns, rows),
        _ => {
            let header: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
            print_delimited(&header, rows, format);
        }
    }
}
