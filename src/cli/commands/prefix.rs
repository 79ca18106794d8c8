//! `yardbook prefix` command - show catalog number families

use clap::Args;
use miette::Result;

use crate::cli::output::{print_rows, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::catalog_number_prefix;

#[derive(Args, Debug)]
pub struct PrefixArgs {
    /// Catalog numbers (e.g., R3390TTS 32-452A)
    #[arg(required = true)]
    pub catalog_numbers: Vec<String>,
}

#[derive(serde::Serialize)]
struct PrefixRow<'a> {
    catalog_number: &'a str,
    prefix: String,
}

pub fn run(args: PrefixArgs, global: &GlobalOpts) -> Result<()> {
    let rows: Vec<PrefixRow> = args
        .catalog_numbers
        .iter()
        .map(|n| PrefixRow {
            catalog_number: n.as_str(),
            prefix: catalog_number_prefix(n),
        })
        .collect();

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&rows, global.format)?,
        OutputFormat::Id | OutputFormat::ShortId => {
            for row in &rows {
                println!("{}", row.prefix);
            }
        }
        OutputFormat::Auto if rows.len() == 1 => println!("{}", rows[0].prefix),
        format => {
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|r| vec![r.catalog_number.to_string(), r.prefix.clone()])
                .collect();
            print_rows(&[("CATALOG NUMBER", 16), ("PREFIX", 12)], &cells, format);
        }
    }

    Ok(())
}
