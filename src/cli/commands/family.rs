//! `yardbook family` command - purchases grouped by catalog number family

use clap::Args;
use miette::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::helpers::report_skipped;
use crate::cli::output::{print_rows, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::collection::Collection;
use crate::entities::Purchase;

#[derive(Args, Debug)]
pub struct FamilyArgs {
    /// Only families from this manufacturer (case-insensitive)
    #[arg(long, short = 'm')]
    pub manufacturer: Option<String>,

    /// Hide families with a single purchase
    #[arg(long)]
    pub multiple: bool,
}

#[derive(Debug, Serialize)]
struct Family {
    manufacturer: String,
    prefix: String,
    catalog_numbers: Vec<String>,
}

pub fn run(args: FamilyArgs, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover()?;
    let (purchases, errors) = collection.load_all::<Purchase>();
    report_skipped(&errors);

    let families = group(&purchases, args.manufacturer.as_deref(), args.multiple);

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&families, global.format)?,
        OutputFormat::Id | OutputFormat::ShortId => {
            for family in &families {
                println!("{}", family.prefix);
            }
        }
        format => {
            if families.is_empty() {
                println!("No families found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = families
                .iter()
                .map(|f| {
                    vec![
                        f.manufacturer.clone(),
                        f.prefix.clone(),
                        f.catalog_numbers.len().to_string(),
                        f.catalog_numbers.join(" "),
                    ]
                })
                .collect();
            print_rows(
                &[
                    ("MANUFACTURER", 14),
                    ("FAMILY", 12),
                    ("COUNT", 5),
                    ("CATALOG NUMBERS", 0),
                ],
                &rows,
                format,
            );
        }
    }

    Ok(())
}

/// Group purchases by manufacturer and catalog prefix
///
/// The prefix is recomputed so hand-edited files group correctly.
/// Manufacturers match case-insensitively and are shown with their most
/// common spelling.
fn group(purchases: &[Purchase], manufacturer: Option<&str>, multiple: bool) -> Vec<Family> {
    let mut groups: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    let mut spellings: BTreeMap<String, BTreeMap<&str, usize>> = BTreeMap::new();

    for purchase in purchases {
        if manufacturer.is_some_and(|m| !purchase.manufacturer.eq_ignore_ascii_case(m)) {
            continue;
        }
        let key = purchase.manufacturer.to_lowercase();
        *spellings
            .entry(key.clone())
            .or_default()
            .entry(purchase.manufacturer.as_str())
            .or_default() += 1;

        let prefix = crate::core::catalog::catalog_number_prefix(&purchase.catalog_number);
        groups
            .entry((key, prefix))
            .or_default()
            .push(purchase.catalog_number.clone());
    }

    groups
        .into_iter()
        .filter(|(_, numbers)| !multiple || numbers.len() > 1)
        .map(|((key, prefix), mut catalog_numbers)| {
            catalog_numbers.sort();
            Family {
                manufacturer: display_name(&spellings, &key),
                prefix,
                catalog_numbers,
            }
        })
        .collect()
}

/// Most frequent spelling; ties go to the first in sort order
fn display_name(spellings: &BTreeMap<String, BTreeMap<&str, usize>>, key: &str) -> String {
    spellings
        .get(key)
        .and_then(|counts| {
            counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(name, _)| name.to_string())
        })
        .unwrap_or_else(|| key.to_string())
}
