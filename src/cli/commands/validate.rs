//! `yardbook validate` command - check ordering and derived values

use console::style;
use miette::Result;

use crate::cli::helpers::register_short_ids;
use crate::core::catalog::catalog_number_prefix;
use crate::core::collection::Collection;
use crate::core::session::Session;
use crate::entities::{Accessory, Model, Purchase};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Renumber out-of-order children and refresh stale catalog prefixes
    #[arg(long)]
    pub fix: bool,

    /// Show summary only, don't show individual problems
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_failed: usize,
    purchases_checked: usize,
    problems: usize,
    fixed: usize,
    files_written: usize,
}

impl ValidationStats {
    /// Problems still present after any repairs
    fn remaining(&self) -> usize {
        (self.files_failed + self.problems).saturating_sub(self.fixed)
    }
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let collection = Collection::discover()?;
    let mut stats = ValidationStats::default();

    println!(
        "{} Validating collection in {}...\n",
        style("→").blue(),
        collection.root().display()
    );

    // Every file must parse before relationships can be checked
    let (purchases, purchase_errors) = collection.load_all::<Purchase>();
    let (models, model_errors) = collection.load_all::<Model>();
    let (accessories, accessory_errors) = collection.load_all::<Accessory>();
    stats.files_checked = purchases.len()
        + models.len()
        + accessories.len()
        + purchase_errors.len()
        + model_errors.len()
        + accessory_errors.len();

    for (path, error) in purchase_errors
        .into_iter()
        .chain(model_errors)
        .chain(accessory_errors)
    {
        stats.files_failed += 1;
        if !args.summary {
            println!("{} {}", style("✗").red(), path.display());
            println!("{:?}", miette::Report::new(error));
        }
    }

    if stats.files_failed == 0 {
        check_records(&collection, &args, &mut stats)?;
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:     {}", style(stats.files_checked).cyan());
    println!("  Files unparseable: {}", style(stats.files_failed).red());
    println!("  Purchases checked: {}", style(stats.purchases_checked).cyan());
    println!("  Problems found:    {}", style(stats.problems).red());
    if args.fix {
        println!("  Problems fixed:    {}", style(stats.fixed).green());
        println!("  Files rewritten:   {}", style(stats.files_written).green());
    }
    println!();

    let remaining = stats.remaining();
    if remaining > 0 {
        let hint = if !args.fix && stats.problems > 0 {
            " (run with --fix to repair)"
        } else {
            ""
        };
        Err(miette::miette!(
            "Validation failed: {} problem(s) remain{}",
            remaining,
            hint
        ))
    } else {
        println!("{} Collection is consistent", style("✓").green().bold());
        Ok(())
    }
}

fn check_records(collection: &Collection, args: &ValidateArgs, stats: &mut ValidationStats) -> Result<()> {
    let mut session = Session::new(collection);
    let (mut records, orphans) = session.load_all()?;
    let short_ids = register_short_ids(collection, records.iter().map(|r| &r.purchase.id));

    for record in records.iter_mut() {
        stats.purchases_checked += 1;
        let display = short_ids.display(&record.id());
        let mut repairable = 0;

        for (prefix, problem) in record.verify() {
            repairable += 1;
            if !args.summary {
                println!("{} {} {} ordering: {}", style("✗").red(), display, prefix, problem);
            }
        }

        let expected = catalog_number_prefix(&record.purchase.catalog_number);
        if expected != record.purchase.catalog_number_prefix {
            repairable += 1;
            if !args.summary {
                println!(
                    "{} {} catalog prefix is {:?}, expected {:?}",
                    style("✗").red(),
                    display,
                    record.purchase.catalog_number_prefix,
                    expected
                );
            }
        }

        stats.problems += repairable;
        if args.fix && repairable > 0 {
            let moved = record.renumber();
            let written = session.commit(record)?.written;
            stats.fixed += repairable;
            stats.files_written += written;
            if !args.summary {
                println!(
                    "{} {} repaired ({} child position(s) renumbered, {} file(s) written)",
                    style("✓").green(),
                    display,
                    moved,
                    written
                );
            }
        }
    }

    for orphan in &orphans {
        stats.problems += 1;
        if !args.summary {
            println!(
                "{} {} belongs to missing purchase {}",
                style("✗").red(),
                orphan.id,
                orphan.purchase
            );
        }
    }

    if stats.problems > 0 && !args.summary {
        println!();
    }
    Ok(())
}
