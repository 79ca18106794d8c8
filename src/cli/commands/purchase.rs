//! `yardbook purchase` command - purchase management

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;
use std::collections::HashMap;

use crate::cli::child_cmd::{open_purchase, print_list_footer};
use crate::cli::filters::ConditionFilter;
use crate::cli::helpers::{confirm, open_in_editor, register_short_ids, report_skipped};
use crate::cli::output::{print_rows, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::collection::Collection;
use crate::core::config::Config;
use crate::core::entity::{Entity, PurchaseItem};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::session::{PurchaseRecord, Session};
use crate::core::shortid::ShortIdIndex;
use crate::entities::{Accessory, Condition, Model, Price, Purchase};

#[derive(Subcommand, Debug)]
pub enum PurchaseCommands {
    /// List purchases with filtering
    List(ListArgs),

    /// Record a new purchase
    New(NewArgs),

    /// Show a purchase with its models and accessories
    Show(ShowArgs),

    /// Edit a purchase in your editor
    Edit(EditArgs),

    /// Delete a purchase together with its models and accessories
    Delete(DeleteArgs),
}

/// Sort keys for purchase lists
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortField {
    Date,
    Manufacturer,
    Catalog,
    Price,
    Created,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by manufacturer (case-insensitive substring match)
    #[arg(long, short = 'm')]
    pub manufacturer: Option<String>,

    /// Only purchases in this catalog number family (e.g., R3390)
    #[arg(long)]
    pub family: Option<String>,

    /// Filter by condition
    #[arg(long, short = 'c', default_value = "all")]
    pub condition: ConditionFilter,

    /// Search in catalog number, description, store and notes
    #[arg(long)]
    pub search: Option<String>,

    /// Sort by field
    #[arg(long, default_value = "date")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Manufacturer (e.g., Hornby)
    #[arg(long, short = 'm')]
    pub manufacturer: String,

    /// Catalog number as printed on the box (e.g., R3390TTS)
    #[arg(long, short = 'c', default_value = "")]
    pub catalog_number: String,

    /// Catalog description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Year of the catalog the item appeared in
    #[arg(long)]
    pub year: Option<u16>,

    /// Limited edition details (e.g., "1 of 500")
    #[arg(long)]
    pub limited_edition: Option<String>,

    /// Date of purchase (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Store or seller
    #[arg(long, short = 's')]
    pub store: Option<String>,

    /// Price paid (e.g., 89.99, £89.99, "USD 120")
    #[arg(long, short = 'p')]
    pub price: Option<String>,

    /// Condition when bought
    #[arg(long)]
    pub condition: Option<Condition>,

    /// Notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Purchase ID or short ID (PUR@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Purchase ID or short ID (PUR@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Purchase ID or short ID (PUR@N)
    pub id: String,

    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a purchase subcommand
pub fn run(cmd: PurchaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PurchaseCommands::List(args) => run_list(args, global),
        PurchaseCommands::New(args) => run_new(args, global),
        PurchaseCommands::Show(args) => run_show(args, global),
        PurchaseCommands::Edit(args) => run_edit(args),
        PurchaseCommands::Delete(args) => run_delete(args),
    }
}

/// Number of models and accessories per purchase
fn child_counts(collection: &Collection) -> HashMap<EntityId, (usize, usize)> {
    let mut counts: HashMap<EntityId, (usize, usize)> = HashMap::new();

    let (models, errors) = collection.load_all::<Model>();
    report_skipped(&errors);
    for model in &models {
        counts.entry(*model.purchase()).or_default().0 += 1;
    }

    let (accessories, errors) = collection.load_all::<Accessory>();
    report_skipped(&errors);
    for accessory in &accessories {
        counts.entry(*accessory.purchase()).or_default().1 += 1;
    }

    counts
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover()?;
    let (purchases, errors) = collection.load_all::<Purchase>();
    report_skipped(&errors);

    let manufacturer = args.manufacturer.as_deref().map(str::to_lowercase);
    let search = args.search.as_deref().map(str::to_lowercase);

    let mut purchases: Vec<Purchase> = purchases
        .into_iter()
        .filter(|p| {
            manufacturer
                .as_deref()
                .is_none_or(|m| p.manufacturer.to_lowercase().contains(m))
        })
        .filter(|p| {
            args.family
                .as_deref()
                .is_none_or(|f| p.catalog_number_prefix.eq_ignore_ascii_case(f))
        })
        .filter(|p| args.condition.matches(p.condition))
        .filter(|p| {
            search.as_deref().is_none_or(|q| {
                [&p.catalog_number, &p.catalog_description, &p.store, &p.notes]
                    .iter()
                    .any(|field| field.to_lowercase().contains(q))
            })
        })
        .collect();

    match args.sort {
        SortField::Date => purchases.sort_by(|a, b| a.date.cmp(&b.date)),
        SortField::Manufacturer => purchases.sort_by(|a, b| {
            a.manufacturer
                .cmp(&b.manufacturer)
                .then_with(|| a.catalog_number.cmp(&b.catalog_number))
        }),
        SortField::Catalog => purchases.sort_by(|a, b| a.catalog_number.cmp(&b.catalog_number)),
        SortField::Price => purchases.sort_by(|a, b| {
            let amount = |p: &Purchase| p.price.as_ref().map(|price| price.amount);
            amount(a).cmp(&amount(b))
        }),
        SortField::Created => purchases.sort_by(|a, b| a.created.cmp(&b.created)),
    }

    if args.reverse {
        purchases.reverse();
    }

    if let Some(limit) = args.limit {
        purchases.truncate(limit);
    }

    if args.count {
        println!("{}", purchases.len());
        return Ok(());
    }

    let short_ids = register_short_ids(&collection, purchases.iter().map(|p| &p.id));

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&purchases, global.format)?,
        OutputFormat::Id => {
            for purchase in &purchases {
                println!("{}", purchase.id);
            }
        }
        OutputFormat::ShortId => {
            for purchase in &purchases {
                println!("{}", short_ids.display(&purchase.id));
            }
        }
        format => {
            if purchases.is_empty() {
                println!("No purchases found.");
                return Ok(());
            }

            let counts = child_counts(&collection);
            let rows: Vec<Vec<String>> = purchases
                .iter()
                .map(|p| {
                    let (models, accessories) = counts.get(&p.id).copied().unwrap_or_default();
                    vec![
                        short_ids.display(&p.id),
                        p.manufacturer.clone(),
                        p.catalog_number.clone(),
                        p.catalog_number_prefix.clone(),
                        p.date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                        p.price
                            .as_ref()
                            .map(Price::to_string)
                            .unwrap_or_else(|| "-".into()),
                        format!("{}+{}", models, accessories),
                        p.catalog_description.clone(),
                    ]
                })
                .collect();

            print_rows(
                &[
                    ("SHORT", 8),
                    ("MANUFACTURER", 12),
                    ("CATALOG", 12),
                    ("PREFIX", 10),
                    ("DATE", 10),
                    ("PRICE", 9),
                    ("ITEMS", 5),
                    ("DESCRIPTION", 0),
                ],
                &rows,
                format,
            );
            if format == OutputFormat::Auto {
                print_list_footer(purchases.len(), EntityPrefix::Pur, "purchases");
            }
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover()?;
    let config = Config::load_for(Some(&collection));

    let mut purchase = Purchase::new(args.manufacturer, args.catalog_number, config.author());
    purchase.catalog_description = args.description.unwrap_or_default();
    purchase.catalog_year = args.year;
    purchase.limited_edition = args.limited_edition;
    purchase.date = args.date;
    purchase.store = args.store.unwrap_or_default();
    purchase.condition = args.condition;
    purchase.notes = args.notes.unwrap_or_default();
    if let Some(price) = args.price {
        purchase.price = Some(
            Price::parse(&price, config.currency()).map_err(|e| miette::miette!("{}", e))?,
        );
    }

    let mut session = Session::new(&collection);
    let mut record = PurchaseRecord::new(purchase);
    session.commit(&mut record)?;

    let id = record.id();
    let short_ids = register_short_ids(&collection, [&id]);
    let path = collection.entity_path(&id);

    match global.format {
        OutputFormat::Id => println!("{}", id),
        OutputFormat::ShortId => println!("{}", short_ids.display(&id)),
        _ => {
            println!(
                "{} Created purchase {}",
                style("✓").green(),
                style(short_ids.display(&id)).cyan()
            );
            println!("   {}", style(path.display()).dim());
            println!("   {}", style(record.purchase.title()).yellow());
            if !record.purchase.catalog_number_prefix.is_empty() {
                println!(
                    "   Family: {}",
                    style(&record.purchase.catalog_number_prefix).yellow()
                );
            }
        }
    }

    if args.edit {
        println!();
        open_in_editor(&config, &path)?;
        resync(&collection, &id)?;
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct PurchaseView<'a> {
    #[serde(flatten)]
    purchase: &'a Purchase,
    models: Vec<&'a Model>,
    accessories: Vec<&'a Accessory>,
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover()?;
    let (_session, record) = open_purchase(&collection, &args.id)?;
    let models = record.models.ordered();
    let accessories = record.accessories.ordered();

    let short_ids = register_short_ids(
        &collection,
        std::iter::once(&record.purchase.id)
            .chain(models.iter().map(|m| &m.id))
            .chain(accessories.iter().map(|a| &a.id)),
    );

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let view = PurchaseView {
                purchase: &record.purchase,
                models,
                accessories,
            };
            print_structured(&view, global.format)
        }
        OutputFormat::Id => {
            println!("{}", record.id());
            Ok(())
        }
        OutputFormat::ShortId => {
            println!("{}", short_ids.display(&record.id()));
            Ok(())
        }
        _ => {
            print_purchase(&record.purchase, &short_ids);

            println!();
            println!("{} ({}):", style("Models").bold(), models.len());
            for model in &models {
                println!(
                    "  {:>2}. {} {} {}",
                    model.position,
                    style(short_ids.display(&model.id)).cyan(),
                    model.title(),
                    style(format!("[{}]", model.category)).dim()
                );
            }

            if !accessories.is_empty() {
                println!();
                println!("{} ({}):", style("Accessories").bold(), accessories.len());
                for accessory in &accessories {
                    println!(
                        "  {:>2}. {} {}",
                        accessory.position,
                        style(short_ids.display(&accessory.id)).cyan(),
                        accessory.title()
                    );
                }
            }

            for (prefix, problem) in record.verify() {
                println!();
                println!(
                    "{} {} ordering: {}",
                    style("!").yellow(),
                    prefix,
                    problem
                );
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {}",
                style("Author").dim(),
                record.purchase.author,
                style("Created").dim(),
                record.purchase.created.format("%Y-%m-%d %H:%M")
            );
            Ok(())
        }
    }
}

fn print_purchase(purchase: &Purchase, short_ids: &ShortIdIndex) {
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("ID").bold(),
        style(short_ids.display(&purchase.id)).cyan()
    );
    println!(
        "{}: {}",
        style("Manufacturer").bold(),
        style(&purchase.manufacturer).yellow()
    );
    if !purchase.catalog_number.is_empty() {
        println!(
            "{}: {} (family {})",
            style("Catalog").bold(),
            purchase.catalog_number,
            style(&purchase.catalog_number_prefix).cyan()
        );
    }
    if !purchase.catalog_description.is_empty() {
        println!("{}: {}", style("Description").bold(), purchase.catalog_description);
    }
    if let Some(year) = purchase.catalog_year {
        println!("{}: {}", style("Catalog year").bold(), year);
    }
    if let Some(ref edition) = purchase.limited_edition {
        println!("{}: {}", style("Limited edition").bold(), edition);
    }
    println!("{}", style("─".repeat(60)).dim());

    if let Some(date) = purchase.date {
        println!("{}: {}", style("Bought").bold(), date);
    }
    if !purchase.store.is_empty() {
        println!("{}: {}", style("Store").bold(), purchase.store);
    }
    if let Some(ref price) = purchase.price {
        println!("{}: {}", style("Price").bold(), price);
    }
    if let Some(condition) = purchase.condition {
        println!("{}: {}", style("Condition").bold(), condition);
    }
    if let Some(ref valuation) = purchase.valuation {
        println!("{}: {}", style("Valuation").bold(), valuation);
    }
    if !purchase.notes.is_empty() {
        println!();
        println!("{}", style("Notes:").bold());
        println!("{}", purchase.notes);
    }
}

fn run_edit(args: EditArgs) -> Result<()> {
    let collection = Collection::discover()?;
    let config = Config::load_for(Some(&collection));
    let id = collection.resolve(EntityPrefix::Pur, &args.id)?;

    open_in_editor(&config, &collection.entity_path(&id))?;
    resync(&collection, &id)
}

/// Reload a hand-edited purchase and rewrite it if derived values are stale
fn resync(collection: &Collection, id: &EntityId) -> Result<()> {
    let mut session = Session::new(collection);
    let mut record = session.load_purchase(id)?;
    report_skipped(&session.take_skipped());

    let problems = record.verify();
    let stats = session.commit(&mut record)?;
    if stats.written > 0 {
        println!("{} Updated derived fields", style("✓").green());
    }
    for (prefix, problem) in problems {
        println!(
            "{} {} ordering: {} (run `yardbook validate --fix`)",
            style("!").yellow(),
            prefix,
            problem
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs) -> Result<()> {
    let collection = Collection::discover()?;
    let (mut session, record) = open_purchase(&collection, &args.id)?;
    let mut short_ids = ShortIdIndex::load(&collection);
    let display = short_ids.display(&record.id());

    let prompt = format!(
        "Delete {} ({}) with {} model(s) and {} accessory(ies)?",
        display,
        record.purchase.title(),
        record.models.len(),
        record.accessories.len()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let ids: Vec<EntityId> = std::iter::once(record.id())
        .chain(record.models.members().iter().map(|m| m.id))
        .chain(record.accessories.members().iter().map(|a| a.id))
        .collect();

    session.delete_purchase(record);
    let stats = session.commit_deletions()?;

    for id in &ids {
        short_ids.forget(id);
    }
    if let Err(e) = short_ids.save(&collection) {
        tracing::warn!(error = %e, "failed to save short IDs");
    }

    println!(
        "{} Deleted {} ({} file(s) removed)",
        style("✓").green(),
        style(display).cyan(),
        stats.deleted
    );
    Ok(())
}
