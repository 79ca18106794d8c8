//! `yardbook model` command - models within a purchase

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::child_cmd::{self, ChildKind};
use crate::cli::filters::CategoryFilter;
use crate::cli::helpers::register_short_ids;
use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::collection::Collection;
use crate::core::config::Config;
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::ordering::ChildList;
use crate::core::session::{PurchaseRecord, Session};
use crate::entities::{Category, Decoder, Disposition, Model};

#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    /// Add a model at the end of a purchase
    Add(AddArgs),

    /// List the models of a purchase in order
    List(ListArgs),

    /// Show a model's details
    Show(ShowArgs),

    /// Remove a model; later models move up one position
    Remove(RemoveArgs),

    /// Move a model to another position within its purchase
    Move(MoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Purchase ID or short ID (PUR@N)
    pub purchase: String,

    /// Kind of prototype
    #[arg(long, short = 't', default_value = "locomotive")]
    pub category: Category,

    /// Class (e.g., "Class 50")
    #[arg(long = "class")]
    pub class_name: Option<String>,

    /// Running number (e.g., "50 033")
    #[arg(long)]
    pub number: Option<String>,

    /// Name carried (e.g., "Glorious")
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub livery: Option<String>,

    /// Modelling details (weathering, lighting, ...)
    #[arg(long)]
    pub details: Option<String>,

    #[arg(long)]
    pub era: Option<String>,

    /// Gauge or scale (defaults to `default_gauge` from config)
    #[arg(long)]
    pub gauge: Option<String>,

    #[arg(long, default_value = "normal")]
    pub disposition: Disposition,

    /// Fitted decoder catalog number
    #[arg(long)]
    pub decoder: Option<String>,

    /// DCC address of the fitted decoder
    #[arg(long, requires = "decoder")]
    pub address: Option<u16>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Purchase ID or short ID (PUR@N)
    pub purchase: String,

    /// Filter by category
    #[arg(long, short = 't', default_value = "all")]
    pub category: CategoryFilter,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Model ID or short ID (MDL@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Model ID or short ID (MDL@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Purchase ID or short ID (PUR@N)
    pub purchase: String,

    /// Current position (0-based, as shown by `model list`)
    pub from: i64,

    /// New position
    pub to: i64,
}

impl ChildKind for Model {
    const NAME: &'static str = "model";
    const NAME_PLURAL: &'static str = "models";
    const COLUMNS: &'static [(&'static str, usize)] = &[
        ("CATEGORY", 13),
        ("CLASS", 12),
        ("NUMBER", 10),
        ("NAME", 18),
        ("LIVERY", 0),
    ];

    fn list(record: &PurchaseRecord) -> &ChildList<Self> {
        &record.models
    }

    fn list_mut(record: &mut PurchaseRecord) -> &mut ChildList<Self> {
        &mut record.models
    }

    fn append<'r>(record: &'r mut PurchaseRecord, session: &mut Session<'_>) -> &'r mut Self {
        record.add_model(session)
    }

    fn detach(record: &mut PurchaseRecord, id: &EntityId, session: &mut Session<'_>) {
        record.remove_model(id, session);
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.category.to_string(),
            self.class_name.clone(),
            self.number.clone(),
            self.name.clone(),
            self.livery.clone(),
        ]
    }
}

/// Run a model subcommand
pub fn run(cmd: ModelCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ModelCommands::Add(args) => run_add(args, global),
        ModelCommands::List(args) => child_cmd::run_list::<Model>(
            &args.purchase,
            |m| args.category.matches(&m.category),
            args.count,
            global,
        ),
        ModelCommands::Show(args) => run_show(args, global),
        ModelCommands::Remove(args) => child_cmd::run_remove::<Model>(&args.id, global),
        ModelCommands::Move(args) => {
            child_cmd::run_move::<Model>(&args.purchase, args.from, args.to, global)
        }
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let default_gauge = Config::load().default_gauge;

    let edit = args.edit;
    let purchase = args.purchase.clone();
    let fill = move |model: &mut Model| {
        model.category = args.category;
        model.class_name = args.class_name.unwrap_or_default();
        model.number = args.number.unwrap_or_default();
        model.name = args.name.unwrap_or_default();
        model.livery = args.livery.unwrap_or_default();
        model.details = args.details.unwrap_or_default();
        model.era = args.era.unwrap_or_default();
        model.gauge = args.gauge.or(default_gauge).unwrap_or_default();
        model.disposition = args.disposition;
        model.decoder = args.decoder.map(|catalog_number| Decoder {
            catalog_number,
            address: args.address,
            ..Decoder::default()
        });
        model.notes = args.notes.unwrap_or_default();
    };

    child_cmd::run_add::<Model>(&purchase, fill, edit, global)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover()?;
    let id = collection.resolve(EntityPrefix::Mdl, &args.id)?;
    let model: Model = collection.load(&id)?;
    let short_ids = register_short_ids(&collection, [&model.id, &model.purchase]);

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => return print_structured(&model, global.format),
        OutputFormat::Id => {
            println!("{}", model.id);
            return Ok(());
        }
        OutputFormat::ShortId => {
            println!("{}", short_ids.display(&model.id));
            return Ok(());
        }
        _ => {}
    }

    let field = |label: &str, value: &str| {
        if !value.is_empty() {
            println!("{}: {}", style(label).bold(), value);
        }
    };

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("ID").bold(),
        style(short_ids.display(&model.id)).cyan()
    );
    println!("{}: {}", style("Model").bold(), style(model.title()).yellow());
    println!(
        "{}: {} at position {}",
        style("Purchase").bold(),
        style(short_ids.display(&model.purchase)).cyan(),
        model.position
    );
    println!("{}", style("─".repeat(60)).dim());

    println!("{}: {}", style("Category").bold(), model.category);
    field("Livery", &model.livery);
    field("Era", &model.era);
    field("Gauge", &model.gauge);
    field("Details", &model.details);
    if model.disposition != Disposition::Normal {
        println!("{}: {}", style("Disposition").bold(), model.disposition);
    }

    if let Some(ref decoder) = model.decoder {
        println!();
        println!("{}:", style("Decoder").bold());
        field("  Catalog", &decoder.catalog_number);
        field("  Serial", &decoder.serial_number);
        if let Some(address) = decoder.address {
            println!("{}: {}", style("  Address").bold(), address);
        }
        if let Some(ref sound) = decoder.sound_file {
            println!("{}: {}", style("  Sound").bold(), sound);
        }
    }

    if !model.notes.is_empty() {
        println!();
        println!("{}", style("Notes:").bold());
        println!("{}", model.notes);
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("Created").dim(),
        model.created.format("%Y-%m-%d %H:%M")
    );

    Ok(())
}
