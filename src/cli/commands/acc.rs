//! `yardbook acc` command - accessories within a purchase

use clap::Subcommand;
use miette::Result;

use crate::cli::child_cmd::{self, ChildKind};
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::identity::EntityId;
use crate::core::ordering::ChildList;
use crate::core::session::{PurchaseRecord, Session};
use crate::entities::Accessory;

#[derive(Subcommand, Debug)]
pub enum AccCommands {
    /// Add an accessory at the end of a purchase
    Add(AddArgs),

    /// List the accessories of a purchase in order
    List(ListArgs),

    /// Remove an accessory; later accessories move up one position
    Remove(RemoveArgs),

    /// Move an accessory to another position within its purchase
    Move(MoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Purchase ID or short ID (PUR@N)
    pub purchase: String,

    /// Accessory catalog number (e.g., R600)
    #[arg(long, short = 'c')]
    pub catalog_number: Option<String>,

    /// What it is (e.g., "Straight track")
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Gauge or scale (defaults to `default_gauge` from config)
    #[arg(long)]
    pub gauge: Option<String>,

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

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Accessory ID or short ID (ACC@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Purchase ID or short ID (PUR@N)
    pub purchase: String,

    /// Current position (0-based, as shown by `acc list`)
    pub from: i64,

    /// New position
    pub to: i64,
}

impl ChildKind for Accessory {
    const NAME: &'static str = "accessory";
    const NAME_PLURAL: &'static str = "accessories";
    const COLUMNS: &'static [(&'static str, usize)] =
        &[("CATALOG", 12), ("GAUGE", 6), ("DESCRIPTION", 0)];

    fn list(record: &PurchaseRecord) -> &ChildList<Self> {
        &record.accessories
    }

    fn list_mut(record: &mut PurchaseRecord) -> &mut ChildList<Self> {
        &mut record.accessories
    }

    fn append<'r>(record: &'r mut PurchaseRecord, session: &mut Session<'_>) -> &'r mut Self {
        record.add_accessory(session)
    }

    fn detach(record: &mut PurchaseRecord, id: &EntityId, session: &mut Session<'_>) {
        record.remove_accessory(id, session);
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.catalog_number.clone(),
            self.gauge.clone(),
            self.description.clone(),
        ]
    }
}

/// Run an accessory subcommand
pub fn run(cmd: AccCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AccCommands::Add(args) => {
            let default_gauge = Config::load().default_gauge;
            let fill = |accessory: &mut Accessory| {
                accessory.catalog_number = args.catalog_number.unwrap_or_default();
                accessory.description = args.description.unwrap_or_default();
                accessory.gauge = args.gauge.or(default_gauge).unwrap_or_default();
                accessory.notes = args.notes.unwrap_or_default();
            };
            child_cmd::run_add::<Accessory>(&args.purchase, fill, args.edit, global)
        }
        AccCommands::List(args) => {
            child_cmd::run_list::<Accessory>(&args.purchase, |_| true, args.count, global)
        }
        AccCommands::Remove(args) => child_cmd::run_remove::<Accessory>(&args.id, global),
        AccCommands::Move(args) => {
            child_cmd::run_move::<Accessory>(&args.purchase, args.from, args.to, global)
        }
    }
}
