//! Command-line argument tree

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    acc::AccCommands, completions::CompletionsArgs, config::ConfigCommands, family::FamilyArgs,
    init::InitArgs, model::ModelCommands, prefix::PrefixArgs, purchase::PurchaseCommands,
    validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(name = "yardbook")]
#[command(author, version)]
#[command(about = "Catalogue a model railway collection as plain-text YAML files")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Output format for show and list commands
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable for the terminal (tables for lists, YAML for single records)
    #[default]
    Auto,
    Yaml,
    Json,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// Full IDs only, one per line
    Id,
    /// Short IDs only, one per line
    ShortId,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new collection in the current directory
    Init(InitArgs),

    /// Manage purchases
    #[command(subcommand, visible_alias = "pur")]
    Purchase(PurchaseCommands),

    /// Manage the models that came in a purchase
    #[command(subcommand, visible_alias = "mdl")]
    Model(ModelCommands),

    /// Manage the accessories that came in a purchase
    #[command(subcommand)]
    Acc(AccCommands),

    /// Show the family prefix of catalog numbers
    Prefix(PrefixArgs),

    /// Group purchases by catalog number family
    Family(FamilyArgs),

    /// Check ordering and derived values across the collection
    Validate(ValidateArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
