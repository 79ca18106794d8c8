//! `yardbook init` command - create a collection

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::collection::Collection;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub path: Option<std::path::PathBuf>,

    /// Overwrite the collection config with the default template
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };

    let existed = Collection::is_initialized(&root);
    if existed && !args.force {
        println!(
            "{} Collection already exists at {}",
            style("!").yellow(),
            style(root.display()).cyan()
        );
        println!("   Use {} to reset the configuration.", style("--force").yellow());
        return Ok(());
    }

    let collection = Collection::init(&root, args.force)?;

    let verb = if existed { "Reinitialized" } else { "Initialized" };
    println!(
        "{} {} yardbook collection in {}",
        style("✓").green(),
        verb,
        style(collection.root().display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!(
        "  {}",
        style("yardbook purchase new --manufacturer Hornby --catalog-number R3390TTS").yellow()
    );
    println!("  {}", style("yardbook model add PUR@1 --class \"Class 50\"").yellow());

    Ok(())
}
