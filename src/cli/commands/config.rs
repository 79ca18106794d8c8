//! `yardbook config` command - inspect configuration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::collection::Collection;
use crate::core::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show where configuration is read from
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover().ok();
    match cmd {
        ConfigCommands::Show => run_show(collection.as_ref(), global),
        ConfigCommands::Path => {
            run_path(collection.as_ref());
            Ok(())
        }
    }
}

fn run_show(collection: Option<&Collection>, global: &GlobalOpts) -> Result<()> {
    let config = Config::load_for(collection);

    if matches!(global.format, OutputFormat::Json | OutputFormat::Yaml) {
        return print_structured(&config, global.format);
    }

    println!("{}: {}", style("author").bold(), config.author());
    println!("{}: {}", style("editor").bold(), config.editor());
    println!("{}: {}", style("default_currency").bold(), config.currency());
    println!(
        "{}: {}",
        style("default_gauge").bold(),
        config.default_gauge.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn run_path(collection: Option<&Collection>) {
    let mark = |exists: bool| {
        if exists {
            style("✓").green()
        } else {
            style("-").dim()
        }
    };

    match Config::user_config_path() {
        Some(path) => println!("{} user:       {}", mark(path.is_file()), path.display()),
        None => println!("{} user:       (no config directory)", mark(false)),
    }
    match collection {
        Some(c) => {
            let path = c.config_path();
            println!("{} collection: {}", mark(path.is_file()), path.display());
        }
        None => println!("{} collection: (not in a collection)", mark(false)),
    }
}
