use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;
use yardbook::cli::commands;
use yardbook::cli::{Cli, Commands, GlobalOpts};

/// Route logs to stderr; `YARDBOOK_LOG` overrides the -v/-q level
fn init_tracing(global: &GlobalOpts) {
    let level = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_env("YARDBOOK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("yardbook={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(&cli.global);
    let global = &cli.global;

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Purchase(cmd) => commands::purchase::run(cmd, global),
        Commands::Model(cmd) => commands::model::run(cmd, global),
        Commands::Acc(cmd) => commands::acc::run(cmd, global),
        Commands::Prefix(args) => commands::prefix::run(args, global),
        Commands::Family(args) => commands::family::run(args, global),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Config(cmd) => commands::config::run(cmd, global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
