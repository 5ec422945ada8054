use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratebook::core::log::init_logging;
use ratebook::core::snapshot::Rates;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a snapshot of the four exchange rates
    Add {
        #[arg(long)]
        eur: f64,
        #[arg(long)]
        usd: f64,
        /// Price of 100 JPY
        #[arg(long)]
        jpy: f64,
        #[arg(long)]
        gbp: f64,
    },
    /// Display the most recent snapshot
    Latest,
    /// Display every snapshot
    All,
    /// Export the history to a spreadsheet
    Export {
        /// Destination workbook, defaults to the configured export path
        path: Option<PathBuf>,
    },
    /// Import snapshots from a spreadsheet
    Import {
        /// Source workbook, defaults to the configured export path
        path: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve,
}

impl From<Commands> for ratebook::AppCommand {
    fn from(cmd: Commands) -> ratebook::AppCommand {
        match cmd {
            Commands::Add { eur, usd, jpy, gbp } => {
                ratebook::AppCommand::Add(Rates::new(eur, usd, jpy, gbp).into())
            }
            Commands::Latest => ratebook::AppCommand::Latest,
            Commands::All => ratebook::AppCommand::All,
            Commands::Export { path } => ratebook::AppCommand::Export(path),
            Commands::Import { path } => ratebook::AppCommand::Import(path),
            Commands::Serve => ratebook::AppCommand::Serve,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ratebook::cli::setup::setup(),
        Some(cmd) => ratebook::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
