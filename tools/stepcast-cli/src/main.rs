//! Stepcast CLI: record clicks into annotated step-by-step guides.
//!
//! Usage:
//!   stepcast record [OPTIONS]    Record until Ctrl+C, then export
//!   stepcast displays            List the detected display layout
//!   stepcast config [--init]     Show or create the configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use stepcast_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "stepcast",
    about = "Record clicks into annotated step-by-step guides",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record clicks until Ctrl+C, then export the steps
    Record {
        /// Output file (defaults to a timestamped file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: html|pdf
        #[arg(short, long)]
        format: Option<String>,

        /// Button polling interval in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Skip the PDF cover page
        #[arg(long)]
        no_cover: bool,
    },

    /// List the detected display layout
    Displays,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    stepcast_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Record {
            output,
            format,
            tick_ms,
            title,
            no_cover,
        } => {
            let args = commands::record::RecordArgs {
                output,
                format,
                tick_ms,
                title,
                cover_page: !no_cover,
            };
            commands::record::run(&config, args).await
        }
        Commands::Displays => commands::displays::run(),
        Commands::Config { init } => commands::config::run(&config, cli.config, init),
    }
}
