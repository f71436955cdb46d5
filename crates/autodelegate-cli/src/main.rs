//! autodelegate CLI - runs the delegate generator outside a compiler
//!
//! Commands:
//! - `autodelegate generate` - Generate delegate classes from a declaration model
//! - `autodelegate check` - Validate configuration and a declaration model
//! - `autodelegate describe` - Print the processor descriptor as JSON

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod check;
mod describe;
mod generate;
mod logging;
mod settings;

#[derive(Parser)]
#[command(name = "autodelegate")]
#[command(author, version, about = "Forwarding delegate generator for Java declarations", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate delegate classes for every annotated declaration in a model
    Generate {
        /// Path to the JSON declaration model
        #[arg(short, long)]
        model: PathBuf,

        /// Root directory for generated sources
        #[arg(short, long)]
        output: PathBuf,

        /// Path to autodelegate.toml (default: ./autodelegate.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only process these declarations (qualified names)
        #[arg(short, long = "element")]
        elements: Vec<String>,
    },

    /// Validate configuration and, optionally, a declaration model
    Check {
        /// Path to autodelegate.toml (default: ./autodelegate.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to a JSON declaration model
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Print the processor descriptor as JSON
    Describe {
        /// Path to autodelegate.toml (default: ./autodelegate.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            model,
            output,
            config,
            elements,
        } => {
            let config = settings::load(config.as_deref())?;
            logging::init_logging(&config.log_level, cli.verbose);
            generate::run(&model, &output, &config, elements)?;
        }
        Commands::Check { config, model } => {
            let config = settings::load(config.as_deref())?;
            logging::init_logging(&config.log_level, cli.verbose);
            check::run(&config, model.as_deref())?;
        }
        Commands::Describe { config } => {
            let config = settings::load(config.as_deref())?;
            logging::init_logging(&config.log_level, cli.verbose);
            describe::run(&config)?;
        }
    }

    Ok(())
}
