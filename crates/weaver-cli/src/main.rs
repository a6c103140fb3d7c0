use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "weaver")]
#[command(about = "Weaver CLI - supervisor-driven Researcher/Coder/Reviewer runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an objective through the default engine
    Run {
        /// The task objective, e.g. "build a sorting function"
        objective: String,
        /// Override the configured step ceiling
        #[arg(long)]
        max_steps: Option<usize>,
        /// Config file (defaults to the per-user config path)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the final run report as JSON instead of step lines
        #[arg(long)]
        json: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            objective,
            max_steps,
            config,
            json,
        } => {
            let succeeded = commands::run::execute(&objective, max_steps, config.as_deref(), json).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => commands::config::show(config.as_deref())?,
            ConfigAction::Path => commands::config::path()?,
        },
    }

    Ok(())
}
