use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hoopchat::config::Config;
use hoopchat::logging::{self, LogTarget};
use hoopchat::{app, commands};

#[derive(Parser)]
#[command(name = "hoopchat")]
#[command(version)]
#[command(about = "Chat with the basketball coach from your terminal", long_about = None)]
struct Cli {
    /// Path to config.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Query endpoint, overrides the config file
    #[arg(short, long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Print the reply as a JSON turn
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration
    Config {
        /// Write it to the config path
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)?;
    config.apply_endpoint_override(cli.endpoint);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => app::run(config).await?,
        Commands::Ask { question, json } => {
            logging::init(LogTarget::Stderr)?;
            let question = question.join(" ");
            commands::ask(&config, question.trim(), json).await?
        }
        Commands::Config { save } => commands::show_config(&config, &config_path, save)?,
    }

    Ok(())
}
