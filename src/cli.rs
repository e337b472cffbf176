//! CLI interface for sustain-tutor

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{self, Config};
use crate::tutor::Tutor;

#[derive(Parser)]
#[command(name = "sustain-tutor")]
#[command(about = "Sustainable Digitalization AI tutor: knowledge checks and scenario activities", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "SUSTAIN_TUTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Knowledge file to load instead of the configured one
    #[arg(long, global = true)]
    knowledge: Option<PathBuf>,

    /// Scenario file to load instead of the configured one
    #[arg(long, global = true)]
    scenarios: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
    /// Start a tutoring session in the terminal (default)
    Interactive,
    /// Validate data files and probe the generation server
    Check,
    /// Show or initialize configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
        /// Write a default config file
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    /// Load config and apply command-line overrides
    fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(path) = &self.knowledge {
            config.data.knowledge_path = path.clone();
        }
        if let Some(path) = &self.scenarios {
            config.data.scenarios_path = path.clone();
        }
        Ok(config)
    }
}

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.command {
        None | Some(Commands::Interactive) => {
            let tutor = Arc::new(Tutor::from_config(&config)?);
            crate::tutor::interactive::run_interactive(tutor).await?;
        }
        Some(Commands::Serve { port, host }) => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            crate::server::start(&config, &host, port).await?;
        }
        Some(Commands::Check) => {
            run_check(&config).await?;
        }
        Some(Commands::Config { show, init }) => {
            if init {
                let path = config::init_config()?;
                println!("✅ Default configuration written to {}", path.display());
            } else if show {
                config::show_config(&config)?;
            } else {
                print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
            }
        }
    }

    Ok(())
}

/// Load everything the tutor needs and report what was found
async fn run_check(config: &Config) -> Result<()> {
    println!("🔍 Checking tutor setup...\n");

    let tutor = Tutor::from_config(config)?;
    println!("✓ {} knowledge chunks ({})", tutor.knowledge().len(), config.data.knowledge_path.display());
    println!("✓ {} scenarios ({})", tutor.scenarios().len(), config.data.scenarios_path.display());

    if tutor.knowledge().len() < crate::knowledge::CONTEXT_CHUNKS {
        println!(
            "⚠ Knowledge Check needs at least {} chunks; answers will be rejected",
            crate::knowledge::CONTEXT_CHUNKS
        );
    }
    if tutor.scenarios().is_empty() {
        println!("⚠ No scenarios loaded; Scenario-Based Activity is unavailable");
    }

    tutor
        .generator()
        .health()
        .await
        .with_context(|| format!("Generation server at {} is not reachable", config.generation.endpoint))?;
    println!("✓ Generation server reachable ({})", tutor.generator().backend_name());

    println!("\n✅ All checks passed");
    Ok(())
}
