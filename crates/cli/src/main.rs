//! Trimless CLI - trimless command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod host;
mod system_config;
mod util;

/// Trimless - show the trimmed content of webmail threads
#[derive(Parser)]
#[command(name = "trimless")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Profile directory (default: <data_dir>/trimless/profile)
    #[arg(long, global = true, env = "TRIMLESS_PROFILE")]
    profile: Option<PathBuf>,

    /// Config file (default: <config_dir>/trimless/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default settings into the profile and offer the trial
    Install,
    /// Show feature state, plan and today's usage
    Status,
    /// Flip the feature flag
    Toggle,
    /// Turn the feature on
    Enable,
    /// Turn the feature off
    Disable,
    /// Untrim one thread, subject to the daily quota
    Untrim {
        /// Location hash (e.g. "#inbox/18c2f0a1b2") or bare thread id
        thread: String,
    },
    /// Record payment events
    #[command(subcommand)]
    Payment(PaymentCommands),
    /// View and edit display options
    #[command(subcommand)]
    Options(OptionsCommands),
    /// View and edit the system configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Run a page session fed from stdin (load, hash <hash>, visible, click, quit)
    Watch {
        /// Initial location hash
        #[arg(long, default_value = "#inbox")]
        hash: String,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Mark the profile as paid
    Paid,
    /// Start the trial
    Trial {
        /// Activation time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Pull the payment state from the provider
    Sync {
        /// Keep syncing every `payment.sync_interval_secs` until interrupted
        #[arg(long)]
        repeat: bool,
    },
}

#[derive(Subcommand)]
enum OptionsCommands {
    /// List all display options
    List,
    /// Get one option
    Get { key: String },
    /// Set one option
    Set { key: String, value: String },
    /// Restore the defaults
    Reset,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = util::Paths::resolve(cli.profile, cli.config)?;

    match cli.command {
        Commands::Install => cmd::install::run(&paths).await,
        Commands::Status => cmd::status::run(&paths).await,
        Commands::Toggle => cmd::toggle::run_toggle(&paths).await,
        Commands::Enable => cmd::toggle::run_set(&paths, true).await,
        Commands::Disable => cmd::toggle::run_set(&paths, false).await,
        Commands::Untrim { thread } => cmd::untrim::run(&paths, &thread).await,
        Commands::Payment(payment_cmd) => match payment_cmd {
            PaymentCommands::Paid => cmd::payment::run_paid(&paths).await,
            PaymentCommands::Trial { at } => cmd::payment::run_trial(&paths, at.as_deref()).await,
            PaymentCommands::Sync { repeat } => cmd::payment::run_sync(&paths, repeat).await,
        },
        Commands::Options(options_cmd) => match options_cmd {
            OptionsCommands::List => cmd::options::run_list(&paths).await,
            OptionsCommands::Get { key } => cmd::options::run_get(&paths, &key).await,
            OptionsCommands::Set { key, value } => {
                cmd::options::run_set(&paths, &key, &value).await
            }
            OptionsCommands::Reset => cmd::options::run_reset(&paths).await,
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(&paths).await,
            ConfigCommands::Get { key } => cmd::config::run_get(&paths, &key).await,
            ConfigCommands::Set { key, value } => {
                cmd::config::run_set(&paths, &key, &value).await
            }
            ConfigCommands::Path { create } => cmd::config::run_path(&paths, create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
        Commands::Watch { hash } => cmd::watch::run(&paths, &hash).await,
    }
}
