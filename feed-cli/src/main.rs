//! # imagefeed
//!
//! Command-line client for the ImageFeed photo feed.
//!
//! ## Commands
//!
//! - `login`: Exchange an authorization code for an access token
//! - `feed`: Fetch and print pages of the photo feed
//! - `like` / `unlike`: Toggle a like on a photo
//! - `logout`: Forget the stored token
//! - `status`: Show login and configuration status
//!
//! ## Example
//!
//! ```bash
//! # Print the authorization page URL, then exchange the code it yields
//! imagefeed login
//! imagefeed login --code <code>
//!
//! # Browse two pages and like a photo
//! imagefeed feed --pages 2
//! imagefeed like abc123
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{feed, like, login, logout, status};

/// Command-line client for the ImageFeed photo feed.
#[derive(Parser, Debug)]
#[command(name = "imagefeed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the token file and default config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/imagefeed.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Exchange an authorization code for an access token
    Login {
        /// Authorization code (prints the authorization URL if omitted)
        #[arg(long, short)]
        code: Option<String>,
    },

    /// Fetch and print pages of the photo feed
    Feed {
        /// Number of pages to fetch
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Like a photo
    Like {
        /// Photo identifier
        id: String,
    },

    /// Remove a like from a photo
    Unlike {
        /// Photo identifier
        id: String,
    },

    /// Forget the stored access token
    Logout,

    /// Show login and configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    tracing::debug!("Data directory: {}", data_dir.display());

    let config_path = cli
        .config
        .unwrap_or_else(|| config::default_path(&data_dir));

    match cli.command {
        Commands::Login { code } => {
            let config = config::load(&config_path)?;
            login::run(&data_dir, config, code.as_deref()).await?;
        }
        Commands::Feed { pages } => {
            let config = config::load(&config_path)?;
            feed::run(&data_dir, config, pages).await?;
        }
        Commands::Like { id } => {
            let config = config::load(&config_path)?;
            like::run(&data_dir, config, &id, true).await?;
        }
        Commands::Unlike { id } => {
            let config = config::load(&config_path)?;
            like::run(&data_dir, config, &id, false).await?;
        }
        Commands::Logout => {
            logout::run(&data_dir)?;
        }
        Commands::Status => {
            status::run(&data_dir, &config_path)?;
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory for imagefeed.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "imagefeed")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
