//! Configuration loading for imagefeed.

use anyhow::{Context, Result};
use imagefeed_client::FeedConfig;
use std::path::{Path, PathBuf};

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "imagefeed.toml";

/// Default config location for `data_dir`.
pub fn default_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load and validate the client configuration.
pub fn load(path: &Path) -> Result<FeedConfig> {
    if !path.exists() {
        anyhow::bail!(
            "No configuration at {}. Create it with at least:\n\n  access_key = \"<your access key>\"\n  secret_key = \"<your secret key>\"",
            path.display()
        );
    }
    FeedConfig::from_file(path).context("Invalid configuration")
}
