//! Show login and configuration status.

use anyhow::Result;
use imagefeed_client::{FeedConfig, FileTokenStore, TokenStore};
use std::path::Path;

/// Run the status command.
pub fn run(data_dir: &Path, config_path: &Path) -> Result<()> {
    println!("=== imagefeed status ===");
    println!();
    println!("Data dir: {}", data_dir.display());

    let store = FileTokenStore::in_dir(data_dir);
    match store.get() {
        Some(_) => println!("Login:    LOGGED IN ({})", store.path().display()),
        None => println!("Login:    NOT LOGGED IN"),
    }

    println!();
    match FeedConfig::from_file(config_path) {
        Ok(config) => {
            println!("Config:   {}", config_path.display());
            println!("  API:      {}", config.api_base_url);
            println!("  Token:    {}", config.token_url);
            println!("  Per page: {}", config.per_page);
        }
        Err(e) => {
            println!("Config:   NOT LOADED");
            println!("  {}", e);
        }
    }

    Ok(())
}
