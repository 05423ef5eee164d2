//! Forget the stored access token.

use anyhow::{Context, Result};
use imagefeed_client::{FileTokenStore, TokenStore};
use std::path::Path;

/// Run the logout command.
pub fn run(data_dir: &Path) -> Result<()> {
    let store = FileTokenStore::in_dir(data_dir);
    if store.get().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    store.clear().context("Failed to remove token")?;
    println!("Logged out.");
    Ok(())
}
