//! Like or unlike a photo.

use anyhow::{Context, Result};
use imagefeed_client::{FeedConfig, Session};
use std::path::Path;

/// Run the like/unlike command.
pub async fn run(data_dir: &Path, config: FeedConfig, id: &str, like: bool) -> Result<()> {
    let session = Session::open(config, data_dir)?;
    if !session.is_authenticated() {
        anyhow::bail!("Not logged in. Run 'imagefeed login' first.");
    }

    let verb = if like { "like" } else { "unlike" };
    session
        .feed()
        .toggle_like(id, like)
        .await
        .with_context(|| format!("Failed to {} {}", verb, id))?;

    println!("{} {}", if like { "Liked" } else { "Unliked" }, id);
    Ok(())
}
