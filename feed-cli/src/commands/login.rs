//! Exchange an authorization code for an access token.

use anyhow::{Context, Result};
use imagefeed_client::{FeedConfig, Session};
use std::path::Path;

/// Run the login command.
///
/// Without a code, prints the page where the user can obtain one.
pub async fn run(data_dir: &Path, config: FeedConfig, code: Option<&str>) -> Result<()> {
    let Some(code) = code else {
        let url = config
            .authorization_url()
            .context("Cannot build authorization URL")?;
        println!("Open this URL and approve access:");
        println!();
        println!("  {}", url);
        println!();
        println!("Then run 'imagefeed login --code <code>'.");
        return Ok(());
    };

    let session = Session::open(config, data_dir)?;
    session.login(code).await.context("Login failed")?;

    println!("Logged in.");
    Ok(())
}
