//! Fetch and print pages of the photo feed.

use anyhow::Result;
use imagefeed_client::{FeedConfig, FetchOutcome, Session};
use imagefeed_core::FeedEvent;
use imagefeed_types::Photo;
use std::path::Path;

/// Run the feed command.
pub async fn run(data_dir: &Path, config: FeedConfig, pages: u32) -> Result<()> {
    let session = Session::open(config, data_dir)?;
    if !session.is_authenticated() {
        println!("(not logged in: browsing anonymously)");
    }

    let feed = session.feed();
    let _printer = feed.subscribe(|notification| {
        if let FeedEvent::PagesAppended { photos } = &notification.event {
            for photo in photos {
                println!("{}", format_photo(photo));
            }
        }
    });

    for _ in 0..pages {
        if !keep_paging(feed.fetch_next_page().await)? {
            break;
        }
    }

    let snapshot = feed.snapshot().await;
    println!();
    println!(
        "{} photos, last page {}",
        snapshot.len(),
        snapshot.last_loaded_page.unwrap_or(0)
    );
    Ok(())
}

/// Whether to request another page after `outcome`.
///
/// Only an empty API page ends the feed; a page whose photos were all
/// already shown still advances.
fn keep_paging(outcome: FetchOutcome) -> Result<bool> {
    match outcome {
        FetchOutcome::Appended { received: 0, .. } => Ok(false),
        FetchOutcome::Appended { .. } | FetchOutcome::Skipped => Ok(true),
        FetchOutcome::Failed => {
            anyhow::bail!("Failed to load page (run with -v for details)")
        }
    }
}

/// One line per photo: id, size, like marker, date, description.
fn format_photo(photo: &Photo) -> String {
    let liked = if photo.is_liked { "♥" } else { " " };
    let date = photo
        .created_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    let mut line = format!(
        "{} {:<12} {:>5}x{:<5} {}",
        liked, photo.id, photo.size.width, photo.size.height, date
    );
    if let Some(description) = &photo.description {
        line.push_str("  ");
        line.push_str(description);
    }
    line
}
