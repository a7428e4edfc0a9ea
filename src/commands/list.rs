//! List posts from the CMS, following "load more" from the terminal

use anyhow::Result;
use std::io::Write;

use crate::cms::SharedClient;
use crate::helpers::format_date;
use crate::listing::{ListingController, LoadOutcome, LoadState};
use crate::Blog;

/// Print up to `max_pages` batches of posts (`None` = all of them)
pub async fn run<W: Write>(
    blog: &Blog,
    client: SharedClient,
    max_pages: Option<usize>,
    out: &mut W,
) -> Result<()> {
    let mut controller = ListingController::load_initial(client, &blog.config.cms).await?;
    let mut loaded_pages = 1;

    while controller.show_load_more() && max_pages.map_or(true, |max| loaded_pages < max) {
        match controller.load_next_page().await {
            LoadOutcome::Appended { .. } => loaded_pages += 1,
            LoadOutcome::Failed => {
                let message = match controller.state() {
                    LoadState::Failed { message, .. } => message.as_str(),
                    _ => "unknown error",
                };
                anyhow::bail!("Failed to load more posts: {}", message);
            }
            LoadOutcome::Exhausted | LoadOutcome::Busy | LoadOutcome::Stale => break,
        }
    }

    let page = controller.page();
    writeln!(out, "Posts ({}):", page.len())?;
    for post in &page.items {
        let date = post
            .published_at
            .as_ref()
            .map(|d| format_date(d, &blog.config.date_format))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {} - {} [{}]",
            date,
            post.title.as_deref().unwrap_or("(untitled)"),
            post.id
        )?;
    }
    if page.has_more() {
        writeln!(out, "More posts available (use --all)")?;
    }

    Ok(())
}
