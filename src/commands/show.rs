//! Resolve and print a single post

use anyhow::Result;
use std::io::Write;

use crate::cms::SharedClient;
use crate::detail::{DetailResolver, DetailState};
use crate::helpers::format_date;
use crate::Blog;

/// Print the post with the given uid
pub async fn run<W: Write>(blog: &Blog, client: SharedClient, id: &str, out: &mut W) -> Result<()> {
    let resolver = DetailResolver::new(client, blog.config.cms.document_type.clone());

    let detail = match resolver.resolve(id).await? {
        DetailState::Resolved(detail) => detail,
        DetailState::NotFound | DetailState::Pending => anyhow::bail!("Post {:?} not found", id),
    };

    writeln!(out, "{}", detail.title.as_deref().unwrap_or("(untitled)"))?;
    if let Some(subtitle) = &detail.subtitle {
        writeln!(out, "{}", subtitle)?;
    }

    let mut meta = Vec::new();
    if let Some(date) = &detail.published_at {
        meta.push(format_date(date, &blog.config.date_format));
    }
    if let Some(author) = &detail.author {
        meta.push(author.clone());
    }
    meta.push(format!("{} min", detail.reading_time()));
    writeln!(out, "{}", meta.join(" | "))?;

    for section in &detail.content {
        writeln!(out)?;
        if let Some(heading) = &section.heading {
            writeln!(out, "## {}", heading)?;
        }
        for block in &section.body {
            writeln!(out, "{}", block.text)?;
        }
    }

    Ok(())
}
