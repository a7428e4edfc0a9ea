//! Generator module - renders the listing and pre-resolved posts into the public directory

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::cms::SharedClient;
use crate::content::{Page, PostDetail};
use crate::detail::{DetailResolver, DetailState};
use crate::listing::ListingController;
use crate::templates::{TemplateRenderer, LOAD_MORE_SCRIPT, STYLESHEET};
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// Posts on the generated listing page
    pub listed: usize,
    /// Post pages written
    pub posts: Vec<String>,
    /// Pre-render ids the CMS no longer knows
    pub missing: Vec<String>,
    /// Pre-render ids that could not be resolved; served on demand instead
    pub failed: Vec<String>,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    client: SharedClient,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, client: SharedClient) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            client,
            renderer: TemplateRenderer::new()?,
        })
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Generate the entire site
    ///
    /// Everything is fetched before anything is written, so a CMS outage
    /// leaves the previous output untouched.
    pub async fn generate(&self) -> Result<GenerateReport> {
        let cms = &self.blog.config.cms;

        // Listing page
        let listing = ListingController::load_initial(self.client.clone(), cms)
            .await
            .context("Failed to load the first page of posts")?;

        let mut report = GenerateReport {
            listed: listing.page().len(),
            ..Default::default()
        };

        // Post pages known ahead of time
        let resolver = DetailResolver::new(self.client.clone(), cms.document_type.clone());
        let ids = resolver
            .known_ids(cms.prerender_count)
            .await
            .context("Failed to list posts to pre-render")?;

        let mut details = Vec::with_capacity(ids.len());
        for id in ids {
            match resolver.resolve(&id).await {
                Ok(DetailState::Resolved(detail)) => details.push(detail),
                Ok(DetailState::NotFound | DetailState::Pending) => {
                    tracing::warn!("Post {} disappeared before it could be generated", id);
                    report.missing.push(id);
                }
                Err(e) => {
                    tracing::error!("Failed to resolve post {}: {}", id, e);
                    report.failed.push(id);
                }
            }
        }

        fs::create_dir_all(&self.blog.public_dir)?;
        self.write_assets()?;
        self.write_index(listing.page())?;
        for detail in details {
            self.write_post(&detail)?;
            report.posts.push(detail.id);
        }

        Ok(report)
    }

    /// Write the stylesheet and scripts
    pub fn write_assets(&self) -> Result<()> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir.join("css"))?;
        fs::create_dir_all(public_dir.join("js"))?;
        fs::write(public_dir.join("css/style.css"), STYLESHEET)?;
        fs::write(public_dir.join("js/load-more.js"), LOAD_MORE_SCRIPT)?;
        Ok(())
    }

    /// Render and write `index.html`
    pub fn write_index(&self, page: &Page) -> Result<PathBuf> {
        let html = self.renderer.render_index(&self.blog.config, page)?;
        let path = self.blog.public_dir.join("index.html");
        fs::write(&path, html)?;
        tracing::debug!("Generated {:?}", path);
        Ok(path)
    }

    /// Render and write `post/{id}/index.html`
    pub fn write_post(&self, detail: &PostDetail) -> Result<PathBuf> {
        let html = self.renderer.render_post(&self.blog.config, detail)?;
        let path = self.blog.post_file(&detail.id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        tracing::debug!("Generated {:?}", path);
        Ok(path)
    }
}
