//! spacetraveling: a blog front-end for a headless CMS
//!
//! Posts live in a Prismic repository. This crate renders the paginated
//! listing and individual post pages, either ahead of time into a public
//! directory or on demand from a small HTTP server.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod detail;
pub mod generator;
pub mod helpers;
pub mod listing;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog instance with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Client for the configured CMS repository
    pub fn client(&self) -> Result<cms::SharedClient> {
        let client = cms::PrismicClient::new(&self.config.cms)?;
        Ok(Arc::new(client))
    }

    /// Output file of a generated post page
    pub fn post_file(&self, id: &str) -> Result<PathBuf> {
        if !is_safe_id(id) {
            anyhow::bail!("Refusing to write post with unsafe id {:?}", id);
        }
        Ok(self.public_dir.join("post").join(id).join("index.html"))
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::GenerateReport> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

/// Whether a post id can be used as a single path component
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}
