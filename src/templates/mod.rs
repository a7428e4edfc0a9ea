//! Built-in site templates using the Tera template engine
//!
//! Templates and static assets are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::cms::public_cursor;
use crate::config::SiteConfig;
use crate::content::{ContentSection, Page, PostDetail, PostSummary};
use crate::helpers::{date_xml, format_date, post_url};

/// Stylesheet served at `css/style.css`
pub const STYLESHEET: &str = include_str!("site/style.css");

/// Script behind the "load more" button, served at `js/load-more.js`
pub const LOAD_MORE_SCRIPT: &str = include_str!("site/load-more.js");

/// Seconds between refreshes of the loading page
const LOADING_REFRESH_SECS: u64 = 1;

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // CMS text is untrusted, so autoescaping stays on for every template
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/post_summary.html",
                include_str!("site/partials/post_summary.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render the listing page for `page`
    pub fn render_index(&self, config: &SiteConfig, page: &Page) -> Result<String> {
        let listing = ListingPayload::new(config, page);

        let mut context = self.base_context(config);
        context.insert("posts", &listing.results);
        context.insert("next_page", &listing.next_page);
        self.render("index.html", &context)
    }

    /// Render a post page
    pub fn render_post(&self, config: &SiteConfig, detail: &PostDetail) -> Result<String> {
        let mut context = self.base_context(config);
        context.insert("post", &DetailView::new(config, detail));
        self.render("post.html", &context)
    }

    /// Render the placeholder shown while a post is being resolved
    pub fn render_loading(&self, config: &SiteConfig) -> Result<String> {
        let mut context = self.base_context(config);
        context.insert("refresh_secs", &LOADING_REFRESH_SECS);
        self.render("loading.html", &context)
    }

    /// Render the page shown for an unknown post
    pub fn render_not_found(&self, config: &SiteConfig, id: &str) -> Result<String> {
        let mut context = self.base_context(config);
        context.insert("id", id);
        self.render("not_found.html", &context)
    }

    fn base_context(&self, config: &SiteConfig) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(config));
        context
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: format!("{}/", config.root.trim_end_matches('/')),
        }
    }
}

/// A listing entry as shown to the reader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub id: String,
    pub path: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    /// Display date
    pub date: Option<String>,
    /// Machine-readable date for `<time datetime>`
    pub datetime: Option<String>,
}

impl SummaryView {
    pub fn new(config: &SiteConfig, post: &PostSummary) -> Self {
        Self {
            id: post.id.clone(),
            path: post_url(config, &post.id),
            title: post.title.clone().unwrap_or_default(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: post
                .published_at
                .as_ref()
                .map(|d| format_date(d, &config.date_format)),
            datetime: post.published_at.as_ref().map(date_xml),
        }
    }
}

/// JSON body of the "load more" endpoint, and the listing template's data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPayload {
    pub results: Vec<SummaryView>,
    pub next_page: Option<String>,
}

impl ListingPayload {
    pub fn new(config: &SiteConfig, page: &Page) -> Self {
        Self {
            results: page
                .items
                .iter()
                .map(|post| SummaryView::new(config, post))
                .collect(),
            next_page: page
                .next_page_cursor
                .as_ref()
                .map(|u| public_cursor(u).to_string()),
        }
    }
}

/// A post page as shown to the reader
#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub banner_url: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub reading_time: usize,
    pub content: Vec<ContentSection>,
}

impl DetailView {
    pub fn new(config: &SiteConfig, detail: &PostDetail) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone().unwrap_or_default(),
            subtitle: detail.subtitle.clone(),
            banner_url: detail.banner_url.clone(),
            author: detail.author.clone(),
            date: detail
                .published_at
                .as_ref()
                .map(|d| format_date(d, &config.date_format)),
            datetime: detail.published_at.as_ref().map(date_xml),
            reading_time: detail.reading_time(),
            content: detail.content.clone(),
        }
    }
}
