//! Post view models

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::cms::{RawDocument, RawSection};

/// Words read per minute when estimating reading time
const WORDS_PER_MINUTE: usize = 200;

/// A post as shown on the listing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// Document uid, used in the post URL
    pub id: String,

    /// First publication date
    pub published_at: Option<DateTime<FixedOffset>>,

    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
}

impl PostSummary {
    /// Map a listing document; documents without a uid cannot be linked and yield `None`
    pub fn from_document(doc: &RawDocument) -> Option<Self> {
        let id = doc.uid.clone().filter(|uid| !uid.is_empty())?;

        Some(Self {
            published_at: doc
                .first_publication_date
                .as_deref()
                .and_then(parse_publication_date),
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            author: doc.data.author.clone(),
            id,
        })
    }
}

/// A fully resolved post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub id: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub title: Option<String>,
    pub subtitle: Option<String>,

    /// Banner image URL, empty when the post has no banner
    pub banner_url: String,

    pub author: Option<String>,

    /// Content sections in document order
    pub content: Vec<ContentSection>,
}

/// A heading followed by its body blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSection {
    pub heading: Option<String>,
    pub body: Vec<TextBlock>,
}

/// One rich-text block; the text is opaque to this crate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub kind: Option<String>,
    pub text: String,
}

impl PostDetail {
    /// Map a detail document. `id` is used when the document carries no uid.
    pub fn from_document(id: &str, doc: &RawDocument) -> Self {
        let banner_url = doc
            .data
            .banner
            .as_ref()
            .and_then(|banner| banner.url.clone())
            .unwrap_or_default();

        let content = doc
            .data
            .content
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(ContentSection::from_raw)
            .collect();

        Self {
            id: doc
                .uid
                .clone()
                .filter(|uid| !uid.is_empty())
                .unwrap_or_else(|| id.to_string()),
            published_at: doc
                .first_publication_date
                .as_deref()
                .and_then(parse_publication_date),
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            banner_url,
            author: doc.data.author.clone(),
            content,
        }
    }

    /// Total words across headings and body text
    pub fn word_count(&self) -> usize {
        self.content
            .iter()
            .map(|section| {
                let heading = section
                    .heading
                    .as_deref()
                    .map(|h| h.split_whitespace().count())
                    .unwrap_or(0);
                let body: usize = section
                    .body
                    .iter()
                    .map(|block| block.text.split_whitespace().count())
                    .sum();
                heading + body
            })
            .sum()
    }

    /// Estimated reading time in minutes
    pub fn reading_time(&self) -> usize {
        self.word_count().div_ceil(WORDS_PER_MINUTE)
    }
}

impl ContentSection {
    fn from_raw(raw: &RawSection) -> Self {
        Self {
            heading: raw.heading.clone(),
            body: raw
                .body
                .iter()
                .map(|block| TextBlock {
                    kind: block.kind.clone(),
                    text: block.text.clone(),
                })
                .collect(),
        }
    }
}

/// Parse a CMS timestamp (RFC 3339, or `+0000` style offsets)
pub fn parse_publication_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"));

    match parsed {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!("Ignoring unparseable publication date {:?}: {}", value, e);
            None
        }
    }
}
