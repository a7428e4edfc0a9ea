//! Headless CMS collaborator
//!
//! The rest of the crate only talks to the CMS through [`CmsClient`], passed
//! around as a [`SharedClient`] handle so tests can substitute a fake.

mod document;
mod error;
mod prismic;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use url::Url;

pub use document::{ApiResponse, RawDocument, RawImage, RawPostData, RawSection, RawTextBlock};
pub use error::CmsError;
pub use prismic::PrismicClient;

/// Shared client handle injected into every component that issues requests
pub type SharedClient = Arc<dyn CmsClient>;

/// Query operations consumed from the CMS
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Search documents matching all predicates
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, CmsError>;

    /// Look up a single document by its uid
    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<RawDocument>, CmsError>;

    /// Follow an opaque next-page URL returned by a previous response
    async fn fetch_page(&self, cursor: &Url) -> Result<ApiResponse, CmsError>;
}

/// Search options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub page_size: usize,
}

impl QueryOptions {
    pub fn page_size(page_size: usize) -> Self {
        Self { page_size }
    }
}

/// A query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match on a document path, e.g. `document.type`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// All documents of the given custom type
    pub fn document_type(document_type: &str) -> Self {
        Self::at("document.type", document_type)
    }

    /// The document of the given type with the given uid
    pub fn uid(document_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", document_type), uid)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                let value = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[at({},\"{}\")]", path, value)
            }
        }
    }
}

/// Query parameter carrying the repository access token
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// A cursor without its access token, safe to hand out to readers
pub fn public_cursor(cursor: &Url) -> Url {
    let mut url = cursor.clone();
    if !cursor.query_pairs().any(|(key, _)| key == ACCESS_TOKEN_PARAM) {
        return url;
    }

    let kept: Vec<(String, String)> = cursor
        .query_pairs()
        .filter(|(key, _)| key != ACCESS_TOKEN_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url
}

/// Build the `q` parameter for a set of predicates
pub fn query_string(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner)
}
