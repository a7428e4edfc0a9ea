//! Detail resolution: uid -> post view model

mod fallback;

pub use fallback::FallbackPages;

use crate::cms::{CmsError, Predicate, QueryOptions, SharedClient};
use crate::content::PostDetail;

/// Lifecycle of a post page: `Pending -> {Resolved, NotFound}`
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Resolution has started but not finished
    Pending,
    Resolved(PostDetail),
    /// No document matches the uid
    NotFound,
}

impl DetailState {
    pub fn is_pending(&self) -> bool {
        matches!(self, DetailState::Pending)
    }
}

/// Resolves posts by uid through the injected CMS client
#[derive(Clone)]
pub struct DetailResolver {
    client: SharedClient,
    document_type: String,
}

impl DetailResolver {
    pub fn new(client: SharedClient, document_type: impl Into<String>) -> Self {
        Self {
            client,
            document_type: document_type.into(),
        }
    }

    /// Look up and map one post. Never returns `Pending`; transport failures are `Err`.
    pub async fn resolve(&self, id: &str) -> Result<DetailState, CmsError> {
        if id.trim().is_empty() {
            return Ok(DetailState::NotFound);
        }

        match self.client.get_by_uid(&self.document_type, id).await? {
            Some(doc) => {
                tracing::debug!("Resolved post {}", id);
                Ok(DetailState::Resolved(PostDetail::from_document(id, &doc)))
            }
            None => {
                tracing::info!("Post {} not found", id);
                Ok(DetailState::NotFound)
            }
        }
    }

    /// Uids of the first `count` posts, for eager generation
    pub async fn known_ids(&self, count: usize) -> Result<Vec<String>, CmsError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let predicates = [Predicate::document_type(&self.document_type)];
        let response = self
            .client
            .query(&predicates, &QueryOptions::page_size(count))
            .await?;

        Ok(response
            .results
            .into_iter()
            .filter_map(|doc| doc.uid.filter(|uid| !uid.is_empty()))
            .take(count)
            .collect())
    }
}
