//! Paginated listing state

use serde::Serialize;
use url::Url;

use super::PostSummary;
use crate::cms::ApiResponse;

/// An ordered batch of summaries plus the cursor of the next batch.
///
/// A page is never mutated in place; loading more derives a new page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<PostSummary>,

    /// `None` once the CMS has no more results
    pub next_page_cursor: Option<Url>,
}

impl Page {
    /// Map a search response, keeping server order
    pub fn from_response(response: ApiResponse) -> Self {
        let total = response.results.len();
        let items: Vec<PostSummary> = response
            .results
            .iter()
            .filter_map(PostSummary::from_document)
            .collect();

        if items.len() < total {
            tracing::warn!(
                "Skipped {} document(s) without a uid",
                total - items.len()
            );
        }

        Self {
            items,
            next_page_cursor: response.next_page,
        }
    }

    /// Whether another batch can be fetched
    pub fn has_more(&self) -> bool {
        self.next_page_cursor.is_some()
    }

    /// Previous items followed by the batch's items, with the batch's cursor
    pub fn append(&self, batch: Page) -> Page {
        let mut items = Vec::with_capacity(self.items.len() + batch.items.len());
        items.extend(self.items.iter().cloned());
        items.extend(batch.items);

        Page {
            items,
            next_page_cursor: batch.next_page_cursor,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
