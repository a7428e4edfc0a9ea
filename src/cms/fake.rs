//! In-memory CMS used by tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use url::Url;

use super::{
    query_string, ApiResponse, CmsClient, CmsError, Predicate, QueryOptions, RawDocument,
    RawPostData,
};

#[derive(Default)]
pub(crate) struct FakeCms {
    first_page: ApiResponse,
    pages: HashMap<String, ApiResponse>,
    documents: HashMap<String, RawDocument>,
    failures: AtomicUsize,
    broken_uids: Vec<String>,
    requests: AtomicUsize,
    queries: Mutex<Vec<(String, usize)>>,
}

impl FakeCms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_page(mut self, response: ApiResponse) -> Self {
        self.first_page = response;
        self
    }

    pub fn with_page(mut self, cursor: &str, response: ApiResponse) -> Self {
        self.pages.insert(cursor.to_string(), response);
        self
    }

    pub fn with_document(mut self, document: RawDocument) -> Self {
        let uid = document.uid.clone().unwrap_or_default();
        self.documents.insert(uid, document);
        self
    }

    /// Fail the next `count` requests with a 503
    pub fn failing(self, count: usize) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    /// Fail every lookup of `uid` with a 503
    pub fn failing_uid(mut self, uid: &str) -> Self {
        self.broken_uids.push(uid.to_string());
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self) -> Result<(), CmsError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(CmsError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CmsClient for FakeCms {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, CmsError> {
        self.record()?;
        self.queries
            .lock()
            .unwrap()
            .push((query_string(predicates), options.page_size));

        let mut response = self.first_page.clone();
        response.results.truncate(options.page_size);
        Ok(response)
    }

    async fn get_by_uid(
        &self,
        _document_type: &str,
        uid: &str,
    ) -> Result<Option<RawDocument>, CmsError> {
        self.record()?;
        if self.broken_uids.iter().any(|broken| broken == uid) {
            return Err(CmsError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.documents.get(uid).cloned())
    }

    async fn fetch_page(&self, cursor: &Url) -> Result<ApiResponse, CmsError> {
        self.record()?;
        self.pages.get(cursor.as_str()).cloned().ok_or(CmsError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            body: format!("no page at {}", cursor),
        })
    }
}

/// A listing-shaped document
pub(crate) fn summary_doc(uid: &str, title: &str) -> RawDocument {
    RawDocument {
        uid: Some(uid.to_string()),
        document_type: Some("post".to_string()),
        first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
        data: RawPostData {
            title: Some(title.to_string()),
            subtitle: Some(format!("About {}", title)),
            author: Some("Joseph Oliveira".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A search response with the given results and cursor
pub(crate) fn response(results: Vec<RawDocument>, next_page: Option<&str>) -> ApiResponse {
    ApiResponse {
        next_page: next_page.map(|u| Url::parse(u).unwrap()),
        results,
        ..Default::default()
    }
}
