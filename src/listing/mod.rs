//! Listing page controller
//!
//! Holds the visible [`Page`] and follows the CMS cursor on "load more".
//! At most one pagination request is in flight; the page is only replaced
//! once a batch has been fetched and mapped in full.

use url::Url;

use crate::cms::{ApiResponse, CmsError, Predicate, QueryOptions, SharedClient};
use crate::config::CmsConfig;
use crate::content::Page;

/// Progress of the "load more" action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { token: u64 },
    /// The last load failed; the page is unchanged and the load may be retried
    Failed { message: String, transient: bool },
}

/// What a load attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A batch was appended
    Appended { added: usize },
    /// No cursor: nothing was requested
    Exhausted,
    /// Another load is still in flight: nothing was requested
    Busy,
    /// The ticket no longer matches the pending load and was ignored
    Stale,
    /// The request failed; see [`LoadState::Failed`]
    Failed,
}

/// Claim on the single pending load, handed out by [`ListingController::begin_load`]
#[derive(Debug)]
pub struct LoadTicket {
    token: u64,
    cursor: Url,
}

impl LoadTicket {
    pub fn cursor(&self) -> &Url {
        &self.cursor
    }
}

pub struct ListingController {
    client: SharedClient,
    page: Page,
    state: LoadState,
    next_token: u64,
}

impl ListingController {
    /// Start from a page fetched elsewhere (e.g. at render time)
    pub fn new(client: SharedClient, initial: Page) -> Self {
        Self {
            client,
            page: initial,
            state: LoadState::Idle,
            next_token: 0,
        }
    }

    /// Fetch the first page of posts
    pub async fn load_initial(client: SharedClient, cms: &CmsConfig) -> Result<Self, CmsError> {
        let predicates = [Predicate::document_type(&cms.document_type)];
        let response = client
            .query(&predicates, &QueryOptions::page_size(cms.page_size))
            .await?;
        let page = Page::from_response(response);

        tracing::info!(
            "Loaded {} posts (more available: {})",
            page.len(),
            page.has_more()
        );

        Ok(Self::new(client, page))
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// The "load more" control is rendered iff there is a cursor
    pub fn show_load_more(&self) -> bool {
        self.page.has_more()
    }

    /// The control is enabled iff there is a cursor and no load in flight
    pub fn can_load_more(&self) -> bool {
        self.page.has_more() && !self.is_loading()
    }

    /// Mark a load as in flight. `Err` carries the no-op outcome when none may start.
    pub fn begin_load(&mut self) -> Result<LoadTicket, LoadOutcome> {
        if self.is_loading() {
            tracing::debug!("Load already in flight, ignoring");
            return Err(LoadOutcome::Busy);
        }

        let cursor = match &self.page.next_page_cursor {
            Some(cursor) => cursor.clone(),
            None => return Err(LoadOutcome::Exhausted),
        };

        self.next_token += 1;
        let token = self.next_token;
        self.state = LoadState::Loading { token };

        Ok(LoadTicket { token, cursor })
    }

    /// Apply the result of the request made for `ticket`
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ApiResponse, CmsError>,
    ) -> LoadOutcome {
        if self.state != (LoadState::Loading { token: ticket.token }) {
            tracing::debug!("Dropping result of stale load {}", ticket.token);
            return LoadOutcome::Stale;
        }

        match result {
            Ok(response) => {
                let batch = Page::from_response(response);
                let added = batch.len();
                self.page = self.page.append(batch);
                self.state = LoadState::Idle;

                tracing::debug!(
                    "Appended {} posts, {} total (more available: {})",
                    added,
                    self.page.len(),
                    self.page.has_more()
                );
                LoadOutcome::Appended { added }
            }
            Err(e) => {
                tracing::error!("Failed to load next page: {}", e);
                self.state = LoadState::Failed {
                    message: e.to_string(),
                    transient: e.is_transient(),
                };
                LoadOutcome::Failed
            }
        }
    }

    /// Give up on the pending load without touching the page
    pub fn cancel_load(&mut self) {
        if self.is_loading() {
            self.state = LoadState::Idle;
        }
    }

    /// Fetch the next batch and append it
    pub async fn load_next_page(&mut self) -> LoadOutcome {
        let ticket = match self.begin_load() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let result = self.client.fetch_page(ticket.cursor()).await;
        self.finish_load(ticket, result)
    }
}
