//! CMS error type

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("request to CMS failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid CMS URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("CMS repository has no master ref")]
    NoMasterRef,
}

impl CmsError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CmsError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CmsError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}
