//! Prismic REST API v2 client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{
    public_cursor, query_string, ApiResponse, CmsClient, CmsError, Predicate, QueryOptions,
    RawDocument, ACCESS_TOKEN_PARAM,
};
use crate::config::CmsConfig;

/// Repository info returned by the API endpoint
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// HTTP client for a Prismic repository
#[derive(Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for the configured repository
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint_url()?,
            access_token: config.access_token.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        // The query string may carry the access token, so only the path is logged
        tracing::debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CmsError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Id of the currently published content release
    async fn master_ref(&self) -> Result<String, CmsError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
        }

        let info: ApiInfo = self.get_json(url).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(CmsError::NoMasterRef)
    }

    fn search_url(
        &self,
        reference: &str,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<Url, CmsError> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/documents/search", base))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", reference);
            query.append_pair("q", &query_string(predicates));
            query.append_pair("pageSize", &options.page_size.to_string());
            if let Some(token) = &self.access_token {
                query.append_pair(ACCESS_TOKEN_PARAM, token);
            }
        }

        Ok(url)
    }

    /// Cursors handed to readers have the token stripped; put ours back
    fn cursor_url(&self, cursor: &Url) -> Url {
        let mut url = public_cursor(cursor);
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
        }
        url
    }
}

#[async_trait]
impl CmsClient for PrismicClient {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, CmsError> {
        let reference = self.master_ref().await?;
        let url = self.search_url(&reference, predicates, options)?;
        self.get_json(url).await
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<RawDocument>, CmsError> {
        let predicates = [Predicate::uid(document_type, uid)];
        let response = self.query(&predicates, &QueryOptions::page_size(1)).await?;
        Ok(response.results.into_iter().next())
    }

    async fn fetch_page(&self, cursor: &Url) -> Result<ApiResponse, CmsError> {
        self.get_json(self.cursor_url(cursor)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Serve a minimal stand-in for a Prismic repository on a random port
    async fn spawn_repository() -> (SocketAddr, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));

        async fn api_info() -> Json<serde_json::Value> {
            Json(json!({
                "refs": [
                    {"id": "preview", "ref": "preview-ref", "isMasterRef": false},
                    {"id": "master", "ref": "master-ref", "isMasterRef": true}
                ]
            }))
        }

        async fn search(
            State(seen): State<Seen>,
            Query(params): Query<HashMap<String, String>>,
        ) -> Response {
            seen.lock().unwrap().push(params.clone());
            let q = params.get("q").cloned().unwrap_or_default();

            if q.contains("missing") {
                return Json(json!({"results": [], "next_page": null})).into_response();
            }
            if params.get("page").map(String::as_str) == Some("2") {
                return Json(json!({
                    "results": [{"uid": "third", "data": {"title": "Third"}}],
                    "next_page": null
                }))
                .into_response();
            }
            Json(json!({
                "page": 1,
                "results": [
                    {"uid": "first", "data": {"title": "First"}},
                    {"uid": "second", "data": {"title": "Second"}}
                ],
                "next_page": null
            }))
            .into_response()
        }

        async fn broken() -> Response {
            (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response()
        }

        async fn slow() -> Json<serde_json::Value> {
            tokio::time::sleep(Duration::from_secs(3)).await;
            api_info().await
        }

        let app = Router::new()
            .route("/api/v2", get(api_info))
            .route("/api/v2/documents/search", get(search))
            .route("/broken/api/v2", get(broken))
            .route("/slow/api/v2", get(slow))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (addr, seen)
    }

    fn client_for(endpoint: String, token: Option<&str>) -> PrismicClient {
        let config = CmsConfig {
            endpoint,
            access_token: token.map(str::to_string),
            timeout_secs: 5,
            ..Default::default()
        };
        PrismicClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_query_uses_master_ref() {
        let (addr, seen) = spawn_repository().await;
        let client = client_for(format!("http://{}/api/v2", addr), Some("token"));

        let response = client
            .query(
                &[Predicate::document_type("post")],
                &QueryOptions::page_size(20),
            )
            .await
            .unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].uid.as_deref(), Some("first"));

        let seen = seen.lock().unwrap();
        let params = &seen[0];
        assert_eq!(params["ref"], "master-ref");
        assert_eq!(params["q"], r#"[[at(document.type,"post")]]"#);
        assert_eq!(params["pageSize"], "20");
        assert_eq!(params["access_token"], "token");
        assert!(!params.contains_key("page"));
    }

    #[tokio::test]
    async fn test_get_by_uid() {
        let (addr, seen) = spawn_repository().await;
        let client = client_for(format!("http://{}/api/v2/", addr), None);

        let found = client.get_by_uid("post", "first").await.unwrap();
        assert_eq!(found.unwrap().uid.as_deref(), Some("first"));

        let missing = client.get_by_uid("post", "missing").await.unwrap();
        assert!(missing.is_none());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["q"], r#"[[at(my.post.uid,"first")]]"#);
        assert_eq!(seen[0]["pageSize"], "1");
        assert!(!seen[0].contains_key("access_token"));
    }

    #[tokio::test]
    async fn test_fetch_page_follows_cursor() {
        let (addr, _) = spawn_repository().await;
        let client = client_for(format!("http://{}/api/v2", addr), None);

        let cursor = Url::parse(&format!(
            "http://{}/api/v2/documents/search?ref=master-ref&page=2&pageSize=2",
            addr
        ))
        .unwrap();
        let response = client.fetch_page(&cursor).await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].uid.as_deref(), Some("third"));
        assert!(response.next_page.is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_restores_token() {
        let (addr, seen) = spawn_repository().await;
        let client = client_for(format!("http://{}/api/v2", addr), Some("token"));

        // A cursor as handed out to readers, token stripped
        let cursor = Url::parse(&format!(
            "http://{}/api/v2/documents/search?ref=master-ref&page=2&pageSize=2",
            addr
        ))
        .unwrap();
        let response = client.fetch_page(&cursor).await.unwrap();
        assert_eq!(response.results[0].uid.as_deref(), Some("third"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["access_token"], "token");
        assert_eq!(seen[0]["page"], "2");
    }

    #[test]
    fn test_cursor_url_replaces_stale_token() {
        let client = client_for("https://blog.cdn.prismic.io/api/v2".to_string(), Some("token"));
        let raw = Url::parse(
            "https://blog.cdn.prismic.io/api/v2/documents/search?ref=X&access_token=stale&page=2",
        )
        .unwrap();

        let tokens: Vec<String> = client
            .cursor_url(&raw)
            .query_pairs()
            .filter(|(key, _)| key == ACCESS_TOKEN_PARAM)
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(tokens, vec!["token"]);

        let anonymous = client_for("https://blog.cdn.prismic.io/api/v2".to_string(), None);
        assert!(!anonymous.cursor_url(&raw).as_str().contains("access_token"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (addr, _) = spawn_repository().await;
        let client = client_for(format!("http://{}/broken/api/v2", addr), None);

        let err = client
            .query(&[Predicate::document_type("post")], &QueryOptions::page_size(1))
            .await
            .unwrap_err();

        match &err {
            CmsError::Status { status, body } => {
                assert_eq!(*status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let (addr, _) = spawn_repository().await;
        let config = CmsConfig {
            endpoint: format!("http://{}/slow/api/v2", addr),
            timeout_secs: 1,
            ..Default::default()
        };
        let client = PrismicClient::new(&config).unwrap();

        let err = client
            .query(&[Predicate::document_type("post")], &QueryOptions::page_size(1))
            .await
            .unwrap_err();

        match &err {
            CmsError::Http(e) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {:?}", other),
        }
        assert!(err.is_transient());
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = CmsConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            PrismicClient::new(&config),
            Err(CmsError::InvalidUrl(_))
        ));
    }
}
