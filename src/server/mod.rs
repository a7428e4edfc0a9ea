//! HTTP server: listing, post pages with on-demand fallback, and the "load more" endpoint

mod error;

pub use error::AppError;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::cms::SharedClient;
use crate::content::Page;
use crate::detail::{DetailResolver, DetailState, FallbackPages};
use crate::generator::Generator;
use crate::listing::ListingController;
use crate::templates::{ListingPayload, LOAD_MORE_SCRIPT, STYLESHEET};
use crate::{is_safe_id, Blog};

/// Server state
pub struct ServerState {
    blog: Blog,
    client: SharedClient,
    generator: Generator,
    fallback: Arc<FallbackPages>,
}

impl ServerState {
    pub fn new(blog: &Blog, client: SharedClient) -> Result<Arc<Self>> {
        let resolver = DetailResolver::new(client.clone(), blog.config.cms.document_type.clone());
        Ok(Arc::new(Self {
            blog: blog.clone(),
            generator: Generator::new(blog, client.clone())?,
            fallback: FallbackPages::new(resolver),
            client,
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub cursor: Option<String>,
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let public_dir = state.blog.public_dir.clone();

    Router::new()
        .route("/", get(index_handler))
        .route("/post/:id", get(post_handler))
        .route("/api/posts", get(posts_handler))
        .route("/css/style.css", get(stylesheet_handler))
        .route("/js/load-more.js", get(script_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, client: SharedClient, ip: &str, port: u16) -> Result<()> {
    let app = router(ServerState::new(blog, client)?);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Listing page: the generated one if present, otherwise rendered from the CMS
async fn index_handler(State(state): State<Arc<ServerState>>) -> Result<Response, AppError> {
    let generated = state.blog.public_dir.join("index.html");
    if generated.is_file() {
        let html = tokio::fs::read_to_string(&generated).await?;
        return Ok(Html(html).into_response());
    }

    let listing = ListingController::load_initial(state.client.clone(), &state.blog.config.cms).await?;
    let html = state
        .generator
        .renderer()
        .render_index(&state.blog.config, listing.page())?;
    Ok(Html(html).into_response())
}

/// Post page: generated, or resolved on first access behind a loading page
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let renderer = state.generator.renderer();
    let config = &state.blog.config;

    if !is_safe_id(&id) {
        let html = renderer.render_not_found(config, &id)?;
        return Ok((StatusCode::NOT_FOUND, Html(html)).into_response());
    }

    let generated = state.blog.post_file(&id)?;
    if generated.is_file() {
        let html = tokio::fs::read_to_string(&generated).await?;
        return Ok(Html(html).into_response());
    }

    match state.fallback.poll(&id) {
        DetailState::Pending => {
            let html = renderer.render_loading(config)?;
            Ok(([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response())
        }
        DetailState::Resolved(detail) => {
            let html = renderer.render_post(config, &detail)?;

            let writer = Arc::clone(&state);
            let stored = tokio::task::spawn_blocking(move || writer.generator.write_post(&detail))
                .await
                .map_err(anyhow::Error::from)
                .and_then(|written| written);
            if let Err(e) = stored {
                tracing::warn!("Failed to store generated post {}: {:#}", id, e);
            }

            Ok(Html(html).into_response())
        }
        DetailState::NotFound => {
            let html = renderer.render_not_found(config, &id)?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
    }
}

/// "Load more": the first page, or the batch behind a CMS cursor
async fn posts_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<ListingPayload>, AppError> {
    let cms = &state.blog.config.cms;

    let page = match query.cursor {
        None => ListingController::load_initial(state.client.clone(), cms)
            .await?
            .into_page(),
        Some(cursor) => {
            let cursor = Url::parse(&cursor)
                .map_err(|e| AppError::BadRequest(format!("Invalid cursor: {}", e)))?;
            if !cms.owns_cursor(&cursor) {
                return Err(AppError::BadRequest(
                    "Cursor does not belong to the CMS".to_string(),
                ));
            }
            Page::from_response(state.client.fetch_page(&cursor).await?)
        }
    };

    Ok(Json(ListingPayload::new(&state.blog.config, &page)))
}

async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        LOAD_MORE_SCRIPT,
    )
}
