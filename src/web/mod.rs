//! HTTP front end for the stylist.
//!
//! One page, one form. `GET /` renders the empty form, `POST /suggest` validates the
//! upload and occasion and, only when both are present, runs a single consultation.

pub mod handlers;
pub mod page;

use crate::config::MuseConfig;
use crate::error::Result;
use crate::stylist::Stylist;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use page::Theme;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared per-process state; nothing in it changes after startup
#[derive(Clone)]
pub struct AppState {
    pub stylist: Arc<Stylist>,
    pub theme: Arc<Theme>,
}

impl AppState {
    pub fn new(stylist: Stylist) -> Self {
        let theme = Theme::new(stylist.kind(), stylist.model());
        Self {
            stylist: Arc::new(stylist),
            theme: Arc::new(theme),
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/suggest", post(handlers::suggest))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, config: &MuseConfig) -> Result<()> {
    info!(
        backend = %state.stylist.kind(),
        model = state.stylist.model(),
        endpoint = %state.stylist.endpoint(),
        "Starting stylist server"
    );

    let app = router(state, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
