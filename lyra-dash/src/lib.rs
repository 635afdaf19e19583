//! lyra-dash library - music project dashboard
//!
//! Loads singer, project and file statistics once at startup, serves them as
//! a chart view-model, and re-renders the per-singer language chart on
//! every dropdown change.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod api;
pub mod charts;
pub mod dashboard;
pub mod interaction;
pub mod layout;

use interaction::Interactions;
use layout::Node;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Page view-model composed at startup
    pub page: Arc<Node>,
    /// Registered dropdown handlers
    pub interactions: Arc<Interactions>,
}

impl AppState {
    /// Create new application state
    pub fn new(page: Node, interactions: Interactions) -> Self {
        Self {
            page: Arc::new(page),
            interactions: Arc::new(interactions),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/layout", get(api::get_layout))
        .route("/api/update", post(api::post_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
