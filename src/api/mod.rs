//! HTTP surface
//!
//! `/health` is open; everything under `/api` requires a session cookie.

pub mod handlers;
pub mod response;
pub mod session;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::SessionStore;
use crate::workflow::WorkflowEngine;

pub use response::ActionResponse;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub sessions: SessionStore,
    pub cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(engine: Arc<WorkflowEngine>, sessions: SessionStore, cookie_name: &str) -> Self {
        Self {
            engine,
            sessions,
            cookie_name: Arc::from(cookie_name),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/{entity}", get(handlers::list).post(handlers::create))
        .route("/{entity}/{id}", get(handlers::get_one))
        .route("/{entity}/{id}/history", get(handlers::history))
        .route("/{entity}/{id}/status", post(handlers::transition))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
