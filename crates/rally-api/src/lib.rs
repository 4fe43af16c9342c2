//! JSON REST API for Rally.
//!
//! Exposes an axum [`Router`] backed by any [`rally_core::store::EventStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rally_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod events;
pub mod signups;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use rally_core::store::{CapacityPolicy, EventStore};
use serde_json::{Value, json};

pub use auth::AdminCredentials;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Behaviour switches for the API, fixed at startup.
#[derive(Clone, Default)]
pub struct ApiSettings {
  pub capacity: CapacityPolicy,
  /// When set, creating events and listing attendees need Basic auth.
  pub admin:    Option<AdminCredentials>,
}

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: EventStore> {
  pub store:    Arc<S>,
  pub settings: Arc<ApiSettings>,
}

impl<S: EventStore> AppState<S> {
  pub fn new(store: Arc<S>, settings: ApiSettings) -> Self {
    Self { store, settings: Arc::new(settings) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route("/events/{id}", get(events::get_one::<S>))
    .route("/events/{id}/attendees", get(events::attendees::<S>))
    // Signups
    .route("/events/{id}/signups", post(signups::join_nested::<S>))
    .route("/signups", post(signups::join_flat::<S>))
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
