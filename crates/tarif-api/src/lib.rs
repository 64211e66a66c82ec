//! JSON/CSV REST API for Tarif.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tarif_core::store::CatalogStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tarif_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod examinations;
pub mod hna;
pub mod upload;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tarif_core::store::CatalogStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Price list
    .route("/hna", get(hna::list::<S>))
    .route("/hna/upload", post(upload::hna::<S>))
    .route("/hna/export", get(hna::export::<S>))
    // Examinations
    .route("/examinations", get(examinations::list::<S>))
    .route("/examinations/upload", post(upload::examinations::<S>))
    .route("/examinations/export", get(examinations::export::<S>))
    // Column registry
    .route("/columns", get(examinations::columns::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
