//! JSON REST API for AIMindset.
//!
//! Exposes an axum [`Router`] backed by any [`mindset_core::store::BlogStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mindset_api::api_router(store.clone(), ApiSettings::default()))
//! ```

pub mod articles;
pub mod engagement;
pub mod error;
pub mod featured;

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post},
};
use mindset_core::{featured::ArticleSummary, score::ScoreWeights, store::BlogStore};
use tokio::sync::RwLock;

pub use error::ApiError;

// ─── Settings and state ──────────────────────────────────────────────────────

/// Knobs the API needs from the server configuration.
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
  pub weights:       ScoreWeights,
  /// Upper bound on any single store call.
  pub store_timeout: Duration,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      weights:       ScoreWeights::default(),
      store_timeout: Duration::from_secs(5),
    }
  }
}

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub settings: ApiSettings,
  /// Last featured list computed successfully; served when the store fails.
  pub featured: Arc<RwLock<Option<Vec<ArticleSummary>>>>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      settings: self.settings,
      featured: self.featured.clone(),
    }
  }
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, settings: ApiSettings) -> Self {
    Self { store, settings, featured: Arc::new(RwLock::new(None)) }
  }
}

/// Run a store call under the configured timeout. An elapsed timeout becomes
/// [`mindset_core::Error::Transient`].
pub(crate) async fn bounded<T, E>(
  limit: Duration,
  fut:   impl Future<Output = Result<T, E>>,
) -> Result<T, mindset_core::Error>
where
  E: Into<mindset_core::Error>,
{
  match tokio::time::timeout(limit, fut).await {
    Ok(res) => res.map_err(Into::into),
    Err(_) => Err(mindset_core::Error::Transient(format!(
      "store call exceeded {}ms",
      limit.as_millis()
    ))),
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: ApiSettings) -> Router<()>
where
  S: BlogStore + 'static,
{
  Router::new()
    // Featured
    .route("/featured", get(featured::list::<S>))
    .route(
      "/articles/{id}/feature",
      post(featured::pin::<S>).delete(featured::unpin::<S>),
    )
    // Articles
    .route("/articles", get(articles::list::<S>).post(articles::create::<S>))
    .route("/articles/{id}", get(articles::get_one::<S>))
    .route("/articles/by-slug/{slug}", get(articles::get_by_slug::<S>))
    .route("/articles/{id}/publish", post(articles::publish::<S>))
    .route("/articles/{id}/unpublish", post(articles::unpublish::<S>))
    .route("/articles/{id}/metrics", get(articles::metrics::<S>))
    .route("/articles/{id}/resync", post(articles::resync_one::<S>))
    .route("/resync", post(articles::resync_all::<S>))
    // Engagement
    .route("/articles/{id}/feedback", post(engagement::create_feedback::<S>))
    .route("/feedback/{id}", delete(engagement::delete_feedback::<S>))
    .route(
      "/articles/{id}/comments",
      get(engagement::list_comments::<S>).post(engagement::create_comment::<S>),
    )
    .route("/comments/{id}", delete(engagement::delete_comment::<S>))
    .route("/comments/{id}/like", post(engagement::like_comment::<S>))
    .with_state(ApiState::new(store, settings))
}

#[cfg(test)]
mod tests;
