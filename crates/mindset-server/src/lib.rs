//! HTTP server wiring for AIMindset.
//!
//! Owns the runtime configuration and mounts [`mindset_api::api_router`]
//! under `/api` with request tracing.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use mindset_api::{ApiSettings, api_router};
use mindset_core::{score::ScoreWeights, store::BlogStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MINDSET_*` environment variables. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Upper bound on a single store call, in milliseconds.
  pub store_timeout_ms: u64,
  pub weights:          ScoreWeights,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".into(),
      port:             8080,
      store_path:       PathBuf::from("mindset.db"),
      store_timeout_ms: 5_000,
      weights:          ScoreWeights::default(),
    }
  }
}

impl ServerConfig {
  /// Check the config and derive the API settings from it.
  pub fn settings(&self) -> anyhow::Result<ApiSettings> {
    self.weights.validate()?;
    anyhow::ensure!(self.store_timeout_ms > 0, "store_timeout_ms must be positive");
    Ok(ApiSettings {
      weights:       self.weights,
      store_timeout: Duration::from_millis(self.store_timeout_ms),
    })
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level application router.
pub fn app<S>(store: Arc<S>, settings: ApiSettings) -> Router
where
  S: BlogStore + 'static,
{
  Router::new()
    .nest("/api", api_router(store, settings))
    .layer(TraceLayer::new_for_http())
}
