//! Handlers for `/articles` endpoints and counter resync.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/articles` | Optional `?published_only=true` |
//! | `POST` | `/articles` | Body: [`NewArticle`]; 201, 409 on duplicate slug |
//! | `GET`  | `/articles/:id` | 404 if not found |
//! | `GET`  | `/articles/by-slug/:slug` | 404 if not found |
//! | `POST` | `/articles/:id/publish` | |
//! | `POST` | `/articles/:id/unpublish` | Leaves a pin in place |
//! | `GET`  | `/articles/:id/metrics` | 503 + `retryable` when the store is down |
//! | `POST` | `/articles/:id/resync` | Returns the recomputed counters |
//! | `POST` | `/resync` | Returns the list of repaired articles |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mindset_core::{
  article::{Article, ArticleCounters, NewArticle},
  engagement::CounterRepair,
  metrics::ArticleMetrics,
  store::BlogStore,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ApiState, bounded, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub published_only: bool,
}

/// `GET /articles[?published_only=true]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Article>>, ApiError>
where
  S: BlogStore,
{
  let articles = bounded(
    state.settings.store_timeout,
    state.store.list_articles(params.published_only),
  )
  .await?;
  Ok(Json(articles))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /articles`. Returns 201 and the stored [`Article`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewArticle>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".into()));
  }
  if body.slug.trim().is_empty() || body.slug.contains('/') {
    return Err(ApiError::BadRequest("slug must be non-empty and contain no '/'".into()));
  }

  let article = bounded(state.settings.store_timeout, state.store.create_article(body)).await?;
  Ok((StatusCode::CREATED, Json(article)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /articles/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError>
where
  S: BlogStore,
{
  let article = bounded(state.settings.store_timeout, state.store.get_article(id))
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("article {id} not found")))?;
  Ok(Json(article))
}

/// `GET /articles/by-slug/:slug`
pub async fn get_by_slug<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<Article>, ApiError>
where
  S: BlogStore,
{
  let article = bounded(
    state.settings.store_timeout,
    state.store.get_article_by_slug(&slug),
  )
  .await?
  .ok_or_else(|| ApiError::NotFound(format!("article {slug:?} not found")))?;
  Ok(Json(article))
}

// ─── Publication ──────────────────────────────────────────────────────────────

/// `POST /articles/:id/publish`
pub async fn publish<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError>
where
  S: BlogStore,
{
  let article =
    bounded(state.settings.store_timeout, state.store.set_published(id, true)).await?;
  Ok(Json(article))
}

/// `POST /articles/:id/unpublish`
pub async fn unpublish<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError>
where
  S: BlogStore,
{
  let article =
    bounded(state.settings.store_timeout, state.store.set_published(id, false)).await?;
  Ok(Json(article))
}

// ─── Metrics ──────────────────────────────────────────────────────────────────

/// `GET /articles/:id/metrics`
pub async fn metrics<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ArticleMetrics>, ApiError>
where
  S: BlogStore,
{
  let metrics = bounded(state.settings.store_timeout, state.store.article_metrics(id))
    .await
    .inspect_err(|e| {
      if e.is_retryable() {
        warn!(article = %id, error = %e, "metrics unavailable");
      }
    })?;
  Ok(Json(metrics))
}

// ─── Resync ───────────────────────────────────────────────────────────────────

/// `POST /articles/:id/resync`
pub async fn resync_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ArticleCounters>, ApiError>
where
  S: BlogStore,
{
  let counters =
    bounded(state.settings.store_timeout, state.store.resync_counters(id)).await?;
  info!(article = %id, "counters resynced on request");
  Ok(Json(counters))
}

/// `POST /resync`
pub async fn resync_all<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<CounterRepair>>, ApiError>
where
  S: BlogStore,
{
  let repairs = bounded(state.settings.store_timeout, state.store.resync_all()).await?;
  Ok(Json(repairs))
}
