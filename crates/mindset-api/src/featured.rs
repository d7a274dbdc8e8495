//! Handlers for the featured strip and the editorial pin.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/featured` | Always 200; see [`FeaturedSource`] |
//! | `POST`   | `/articles/:id/feature` | Pin; 404 missing, 422 unpublished |
//! | `DELETE` | `/articles/:id/feature` | Unpin; always 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use mindset_core::{
  article::Article,
  featured::{ArticleSummary, featured_articles},
  store::BlogStore,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ApiState, bounded, error::ApiError};

/// Where a featured list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeaturedSource {
  /// Computed from the store on this request.
  Fresh,
  /// The store failed; this is the last list computed successfully.
  Cached,
  /// The store failed and nothing was cached. `articles` is empty.
  Unavailable,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeaturedResponse {
  pub articles: Vec<ArticleSummary>,
  pub source:   FeaturedSource,
}

/// `GET /featured`
///
/// Feeds a public page, so it never fails: store errors degrade to the
/// cached list or to an empty one.
pub async fn list<S>(State(state): State<ApiState<S>>) -> Json<FeaturedResponse>
where
  S: BlogStore,
{
  let weights = state.settings.weights;
  let result = bounded(
    state.settings.store_timeout,
    featured_articles(state.store.as_ref(), &weights),
  )
  .await;

  match result {
    Ok(articles) => {
      *state.featured.write().await = Some(articles.clone());
      Json(FeaturedResponse { articles, source: FeaturedSource::Fresh })
    }
    Err(e) => {
      let cached = state.featured.read().await.clone();
      warn!(error = %e, cached = cached.is_some(), "featured list degraded");
      Json(match cached {
        Some(articles) => FeaturedResponse { articles, source: FeaturedSource::Cached },
        None => FeaturedResponse {
          articles: Vec::new(),
          source:   FeaturedSource::Unavailable,
        },
      })
    }
  }
}

/// `POST /articles/:id/feature`
pub async fn pin<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError>
where
  S: BlogStore,
{
  let article = bounded(state.settings.store_timeout, state.store.pin_article(id)).await?;
  info!(article = %id, "manual feature set");
  Ok(Json(article))
}

/// `DELETE /articles/:id/feature`
pub async fn unpin<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  bounded(state.settings.store_timeout, state.store.unpin_article(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}
