//! Handlers for feedback votes and comments.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/articles/:id/feedback` | Body: `{"polarity":"positive"}`; 201 |
//! | `DELETE` | `/feedback/:id` | 204 |
//! | `GET`    | `/articles/:id/comments` | Oldest first |
//! | `POST`   | `/articles/:id/comments` | Body: [`CommentBody`]; 201 |
//! | `DELETE` | `/comments/:id` | Replies are removed too; 204 |
//! | `POST`   | `/comments/:id/like` | Returns the updated comment |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use mindset_core::{
  engagement::{Comment, NewComment, NewFeedback, Polarity},
  store::BlogStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, bounded, error::ApiError};

// ─── Feedback ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
  pub polarity: Polarity,
}

/// `POST /articles/:id/feedback`
pub async fn create_feedback<S>(
  State(state): State<ApiState<S>>,
  Path(article_id): Path<Uuid>,
  Json(body): Json<FeedbackBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  let input = NewFeedback { article_id, polarity: body.polarity };
  let feedback = bounded(state.settings.store_timeout, state.store.record_feedback(input)).await?;
  Ok((StatusCode::CREATED, Json(feedback)))
}

/// `DELETE /feedback/:id`
pub async fn delete_feedback<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  bounded(state.settings.store_timeout, state.store.delete_feedback(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /articles/:id/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub parent_id:   Option<Uuid>,
  pub author_name: String,
  pub content:     String,
}

/// `GET /articles/:id/comments`
pub async fn list_comments<S>(
  State(state): State<ApiState<S>>,
  Path(article_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: BlogStore,
{
  let comments =
    bounded(state.settings.store_timeout, state.store.list_comments(article_id)).await?;
  Ok(Json(comments))
}

/// `POST /articles/:id/comments`
pub async fn create_comment<S>(
  State(state): State<ApiState<S>>,
  Path(article_id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("comment content must not be empty".into()));
  }
  let author_name = match body.author_name.trim() {
    "" => "Anonymous".to_owned(),
    name => name.to_owned(),
  };

  let input = NewComment {
    article_id,
    parent_id: body.parent_id,
    author_name,
    content: body.content,
  };
  let comment = bounded(state.settings.store_timeout, state.store.add_comment(input)).await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `DELETE /comments/:id`
pub async fn delete_comment<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  bounded(state.settings.store_timeout, state.store.delete_comment(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /comments/:id/like`
pub async fn like_comment<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Comment>, ApiError>
where
  S: BlogStore,
{
  let comment = bounded(state.settings.store_timeout, state.store.like_comment(id)).await?;
  Ok(Json(comment))
}
