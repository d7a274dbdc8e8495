//! Error taxonomy shared by every layer.
//!
//! Storage backends keep their own error types but must convert into this
//! one, so the API layer can map failures to HTTP semantics without knowing
//! which backend produced them.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("article not found: {0}")]
  ArticleNotFound(Uuid),

  #[error("feedback not found: {0}")]
  FeedbackNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  /// The article exists but is not published.
  #[error("article {0} is not eligible: unpublished")]
  NotEligible(Uuid),

  #[error("slug already in use: {0:?}")]
  SlugTaken(String),

  #[error("comment {parent} does not belong to article {article}")]
  InvalidParent { parent: Uuid, article: Uuid },

  #[error("invalid score weights: {0}")]
  InvalidWeights(String),

  /// Timeout or lock contention talking to the store. Reads, pin/unpin and
  /// resync are safe to retry. Feedback, comment and like writes are not:
  /// a timed-out write may still have been applied.
  #[error("store unavailable: {0}")]
  Transient(String),

  #[error("invariant violated: {0}")]
  InvariantViolation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::ArticleNotFound(_) | Self::FeedbackNotFound(_) | Self::CommentNotFound(_)
    )
  }

  pub fn is_retryable(&self) -> bool { matches!(self, Self::Transient(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
