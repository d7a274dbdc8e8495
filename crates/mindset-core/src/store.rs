//! The `BlogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `mindset-store-sqlite`).
//! Higher layers (`mindset-api`, `mindset-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  article::{Article, ArticleCounters, NewArticle},
  engagement::{Comment, CounterRepair, Feedback, NewComment, NewFeedback},
  metrics::ArticleMetrics,
};

/// Abstraction over an AIMindset store backend.
///
/// Counter columns and the pin flag are the only shared mutable state. A
/// backend must only touch them through the atomic operations below:
///
/// - every detail-table write recomputes the affected article's counters in
///   the same transaction;
/// - [`pin_article`](Self::pin_article) clears every other pin and sets the
///   new one in one transaction.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BlogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Articles ──────────────────────────────────────────────────────────

  fn create_article(
    &self,
    input: NewArticle,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Retrieve an article by id. Returns `None` if not found.
  fn get_article(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  fn get_article_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + 'a;

  /// List articles newest first, optionally only the published ones.
  fn list_articles(
    &self,
    published_only: bool,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + '_;

  /// Publish or unpublish. Does not touch the pin flag.
  fn set_published(
    &self,
    id: Uuid,
    published: bool,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  // ── Manual pin ────────────────────────────────────────────────────────

  /// Pin `id` to the top of the featured list, unpinning any other article
  /// atomically. Fails if the article is missing or unpublished, leaving the
  /// previous pin in place.
  fn pin_article(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Clear the pin on `id`. Succeeds whether or not it was pinned.
  fn unpin_article(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every article carrying the pin flag, most recently pinned first.
  /// More than one entry is an invariant violation.
  fn pinned_articles(
    &self,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + '_;

  /// Clear the pin on every article except `keep`.
  fn clear_pins_except(
    &self,
    keep: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Engagement writes ─────────────────────────────────────────────────

  /// Record a vote. The article must exist and be published.
  fn record_feedback(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  fn delete_feedback(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Add a comment or reply. A reply's parent must be on the same article.
  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Delete a comment together with its replies.
  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn like_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// All comments on an article, oldest first.
  fn list_comments(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  // ── Reconciliation ────────────────────────────────────────────────────

  /// Recompute the four cached counters of `id` from the detail rows and
  /// write them in one statement. Idempotent.
  fn resync_counters(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<ArticleCounters, Self::Error>> + Send + '_;

  /// Resync every article, returning only those whose counters drifted.
  fn resync_all(
    &self,
  ) -> impl Future<Output = Result<Vec<CounterRepair>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn article_metrics(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<ArticleMetrics, Self::Error>> + Send + '_;
}
