//! Featured article selection.
//!
//! The featured list is the editorial pin (if any) followed by the
//! highest-scoring published articles, capped at [`FEATURED_LIMIT`]. It is
//! recomputed on every read; nothing here is persisted.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
  Result,
  article::{Article, ArticleCounters},
  score::ScoreWeights,
  store::BlogStore,
};

/// Number of slots on the featured strip.
pub const FEATURED_LIMIT: usize = 3;

// ─── Output ──────────────────────────────────────────────────────────────────

/// One entry of the featured list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
  pub id:         Uuid,
  pub title:      String,
  pub slug:       String,
  #[serde(flatten)]
  pub counters:   ArticleCounters,
  pub score:      f64,
  /// `true` when the entry is there because of the editorial pin rather than
  /// its score.
  pub pinned:     bool,
  pub created_at: DateTime<Utc>,
}

impl ArticleSummary {
  fn new(article: &Article, score: f64, pinned: bool) -> Self {
    Self {
      id: article.id,
      title: article.title.clone(),
      slug: article.slug.clone(),
      counters: article.counters,
      score,
      pinned,
      created_at: article.created_at,
    }
  }
}

// ─── Pin resolution ──────────────────────────────────────────────────────────

/// Outcome of reading the pin flag across the corpus.
#[derive(Debug, Clone, Default)]
pub struct PinResolution {
  /// The pin that wins: the most recently pinned article.
  pub keep:  Option<Article>,
  /// Extra pins that must be cleared. Non-empty only if the at-most-one
  /// invariant was broken.
  pub stale: Vec<Uuid>,
}

/// Pick the surviving pin out of every article carrying the flag.
pub fn resolve_pin(mut pins: Vec<Article>) -> PinResolution {
  pins.sort_by(|a, b| {
    b.featured_at
      .cmp(&a.featured_at)
      .then_with(|| b.updated_at.cmp(&a.updated_at))
      .then_with(|| a.id.cmp(&b.id))
  });
  let mut iter = pins.into_iter();
  let keep = iter.next();
  let stale = iter.map(|a| a.id).collect();
  PinResolution { keep, stale }
}

impl PinResolution {
  /// The broken at-most-one-pin invariant, if any extra pins were found.
  pub fn violation(&self) -> Option<crate::Error> {
    let keep = self.keep.as_ref()?;
    if self.stale.is_empty() {
      return None;
    }
    Some(crate::Error::InvariantViolation(format!(
      "{} articles pinned; keeping {}",
      self.stale.len() + 1,
      keep.id
    )))
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Merge the pin with the top-scored candidates.
///
/// - An unpublished pin is ignored, as if nothing were pinned.
/// - Candidates that are unpublished or equal to the pin are skipped.
/// - Ranking is score descending, then `created_at` newest first, then id.
/// - The result holds at most [`FEATURED_LIMIT`] entries and no duplicate ids.
pub fn select_featured(
  pinned:     Option<&Article>,
  candidates: Vec<Article>,
  weights:    &ScoreWeights,
) -> Vec<ArticleSummary> {
  let pinned = pinned.filter(|a| a.is_eligible());
  let mut out = Vec::with_capacity(FEATURED_LIMIT);
  let mut seen = HashSet::new();

  if let Some(p) = pinned {
    seen.insert(p.id);
    out.push(ArticleSummary::new(p, weights.score(&p.counters), true));
  }

  let mut ranked: Vec<(f64, Article)> = candidates
    .into_iter()
    .filter(|a| a.is_eligible())
    .map(|a| (weights.score(&a.counters), a))
    .collect();

  ranked.sort_by(|(sa, a), (sb, b)| {
    sb.total_cmp(sa)
      .then_with(|| b.created_at.cmp(&a.created_at))
      .then_with(|| a.id.cmp(&b.id))
  });

  for (score, article) in ranked {
    if out.len() >= FEATURED_LIMIT {
      break;
    }
    if seen.insert(article.id) {
      out.push(ArticleSummary::new(&article, score, false));
    }
  }

  out
}

/// Compute the featured list from the current store snapshot.
///
/// If more than one article is found pinned, the most recently pinned one is
/// kept and the others are cleared before selection.
pub async fn featured_articles<S: BlogStore>(
  store:   &S,
  weights: &ScoreWeights,
) -> Result<Vec<ArticleSummary>> {
  let pins = store.pinned_articles().await.map_err(Into::into)?;
  let resolution = resolve_pin(pins);

  if let Some(keep) = &resolution.keep
    && let Some(violation) = resolution.violation()
  {
    warn!(
      error = %violation,
      cleared = ?resolution.stale,
      "clearing all but the most recent pin"
    );
    if let Err(e) = store.clear_pins_except(keep.id).await {
      let e: crate::Error = e.into();
      warn!(error = %e, "failed to clear stale pins");
    }
  }

  let candidates = store.list_articles(true).await.map_err(Into::into)?;
  Ok(select_featured(resolution.keep.as_ref(), candidates, weights))
}
