//! Article — the unit that gets scored, pinned and featured.
//!
//! The four engagement counters on an article are a cache over the feedback
//! and comment tables. Only the store's reconciliation path writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Counters ────────────────────────────────────────────────────────────────

/// Cached engagement counters. Always reconcilable to the detail rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCounters {
  pub positive_feedbacks: u64,
  pub negative_feedbacks: u64,
  /// Top-level comments and replies alike.
  pub comments_count:     u64,
  /// Sum of `likes` over every comment on the article.
  pub likes_count:        u64,
}

impl ArticleCounters {
  pub fn new(positive: u64, negative: u64, comments: u64, likes: u64) -> Self {
    Self {
      positive_feedbacks: positive,
      negative_feedbacks: negative,
      comments_count:     comments,
      likes_count:        likes,
    }
  }

  pub fn total_feedbacks(&self) -> u64 {
    self.positive_feedbacks + self.negative_feedbacks
  }
}

// ─── Article ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
  pub id:                 Uuid,
  pub title:              String,
  pub slug:               String,
  pub content:            String,
  pub published:          bool,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
  pub counters:           ArticleCounters,
  /// Editorial pin. At most one article carries it at any time.
  pub is_featured_manual: bool,
  /// When the pin was last set; `None` while unpinned.
  pub featured_at:        Option<DateTime<Utc>>,
}

impl Article {
  /// Only published articles may be pinned or shown as featured.
  pub fn is_eligible(&self) -> bool { self.published }
}

/// Input for [`BlogStore::create_article`](crate::store::BlogStore::create_article).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArticle {
  pub title:     String,
  pub slug:      String,
  #[serde(default)]
  pub content:   String,
  #[serde(default)]
  pub published: bool,
}

impl NewArticle {
  pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
    Self {
      title:     title.into(),
      slug:      slug.into(),
      content:   String::new(),
      published: false,
    }
  }

  pub fn published(mut self) -> Self {
    self.published = true;
    self
  }
}
