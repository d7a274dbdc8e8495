//! Reader engagement: feedback votes and comments.
//!
//! These are the detail rows the article counters are derived from. Feedback
//! is insert/delete only. Comments carry an opaque like counter that is
//! bumped in place; there is no like-event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::article::ArticleCounters;

// ─── Feedback ────────────────────────────────────────────────────────────────

/// Direction of a feedback vote.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Polarity {
  Positive,
  Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
  pub id:         Uuid,
  pub article_id: Uuid,
  pub polarity:   Polarity,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFeedback {
  pub article_id: Uuid,
  pub polarity:   Polarity,
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id:          Uuid,
  pub article_id:  Uuid,
  /// Set for threaded replies. The parent always lives on the same article.
  pub parent_id:   Option<Uuid>,
  pub author_name: String,
  pub content:     String,
  pub likes:       u64,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
  pub article_id:  Uuid,
  pub parent_id:   Option<Uuid>,
  pub author_name: String,
  pub content:     String,
}

// ─── Reconciliation report ───────────────────────────────────────────────────

/// One article whose cached counters disagreed with its detail rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRepair {
  pub article_id: Uuid,
  pub before:     ArticleCounters,
  pub after:      ArticleCounters,
}
