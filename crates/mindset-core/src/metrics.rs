//! Per-article engagement metrics as shown on the article page.

use serde::{Deserialize, Serialize};

use crate::article::ArticleCounters;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetrics {
  pub positive_feedback: u64,
  pub negative_feedback: u64,
  pub comments_count:    u64,
  pub likes_count:       u64,
  /// Percentage of positive votes, one decimal place. `0.0` with no votes.
  pub approval_rate:     f64,
}

impl From<ArticleCounters> for ArticleMetrics {
  fn from(c: ArticleCounters) -> Self {
    let total = c.total_feedbacks();
    let approval_rate = if total == 0 {
      0.0
    } else {
      (c.positive_feedbacks as f64 / total as f64 * 1000.0).round() / 10.0
    };
    Self {
      positive_feedback: c.positive_feedbacks,
      negative_feedback: c.negative_feedbacks,
      comments_count: c.comments_count,
      likes_count: c.likes_count,
      approval_rate,
    }
  }
}
