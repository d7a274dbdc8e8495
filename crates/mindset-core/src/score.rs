//! Engagement scoring.
//!
//! `score = positive*W_p + comments*W_c + likes*W_l - negative*W_n`
//!
//! The weights are configuration, not constants baked into queries. The
//! default set is `(3, 2, 1.5, 1)`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, article::ArticleCounters};

/// Weights applied to each counter when ranking articles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
  pub positive: f64,
  pub comments: f64,
  pub likes:    f64,
  pub negative: f64,
}

impl Default for ScoreWeights {
  fn default() -> Self {
    Self { positive: 3.0, comments: 2.0, likes: 1.5, negative: 1.0 }
  }
}

impl ScoreWeights {
  /// Reject weights that would break monotonicity (negative) or ordering
  /// (NaN, infinity).
  pub fn validate(&self) -> Result<()> {
    let named = [
      ("positive", self.positive),
      ("comments", self.comments),
      ("likes", self.likes),
      ("negative", self.negative),
    ];
    for (name, w) in named {
      if !w.is_finite() {
        return Err(Error::InvalidWeights(format!("{name} weight is not finite")));
      }
      if w < 0.0 {
        return Err(Error::InvalidWeights(format!(
          "{name} weight must be non-negative, got {w}"
        )));
      }
    }
    Ok(())
  }

  /// Pure and total over any counter values.
  pub fn score(&self, c: &ArticleCounters) -> f64 {
    c.positive_feedbacks as f64 * self.positive
      + c.comments_count as f64 * self.comments
      + c.likes_count as f64 * self.likes
      - c.negative_feedbacks as f64 * self.negative
  }
}
