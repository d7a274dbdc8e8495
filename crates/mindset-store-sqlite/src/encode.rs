//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! so that lexical order equals chronological order. UUIDs are stored as
//! hyphenated lowercase strings. Counters are SQLite integers.

use chrono::{DateTime, SecondsFormat, Utc};
use mindset_core::{
  article::{Article, ArticleCounters},
  engagement::{Comment, Polarity},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counters ─────────────────────────────────────────────────────────────────

fn decode_count(column: &str, v: i64) -> Result<u64> {
  u64::try_from(v).map_err(|_| Error::Decode(format!("negative {column}: {v}")))
}

// ─── Polarity ─────────────────────────────────────────────────────────────────

pub fn encode_polarity(p: Polarity) -> &'static str { p.into() }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawArticle::from_row`].
pub const ARTICLE_COLUMNS: &str = "article_id, title, slug, content, published, \
   created_at, updated_at, positive_feedbacks, negative_feedbacks, \
   comments_count, likes_count, is_featured_manual, featured_at";

/// Raw values read directly from an `articles` row.
pub struct RawArticle {
  pub article_id:         String,
  pub title:              String,
  pub slug:               String,
  pub content:            String,
  pub published:          bool,
  pub created_at:         String,
  pub updated_at:         String,
  pub positive_feedbacks: i64,
  pub negative_feedbacks: i64,
  pub comments_count:     i64,
  pub likes_count:        i64,
  pub is_featured_manual: bool,
  pub featured_at:        Option<String>,
}

impl RawArticle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      article_id:         row.get(0)?,
      title:              row.get(1)?,
      slug:               row.get(2)?,
      content:            row.get(3)?,
      published:          row.get(4)?,
      created_at:         row.get(5)?,
      updated_at:         row.get(6)?,
      positive_feedbacks: row.get(7)?,
      negative_feedbacks: row.get(8)?,
      comments_count:     row.get(9)?,
      likes_count:        row.get(10)?,
      is_featured_manual: row.get(11)?,
      featured_at:        row.get(12)?,
    })
  }

  pub fn counters(&self) -> Result<ArticleCounters> {
    Ok(ArticleCounters {
      positive_feedbacks: decode_count("positive_feedbacks", self.positive_feedbacks)?,
      negative_feedbacks: decode_count("negative_feedbacks", self.negative_feedbacks)?,
      comments_count:     decode_count("comments_count", self.comments_count)?,
      likes_count:        decode_count("likes_count", self.likes_count)?,
    })
  }

  pub fn into_article(self) -> Result<Article> {
    let counters = self.counters()?;
    Ok(Article {
      id: decode_uuid(&self.article_id)?,
      title: self.title,
      slug: self.slug,
      content: self.content,
      published: self.published,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      counters,
      is_featured_manual: self.is_featured_manual,
      featured_at: self.featured_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column list matching [`RawComment::from_row`].
pub const COMMENT_COLUMNS: &str =
  "comment_id, article_id, parent_id, author_name, content, likes, created_at";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub comment_id:  String,
  pub article_id:  String,
  pub parent_id:   Option<String>,
  pub author_name: String,
  pub content:     String,
  pub likes:       i64,
  pub created_at:  String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:  row.get(0)?,
      article_id:  row.get(1)?,
      parent_id:   row.get(2)?,
      author_name: row.get(3)?,
      content:     row.get(4)?,
      likes:       row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:          decode_uuid(&self.comment_id)?,
      article_id:  decode_uuid(&self.article_id)?,
      parent_id:   self.parent_id.as_deref().map(decode_uuid).transpose()?,
      author_name: self.author_name,
      content:     self.content,
      likes:       decode_count("likes", self.likes)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
