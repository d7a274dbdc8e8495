//! [`SqliteStore`] — the SQLite implementation of [`BlogStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use mindset_core::{
  Error as CoreError,
  article::{Article, ArticleCounters, NewArticle},
  engagement::{Comment, CounterRepair, Feedback, NewComment, NewFeedback},
  metrics::ArticleMetrics,
  store::BlogStore,
};

use crate::{
  Error, Result,
  encode::{
    ARTICLE_COLUMNS, COMMENT_COLUMNS, RawArticle, RawComment, decode_uuid,
    encode_dt, encode_polarity, encode_uuid,
  },
  error::reject,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An AIMindset store backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Current time at the precision the store persists.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Every clone of this store fails with a
  /// transient "connection closed" error afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection, bypassing every invariant.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Connection-level helpers ────────────────────────────────────────────────
//
// These run inside `conn.call` closures, usually on an open transaction.

fn fetch_article(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawArticle>> {
  conn
    .query_row(
      &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = ?1"),
      rusqlite::params![id],
      RawArticle::from_row,
    )
    .optional()
}

fn fetch_comment(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawComment>> {
  conn
    .query_row(
      &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"),
      rusqlite::params![id],
      RawComment::from_row,
    )
    .optional()
}

/// Fail unless the article exists and is published.
fn ensure_published(conn: &Connection, id: Uuid) -> tokio_rusqlite::Result<()> {
  let published: Option<bool> = conn
    .query_row(
      "SELECT published FROM articles WHERE article_id = ?1",
      rusqlite::params![encode_uuid(id)],
      |r| r.get(0),
    )
    .optional()?;
  match published {
    None => Err(reject(CoreError::ArticleNotFound(id))),
    Some(false) => Err(reject(CoreError::NotEligible(id))),
    Some(true) => Ok(()),
  }
}

/// Recompute the four cached counters of one article from its detail rows,
/// in a single statement. Returns the number of articles updated (0 or 1).
fn sync_counters(conn: &Connection, id: &str) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE articles SET
       positive_feedbacks = (SELECT COUNT(*) FROM feedbacks
                             WHERE article_id = ?1 AND polarity = 'positive'),
       negative_feedbacks = (SELECT COUNT(*) FROM feedbacks
                             WHERE article_id = ?1 AND polarity = 'negative'),
       comments_count     = (SELECT COUNT(*) FROM comments WHERE article_id = ?1),
       likes_count        = (SELECT COALESCE(SUM(likes), 0) FROM comments
                             WHERE article_id = ?1)
     WHERE article_id = ?1",
    rusqlite::params![id],
  )
}

fn list_article_rows(
  conn: &Connection,
  sql:  &str,
) -> rusqlite::Result<Vec<RawArticle>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map([], RawArticle::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

// ─── BlogStore impl ──────────────────────────────────────────────────────────

impl BlogStore for SqliteStore {
  type Error = Error;

  // ── Articles ──────────────────────────────────────────────────────────────

  async fn create_article(&self, input: NewArticle) -> Result<Article> {
    let at = now();
    let article = Article {
      id:                 Uuid::new_v4(),
      title:              input.title,
      slug:               input.slug,
      content:            input.content,
      published:          input.published,
      created_at:         at,
      updated_at:         at,
      counters:           ArticleCounters::default(),
      is_featured_manual: false,
      featured_at:        None,
    };

    let id_str    = encode_uuid(article.id);
    let title     = article.title.clone();
    let slug      = article.slug.clone();
    let content   = article.content.clone();
    let published = article.published;
    let at_str    = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM articles WHERE slug = ?1",
            rusqlite::params![slug],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Err(reject(CoreError::SlugTaken(slug)));
        }
        tx.execute(
          "INSERT INTO articles (article_id, title, slug, content, published, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, title, slug, content, published, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(article = %article.id, slug = %article.slug, "article created");
    Ok(article)
  }

  async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_article(conn, &id_str)?))
      .await?;
    raw.map(RawArticle::into_article).transpose()
  }

  async fn get_article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
    let slug = slug.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = ?1"),
            rusqlite::params![slug],
            RawArticle::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawArticle::into_article).transpose()
  }

  async fn list_articles(&self, published_only: bool) -> Result<Vec<Article>> {
    let raws = self
      .conn
      .call(move |conn| {
        let sql = if published_only {
          format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE published = 1
             ORDER BY created_at DESC, rowid DESC"
          )
        } else {
          format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at DESC, rowid DESC")
        };
        Ok(list_article_rows(conn, &sql)?)
      })
      .await?;
    raws.into_iter().map(RawArticle::into_article).collect()
  }

  async fn set_published(&self, id: Uuid, published: bool) -> Result<Article> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE articles SET published = ?2, updated_at = ?3 WHERE article_id = ?1",
          rusqlite::params![id_str, published, at_str],
        )?;
        if n == 0 {
          return Err(reject(CoreError::ArticleNotFound(id)));
        }
        let raw = fetch_article(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ArticleNotFound(id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    info!(article = %id, published, "publication state changed");
    raw.into_article()
  }

  // ── Manual pin ────────────────────────────────────────────────────────────

  async fn pin_article(&self, id: Uuid) -> Result<Article> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    // Clear-then-set in one IMMEDIATE transaction: no reader ever observes
    // two pins, and a failed check leaves the previous pin untouched.
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_published(&tx, id)?;
        tx.execute(
          "UPDATE articles SET is_featured_manual = 0, featured_at = NULL
           WHERE is_featured_manual = 1 AND article_id != ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "UPDATE articles SET is_featured_manual = 1, featured_at = ?2
           WHERE article_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;
        let raw = fetch_article(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ArticleNotFound(id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    info!(article = %id, "article pinned");
    raw.into_article()
  }

  async fn unpin_article(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let cleared = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE articles SET is_featured_manual = 0, featured_at = NULL
           WHERE article_id = ?1 AND is_featured_manual = 1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if cleared > 0 {
      info!(article = %id, "article unpinned");
    }
    Ok(())
  }

  async fn pinned_articles(&self) -> Result<Vec<Article>> {
    let raws = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {ARTICLE_COLUMNS} FROM articles WHERE is_featured_manual = 1
           ORDER BY featured_at DESC"
        );
        Ok(list_article_rows(conn, &sql)?)
      })
      .await?;
    raws.into_iter().map(RawArticle::into_article).collect()
  }

  async fn clear_pins_except(&self, keep: Uuid) -> Result<u64> {
    let keep_str = encode_uuid(keep);
    let cleared = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE articles SET is_featured_manual = 0, featured_at = NULL
           WHERE is_featured_manual = 1 AND article_id != ?1",
          rusqlite::params![keep_str],
        )?)
      })
      .await?;
    Ok(cleared as u64)
  }

  // ── Engagement writes ─────────────────────────────────────────────────────

  async fn record_feedback(&self, input: NewFeedback) -> Result<Feedback> {
    let feedback = Feedback {
      id:         Uuid::new_v4(),
      article_id: input.article_id,
      polarity:   input.polarity,
      created_at: now(),
    };

    let id_str      = encode_uuid(feedback.id);
    let article_id  = feedback.article_id;
    let article_str = encode_uuid(article_id);
    let polarity    = encode_polarity(feedback.polarity);
    let at_str      = encode_dt(feedback.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_published(&tx, article_id)?;
        tx.execute(
          "INSERT INTO feedbacks (feedback_id, article_id, polarity, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, article_str, polarity, at_str],
        )?;
        sync_counters(&tx, &article_str)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(feedback)
  }

  async fn delete_feedback(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let article: Option<String> = tx
          .query_row(
            "SELECT article_id FROM feedbacks WHERE feedback_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(article) = article else {
          return Err(reject(CoreError::FeedbackNotFound(id)));
        };
        tx.execute(
          "DELETE FROM feedbacks WHERE feedback_id = ?1",
          rusqlite::params![id_str],
        )?;
        sync_counters(&tx, &article)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      id:          Uuid::new_v4(),
      article_id:  input.article_id,
      parent_id:   input.parent_id,
      author_name: input.author_name,
      content:     input.content,
      likes:       0,
      created_at:  now(),
    };

    let id_str      = encode_uuid(comment.id);
    let article_id  = comment.article_id;
    let article_str = encode_uuid(article_id);
    let parent_id   = comment.parent_id;
    let author      = comment.author_name.clone();
    let content     = comment.content.clone();
    let at_str      = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_published(&tx, article_id)?;

        let parent_str = parent_id.map(encode_uuid);
        if let (Some(parent), Some(parent_str)) = (parent_id, &parent_str) {
          let parent_article: Option<String> = tx
            .query_row(
              "SELECT article_id FROM comments WHERE comment_id = ?1",
              rusqlite::params![parent_str],
              |r| r.get(0),
            )
            .optional()?;
          match parent_article {
            None => return Err(reject(CoreError::CommentNotFound(parent))),
            Some(a) if a != article_str => {
              return Err(reject(CoreError::InvalidParent {
                parent,
                article: article_id,
              }));
            }
            Some(_) => {}
          }
        }

        tx.execute(
          "INSERT INTO comments
             (comment_id, article_id, parent_id, author_name, content, likes, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
          rusqlite::params![id_str, article_str, parent_str, author, content, at_str],
        )?;
        sync_counters(&tx, &article_str)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn delete_comment(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(raw) = fetch_comment(&tx, &id_str)? else {
          return Err(reject(CoreError::CommentNotFound(id)));
        };
        // Replies go with it via ON DELETE CASCADE.
        tx.execute(
          "DELETE FROM comments WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?;
        sync_counters(&tx, &raw.article_id)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn like_comment(&self, id: Uuid) -> Result<Comment> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let n = tx.execute(
          "UPDATE comments SET likes = likes + 1 WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?;
        if n == 0 {
          return Err(reject(CoreError::CommentNotFound(id)));
        }
        let raw = fetch_comment(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::CommentNotFound(id)))?;
        sync_counters(&tx, &raw.article_id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;
    raw.into_comment()
  }

  async fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>> {
    let article_str = encode_uuid(article_id);
    let raws = self
      .conn
      .call(move |conn| {
        if fetch_article(conn, &article_str)?.is_none() {
          return Err(reject(CoreError::ArticleNotFound(article_id)));
        }
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments WHERE article_id = ?1
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![article_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  async fn resync_counters(&self, id: Uuid) -> Result<ArticleCounters> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if sync_counters(&tx, &id_str)? == 0 {
          return Err(reject(CoreError::ArticleNotFound(id)));
        }
        let raw = fetch_article(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ArticleNotFound(id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    let counters = raw.counters()?;
    debug!(article = %id, ?counters, "counters resynced");
    Ok(counters)
  }

  async fn resync_all(&self) -> Result<Vec<CounterRepair>> {
    let pairs = self
      .conn
      .call(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at");
        let before = list_article_rows(&tx, &sql)?;

        let mut pairs = Vec::with_capacity(before.len());
        for raw in before {
          sync_counters(&tx, &raw.article_id)?;
          if let Some(after) = fetch_article(&tx, &raw.article_id)? {
            pairs.push((raw, after));
          }
        }
        tx.commit()?;
        Ok(pairs)
      })
      .await?;

    let mut repairs = Vec::new();
    for (before, after) in pairs {
      let (b, a) = (before.counters()?, after.counters()?);
      if b != a {
        repairs.push(CounterRepair {
          article_id: decode_uuid(&before.article_id)?,
          before:     b,
          after:      a,
        });
      }
    }

    info!(repaired = repairs.len(), "counter resync complete");
    Ok(repairs)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn article_metrics(&self, id: Uuid) -> Result<ArticleMetrics> {
    let article = self
      .get_article(id)
      .await?
      .ok_or(Error::Core(CoreError::ArticleNotFound(id)))?;
    Ok(ArticleMetrics::from(article.counters))
  }
}
