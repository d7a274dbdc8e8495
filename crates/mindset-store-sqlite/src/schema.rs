//! SQL schema for the AIMindset SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS articles (
    article_id          TEXT PRIMARY KEY,
    title               TEXT NOT NULL,
    slug                TEXT NOT NULL UNIQUE,
    content             TEXT NOT NULL DEFAULT '',
    published           INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,   -- RFC 3339 UTC, fixed micro precision
    updated_at          TEXT NOT NULL,
    -- Cached counters. Written only by the counter sync inside the same
    -- transaction as the detail-row change.
    positive_feedbacks  INTEGER NOT NULL DEFAULT 0,
    negative_feedbacks  INTEGER NOT NULL DEFAULT 0,
    comments_count      INTEGER NOT NULL DEFAULT 0,
    likes_count         INTEGER NOT NULL DEFAULT 0,
    is_featured_manual  INTEGER NOT NULL DEFAULT 0,
    featured_at         TEXT
);

-- At most one pinned article, enforced by the storage layer.
CREATE UNIQUE INDEX IF NOT EXISTS articles_single_pin_idx
    ON articles(is_featured_manual) WHERE is_featured_manual = 1;

-- Votes are insert/delete only.
CREATE TABLE IF NOT EXISTS feedbacks (
    feedback_id TEXT PRIMARY KEY,
    article_id  TEXT NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
    polarity    TEXT NOT NULL CHECK (polarity IN ('positive', 'negative')),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    article_id  TEXT NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
    parent_id   TEXT REFERENCES comments(comment_id) ON DELETE CASCADE,
    author_name TEXT NOT NULL,
    content     TEXT NOT NULL,
    likes       INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS articles_created_idx  ON articles(created_at);
CREATE INDEX IF NOT EXISTS feedbacks_article_idx ON feedbacks(article_id);
CREATE INDEX IF NOT EXISTS comments_article_idx  ON comments(article_id);
CREATE INDEX IF NOT EXISTS comments_parent_idx   ON comments(parent_id);

PRAGMA user_version = 1;
";
