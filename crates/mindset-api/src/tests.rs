//! Router-level tests against an in-memory SQLite store.

use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use mindset_core::{
  Error as CoreError,
  article::{Article, ArticleCounters, NewArticle},
  engagement::{Comment, CounterRepair, Feedback, NewComment, NewFeedback},
  metrics::ArticleMetrics,
  store::BlogStore,
};
use mindset_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{ApiSettings, api_router, bounded};

async fn setup() -> (SqliteStore, Router) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let router = api_router(Arc::new(store.clone()), ApiSettings::default());
  (store, router)
}

async fn send(
  router: &Router,
  method: &str,
  uri:    &str,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = router
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn create(router: &Router, slug: &str, published: bool) -> String {
  let (status, body) = send(
    router,
    "POST",
    "/articles",
    Some(json!({ "title": slug.to_uppercase(), "slug": slug, "published": published })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_str().unwrap().to_owned()
}

// ── Articles ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_get_and_conflict() {
  let (_store, router) = setup().await;
  let id = create(&router, "first-post", true).await;

  let (status, body) = send(&router, "GET", &format!("/articles/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["slug"], "first-post");
  assert_eq!(body["counters"]["positive_feedbacks"], 0);

  let (status, body) = send(&router, "GET", "/articles/by-slug/first-post", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["id"], id.as_str());

  let (status, _) = send(
    &router,
    "POST",
    "/articles",
    Some(json!({ "title": "Again", "slug": "first-post" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_rejects_blank_title() {
  let (_store, router) = setup().await;
  let (status, body) = send(
    &router,
    "POST",
    "/articles",
    Some(json!({ "title": "  ", "slug": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn missing_article_is_404() {
  let (_store, router) = setup().await;
  let id = uuid::Uuid::new_v4();
  let (status, _) = send(&router, "GET", &format!("/articles/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&router, "POST", &format!("/articles/{id}/resync"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Featured and pin ──────────────────────────────────────────────────────────

#[tokio::test]
async fn pinned_article_is_first_and_flagged() {
  let (_store, router) = setup().await;
  let a = create(&router, "a", true).await;
  let b = create(&router, "b", true).await;
  create(&router, "c", true).await;
  create(&router, "d", true).await;

  for _ in 0..3 {
    send(
      &router,
      "POST",
      &format!("/articles/{a}/feedback"),
      Some(json!({ "polarity": "positive" })),
    )
    .await;
  }

  let (status, _) = send(&router, "POST", &format!("/articles/{b}/feature"), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = send(&router, "GET", "/featured", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "fresh");
  let list = body["articles"].as_array().unwrap();
  assert_eq!(list.len(), 3);
  assert_eq!(list[0]["id"], b.as_str());
  assert_eq!(list[0]["pinned"], true);
  assert_eq!(list[1]["id"], a.as_str());
  assert_eq!(list[1]["pinned"], false);
  assert_eq!(list[1]["score"], 9.0);

  let (status, _) = send(&router, "DELETE", &format!("/articles/{b}/feature"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, body) = send(&router, "GET", "/featured", None).await;
  assert_eq!(body["articles"][0]["id"], a.as_str());
}

#[tokio::test]
async fn pinning_a_draft_is_unprocessable() {
  let (_store, router) = setup().await;
  let draft = create(&router, "draft", false).await;
  let (status, body) = send(&router, "POST", &format!("/articles/{draft}/feature"), None).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("not eligible"));

  let missing = uuid::Uuid::new_v4();
  let (status, _) = send(&router, "POST", &format!("/articles/{missing}/feature"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Engagement ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feedback_comments_and_metrics() {
  let (_store, router) = setup().await;
  let a = create(&router, "a", true).await;

  for polarity in ["positive", "positive", "negative"] {
    let (status, _) = send(
      &router,
      "POST",
      &format!("/articles/{a}/feedback"),
      Some(json!({ "polarity": polarity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, top) = send(
    &router,
    "POST",
    &format!("/articles/{a}/comments"),
    Some(json!({ "author_name": "", "content": "great" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(top["author_name"], "Anonymous");
  let top_id = top["id"].as_str().unwrap();

  let (status, _) = send(
    &router,
    "POST",
    &format!("/articles/{a}/comments"),
    Some(json!({ "author_name": "bo", "content": "agreed", "parent_id": top_id })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, liked) = send(&router, "POST", &format!("/comments/{top_id}/like"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(liked["likes"], 1);

  let (status, m) = send(&router, "GET", &format!("/articles/{a}/metrics"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(m["positive_feedback"], 2);
  assert_eq!(m["negative_feedback"], 1);
  assert_eq!(m["comments_count"], 2);
  assert_eq!(m["likes_count"], 1);
  assert_eq!(m["approval_rate"], 66.7);

  let (_, comments) = send(&router, "GET", &format!("/articles/{a}/comments"), None).await;
  assert_eq!(comments.as_array().unwrap().len(), 2);

  let (status, _) = send(&router, "DELETE", &format!("/comments/{top_id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, m) = send(&router, "GET", &format!("/articles/{a}/metrics"), None).await;
  assert_eq!(m["comments_count"], 0);
  assert_eq!(m["likes_count"], 0);
}

#[tokio::test]
async fn empty_comment_is_rejected() {
  let (_store, router) = setup().await;
  let a = create(&router, "a", true).await;
  let (status, _) = send(
    &router,
    "POST",
    &format!("/articles/{a}/comments"),
    Some(json!({ "author_name": "x", "content": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resync_endpoints_are_idempotent() {
  let (_store, router) = setup().await;
  let a = create(&router, "a", true).await;
  send(
    &router,
    "POST",
    &format!("/articles/{a}/feedback"),
    Some(json!({ "polarity": "negative" })),
  )
  .await;

  let (status, first) = send(&router, "POST", &format!("/articles/{a}/resync"), None).await;
  assert_eq!(status, StatusCode::OK);
  let (_, second) = send(&router, "POST", &format!("/articles/{a}/resync"), None).await;
  assert_eq!(first, second);
  assert_eq!(first["negative_feedbacks"], 1);

  let (status, repairs) = send(&router, "POST", "/resync", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(repairs, json!([]));
}

// ── Degradation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn featured_falls_back_to_cache_when_store_is_down() {
  let (store, router) = setup().await;
  let a = create(&router, "a", true).await;

  let (_, fresh) = send(&router, "GET", "/featured", None).await;
  assert_eq!(fresh["source"], "fresh");

  store.close().await.unwrap();

  let (status, body) = send(&router, "GET", "/featured", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "cached");
  assert_eq!(body["articles"][0]["id"], a.as_str());
}

#[tokio::test]
async fn featured_reports_unavailable_without_cache() {
  let (store, router) = setup().await;
  store.close().await.unwrap();

  let (status, body) = send(&router, "GET", "/featured", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "unavailable");
  assert_eq!(body["articles"], json!([]));
}

#[tokio::test]
async fn writes_and_metrics_fail_loudly_when_store_is_down() {
  let (store, router) = setup().await;
  let a = create(&router, "a", true).await;
  store.close().await.unwrap();

  let (status, body) = send(&router, "GET", &format!("/articles/{a}/metrics"), None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["retryable"], true);

  let (status, _) = send(&router, "POST", &format!("/articles/{a}/feature"), None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ── Timeouts ──────────────────────────────────────────────────────────────────

/// A [`SqliteStore`] whose calls hang forever once `stalled` is set.
struct StallingStore {
  inner:   SqliteStore,
  stalled: AtomicBool,
}

impl StallingStore {
  async fn run<T, F>(&self, fut: F) -> Result<T, CoreError>
  where
    F: Future<Output = Result<T, mindset_store_sqlite::Error>>,
  {
    if self.stalled.load(Ordering::SeqCst) {
      std::future::pending::<()>().await;
    }
    fut.await.map_err(Into::into)
  }
}

impl BlogStore for StallingStore {
  type Error = CoreError;

  async fn create_article(&self, input: NewArticle) -> Result<Article, CoreError> {
    self.run(self.inner.create_article(input)).await
  }

  async fn get_article(&self, id: Uuid) -> Result<Option<Article>, CoreError> {
    self.run(self.inner.get_article(id)).await
  }

  async fn get_article_by_slug(&self, slug: &str) -> Result<Option<Article>, CoreError> {
    self.run(self.inner.get_article_by_slug(slug)).await
  }

  async fn list_articles(&self, published_only: bool) -> Result<Vec<Article>, CoreError> {
    self.run(self.inner.list_articles(published_only)).await
  }

  async fn set_published(&self, id: Uuid, published: bool) -> Result<Article, CoreError> {
    self.run(self.inner.set_published(id, published)).await
  }

  async fn pin_article(&self, id: Uuid) -> Result<Article, CoreError> {
    self.run(self.inner.pin_article(id)).await
  }

  async fn unpin_article(&self, id: Uuid) -> Result<(), CoreError> {
    self.run(self.inner.unpin_article(id)).await
  }

  async fn pinned_articles(&self) -> Result<Vec<Article>, CoreError> {
    self.run(self.inner.pinned_articles()).await
  }

  async fn clear_pins_except(&self, keep: Uuid) -> Result<u64, CoreError> {
    self.run(self.inner.clear_pins_except(keep)).await
  }

  async fn record_feedback(&self, input: NewFeedback) -> Result<Feedback, CoreError> {
    self.run(self.inner.record_feedback(input)).await
  }

  async fn delete_feedback(&self, id: Uuid) -> Result<(), CoreError> {
    self.run(self.inner.delete_feedback(id)).await
  }

  async fn add_comment(&self, input: NewComment) -> Result<Comment, CoreError> {
    self.run(self.inner.add_comment(input)).await
  }

  async fn delete_comment(&self, id: Uuid) -> Result<(), CoreError> {
    self.run(self.inner.delete_comment(id)).await
  }

  async fn like_comment(&self, id: Uuid) -> Result<Comment, CoreError> {
    self.run(self.inner.like_comment(id)).await
  }

  async fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, CoreError> {
    self.run(self.inner.list_comments(article_id)).await
  }

  async fn resync_counters(&self, id: Uuid) -> Result<ArticleCounters, CoreError> {
    self.run(self.inner.resync_counters(id)).await
  }

  async fn resync_all(&self) -> Result<Vec<CounterRepair>, CoreError> {
    self.run(self.inner.resync_all()).await
  }

  async fn article_metrics(&self, id: Uuid) -> Result<ArticleMetrics, CoreError> {
    self.run(self.inner.article_metrics(id)).await
  }
}

async fn stalling_setup() -> (Arc<StallingStore>, Router) {
  let store = Arc::new(StallingStore {
    inner:   SqliteStore::open_in_memory().await.unwrap(),
    stalled: AtomicBool::new(false),
  });
  let settings = ApiSettings {
    store_timeout: Duration::from_millis(50),
    ..ApiSettings::default()
  };
  let router = api_router(store.clone(), settings);
  (store, router)
}

#[tokio::test]
async fn elapsed_timeout_is_transient() {
  let err = bounded(
    Duration::from_millis(10),
    std::future::pending::<Result<(), CoreError>>(),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::Transient(_)));
  assert!(err.is_retryable());
}

#[tokio::test]
async fn featured_serves_cache_when_store_hangs() {
  let (store, router) = stalling_setup().await;
  let a = create(&router, "a", true).await;

  let (_, fresh) = send(&router, "GET", "/featured", None).await;
  assert_eq!(fresh["source"], "fresh");

  store.stalled.store(true, Ordering::SeqCst);

  let (status, body) = send(&router, "GET", "/featured", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "cached");
  assert_eq!(body["articles"][0]["id"], a.as_str());
}

#[tokio::test]
async fn featured_is_unavailable_when_store_hangs_cold() {
  let (store, router) = stalling_setup().await;
  store.stalled.store(true, Ordering::SeqCst);

  let (status, body) = send(&router, "GET", "/featured", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "unavailable");
  assert_eq!(body["articles"], json!([]));
}

#[tokio::test]
async fn hung_writes_are_retryable_503() {
  let (store, router) = stalling_setup().await;
  let a = create(&router, "a", true).await;
  store.stalled.store(true, Ordering::SeqCst);

  let (status, body) = send(
    &router,
    "POST",
    &format!("/articles/{a}/feedback"),
    Some(json!({ "polarity": "positive" })),
  )
  .await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["retryable"], true);

  let (status, body) = send(&router, "POST", &format!("/articles/{a}/feature"), None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["retryable"], true);
}
