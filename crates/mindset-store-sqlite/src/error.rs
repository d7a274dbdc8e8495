//! Error type for `mindset-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain-level failure (not found, not eligible, ...).
  #[error(transparent)]
  Core(#[from] mindset_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value that does not decode into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Domain errors raised inside a connection closure travel out as
/// `tokio_rusqlite::Error::Other` and are unwrapped here.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
        Ok(e) => *e,
        Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
      },
      e => Error::Database(e),
    }
  }
}

/// Wrap a domain error so it can be returned from inside a connection
/// closure.
pub(crate) fn reject(e: mindset_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(Error::Core(e)))
}

fn is_transient(e: &tokio_rusqlite::Error) -> bool {
  match e {
    tokio_rusqlite::Error::ConnectionClosed => true,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _)) => {
      matches!(f.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    }
    _ => false,
  }
}

impl From<Error> for mindset_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e,
      Error::Database(db) if is_transient(&db) => {
        mindset_core::Error::Transient(db.to_string())
      }
      other => mindset_core::Error::Store(Box::new(other)),
    }
  }
}
