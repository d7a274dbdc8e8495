//! AIMindset server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), overlays any
//! `MINDSET_*` environment variables, opens the SQLite store and serves the
//! JSON API under `/api`.
//!
//! ```sh
//! cargo run -p mindset-server -- --config config.toml serve
//! cargo run -p mindset-server -- resync
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mindset_core::store::BlogStore;
use mindset_server::ServerConfig;
use mindset_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "AIMindset featured-article server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
  /// Serve the HTTP API (default).
  #[default]
  Serve,
  /// Recompute every article's counters from the detail rows, print the
  /// repairs as JSON and exit.
  Resync,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg: ServerConfig = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("MINDSET")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let settings = server_cfg.settings().context("invalid configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or_default() {
    Command::Resync => {
      let repairs = store.resync_all().await.context("resync failed")?;
      tracing::info!(repaired = repairs.len(), "resync complete");
      println!("{}", serde_json::to_string_pretty(&repairs)?);
    }
    Command::Serve => {
      let app = mindset_server::app(Arc::new(store.clone()), settings);
      let address = server_cfg.address();

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
      tracing::info!("shutting down");
    }
  }

  store.close().await.context("failed to close store")?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
