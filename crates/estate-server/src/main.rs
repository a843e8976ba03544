//! estate-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the listing API over HTTP.
//!
//! # Local session tokens
//!
//! Identity is issued by another service. To mint a token for manual
//! testing with the configured `session_secret`:
//!
//! ```
//! cargo run -p estate-server -- --issue-token <USER_ID>
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use estate_api::{ApiState, SessionKeys};
use estate_core::image::BaseUrlResolver;
use estate_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Estate listing API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print a session token for USER_ID and exit.
  #[arg(long, value_name = "USER_ID")]
  issue_token: Option<String>,
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

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;
  let sessions =
    SessionKeys::new(&server_cfg.session_secret).context("invalid session secret")?;

  // Helper mode: mint a token and exit.
  if let Some(user_id) = cli.issue_token {
    println!("{}", sessions.issue(&user_id));
    return Ok(());
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let state = ApiState {
    store:    Arc::new(store),
    images:   Arc::new(BaseUrlResolver::new(server_cfg.image_base_url.as_str())),
    sessions: Arc::new(sessions),
    config:   Arc::new(server_cfg.api()),
  };

  let app = estate_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
