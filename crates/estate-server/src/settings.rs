//! Runtime server configuration, deserialised from `config.toml` layered
//! with `ESTATE_*` environment variables.

use std::path::{Path, PathBuf};

use estate_api::ApiConfig;
use estate_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `ESTATE_PORT=8080`.
pub const ENV_PREFIX: &str = "ESTATE";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Public base URL that relative image references are joined onto.
  pub image_base_url:    String,
  /// Shared secret for verifying session tokens.
  pub session_secret:    String,
  #[serde(default = "default_page_size")]
  pub default_page_size: u32,
  #[serde(default = "max_page_size")]
  pub max_page_size:     u32,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_page_size() -> u32 { DEFAULT_PAGE_SIZE }
fn max_page_size() -> u32 { MAX_PAGE_SIZE }

impl ServerConfig {
  /// Build from an optional TOML file plus the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn api(&self) -> ApiConfig {
    ApiConfig {
      default_page_size: self.default_page_size,
      max_page_size:     self.max_page_size,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
