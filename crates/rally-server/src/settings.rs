//! Server configuration: an optional TOML file layered under `RALLY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use rally_api::{AdminCredentials, ApiSettings};
use rally_core::store::CapacityPolicy;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Reject joins once an event reaches `totalSlots`.
  #[serde(default)]
  pub enforce_capacity:    bool,
  pub admin_username:      Option<String>,
  /// argon2 PHC string; generate with `rally --hash-password`.
  pub admin_password_hash: Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("rally.db") }

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("RALLY").try_parsing(true)),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~/` expanded to the home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn api_settings(&self) -> anyhow::Result<ApiSettings> {
    let admin = match (&self.admin_username, &self.admin_password_hash) {
      (Some(username), Some(password_hash)) => Some(AdminCredentials {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      }),
      (None, None) => None,
      _ => bail!("admin_username and admin_password_hash must be set together"),
    };

    let capacity = if self.enforce_capacity {
      CapacityPolicy::Enforced
    } else {
      CapacityPolicy::Advisory
    };

    Ok(ApiSettings { capacity, admin })
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
