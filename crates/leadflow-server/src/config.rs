//! Server configuration.
//!
//! Sources are layered: built-in defaults, then an optional TOML file
//! (`LEADFLOW_CONFIG`, default `leadflow.toml`), then `LEADFLOW_`
//! environment variables with `__` separating nested keys, e.g.
//! `LEADFLOW_AUTH__JWT_SECRET`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use leadflow_auth::AuthConfig;
use leadflow_db::{DbConfig, SeedConfig};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "leadflow.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Return the reset code in the forgot-password response. Only for
    /// demo deployments without an e-mail channel.
    pub expose_code: bool,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self { expose_code: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub reset: ResetConfig,
    pub bootstrap: SeedConfig,
    /// Origins allowed by CORS. Empty disables cross-origin access.
    pub cors_origins: Vec<String>,
    /// Upper bound on request bodies, uploads included.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database: DbConfig::default(),
            auth: AuthConfig::default(),
            reset: ResetConfig::default(),
            bootstrap: SeedConfig::default(),
            cors_origins: vec![
                "http://localhost:5177".into(),
                "http://localhost:5178".into(),
                "http://127.0.0.1:5177".into(),
                "http://127.0.0.1:5178".into(),
            ],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from the file named by `LEADFLOW_CONFIG` (if any) and the
    /// environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("LEADFLOW_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut figment = Figment::new();
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("LEADFLOW_").split("__"));

        let config: ServerConfig = figment
            .extract()
            .context("Failed to extract configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("auth.jwt_secret must be set (LEADFLOW_AUTH__JWT_SECRET)");
        }
        if self.auth.access_token_lifetime_secs == 0 {
            bail!("auth.access_token_lifetime_secs must be positive");
        }
        if self.max_upload_bytes == 0 {
            bail!("max_upload_bytes must be positive");
        }
        Ok(())
    }
}
