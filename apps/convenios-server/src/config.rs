//! Layered server configuration
//!
//! Sources, highest priority last:
//! 1. Built-in defaults
//! 2. YAML file passed with `--config`
//! 3. Environment variables prefixed with `CONVENIOS_`, `__` separating
//!    sections (`CONVENIOS_AUTH__JWT_SECRET` -> `auth.jwt_secret`)

use agreements_service::{AgreementsConfig, AuthConfig, IdentityConfig};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "CONVENIOS_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
    #[serde(default)]
    pub agreements: AgreementsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Any URL sea-orm accepts (`postgres://…`, `sqlite://…?mode=rwc`)
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://convenios.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,audit=info".to_string(),
            json: false,
        }
    }
}

impl ServerConfig {
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
        }
        Self::figment(file)
            .extract()
            .context("failed to load server configuration")
    }

    pub fn auth(&self) -> Result<&AuthConfig> {
        self.auth
            .as_ref()
            .context("missing `auth` section (set CONVENIOS_AUTH__JWT_SECRET)")
    }

    pub fn identity(&self) -> Result<&IdentityConfig> {
        self.identity.as_ref().context(
            "missing `identity` section (set CONVENIOS_IDENTITY__BASE_URL and \
             CONVENIOS_IDENTITY__SERVICE_KEY)",
        )
    }
}
