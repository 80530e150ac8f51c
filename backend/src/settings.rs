//! Process settings loaded via OrthoConfig.
//!
//! Values come from `REGISTRAR_*` environment variables, CLI flags or a
//! configuration file. Accessors resolve the defaults.

use std::net::{AddrParseError, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_LOGIN_PASSWORD: &str = "password";

/// Settings controlling the registrar server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRAR")]
pub struct RegistrarSettings {
    /// Socket address the HTTP server binds to.
    pub bind_address: Option<String>,
    /// PostgreSQL connection string. Without one the server runs on the
    /// in-memory adapters.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Upsert the fixture accounts at startup.
    #[ortho_config(default = false)]
    pub seed_accounts: bool,
    /// Shared development password accepted for every account.
    pub login_password: Option<String>,
}

impl RegistrarSettings {
    /// Parse the configured bind address.
    pub fn bind_address(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_address
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDRESS)
            .parse()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|max| *max > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations
    }

    /// Whether fixture accounts should be loaded.
    ///
    /// The in-memory adapters always start with them.
    pub fn seed_accounts(&self) -> bool {
        self.seed_accounts || self.database_url().is_none()
    }

    pub fn login_password(&self) -> &str {
        self.login_password
            .as_deref()
            .unwrap_or(DEFAULT_LOGIN_PASSWORD)
    }
}
