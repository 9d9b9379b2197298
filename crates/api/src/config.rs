//! Environment-derived runtime configuration.

use anyhow::{Context, bail};

/// Runtime configuration for the API binary.
///
/// The signing secret is **required**: startup fails closed rather than
/// falling back to a well-known default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub use_postgres: bool,
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .context("JWT_SECRET must be set; refusing to start without a signing secret")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET is empty; refusing to start without a signing secret");
        }

        let use_postgres = std::env::var("USE_POSTGRES_STORES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let database_url = std::env::var("DATABASE_URL").ok();
        if use_postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when USE_POSTGRES_STORES=true");
        }

        let bind_addr =
            std::env::var("REGISTRAR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            bind_addr,
            jwt_secret,
            use_postgres,
            database_url,
        })
    }
}
