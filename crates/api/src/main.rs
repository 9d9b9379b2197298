use std::sync::Arc;

use anyhow::Context;

use registrar_api::app::{build_app, build_in_memory_services, build_postgres_services};
use registrar_api::config::AppConfig;
use registrar_auth::Hs256TokenCodec;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    registrar_observability::init();

    let config = AppConfig::from_env()?;
    let codec = Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes()));

    let services = if config.use_postgres {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set when USE_POSTGRES_STORES=true")?;
        build_postgres_services(database_url, codec.clone()).await?
    } else {
        tracing::warn!("USE_POSTGRES_STORES not set; running with in-memory stores");
        build_in_memory_services(codec.clone())
    };

    let app = build_app(services, codec);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
