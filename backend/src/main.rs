//! Registrar entry-point: loads settings, wires adapters and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use registrar::inbound::http::health::HealthState;
use registrar::inbound::http::session_config::{BuildMode, session_settings_from_env};
use registrar::settings::RegistrarSettings;
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings =
        RegistrarSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    let bind_addr = settings
        .bind_address()
        .wrap_err("invalid REGISTRAR_BIND_ADDRESS")?;

    let config = ServerConfig::new(session, bind_addr);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::prometheus()?);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config, &settings)
        .await
        .wrap_err("failed to start server")?;
    info!(%bind_addr, in_memory = settings.database_url().is_none(), "registrar listening");
    server.await.wrap_err("server terminated abnormally")
}
