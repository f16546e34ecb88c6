//! Recording Service
//!
//! Administrative front for the PBX SOAP admin API:
//! - User configuration lookup by common name, H.323 alias or E.164 number
//! - Call recording status per phone
//! - Supervisor-authorized recording toggle (shared PBX group required)

mod config;
mod error;
mod handlers;
mod lookup;
mod recording;
mod routes;
#[cfg(test)]
mod testing;
mod user_config;

use pbx_soap_sdk::{AdminService, SoapClient};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub use config::Config;
pub use error::{Error, Result};

use lookup::ConfigLookupService;
use recording::RecordingToggle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub toggle: Arc<RecordingToggle>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pbx_telemetry::init("recording-service")?;

    info!("Starting Recording Service");

    // Load configuration
    let config = Config::from_env()?;
    let bind_addr = config.bind_address()?;

    // Remote admin client; absent when no endpoint is configured
    let client = SoapClient::from_config(&config.pbx)?
        .map(|client| Arc::new(client) as Arc<dyn AdminService>);

    let lookup = ConfigLookupService::new(client);
    let toggle = Arc::new(RecordingToggle::new(
        lookup,
        config.pbx.recording.group_prefix.clone(),
    ));

    let state = AppState { toggle };

    let app = routes::create_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    info!("Recording Service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
