//! Restores or opens a session against a live server, renews it once,
//! then signs out.
//!
//! ```text
//! LATCHKEY_BASE_URL=http://localhost:8000/api/ \
//! LATCHKEY_USERNAME=ada LATCHKEY_PASSWORD=... \
//! RUST_LOG=latchkey=debug,info cargo run -p session-probe
//! ```

use std::sync::Arc;

use latchkey::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let mut config = GatewayConfig::default();
    if let Ok(base_url) = std::env::var("LATCHKEY_BASE_URL") {
        config.base_url = base_url;
    }
    info!(base_url = %config.base_url, "session probe starting");

    let client = Arc::new(ApiClient::new(config)?);
    let gateway = HttpAuthGateway::new(Arc::clone(&client));
    let session = SessionController::over_http(gateway, TokioTimer, SessionConfig::default())?;

    if session.bootstrap().await {
        info!("restored existing session");
    } else {
        let (Ok(username), Ok(password)) = (
            std::env::var("LATCHKEY_USERNAME"),
            std::env::var("LATCHKEY_PASSWORD"),
        ) else {
            warn!("no session to restore and LATCHKEY_USERNAME/LATCHKEY_PASSWORD not set");
            return Ok(());
        };
        session.login(&LoginRequest::new(username, password)).await?;
    }

    if let Some(user) = session.user() {
        info!(user_id = %user.id, username = %user.username, role = %user.role, "signed in");
    }

    match session.refresh_now().await {
        Ok(()) => info!(state = %session.state(), "manual renewal succeeded"),
        Err(error) => warn!(error = %error, "manual renewal failed"),
    }

    session.logout().await;
    session.shutdown();
    info!(state = %session.state(), "done");
    Ok(())
}
