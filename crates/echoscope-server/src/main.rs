//! echoscope server binary.
//!
//! - Config from `ECHOSCOPE_CONFIG` (YAML) plus `LISTEN_ADDR` / `SHUTDOWN_DEADLINE`
//! - First SIGINT/SIGTERM drains, second one exits immediately
//! - Exit status: 0 after a drain, 1 on fatal errors, 2 on forced exit

use tracing_subscriber::{fmt, EnvFilter};

use echoscope_core::Result;
use echoscope_server::shutdown::{self, signal::FORCED_EXIT_CODE, DrainOutcome};
use echoscope_server::{app_state::AppState, config, router, server::Server};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(DrainOutcome::Forced) => std::process::exit(FORCED_EXIT_CODE),
        Ok(_) => {}
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "fatal");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<DrainOutcome> {
    let cfg = config::load()?;
    let state = AppState::new(cfg)?;
    shutdown::signal::spawn_listener(state.shutdown());

    let server = Server::bind(state.cfg().listen).await?;
    let app = router::build_app(state.clone());
    server.run(app, &state).await
}
