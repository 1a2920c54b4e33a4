//! Shared application state.
//!
//! Holds the resolved config, the metric registry and the shutdown
//! coordinator. Everything is built once in `main` and cloned cheaply into
//! handlers.

use std::sync::Arc;

use echoscope_core::Result;

use crate::config::ServerConfig;
use crate::obs::HttpMetrics;
use crate::shutdown::{ShutdownCoordinator, ShutdownState};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    metrics: Arc<HttpMetrics>,
    shutdown: ShutdownCoordinator,
}

impl AppState {
    /// Build application state with a fresh metric registry.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let metrics = Arc::new(HttpMetrics::new()?);
        let shutdown = ShutdownCoordinator::new(cfg.shutdown_grace);
        Ok(Self::from_parts(cfg, metrics, shutdown))
    }

    pub fn from_parts(
        cfg: ServerConfig,
        metrics: Arc<HttpMetrics>,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics,
                shutdown,
            }),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<HttpMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn shutdown(&self) -> ShutdownCoordinator {
        self.inner.shutdown.clone()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.shutdown.state() != ShutdownState::Serving
    }
}
