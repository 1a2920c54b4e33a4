//! Server loop: bind, serve until a drain is requested, then drain within the
//! grace period.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use echoscope_core::error::{EchoscopeError, Result};

use crate::app_state::AppState;
use crate::shutdown::DrainOutcome;

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the listening socket. Failure here is fatal for the process.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let bind_err = |source| EchoscopeError::Bind {
            addr: addr.to_string(),
            source,
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve `app` until the coordinator leaves `Serving`, then drain.
    ///
    /// `Drained` and `GraceExceeded` are normal outcomes. A serve failure
    /// before the drain, or a failure while closing during it, is an error.
    pub async fn run(self, app: Router, state: &AppState) -> Result<DrainOutcome> {
        let shutdown = state.shutdown();
        let drain_signal = {
            let shutdown = shutdown.clone();
            async move { shutdown.wait_for_drain().await }
        };

        let serve = axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(drain_signal);
        let mut task = tokio::spawn(async move { serve.await });
        let abort = task.abort_handle();

        tracing::info!(listen = %self.local_addr, "listening");

        tokio::select! {
            biased;
            _ = shutdown.wait_for_drain() => {}
            joined = &mut task => {
                let err = match joined {
                    Ok(Ok(())) => EchoscopeError::Serve("server exited before shutdown".into()),
                    Ok(Err(e)) => EchoscopeError::Serve(e.to_string()),
                    Err(e) => EchoscopeError::Serve(format!("server task failed: {e}")),
                };
                return Err(err);
            }
        }

        state.metrics().set_draining();
        tracing::info!(grace = ?shutdown.grace_period(), "try shutdown server gracefully...");

        let outcome = shutdown
            .drain(async move {
                match task.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(EchoscopeError::Shutdown(e.to_string())),
                    Err(e) => Err(EchoscopeError::Shutdown(format!("server task failed: {e}"))),
                }
            })
            .await?;

        match outcome {
            DrainOutcome::Drained => tracing::info!("server graceful shutdown ok"),
            DrainOutcome::GraceExceeded => {
                abort.abort();
                tracing::warn!(
                    in_flight = state.metrics().in_flight.get(),
                    "grace period exceeded, abandoning in-flight requests"
                );
            }
            DrainOutcome::Forced => {
                abort.abort();
                tracing::warn!("forced exit during drain");
            }
        }
        Ok(outcome)
    }
}
