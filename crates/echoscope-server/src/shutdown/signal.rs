//! OS signal adapter: SIGINT / SIGTERM -> [`ShutdownCoordinator::signal`].

use tokio::task::JoinHandle;

use super::{ShutdownCoordinator, SignalOutcome};

/// Process status used when a second signal cuts the drain short.
/// Fatal startup/shutdown errors exit with 1.
pub const FORCED_EXIT_CODE: i32 = 2;

/// Spawn the listener task. The first signal starts the drain; the second
/// terminates the process immediately.
pub fn spawn_listener(coord: ShutdownCoordinator) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = listen(&coord).await {
            tracing::error!(error = %e, "failed to install signal handler");
        }
    })
}

/// Feed one received signal into the coordinator and log the transition.
/// Exiting on `ForceExit` is left to the caller.
pub fn handle_signal(coord: &ShutdownCoordinator, name: &'static str) -> SignalOutcome {
    let outcome = coord.signal();
    match outcome {
        SignalOutcome::BeginDrain => {
            tracing::info!(signal = name, "signal received, starting graceful shutdown");
        }
        SignalOutcome::ForceExit => {
            tracing::warn!(signal = name, "second signal received, exiting immediately");
        }
    }
    outcome
}

fn on_signal(coord: &ShutdownCoordinator, name: &'static str) {
    if handle_signal(coord, name) == SignalOutcome::ForceExit {
        std::process::exit(FORCED_EXIT_CODE);
    }
}

#[cfg(unix)]
async fn listen(coord: &ShutdownCoordinator) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    loop {
        let name = tokio::select! {
            Some(()) = interrupt.recv() => "SIGINT",
            Some(()) = terminate.recv() => "SIGTERM",
            else => return Ok(()),
        };
        on_signal(coord, name);
    }
}

#[cfg(not(unix))]
async fn listen(coord: &ShutdownCoordinator) -> std::io::Result<()> {
    loop {
        tokio::signal::ctrl_c().await?;
        on_signal(coord, "ctrl-c");
    }
}
