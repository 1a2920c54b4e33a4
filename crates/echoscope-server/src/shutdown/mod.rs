//! Shutdown coordination.
//!
//! `Serving -> Draining -> Stopped`, with `ForcedExit` reachable from any state
//! once a first signal has been seen. The coordinator knows nothing about OS
//! signals; [`signal`] adapts SIGINT/SIGTERM into [`ShutdownCoordinator::signal`].

pub mod signal;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use echoscope_core::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Serving,
    Draining,
    Stopped,
    ForcedExit,
}

/// What the caller of [`ShutdownCoordinator::signal`] should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    BeginDrain,
    ForceExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// In-flight work finished inside the grace period.
    Drained,
    /// Grace period elapsed first; remaining work was abandoned.
    GraceExceeded,
    /// A second signal cut the drain short.
    Forced,
}

#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    state: Arc<watch::Sender<ShutdownState>>,
    grace: Duration,
}

impl ShutdownCoordinator {
    pub fn new(grace: Duration) -> Self {
        let (tx, _rx) = watch::channel(ShutdownState::Serving);
        Self {
            state: Arc::new(tx),
            grace,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Feed one termination signal. The first one starts draining, every
    /// later one forces an exit.
    pub fn signal(&self) -> SignalOutcome {
        let mut outcome = SignalOutcome::ForceExit;
        self.state.send_modify(|s| {
            if *s == ShutdownState::Serving {
                *s = ShutdownState::Draining;
                outcome = SignalOutcome::BeginDrain;
            } else {
                *s = ShutdownState::ForcedExit;
            }
        });
        outcome
    }

    /// Resolves once the state has left `Serving`.
    pub async fn wait_for_drain(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| *s != ShutdownState::Serving).await;
    }

    /// Resolves once a forced exit has been requested.
    pub async fn wait_for_force(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| *s == ShutdownState::ForcedExit).await;
    }

    /// Run `work` (the server's own drain) bounded by the grace period.
    ///
    /// Enters `Draining` if nobody signalled yet. On `Drained` and
    /// `GraceExceeded` the state becomes `Stopped`; on `Forced` it stays
    /// `ForcedExit`. An error from `work` is a shutdown failure and is returned
    /// as-is; the state is still moved to `Stopped`.
    pub async fn drain<F>(&self, work: F) -> Result<DrainOutcome>
    where
        F: Future<Output = Result<()>>,
    {
        self.state.send_if_modified(|s| {
            if *s == ShutdownState::Serving {
                *s = ShutdownState::Draining;
                true
            } else {
                false
            }
        });

        let res = tokio::select! {
            biased;
            _ = self.wait_for_force() => Ok(DrainOutcome::Forced),
            timed = tokio::time::timeout(self.grace, work) => match timed {
                Ok(Ok(())) => Ok(DrainOutcome::Drained),
                Ok(Err(e)) => Err(e),
                Err(_elapsed) => Ok(DrainOutcome::GraceExceeded),
            },
        };

        if !matches!(res, Ok(DrainOutcome::Forced)) {
            self.state.send_if_modified(|s| {
                if *s == ShutdownState::Draining {
                    *s = ShutdownState::Stopped;
                    true
                } else {
                    false
                }
            });
        }
        res
    }
}
