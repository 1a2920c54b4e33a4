//! Shutdown state machine, driven directly (no OS signals).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use tokio::time::{sleep, Instant};

use echoscope_core::error::{EchoscopeError, ErrorCode};
use echoscope_server::shutdown::signal::{handle_signal, FORCED_EXIT_CODE};
use echoscope_server::shutdown::{
    DrainOutcome, ShutdownCoordinator, ShutdownState, SignalOutcome,
};

#[test]
fn first_signal_drains_second_forces() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));
    assert_eq!(coord.state(), ShutdownState::Serving);

    assert_eq!(coord.signal(), SignalOutcome::BeginDrain);
    assert_eq!(coord.state(), ShutdownState::Draining);

    assert_eq!(coord.signal(), SignalOutcome::ForceExit);
    assert_eq!(coord.state(), ShutdownState::ForcedExit);

    assert_eq!(coord.signal(), SignalOutcome::ForceExit);
    assert_eq!(coord.state(), ShutdownState::ForcedExit);
}

#[test]
fn os_signals_map_to_drain_then_force() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));

    assert_eq!(handle_signal(&coord, "SIGTERM"), SignalOutcome::BeginDrain);
    assert_eq!(coord.state(), ShutdownState::Draining);

    assert_eq!(handle_signal(&coord, "SIGINT"), SignalOutcome::ForceExit);
    assert_eq!(coord.state(), ShutdownState::ForcedExit);
    assert_ne!(FORCED_EXIT_CODE, 0);
    assert_ne!(FORCED_EXIT_CODE, 1);
}

#[test]
fn clones_share_state() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(1));
    let other = coord.clone();
    other.signal();
    assert_eq!(coord.state(), ShutdownState::Draining);
    assert_eq!(coord.grace_period(), Duration::from_secs(1));
}

#[tokio::test]
async fn wait_for_drain_blocks_until_first_signal() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));

    let pending = tokio::time::timeout(Duration::from_millis(20), coord.wait_for_drain()).await;
    assert!(pending.is_err(), "must block while serving");

    let waiter = tokio::spawn({
        let coord = coord.clone();
        async move { coord.wait_for_drain().await }
    });
    coord.signal();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter must wake")
        .unwrap();

    // already draining: returns immediately
    coord.wait_for_drain().await;
}

#[tokio::test(start_paused = true)]
async fn idle_drain_stops_before_grace_timer() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));
    coord.signal();

    let start = Instant::now();
    let outcome = coord.drain(async { Ok(()) }).await.unwrap();

    assert_eq!(outcome, DrainOutcome::Drained);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(coord.state(), ShutdownState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn drain_finishing_inside_grace_is_clean() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));
    coord.signal();

    let start = Instant::now();
    let outcome = coord
        .drain(async {
            sleep(Duration::from_secs(3)).await;
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(outcome, DrainOutcome::Drained);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(coord.state(), ShutdownState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn grace_period_bounds_a_slow_drain() {
    // grace 2s, in-flight work needs 5s
    let coord = ShutdownCoordinator::new(Duration::from_secs(2));
    coord.signal();

    let start = Instant::now();
    let outcome = coord
        .drain(async {
            sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(outcome, DrainOutcome::GraceExceeded);
    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(2));
    assert!(waited < Duration::from_secs(5));
    assert_eq!(coord.state(), ShutdownState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn second_signal_preempts_drain() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));
    coord.signal();

    let forcer = tokio::spawn({
        let coord = coord.clone();
        async move {
            sleep(Duration::from_millis(100)).await;
            coord.signal()
        }
    });

    let start = Instant::now();
    let outcome = coord
        .drain(async {
            sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(outcome, DrainOutcome::Forced);
    assert_eq!(forcer.await.unwrap(), SignalOutcome::ForceExit);
    assert_eq!(start.elapsed(), Duration::from_millis(100));
    assert_eq!(coord.state(), ShutdownState::ForcedExit);
}

#[tokio::test]
async fn forced_before_drain_returns_immediately() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));
    coord.signal();
    coord.signal();

    let outcome = coord
        .drain(std::future::pending::<echoscope_core::Result<()>>())
        .await
        .unwrap();
    assert_eq!(outcome, DrainOutcome::Forced);
}

#[tokio::test]
async fn drain_without_signal_enters_draining() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));
    let outcome = coord.drain(async { Ok(()) }).await.unwrap();
    assert_eq!(outcome, DrainOutcome::Drained);
    assert_eq!(coord.state(), ShutdownState::Stopped);
}

#[tokio::test]
async fn close_failure_is_reported() {
    let coord = ShutdownCoordinator::new(Duration::from_secs(10));
    coord.signal();

    let err = coord
        .drain(async { Err(EchoscopeError::Shutdown("listener busy".into())) })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Shutdown);
    assert_eq!(coord.state(), ShutdownState::Stopped);
}
