//! echoscope server library entry.
//!
//! Diagnostic HTTP server: echo and host-fact endpoints behind a request
//! instrumentation stack, with signal-driven graceful shutdown. Consumed by
//! the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod instrument;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
pub mod shutdown;
