//! echoscope core: metric instruments, text exposition, and the shared error type.
//!
//! This crate carries no transport or runtime dependencies so the instruments
//! can be exercised directly from tests and embedded in other servers.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Instrument mutation never fails; construction errors surface as
//! `EchoscopeError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{EchoscopeError, Result};
