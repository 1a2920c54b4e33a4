//! Top-level facade crate for echoscope.
//!
//! Re-exports the core instruments and the server library so users can depend on a single crate.

pub mod core {
    pub use echoscope_core::*;
}

pub mod server {
    pub use echoscope_server::*;
}
