//! In-process metrics for the HTTP surface.
//!
//! Instruments come from `echoscope_core::metrics`; this module fixes their
//! names, label sets and bucket layouts, and renders them for `/metrics`.

pub mod metrics;

pub use metrics::HttpMetrics;
