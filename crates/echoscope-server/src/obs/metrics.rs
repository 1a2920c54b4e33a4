//! Process-wide HTTP metric registry.
//!
//! Built once at startup and shared by `Arc` between the instrumentation
//! layers (writers) and the `/metrics` endpoint (reader). Instruments live for
//! the whole process; there is no teardown.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use echoscope_core::metrics::{CounterVec, Gauge, HistogramVec, DEFAULT_BUCKETS};
use echoscope_core::Result;

pub const IN_FLIGHT: &str = "in_flight_requests";
pub const REQUESTS_TOTAL: &str = "api_requests_total";
pub const RESPONSE_DURATION: &str = "response_duration_seconds";
pub const WRITE_HEADER_DURATION: &str = "write_header_duration_seconds";
pub const RESPONSE_SIZE: &str = "response_size_bytes";

pub const RESPONSE_DURATION_BUCKETS: [f64; 11] = DEFAULT_BUCKETS;
pub const RESPONSE_SIZE_BUCKETS: [f64; 4] = [200.0, 500.0, 900.0, 1500.0];

/// Value of the constant `handler` label on the latency histograms.
pub const HANDLER_LABEL: &str = "/";

#[derive(Debug)]
pub struct HttpMetrics {
    /// Requests currently inside the wrapped handler.
    pub in_flight: Gauge,
    /// `{code, method}`.
    pub requests: CounterVec,
    /// `{handler, method}`, seconds until the response body is finished.
    pub response_duration: HistogramVec,
    /// `{handler}`, seconds until the response head is produced.
    pub write_header_duration: HistogramVec,
    /// Body bytes per response.
    pub response_size: HistogramVec,
    draining: AtomicBool,
}

impl HttpMetrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            in_flight: Gauge::default(),
            requests: CounterVec::default(),
            response_duration: HistogramVec::new(&RESPONSE_DURATION_BUCKETS)?
                .with_const_labels(&[("handler", HANDLER_LABEL)]),
            write_header_duration: HistogramVec::with_default_buckets()
                .with_const_labels(&[("handler", HANDLER_LABEL)]),
            response_size: HistogramVec::new(&RESPONSE_SIZE_BUCKETS)?,
            draining: AtomicBool::new(false),
        })
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Render all registered metrics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.in_flight.render(
            IN_FLIGHT,
            "A gauge of requests currently being served by the wrapped handler.",
            &mut out,
        );
        self.requests.render(
            REQUESTS_TOTAL,
            "A counter for requests to the wrapped handler.",
            &mut out,
        );
        self.response_duration.render(
            RESPONSE_DURATION,
            "A histogram of request latencies.",
            &mut out,
        );
        self.write_header_duration.render(
            WRITE_HEADER_DURATION,
            "A histogram of time to first write latencies.",
            &mut out,
        );
        self.response_size.render(
            RESPONSE_SIZE,
            "A histogram of response sizes for requests.",
            &mut out,
        );

        let _ = writeln!(
            out,
            "# TYPE echoscope_draining gauge\nechoscope_draining {}",
            if self.is_draining() { 1 } else { 0 }
        );
        out
    }
}
