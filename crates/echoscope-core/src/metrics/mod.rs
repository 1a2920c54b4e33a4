//! Minimal metric instruments with Prometheus text exposition.
//!
//! Counter/gauge/histogram types with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors so the same label set always
//! maps to the same series regardless of call-site ordering. Rendering is
//! deterministic: series are emitted in label order.

mod counter;
mod gauge;
mod histogram;

use std::fmt::Write;

pub use counter::CounterVec;
pub use gauge::Gauge;
pub use histogram::{HistogramSnapshot, HistogramVec, DEFAULT_BUCKETS};

/// Flattened, sorted label set identifying one series.
pub type LabelKey = Vec<(String, String)>;

/// Content type of the text exposition format produced by the `render` methods.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

pub(crate) fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// `k1="v1",k2="v2"` (no braces).
pub(crate) fn format_labels(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Series name with optional label block.
pub(crate) fn series(name: &str, labels: &str) -> String {
    if labels.is_empty() {
        name.to_string()
    } else {
        format!("{name}{{{labels}}}")
    }
}

pub(crate) fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    if !help.is_empty() {
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    }
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Render a float the way Prometheus clients do (`+Inf`, `-Inf`, `NaN`).
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}
