use std::fmt::Write;
use std::sync::atomic::{AtomicI64, Ordering};

use super::write_header;

/// A single unlabeled value that can go up and down.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    /// Increment by 1.
    pub fn inc(&self) {
        self.add(1);
    }
    /// Decrement by 1.
    pub fn dec(&self) {
        self.add(-1);
    }

    /// Add an arbitrary signed delta.
    pub fn add(&self, v: i64) {
        self.value.fetch_add(v, Ordering::SeqCst);
    }

    /// Current value.
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "gauge");
        let _ = writeln!(out, "{} {}", name, self.get());
    }
}
