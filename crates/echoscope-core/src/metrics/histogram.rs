use std::fmt::Write;
use std::time::Duration;

use dashmap::DashMap;

use super::{format_float, format_labels, label_key, series, write_header, LabelKey};
use crate::error::{EchoscopeError, Result};

/// Default latency buckets in seconds (5ms .. 10s).
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Per-series state. `counts[i]` holds observations that landed in bucket `i`
/// only; cumulative counts are computed on read.
#[derive(Debug)]
struct Cell {
    counts: Vec<u64>,
    sum: f64,
    count: u64,
}

impl Cell {
    fn new(buckets: usize) -> Self {
        Self {
            counts: vec![0; buckets],
            sum: 0.0,
            count: 0,
        }
    }

    fn snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        let mut acc = 0u64;
        let buckets = bounds
            .iter()
            .zip(&self.counts)
            .map(|(&le, &n)| {
                acc += n;
                (le, acc)
            })
            .collect();
        HistogramSnapshot {
            buckets,
            sum: self.sum,
            count: self.count,
        }
    }
}

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` in ascending bound order, `+Inf` excluded.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    /// Number of observations; also the `+Inf` bucket.
    pub count: u64,
}

impl HistogramSnapshot {
    /// Cumulative count for the `+Inf` bucket.
    pub fn inf_bucket(&self) -> u64 {
        self.count
    }
}

/// Histograms keyed by label set, sharing one bucket layout and an optional
/// set of constant labels.
#[derive(Debug)]
pub struct HistogramVec {
    bounds: Vec<f64>,
    const_labels: LabelKey,
    map: DashMap<LabelKey, Cell>,
}

impl HistogramVec {
    /// Bounds must be finite and strictly ascending.
    pub fn new(bounds: &[f64]) -> Result<Self> {
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(EchoscopeError::Config(
                "histogram bounds must be finite".into(),
            ));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(EchoscopeError::Config(
                "histogram bounds must be strictly ascending".into(),
            ));
        }
        Ok(Self {
            bounds: bounds.to_vec(),
            const_labels: Vec::new(),
            map: DashMap::new(),
        })
    }

    /// Histogram using [`DEFAULT_BUCKETS`].
    pub fn with_default_buckets() -> Self {
        Self {
            bounds: DEFAULT_BUCKETS.to_vec(),
            const_labels: Vec::new(),
            map: DashMap::new(),
        }
    }

    /// Attach labels rendered on every series (e.g. `handler="/"`).
    pub fn with_const_labels(mut self, labels: &[(&str, &str)]) -> Self {
        self.const_labels = label_key(labels);
        self
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation. The shard lock held by `entry` serializes
    /// updates to the same series.
    pub fn observe(&self, labels: &[(&str, &str)], v: f64) {
        let idx = self.bounds.partition_point(|b| *b < v);
        let n = self.bounds.len();

        let mut cell = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| Cell::new(n));
        if let Some(slot) = cell.counts.get_mut(idx) {
            *slot += 1;
        }
        cell.sum += v;
        cell.count += 1;
    }

    /// Record a duration in seconds.
    pub fn observe_duration(&self, labels: &[(&str, &str)], d: Duration) {
        self.observe(labels, d.as_secs_f64());
    }

    /// Snapshot one series, `None` if it was never observed.
    pub fn snapshot(&self, labels: &[(&str, &str)]) -> Option<HistogramSnapshot> {
        self.map
            .get(&label_key(labels))
            .map(|cell| cell.value().snapshot(&self.bounds))
    }

    /// Total observations over every series.
    pub fn total_count(&self) -> u64 {
        self.map.iter().map(|r| r.value().count).sum()
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "histogram");

        let mut rows: Vec<(LabelKey, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().snapshot(&self.bounds)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, snap) in rows {
            let mut all = self.const_labels.clone();
            all.extend(key);
            all.sort();
            let label_str = format_labels(&all);
            let prefix = if label_str.is_empty() {
                String::new()
            } else {
                format!("{label_str},")
            };

            for (le, count) in &snap.buckets {
                let _ = writeln!(
                    out,
                    "{}_bucket{{{}le=\"{}\"}} {}",
                    name,
                    prefix,
                    format_float(*le),
                    count
                );
            }
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, snap.count);

            let _ = writeln!(
                out,
                "{} {}",
                series(&format!("{name}_sum"), &label_str),
                format_float(snap.sum)
            );
            let _ = writeln!(
                out,
                "{} {}",
                series(&format!("{name}_count"), &label_str),
                snap.count
            );
        }
    }
}
