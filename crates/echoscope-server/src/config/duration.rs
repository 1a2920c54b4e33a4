//! Go-style duration strings: `300ms`, `2s`, `1m30s`, `1.5h`.
//!
//! Units: `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
//! Negative values are rejected since every duration here is a timeout.
//!
//! `humantime` does the parsing. Its grammar is wider than Go's (spaces, days,
//! long unit names) and lacks fractional values, so input is first checked
//! against Go's units and fractional segments are rewritten as whole
//! nanoseconds.

use std::time::Duration;

const NANOS: [(&str, u64); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60_000_000_000),
    ("h", 3_600_000_000_000),
];

pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s == "0" {
        return Some(Duration::ZERO);
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    humantime::parse_duration(&to_humantime(s)?).ok()
}

/// Rewrite a Go duration into `humantime` syntax, `None` where Go would
/// reject it.
fn to_humantime(s: &str) -> Option<String> {
    if s.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (num, tail) = rest.split_at(num_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        if num.is_empty() {
            return None;
        }
        let (_, scale) = NANOS.iter().find(|(u, _)| *u == unit)?;

        if num.contains('.') {
            let nanos = num.parse::<f64>().ok()? * *scale as f64;
            if !nanos.is_finite() || nanos >= u64::MAX as f64 {
                return None;
            }
            out.push_str(&format!("{}ns", nanos.round() as u64));
        } else {
            out.push_str(num);
            out.push_str(if *scale == 1_000 { "us" } else { unit });
        }
        rest = tail;
    }
    Some(out)
}
