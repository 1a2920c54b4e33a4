use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;

use super::duration::parse_duration;

/// On-disk config (optional). Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Listening address, `host:port` or Go-style `:port`.
    pub listen: Option<String>,
    /// Drain grace period as a duration string (`10s`).
    pub shutdown_deadline: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

impl ServerConfig {
    /// Merge file values and overrides (highest precedence first in each slice).
    /// Invalid values fall back to the next candidate, and finally to the default.
    pub fn resolve(listen: &[(&str, Option<String>)], grace: &[(&str, Option<String>)]) -> Self {
        let listen = pick(listen, "listen", parse_listen_addr).unwrap_or_else(default_listen);
        let shutdown_grace =
            pick(grace, "shutdown_deadline", parse_duration).unwrap_or_else(default_shutdown_grace);
        Self { listen, shutdown_grace }
    }
}

fn pick<T>(
    candidates: &[(&str, Option<String>)],
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    for (source, raw) in candidates {
        let Some(raw) = raw.as_deref().filter(|s| !s.trim().is_empty()) else { continue; };
        match parse(raw) {
            Some(v) => return Some(v),
            None => {
                tracing::warn!(%source, %field, value = %raw, "invalid config value, ignoring");
            }
        }
    }
    None
}

/// Accepts `ip:port`, `[v6]:port`, `localhost:port` and Go-style `:port`.
pub fn parse_listen_addr(s: &str) -> Option<SocketAddr> {
    let s = s.trim();
    if let Some(port) = s.strip_prefix(':') {
        let port: u16 = port.parse().ok()?;
        return Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }
    if let Some(port) = s.strip_prefix("localhost:") {
        let port: u16 = port.parse().ok()?;
        return Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    }
    s.parse().ok()
}

fn default_listen() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080)
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(10)
}
