//! Server config loader.
//!
//! Precedence (highest first): environment (`LISTEN_ADDR`, `SHUTDOWN_DEADLINE`),
//! the optional YAML file named by `ECHOSCOPE_CONFIG`, then built-in defaults.
//! The file is parsed strictly; bad individual values only produce a warning.

pub mod duration;
pub mod schema;

use std::fs;

use echoscope_core::error::{EchoscopeError, Result};

pub use duration::parse_duration;
pub use schema::{parse_listen_addr, FileConfig, ServerConfig, ServerSection};

pub const ENV_CONFIG_PATH: &str = "ECHOSCOPE_CONFIG";
pub const ENV_LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const ENV_SHUTDOWN_DEADLINE: &str = "SHUTDOWN_DEADLINE";

/// Load from the process environment.
pub fn load() -> Result<ServerConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using an arbitrary variable lookup.
pub fn load_with<F>(lookup: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match lookup(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
        Some(path) => load_from_file(&path)?,
        None => FileConfig::default(),
    };

    Ok(ServerConfig::resolve(
        &[
            (ENV_LISTEN_ADDR, lookup(ENV_LISTEN_ADDR)),
            ("file", file.server.listen),
        ],
        &[
            (ENV_SHUTDOWN_DEADLINE, lookup(ENV_SHUTDOWN_DEADLINE)),
            ("file", file.server.shutdown_deadline),
        ],
    ))
}

pub fn load_from_file(path: &str) -> Result<FileConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| EchoscopeError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<FileConfig> {
    if s.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(s).map_err(|e| EchoscopeError::Config(format!("invalid yaml: {e}")))
}
