//! Host facts via `sysinfo`. Collection is blocking, so it runs on the
//! blocking pool.

use axum::response::Response;
use serde::Serialize;
use sysinfo::{Networks, System};

use super::{render_json, HandlerError};

#[derive(Debug, Clone, Serialize)]
pub struct CpuInfo {
    pub cpu: usize,
    pub name: String,
    pub vendor_id: String,
    pub model_name: String,
    pub mhz: u64,
    pub usage_percent: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
    pub swap_total: u64,
    pub swap_used: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetInfo {
    pub name: String,
    pub bytes_recv: u64,
    pub bytes_sent: u64,
    pub packets_recv: u64,
    pub packets_sent: u64,
    pub errors_in: u64,
    pub errors_out: u64,
}

pub fn gather_cpus() -> Vec<CpuInfo> {
    let mut sys = System::new();
    sys.refresh_cpu();
    sys.cpus()
        .iter()
        .enumerate()
        .map(|(i, c)| CpuInfo {
            cpu: i,
            name: c.name().to_string(),
            vendor_id: c.vendor_id().to_string(),
            model_name: c.brand().to_string(),
            mhz: c.frequency(),
            usage_percent: c.cpu_usage(),
        })
        .collect()
}

pub fn gather_mem() -> MemInfo {
    let mut sys = System::new();
    sys.refresh_memory();

    let total = sys.total_memory();
    let used = sys.used_memory();
    let used_percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    MemInfo {
        total,
        available: sys.available_memory(),
        used,
        free: sys.free_memory(),
        used_percent,
        swap_total: sys.total_swap(),
        swap_used: sys.used_swap(),
    }
}

pub fn gather_net() -> Vec<NetInfo> {
    let networks = Networks::new_with_refreshed_list();
    let mut out: Vec<NetInfo> = networks
        .list()
        .iter()
        .map(|(name, data)| NetInfo {
            name: name.clone(),
            bytes_recv: data.total_received(),
            bytes_sent: data.total_transmitted(),
            packets_recv: data.total_packets_received(),
            packets_sent: data.total_packets_transmitted(),
            errors_in: data.total_errors_on_received(),
            errors_out: data.total_errors_on_transmitted(),
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

async fn blocking<T, F>(f: F) -> Result<T, HandlerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HandlerError::Host(e.to_string()))
}

pub async fn cpu() -> Result<Response, HandlerError> {
    let cpus = blocking(gather_cpus).await?;
    if cpus.is_empty() {
        return Err(HandlerError::Host("no cpu information".into()));
    }
    render_json(&cpus)
}

pub async fn mem() -> Result<Response, HandlerError> {
    render_json(&blocking(gather_mem).await?)
}

pub async fn net() -> Result<Response, HandlerError> {
    render_json(&blocking(gather_net).await?)
}
