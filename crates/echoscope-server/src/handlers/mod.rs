//! Diagnostic endpoints.
//!
//! - `/`      : echo the request back (also the catch-all)
//! - `/hello` : fixed greeting
//! - `/cpu`   : CPU facts as JSON
//! - `/mem`   : virtual memory facts as JSON
//! - `/net`   : network interface counters as JSON

pub mod echo;
pub mod host;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub use echo::echo;
pub use host::{cpu, mem, net};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("read request body failed: {0}")]
    Body(String),
    #[error("request body exceeds {0} bytes")]
    TooLarge(usize),
    #[error("host facts unavailable: {0}")]
    Host(String),
    #[error("render json failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "handler failed");
        let status = match self {
            HandlerError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{self}\n"),
        )
            .into_response()
    }
}

/// Serialize `v` and send it as `application/json`.
pub fn render_json<T: Serialize>(v: &T) -> Result<Response, HandlerError> {
    let body = serde_json::to_vec(v)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn hello() -> &'static str {
    "hello world\n"
}
