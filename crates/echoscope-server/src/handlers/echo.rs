//! Echo endpoint.
//!
//! Writes the raw request (request line, headers, body) back to the caller.
//! Query parameters:
//! - `code=N`     : respond with status `N` (ignored if not a valid status)
//! - `duration=D` : wait `D` (Go-style duration) before sending the body
//!
//! When `code` is given the status line and headers go out before the wait,
//! so time-to-first-byte and total duration differ by roughly `D`.
//!
//! Request bodies are read whole and capped at [`MAX_ECHO_BODY`]; a larger
//! body is answered with 413 instead of being echoed.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use http_body_util::{BodyExt, LengthLimitError, Limited};

use super::HandlerError;
use crate::config::parse_duration;

/// Largest request body echoed back (16 MiB).
pub const MAX_ECHO_BODY: usize = 16 * 1024 * 1024;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EchoParams {
    pub code: Option<StatusCode>,
    pub delay: Option<Duration>,
}

impl EchoParams {
    /// Only the first occurrence of each key counts; bad values are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let Some(q) = query else { return Self::default(); };
        Self {
            code: first_value(q, "code")
                .and_then(|v| v.parse::<u16>().ok())
                .and_then(|c| StatusCode::from_u16(c).ok()),
            delay: first_value(q, "duration").and_then(parse_duration),
        }
    }
}

fn first_value<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Request line, headers, blank line, body.
pub fn dump_request(parts: &Parts, body: &[u8]) -> Vec<u8> {
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut out = format!("{} {} {:?}\r\n", parts.method, target, parts.version).into_bytes();
    for (name, value) in &parts.headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

pub async fn echo(req: Request) -> Result<Response, HandlerError> {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let params = EchoParams::from_query(req.uri().query());

    let (parts, body) = req.into_parts();
    let body = Limited::new(body, MAX_ECHO_BODY)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                HandlerError::TooLarge(MAX_ECHO_BODY)
            } else {
                HandlerError::Body(e.to_string())
            }
        })?
        .to_bytes();
    let dump = dump_request(&parts, &body);

    tracing::info!(
        remote = ?remote,
        request = %String::from_utf8_lossy(&dump),
        "echo"
    );

    let content_type = [(header::CONTENT_TYPE, "text/plain; charset=utf-8")];
    match params.code {
        Some(code) => {
            let delay = params.delay;
            let chunk = futures_util::stream::once(async move {
                if let Some(d) = delay {
                    tokio::time::sleep(d).await;
                }
                Ok::<_, Infallible>(Bytes::from(dump))
            });
            Ok((code, content_type, Body::from_stream(chunk)).into_response())
        }
        None => {
            if let Some(d) = params.delay {
                tokio::time::sleep(d).await;
            }
            Ok((content_type, dump).into_response())
        }
    }
}
