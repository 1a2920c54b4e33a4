//! The five observation layers.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;
use tokio::time::Instant;

use super::body::{tap_first_data, tap_response};
use super::{Decorator, Handler};
use crate::obs::HttpMetrics;

/// Lower-cased method name used as the `method` label.
pub fn method_label(method: &Method) -> String {
    method.as_str().to_ascii_lowercase()
}

/// Holds one unit of `in_flight_requests` until dropped.
struct InFlightGuard {
    metrics: Arc<HttpMetrics>,
}

impl InFlightGuard {
    fn enter(metrics: Arc<HttpMetrics>) -> Self {
        metrics.in_flight.inc();
        Self { metrics }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics.in_flight.dec();
    }
}

/// Counts the request as in flight from invocation until the response body is
/// finished. The guard travels with the future and then with the body, so a
/// panic, a dropped future or an abandoned body all release it.
pub struct InFlightLayer {
    metrics: Arc<HttpMetrics>,
}

impl InFlightLayer {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Self { metrics }
    }
}

impl Decorator for InFlightLayer {
    fn name(&self) -> &'static str {
        "in_flight"
    }

    fn wrap(&self, inner: Handler) -> Handler {
        let metrics = Arc::clone(&self.metrics);
        Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            let guard = InFlightGuard::enter(Arc::clone(&metrics));
            let fut = inner(req);
            Box::pin(async move {
                let resp = fut.await;
                tap_response(resp, move |_| drop(guard))
            })
        })
    }
}

/// `api_requests_total{code, method}` once the status is known.
pub struct CounterLayer {
    metrics: Arc<HttpMetrics>,
}

impl CounterLayer {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Self { metrics }
    }
}

impl Decorator for CounterLayer {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn wrap(&self, inner: Handler) -> Handler {
        let metrics = Arc::clone(&self.metrics);
        Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            let metrics = Arc::clone(&metrics);
            let method = method_label(req.method());
            let fut = inner(req);
            Box::pin(async move {
                let resp = fut.await;
                metrics
                    .requests
                    .inc(&[("code", resp.status().as_str()), ("method", &method)]);
                resp
            })
        })
    }
}

/// `response_duration_seconds{method}`: entry until the body is finished.
pub struct DurationLayer {
    metrics: Arc<HttpMetrics>,
}

impl DurationLayer {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Self { metrics }
    }
}

impl Decorator for DurationLayer {
    fn name(&self) -> &'static str {
        "duration"
    }

    fn wrap(&self, inner: Handler) -> Handler {
        let metrics = Arc::clone(&self.metrics);
        Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            let start = Instant::now();
            let metrics = Arc::clone(&metrics);
            let method = method_label(req.method());
            let fut = inner(req);
            Box::pin(async move {
                let resp = fut.await;
                tap_response(resp, move |_| {
                    metrics
                        .response_duration
                        .observe_duration(&[("method", &method)], start.elapsed());
                })
            })
        })
    }
}

/// True when the handler set the head itself: a non-default status or any
/// header. A bare `Response::new(body)` only writes once data flows.
fn head_is_explicit(resp: &Response) -> bool {
    resp.status() != StatusCode::OK || !resp.headers().is_empty()
}

/// `write_header_duration_seconds`: entry until the handler first writes.
///
/// An explicit head counts as written when the handler returns, which is the
/// moment hyper can flush status and headers. Otherwise the first data frame
/// of the body is the first write. A response with the default status, no
/// headers and an empty body never wrote anything and is not observed.
pub struct TimeToFirstByteLayer {
    metrics: Arc<HttpMetrics>,
}

impl TimeToFirstByteLayer {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Self { metrics }
    }
}

impl Decorator for TimeToFirstByteLayer {
    fn name(&self) -> &'static str {
        "time_to_header"
    }

    fn wrap(&self, inner: Handler) -> Handler {
        let metrics = Arc::clone(&self.metrics);
        Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            let start = Instant::now();
            let metrics = Arc::clone(&metrics);
            let fut = inner(req);
            Box::pin(async move {
                let resp = fut.await;
                let observe = move || {
                    metrics
                        .write_header_duration
                        .observe_duration(&[], start.elapsed());
                };
                if head_is_explicit(&resp) {
                    observe();
                    resp
                } else {
                    tap_first_data(resp, observe)
                }
            })
        })
    }
}

/// `response_size_bytes`: body bytes, 0 for an empty body.
pub struct ResponseSizeLayer {
    metrics: Arc<HttpMetrics>,
}

impl ResponseSizeLayer {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Self { metrics }
    }
}

impl Decorator for ResponseSizeLayer {
    fn name(&self) -> &'static str {
        "response_size"
    }

    fn wrap(&self, inner: Handler) -> Handler {
        let metrics = Arc::clone(&self.metrics);
        Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            let metrics = Arc::clone(&metrics);
            let fut = inner(req);
            Box::pin(async move {
                let resp = fut.await;
                tap_response(resp, move |bytes| {
                    metrics.response_size.observe(&[], bytes as f64);
                })
            })
        })
    }
}
