//! Request instrumentation.
//!
//! A [`Handler`] is any shared async function from request to response. A
//! [`Decorator`] wraps one handler into another; each of the standard
//! decorators updates exactly one instrument in [`HttpMetrics`] and leaves
//! status, headers and body bytes untouched.
//!
//! Standard order, outermost first:
//!
//! 1. `in_flight`      - `in_flight_requests`
//! 2. `counter`        - `api_requests_total{code,method}`
//! 3. `duration`       - `response_duration_seconds{handler,method}`
//! 4. `time_to_header` - `write_header_duration_seconds{handler}`
//! 5. `response_size`  - `response_size_bytes`
//!
//! `in_flight` must stay outermost so its decrement covers every inner exit
//! path. The others observe disjoint parts of the response and commute.

pub mod body;
pub mod layers;

use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use axum::Router;
use futures_util::future::BoxFuture;
use tower::ServiceExt;

use crate::obs::HttpMetrics;

pub use layers::{
    method_label, CounterLayer, DurationLayer, InFlightLayer, ResponseSizeLayer,
    TimeToFirstByteLayer,
};

/// Shared async request handler.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Turns a handler into an observed handler with identical external behavior.
pub trait Decorator: Send + Sync {
    fn name(&self) -> &'static str;
    fn wrap(&self, inner: Handler) -> Handler;
}

/// Adapt an async fn into a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request| -> BoxFuture<'static, Response> { Box::pin(f(req)) })
}

/// Use an axum router (endpoint dispatch) as the base handler.
pub fn from_router(router: Router) -> Handler {
    Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
        let router = router.clone();
        Box::pin(async move {
            match router.oneshot(req).await {
                Ok(resp) => resp,
                Err(never) => match never {},
            }
        })
    })
}

/// Serve a composed handler for every path and method.
pub fn into_router(handler: Handler) -> Router {
    Router::new().fallback(move |req: Request| {
        let handler = Arc::clone(&handler);
        async move { handler(req).await }
    })
}

/// Ordered decorator stack, outermost first.
#[derive(Default)]
pub struct Instrumentation {
    layers: Vec<Box<dyn Decorator>>,
}

impl Instrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five observation layers in the documented order.
    pub fn standard(metrics: Arc<HttpMetrics>) -> Self {
        Self::new()
            .layer(InFlightLayer::new(Arc::clone(&metrics)))
            .layer(CounterLayer::new(Arc::clone(&metrics)))
            .layer(DurationLayer::new(Arc::clone(&metrics)))
            .layer(TimeToFirstByteLayer::new(Arc::clone(&metrics)))
            .layer(ResponseSizeLayer::new(metrics))
    }

    /// Append a layer inside the ones already added.
    pub fn layer(mut self, d: impl Decorator + 'static) -> Self {
        self.layers.push(Box::new(d));
        self
    }

    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Compose: the last layer wraps `base` directly, the first one ends up outermost.
    pub fn apply(&self, base: Handler) -> Handler {
        self.layers.iter().rev().fold(base, |h, l| l.wrap(h))
    }
}
