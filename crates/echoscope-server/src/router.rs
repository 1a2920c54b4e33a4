//! Axum router wiring.
//!
//! `build_router` is plain path dispatch; `build_app` puts the whole thing,
//! `/metrics` included, behind the instrumentation stack.

use axum::{
    routing::{any, get},
    Router,
};

use crate::instrument::{self, Instrumentation};
use crate::{app_state::AppState, handlers, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::echo))
        .route("/hello", any(handlers::hello))
        .route("/cpu", any(handlers::cpu))
        .route("/mem", any(handlers::mem))
        .route("/net", any(handlers::net))
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .fallback(handlers::echo)
        .with_state(state)
}

pub fn build_app(state: AppState) -> Router {
    let stack = Instrumentation::standard(state.metrics());
    let handler = stack.apply(instrument::from_router(build_router(state)));
    instrument::into_router(handler)
}
