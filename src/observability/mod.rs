//! Observability module providing structured logging.
//!
//! Request-level spans come from `tower_http::trace::TraceLayer` and the
//! `#[tracing::instrument]` attributes on handlers and services; this module
//! only installs the global subscriber.

mod tracing_init;

pub use tracing_init::*;
