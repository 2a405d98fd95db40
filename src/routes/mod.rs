//! HTTP route handlers
//!
//! - `webhook`: the inbound processor webhook (the whole point)
//! - `health`: liveness probe and Prometheus metrics

pub mod health;
pub mod webhook;

use crate::error::ServerError;

/// 404 fallback: anything outside the webhook and probe paths.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
