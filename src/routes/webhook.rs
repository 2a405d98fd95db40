//! The inbound webhook: verify, filter, normalize, fan out.
//!
//! Per-request state machine:
//! Received → Verifying → (Rejected | Filtering) → (Ignored | Normalizing)
//! → Dispatching → Completed. The caller only ever sees 400 (rejected) or
//! 200 (everything else); downstream delivery failures are an operator
//! concern, visible in logs and metrics, never in the response.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::dispatch::dispatch;
use crate::error::{ServerError, ServerResult};
use crate::event::RawEvent;
use crate::record::normalize;
use crate::signature;
use crate::state::RelayState;

/// Header the processor uses to carry the authenticity tag.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Handle `POST /stripe-webhook`.
///
/// Verification runs against the raw body bytes before any parsing; the
/// body is only decoded once the tag checks out.
pub async fn receive(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let stripe = &state.config.stripe;
    let now = chrono::Utc::now();

    if let Err(err) = signature::verify(
        header,
        &body,
        &stripe.webhook_secret,
        stripe.tolerance_secs,
        now.timestamp(),
    ) {
        tracing::warn!(error = %err, "webhook rejected");
        return Err(ServerError::Authentication(err));
    }

    let event: RawEvent = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("unparsable event payload: {e}")))?;

    if !event.is_accepted() {
        tracing::info!(event_type = %event.event_type, event_id = %event.id, "event ignored");
        return Ok(Json(json!({ "status": "ignored" })));
    }

    let record = normalize(&event, now);
    tracing::info!(
        event_type = %record.event_type,
        order_no = %record.order_no,
        amount = %record.amount_readable,
        "event accepted"
    );

    let report = dispatch(&state.notifiers, &record).await;
    tracing::info!(
        attempted = report.attempted,
        delivered = report.delivered,
        failed = report.failed(),
        order_no = %record.order_no,
        "dispatch completed"
    );

    Ok(Json(json!({
        "status": "ok",
        "dispatched": report.attempted,
        "delivered": report.delivered,
    })))
}
