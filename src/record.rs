//! Canonical payment record and the normalization that produces it.
//!
//! Normalization is total: every field resolves through a fixed priority
//! chain of candidate locations inside `data.object` and falls back to a
//! documented default, so no upstream payload shape can fail it. The chains
//! are data-described (`&[&str]` dotted paths walked by one resolver), which
//! lets the same code tolerate checkout-session, payment-intent and invoice
//! payloads; supporting a new shape means adding a path, not a branch.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::event::RawEvent;

const EMAIL_PATHS: &[&str] = &[
    "customer_details.email",
    "customer_email",
    "receipt_email",
    "billing_details.email",
];

const ORDER_NO_PATHS: &[&str] = &[
    "metadata.order_no",
    "client_reference_id",
    "payment_intent",
    "number",
    "id",
];

const AMOUNT_PATHS: &[&str] = &["amount_total", "amount_received", "amount_paid", "amount"];

const PRODUCT_PATHS: &[&str] = &["metadata.product_name", "metadata.product", "description"];

const METHOD_PATHS: &[&str] = &[
    "payment_method_types.0",
    "payment_method_details.type",
    "metadata.payment_method",
];

/// The channel-agnostic payment record every notifier consumes.
///
/// Immutable once built and shared read-only across all concurrent notifier
/// tasks. `amount_readable` always divides minor units by 100 and prints two
/// decimals; zero-decimal currencies are knowingly misformatted, a
/// documented simplification rather than a per-currency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub event_type: String,
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub currency: String,
    pub amount_minor: i64,
    pub amount_readable: String,
    pub email: Option<String>,
    pub order_no: String,
    pub product_name: String,
    pub quantity: i64,
    pub payment_method: String,
    pub customer_id: Option<String>,
}

/// Build a [`PaymentRecord`] from a raw event.
///
/// Pure: the receipt instant is a parameter (used only when the event
/// carries no `created` timestamp), so the same inputs always yield the
/// same record.
pub fn normalize(event: &RawEvent, received_at: DateTime<Utc>) -> PaymentRecord {
    let object = &event.data.object;

    let created_at = event
        .created
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(received_at);

    let currency = first_string(object, &["currency"])
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| "USD".to_string());

    let amount_minor = first_integer(object, AMOUNT_PATHS).unwrap_or(0);
    let amount_readable = format!("{} {:.2}", currency, amount_minor as f64 / 100.0);

    let order_no =
        first_string(object, ORDER_NO_PATHS).unwrap_or_else(|| event.id.clone());

    let quantity = match first_integer(object, &["metadata.quantity"]) {
        Some(n) if n > 0 => n,
        _ => 1,
    };

    PaymentRecord {
        event_type: event.event_type.clone(),
        id: event.id.clone(),
        created_at,
        currency,
        amount_minor,
        amount_readable,
        email: first_string(object, EMAIL_PATHS),
        order_no,
        product_name: first_string(object, PRODUCT_PATHS)
            .unwrap_or_else(|| "payment".to_string()),
        quantity,
        payment_method: first_string(object, METHOD_PATHS)
            .unwrap_or_else(|| "processor".to_string()),
        customer_id: first_string(object, &["customer"]),
    }
}

/// Walk a dotted path: objects by key, arrays by numeric segment.
fn lookup<'a>(object: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(object, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// First candidate that is a non-empty string.
fn first_string(object: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match lookup(object, path) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// First candidate that is an integer, or a string parseable as one.
fn first_integer(object: &Value, paths: &[&str]) -> Option<i64> {
    paths.iter().find_map(|path| match lookup(object, path) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    fn receipt_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_123, 0).unwrap()
    }

    #[test]
    fn payment_intent_shape_resolves() {
        let event = event(json!({
            "type": "payment_intent.succeeded",
            "id": "evt_1",
            "created": 1_700_000_000,
            "data": { "object": {
                "id": "pi_1",
                "amount": 1999,
                "amount_received": 1999,
                "currency": "usd",
                "receipt_email": "buyer@example.com",
                "customer": "cus_9",
                "payment_method_types": ["card"]
            }}
        }));

        let record = normalize(&event, receipt_time());
        assert_eq!(record.amount_minor, 1999);
        assert_eq!(record.amount_readable, "USD 19.99");
        assert_eq!(record.order_no, "pi_1");
        assert_eq!(record.email.as_deref(), Some("buyer@example.com"));
        assert_eq!(record.payment_method, "card");
        assert_eq!(record.customer_id.as_deref(), Some("cus_9"));
        assert_eq!(record.created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn checkout_session_shape_resolves() {
        let event = event(json!({
            "type": "checkout.session.completed",
            "id": "evt_2",
            "data": { "object": {
                "id": "cs_1",
                "amount_total": 5000,
                "currency": "eur",
                "client_reference_id": "order-42",
                "customer_details": { "email": "cart@example.com" },
                "metadata": { "product_name": "Pro plan", "quantity": "3" }
            }}
        }));

        let record = normalize(&event, receipt_time());
        assert_eq!(record.amount_readable, "EUR 50.00");
        assert_eq!(record.order_no, "order-42");
        assert_eq!(record.email.as_deref(), Some("cart@example.com"));
        assert_eq!(record.product_name, "Pro plan");
        assert_eq!(record.quantity, 3);
        // No `created` on the envelope: receipt time wins.
        assert_eq!(record.created_at, receipt_time());
    }

    #[test]
    fn invoice_shape_resolves() {
        let event = event(json!({
            "type": "invoice.paid",
            "id": "evt_3",
            "data": { "object": {
                "id": "in_1",
                "number": "INV-0007",
                "amount_paid": 1200,
                "currency": "gbp",
                "customer_email": "billing@example.com",
                "description": "Monthly subscription"
            }}
        }));

        let record = normalize(&event, receipt_time());
        assert_eq!(record.order_no, "INV-0007");
        assert_eq!(record.amount_readable, "GBP 12.00");
        assert_eq!(record.product_name, "Monthly subscription");
        assert_eq!(record.email.as_deref(), Some("billing@example.com"));
    }

    #[test]
    fn missing_object_takes_every_default() {
        let event = event(json!({ "type": "payment_intent.succeeded", "id": "evt_4" }));

        let record = normalize(&event, receipt_time());
        assert_eq!(record.amount_minor, 0);
        assert_eq!(record.currency, "USD");
        assert_eq!(record.amount_readable, "USD 0.00");
        assert_eq!(record.email, None);
        assert_eq!(record.order_no, "evt_4");
        assert_eq!(record.product_name, "payment");
        assert_eq!(record.quantity, 1);
        assert_eq!(record.payment_method, "processor");
        assert_eq!(record.customer_id, None);
    }

    #[test]
    fn order_no_falls_back_to_envelope_id_when_object_has_none() {
        let event = event(json!({
            "type": "payment_intent.succeeded",
            "id": "evt_5",
            "data": { "object": { "amount": 100 } }
        }));
        assert_eq!(normalize(&event, receipt_time()).order_no, "evt_5");
    }

    #[test]
    fn non_positive_or_unparsable_quantity_becomes_one() {
        for quantity in [json!("0"), json!("-2"), json!("many"), json!(0)] {
            let event = event(json!({
                "type": "invoice.paid",
                "id": "evt_6",
                "data": { "object": { "metadata": { "quantity": quantity } } }
            }));
            assert_eq!(normalize(&event, receipt_time()).quantity, 1);
        }
    }

    #[test]
    fn empty_string_candidates_are_skipped() {
        let event = event(json!({
            "type": "invoice.paid",
            "id": "evt_7",
            "data": { "object": {
                "customer_email": "",
                "receipt_email": "real@example.com"
            }}
        }));
        assert_eq!(
            normalize(&event, receipt_time()).email.as_deref(),
            Some("real@example.com")
        );
    }

    #[test]
    fn normalize_is_pure() {
        let event = event(json!({
            "type": "checkout.session.completed",
            "id": "evt_8",
            "created": 1_700_000_000,
            "data": { "object": { "amount_total": 777, "currency": "usd" } }
        }));
        let at = receipt_time();
        assert_eq!(normalize(&event, at), normalize(&event, at));
    }

    #[test]
    fn amount_formatting_always_assumes_two_decimals() {
        // Zero-decimal currencies get the same /100 treatment on purpose.
        let event = event(json!({
            "type": "payment_intent.succeeded",
            "id": "evt_9",
            "data": { "object": { "amount": 500, "currency": "jpy" } }
        }));
        assert_eq!(normalize(&event, receipt_time()).amount_readable, "JPY 5.00");
    }
}
