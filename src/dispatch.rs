//! Concurrent fan-out of one record to every enabled channel.
//!
//! The join is settle-all: every enabled channel's `send` runs concurrently
//! over the same shared read-only record, every outcome is awaited, and
//! failures are collected rather than propagated. Nothing here can cancel a
//! sibling delivery or fail the inbound request.

use std::sync::Arc;

use futures::future::join_all;
use metrics::counter;

use crate::notify::Notifier;
use crate::record::PaymentRecord;

/// Per-dispatch outcome summary. Failures carry the channel label and the
/// rendered error; the caller has already decided they are not its problem.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<(&'static str, String)>,
}

impl DispatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Send `record` through every enabled channel concurrently and wait for all
/// of them to settle. Zero enabled channels completes immediately.
pub async fn dispatch(notifiers: &[Arc<dyn Notifier>], record: &PaymentRecord) -> DispatchReport {
    let enabled: Vec<_> = notifiers.iter().filter(|n| n.enabled()).collect();

    let outcomes = join_all(enabled.iter().map(|notifier| async move {
        let result = notifier.send(record).await;
        (notifier.name(), result)
    }))
    .await;

    let mut report = DispatchReport {
        attempted: outcomes.len(),
        ..Default::default()
    };

    for (channel, outcome) in outcomes {
        match outcome {
            Ok(()) => {
                counter!("relay_deliveries_total", "channel" => channel).increment(1);
                tracing::debug!(channel, order_no = %record.order_no, "notification delivered");
                report.delivered += 1;
            }
            Err(err) => {
                counter!("relay_delivery_failures_total", "channel" => channel).increment(1);
                tracing::error!(
                    channel,
                    order_no = %record.order_no,
                    error = %err,
                    "notification delivery failed"
                );
                report.failures.push((channel, err.to_string()));
            }
        }
    }

    report
}
