//! Notification channels.
//!
//! Every channel implements [`Notifier`]: one outbound HTTP call delivering
//! a [`PaymentRecord`] in the channel's own wire shape. Channels are
//! constructed once into a static registry; whether a channel actually
//! participates in a dispatch is decided per request by its `enabled()`
//! predicate, which only checks configuration presence.
//!
//! A channel's failure is its own: `send` returns a [`DeliveryError`] and
//! the coordinator logs it, but nothing here can fail a sibling channel or
//! the inbound request.

pub mod bark;
pub mod dingtalk;
pub mod email;
pub mod telegram;
pub mod template;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RelayConfig;
use crate::record::PaymentRecord;

pub use bark::BarkNotifier;
pub use dingtalk::DingTalkNotifier;
pub use email::EmailNotifier;
pub use telegram::TelegramNotifier;

/// Delivery failure for a single channel.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid notifier configuration: {0}")]
    Config(String),
}

/// A notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Stable channel label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Whether this channel's required configuration keys are present.
    fn enabled(&self) -> bool;

    /// Deliver one record. Must fail fast on non-2xx rather than hang.
    async fn send(&self, record: &PaymentRecord) -> Result<(), DeliveryError>;
}

/// Build the channel registry. All channels are constructed; disabled ones
/// simply never pass the `enabled()` filter at dispatch time.
pub fn build_notifiers(
    config: &RelayConfig,
    http: &reqwest::Client,
    email_template: String,
) -> Vec<Arc<dyn Notifier>> {
    vec![
        Arc::new(EmailNotifier::new(
            config.email.clone(),
            http.clone(),
            email_template,
        )),
        Arc::new(TelegramNotifier::new(config.telegram.clone(), http.clone())),
        Arc::new(DingTalkNotifier::new(config.dingtalk.clone(), http.clone())),
        Arc::new(BarkNotifier::new(config.bark.clone(), http.clone())),
    ]
}

/// Map a response to `Ok` on 2xx, `DeliveryError::Status` otherwise.
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<(), DeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(DeliveryError::Status { status, body })
}
