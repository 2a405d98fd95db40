//! DingTalk robot channel.
//!
//! The robot endpoint requires each call's URL to carry a signature:
//! HMAC-SHA256 keyed by the channel secret over `"{timestamp_ms}\n{secret}"`,
//! base64-encoded, sent alongside the millisecond timestamp as query
//! parameters. The timestamp is taken fresh at call time; the receiving
//! robot enforces its own freshness window on it, so reusing the inbound
//! event's timestamp would break deliveries for replayed-late events.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::config::DingTalkConfig;
use crate::notify::{expect_success, DeliveryError, Notifier};
use crate::record::PaymentRecord;

type HmacSha256 = Hmac<Sha256>;

const ROBOT_URL: &str = "https://oapi.dingtalk.com/robot/send";

pub struct DingTalkNotifier {
    config: DingTalkConfig,
    http: reqwest::Client,
}

impl DingTalkNotifier {
    pub fn new(config: DingTalkConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Base64 signature over `"{timestamp_ms}\n{secret}"`.
    fn sign(secret: &str, timestamp_ms: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(format!("{timestamp_ms}\n{secret}").as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    fn markdown(record: &PaymentRecord) -> String {
        format!(
            "### Payment received\n\n- Product: {} x{}\n- Order: {}\n- Total: **{}**\n- Paid with: {}\n",
            record.product_name,
            record.quantity,
            record.order_no,
            record.amount_readable,
            record.payment_method,
        )
    }
}

#[async_trait]
impl Notifier for DingTalkNotifier {
    fn name(&self) -> &'static str {
        "dingtalk"
    }

    fn enabled(&self) -> bool {
        self.config.is_enabled()
    }

    async fn send(&self, record: &PaymentRecord) -> Result<(), DeliveryError> {
        let (Some(access_token), Some(secret)) = (
            self.config.access_token.as_deref(),
            self.config.secret.as_deref(),
        ) else {
            return Err(DeliveryError::Config(
                "dingtalk channel requires access_token and secret".into(),
            ));
        };

        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let timestamp = timestamp_ms.to_string();
        let sign = Self::sign(secret, timestamp_ms);

        let payload = json!({
            "msgtype": "markdown",
            "markdown": {
                "title": "Payment received",
                "text": Self::markdown(record),
            }
        });

        let response = self
            .http
            .post(ROBOT_URL)
            .query(&[
                ("access_token", access_token),
                ("timestamp", timestamp.as_str()),
                ("sign", sign.as_str()),
            ])
            .json(&payload)
            .send()
            .await?;

        expect_success(response).await
    }
}
