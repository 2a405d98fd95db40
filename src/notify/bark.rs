//! Bark push channel: one device key, one JSON POST.

use async_trait::async_trait;
use serde_json::json;

use crate::config::BarkConfig;
use crate::notify::{expect_success, DeliveryError, Notifier};
use crate::record::PaymentRecord;

pub struct BarkNotifier {
    config: BarkConfig,
    http: reqwest::Client,
}

impl BarkNotifier {
    pub fn new(config: BarkConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl Notifier for BarkNotifier {
    fn name(&self) -> &'static str {
        "bark"
    }

    fn enabled(&self) -> bool {
        self.config.is_enabled()
    }

    async fn send(&self, record: &PaymentRecord) -> Result<(), DeliveryError> {
        let Some(device_key) = self.config.device_key.as_deref() else {
            return Err(DeliveryError::Config(
                "bark channel requires device_key".into(),
            ));
        };

        let url = format!("{}/push", self.config.base_url.trim_end_matches('/'));
        let payload = json!({
            "device_key": device_key,
            "title": format!("Payment received: {}", record.amount_readable),
            "body": format!(
                "{} x{} · order {}",
                record.product_name, record.quantity, record.order_no
            ),
            "group": "payments",
        });

        let response = self.http.post(url).json(&payload).send().await?;
        expect_success(response).await
    }
}
