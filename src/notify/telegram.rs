//! Telegram channel: bot sendMessage call with a Markdown summary.

use async_trait::async_trait;
use serde_json::json;

use crate::config::TelegramConfig;
use crate::notify::{expect_success, DeliveryError, Notifier};
use crate::record::PaymentRecord;

pub struct TelegramNotifier {
    config: TelegramConfig,
    http: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    fn message(record: &PaymentRecord) -> String {
        let mut lines = vec![
            "*Payment received*".to_string(),
            format!("Product: {} x{}", record.product_name, record.quantity),
            format!("Order: `{}`", record.order_no),
            format!("Total: *{}*", record.amount_readable),
            format!("Paid with: {}", record.payment_method),
        ];
        if let Some(email) = &record.email {
            lines.push(format!("Customer: {email}"));
        }
        lines.join("\n")
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn enabled(&self) -> bool {
        self.config.is_enabled()
    }

    async fn send(&self, record: &PaymentRecord) -> Result<(), DeliveryError> {
        let (Some(bot_token), Some(chat_id)) = (
            self.config.bot_token.as_deref(),
            self.config.chat_id.as_deref(),
        ) else {
            return Err(DeliveryError::Config(
                "telegram channel requires bot_token and chat_id".into(),
            ));
        };

        let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
        let payload = json!({
            "chat_id": chat_id,
            "text": Self::message(record),
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        let response = self.http.post(url).json(&payload).send().await?;
        expect_success(response).await
    }
}
