//! Email channel: HTML receipt posted to a Mailgun-style messages API.

use async_trait::async_trait;

use crate::config::EmailConfig;
use crate::notify::{expect_success, template, DeliveryError, Notifier};
use crate::record::PaymentRecord;

pub struct EmailNotifier {
    config: EmailConfig,
    http: reqwest::Client,
    template: String,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, http: reqwest::Client, template: String) -> Self {
        Self {
            config,
            http,
            template,
        }
    }

    fn subject(record: &PaymentRecord) -> String {
        format!("Payment received: {} {}", record.product_name, record.amount_readable)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        self.config.is_enabled()
    }

    async fn send(&self, record: &PaymentRecord) -> Result<(), DeliveryError> {
        let (Some(api_key), Some(domain), Some(to)) = (
            self.config.api_key.as_deref(),
            self.config.domain.as_deref(),
            self.config.to.as_deref(),
        ) else {
            return Err(DeliveryError::Config(
                "email channel requires api_key, domain and to".into(),
            ));
        };

        let from = self
            .config
            .from
            .clone()
            .unwrap_or_else(|| format!("Payments <payments@{domain}>"));
        let html = template::render(&self.template, record);
        let subject = Self::subject(record);

        let url = format!("https://api.mailgun.net/v3/{domain}/messages");
        let form = [
            ("from", from.as_str()),
            ("to", to),
            ("subject", subject.as_str()),
            ("html", html.as_str()),
        ];

        let response = self
            .http
            .post(url)
            .basic_auth("api", Some(api_key))
            .form(&form)
            .send()
            .await?;

        expect_success(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> PaymentRecord {
        PaymentRecord {
            event_type: "invoice.paid".into(),
            id: "evt_1".into(),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            currency: "USD".into(),
            amount_minor: 4200,
            amount_readable: "USD 42.00".into(),
            email: None,
            order_no: "INV-1".into(),
            product_name: "Support plan".into(),
            quantity: 1,
            payment_method: "card".into(),
            customer_id: None,
        }
    }

    #[test]
    fn subject_carries_product_and_amount() {
        assert_eq!(
            EmailNotifier::subject(&record()),
            "Payment received: Support plan USD 42.00"
        );
    }

    #[tokio::test]
    async fn send_without_keys_is_a_config_error() {
        let notifier = EmailNotifier::new(
            EmailConfig::default(),
            reqwest::Client::new(),
            String::new(),
        );
        assert!(!notifier.enabled());
        let result = notifier.send(&record()).await;
        assert!(matches!(result, Err(DeliveryError::Config(_))));
    }
}
