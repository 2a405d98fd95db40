use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::signature::DEFAULT_TOLERANCE_SECS;

/// Relay configuration
///
/// Channel sections are always present; a channel is *enabled* only when its
/// required keys are set. Absent keys silently disable the channel rather
/// than failing startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Log level / env-filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Inbound webhook verification
    #[serde(default)]
    pub stripe: StripeConfig,

    /// Notification channels
    #[serde(default)]
    pub email: EmailConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub dingtalk: DingTalkConfig,

    #[serde(default)]
    pub bark: BarkConfig,
}

/// Inbound signature verification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeConfig {
    /// Shared signing secret; empty means verification always fails
    #[serde(default)]
    pub webhook_secret: String,

    /// Freshness window in seconds for the signed timestamp
    #[serde(default = "default_tolerance_secs")]
    pub tolerance_secs: u64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            tolerance_secs: default_tolerance_secs(),
        }
    }
}

/// Mailgun-style email channel: HTML receipt posted as form fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sending domain registered with the mail API
    #[serde(default)]
    pub domain: Option<String>,

    /// Recipient address for payment receipts
    #[serde(default)]
    pub to: Option<String>,

    /// Sender address; derived from the domain when unset
    #[serde(default)]
    pub from: Option<String>,

    /// Optional path to an HTML template overriding the built-in one
    #[serde(default)]
    pub template_path: Option<String>,
}

impl EmailConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some() && self.domain.is_some() && self.to.is_some()
    }
}

/// Telegram bot channel
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,

    #[serde(default)]
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn is_enabled(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

/// DingTalk robot channel; every call is signed with a fresh timestamp.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DingTalkConfig {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub secret: Option<String>,
}

impl DingTalkConfig {
    pub fn is_enabled(&self) -> bool {
        self.access_token.is_some() && self.secret.is_some()
    }
}

/// Bark push channel: one device key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BarkConfig {
    #[serde(default)]
    pub device_key: Option<String>,

    #[serde(default = "default_bark_base_url")]
    pub base_url: String,
}

impl Default for BarkConfig {
    fn default() -> Self {
        Self {
            device_key: None,
            base_url: default_bark_base_url(),
        }
    }
}

impl BarkConfig {
    pub fn is_enabled(&self) -> bool {
        self.device_key.is_some()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            stripe: StripeConfig::default(),
            email: EmailConfig::default(),
            telegram: TelegramConfig::default(),
            dingtalk: DingTalkConfig::default(),
            bark: BarkConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from an optional `relay` config file, overridden
    /// by `RELAY_`-prefixed environment variables with `__` separating
    /// nesting, e.g. `RELAY_STRIPE__WEBHOOK_SECRET`.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("relay").required(false))
            .add_source(config::Environment::with_prefix("RELAY").separator("__"));

        let config: RelayConfig = builder.build()?.try_deserialize()?;

        if config.stripe.webhook_secret.is_empty() {
            tracing::warn!("No webhook secret configured; all deliveries will be rejected");
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_kb() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tolerance_secs() -> u64 {
    DEFAULT_TOLERANCE_SECS
}

fn default_bark_base_url() -> String {
    "https://api.day.app".to_string()
}

fn default_true() -> bool {
    true
}
