//! hookrelay - Payment webhook relay
//!
//! Receives payment-success notifications from a payment processor,
//! authenticates them, normalizes the payload into one canonical record and
//! fans that record out to every configured notification channel:
//!
//! - **Signature Verification**: HMAC-SHA256 over the raw body with a
//!   freshness window and constant-time tag comparison
//! - **Normalization**: priority-chain field resolution tolerant of the
//!   checkout-session, payment-intent and invoice payload shapes
//! - **Fan-out**: concurrent settle-all dispatch with per-channel failure
//!   isolation (email, Telegram, DingTalk, Bark)
//! - **Configuration**: environment variable and file-based configuration;
//!   a channel is enabled purely by the presence of its keys
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hookrelay::RelayConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RelayConfig::load()?;
//!     hookrelay::server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Endpoints
//!
//! - `POST /stripe-webhook` - signed processor events (200 ok/ignored, 400 rejected)
//! - `GET /health` - liveness probe
//! - `GET /metrics` - Prometheus metrics (when enabled)

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod middleware;
pub mod notify;
pub mod record;
pub mod routes;
pub mod server;
pub mod signature;
pub mod state;

pub use config::RelayConfig;
pub use error::{ServerError, ServerResult};
pub use record::PaymentRecord;
pub use server::{build_router, start_server};
pub use state::RelayState;
