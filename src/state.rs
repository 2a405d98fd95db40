use std::sync::Arc;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::RelayConfig;
use crate::error::{ServerError, ServerResult};
use crate::notify::{build_notifiers, template, Notifier};

/// Shared application state
#[derive(Clone)]
pub struct RelayState {
    /// Relay configuration (process-wide, read-only)
    pub config: Arc<RelayConfig>,

    /// Channel registry; enablement is re-checked per dispatch
    pub notifiers: Vec<Arc<dyn Notifier>>,

    /// Prometheus render handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl RelayState {
    /// Create new relay state: one shared outbound client, the channel
    /// registry, and the metrics recorder.
    pub fn new(config: RelayConfig) -> ServerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServerError::Internal(format!("http client: {e}")))?;

        let email_template = match &config.email.template_path {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                ServerError::Config(format!("email template {path}: {e}"))
            })?,
            None => template::DEFAULT_TEMPLATE.to_string(),
        };

        let notifiers = build_notifiers(&config, &http, email_template);

        let metrics = if config.metrics_enabled {
            Some(install_metrics_recorder()?)
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            notifiers,
            metrics,
        })
    }
}

/// Install the process-wide Prometheus recorder. A second install (tests
/// building several states) is tolerated by falling back to render-less
/// state instead of failing startup.
fn install_metrics_recorder() -> ServerResult<PrometheusHandle> {
    static HANDLE: once_cell::sync::OnceCell<PrometheusHandle> = once_cell::sync::OnceCell::new();

    HANDLE
        .get_or_try_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| ServerError::Config(format!("metrics recorder: {e}")))
        })
        .cloned()
}
