use anyhow::Context;
use axum::{extract::State, routing::get, Router};
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_http_metrics();
        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus text format, for merging into the app.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(render))
            .with_state(self.handle.clone())
    }
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

fn describe_http_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "analytics_requests_total",
            "Analytics API requests by endpoint."
        );
        describe_counter!("chat_intent_total", "Chat questions by routed intent.");
    });
}

/// Count one API hit. A no-op until a recorder is installed.
pub fn record_request(endpoint: &'static str) {
    counter!("analytics_requests_total", "endpoint" => endpoint).increment(1);
}

pub fn record_intent(kind: &'static str) {
    counter!("chat_intent_total", "intent" => kind).increment(1);
}
