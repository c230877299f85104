//! Customer health analytics service: binary entrypoint.
//! Resolves config, installs logging and metrics, then serves the router.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing::info;

use customer_health_analytics::{app, config::AppConfig, init_tracing, metrics::Metrics};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load().context("loading analytics config")?;
    let metrics = Metrics::init()?;

    info!(
        data_dir = %cfg.data_dir.display(),
        static_dir = %cfg.static_dir.display(),
        "customer health analytics starting"
    );

    Ok(app(&cfg, Some(&metrics)).into())
}
