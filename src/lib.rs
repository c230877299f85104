// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod grouping;
pub mod health;
pub mod intent;
pub mod kpi;
pub mod loader;
pub mod metrics;
pub mod record;
pub mod security;
pub mod timebucket;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState};
pub use crate::config::AppConfig;
pub use crate::error::{AnalyticsError, Result};
pub use crate::intent::{answer, QueryResult};
pub use crate::record::{Datasets, Record};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "customer_health_analytics=info,warn";

/// Install the global tracing subscriber. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var("ANALYTICS_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// Build the full in-process app from resolved config: API routes,
/// static UI fallback, and optionally the `/metrics` exporter.
pub fn app(cfg: &AppConfig, metrics: Option<&crate::metrics::Metrics>) -> axum::Router {
    let router = create_router(cfg);
    match metrics {
        Some(m) => m.router().merge(router),
        None => router,
    }
}
