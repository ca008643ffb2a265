// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::NodeConfig;
use crate::errors::NodeError;

pub const EVENTS_PROCESSED: &str = "indexer_events_processed_total";
pub const EVENTS_REPLAYED: &str = "indexer_events_replayed_total";
pub const CHANGESETS_EMITTED: &str = "indexer_changesets_emitted_total";
pub const REPLAY_DIVERGENCE: &str = "indexer_replay_divergence_total";
pub const COMPILE_DURATION: &str = "indexer_event_compile_duration_seconds";

/// Initialize telemetry (logs + metrics). Must run inside a Tokio runtime
/// when `metrics_addr` is set.
pub fn init_telemetry(cfg: &NodeConfig) -> Result<(), NodeError> {
    // 1. Tracing: RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| NodeError::Config(format!("tracing already initialized: {}", e)))?;

    // 2. Metrics: without a listener the macros below record nothing
    if let Some(addr) = cfg.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| NodeError::Config(format!("prometheus exporter on {}: {}", addr, e)))?;
        tracing::info!("Serving metrics on http://{}/metrics", addr);
    }

    metrics::describe_counter!(EVENTS_PROCESSED, "Events compiled and applied");
    metrics::describe_counter!(EVENTS_REPLAYED, "Events at or behind the chain cursor, recompiled but not applied");
    metrics::describe_counter!(CHANGESETS_EMITTED, "Changesets applied to the index");
    metrics::describe_counter!(REPLAY_DIVERGENCE, "Replays whose changesets differed from the first run");
    metrics::describe_histogram!(COMPILE_DURATION, "Time taken to compile one event");
    Ok(())
}
