use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hub_core::config::{capacity_from_env_value, millis_from_env_value};
use hub_core::constants::{
    DEFAULT_CONNECTOR_INTERVAL_MS, DEFAULT_INGEST_INTERVAL_MAX_MS, DEFAULT_INGEST_INTERVAL_MIN_MS,
    PERSISTED_STATE_FILENAME,
};
use hub_core::persist::{self, PersistedState};
use hub_core::{AggregationStore, ConnectorStatusSimulator, CoreConfig, RequestFeed};

const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Main entry point for the integration hub demo
///
/// Restores persisted connectors and hospitals, seeds connectors on first run, then runs the
/// request feed and connector pings on timers while serving the REST API.
///
/// # Environment Variables
/// - `HUB_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HUB_REQUEST_CAPACITY`: retained request history (default: 100, clamped to at least 1)
/// - `HUB_PERSIST_PATH`: connector/hospital state file (default: `integration-hub-storage.json`;
///   an empty value disables persistence)
/// - `HUB_INGEST_MIN_MS` / `HUB_INGEST_MAX_MS`: bounds on the delay between requests
/// - `HUB_CONNECTOR_INTERVAL_MS`: delay between connector pings
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hub_run=info".parse()?)
                .add_directive("hub_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HUB_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let cfg = config_from_lookup(|name| std::env::var(name).ok())?;

    let store = Arc::new(AggregationStore::from_config(&cfg));
    if let Some(path) = cfg.persist_path() {
        store.restore(load_or_default(path));
    }
    if store.snapshot().connectors.is_empty() {
        ConnectorStatusSimulator::seed_store(&store, &mut StdRng::from_entropy(), Utc::now());
    }

    tokio::spawn(run_request_feed(
        store.clone(),
        cfg.ingest_interval_min(),
        cfg.ingest_interval_max(),
    ));
    tokio::spawn(run_connector_pings(store.clone(), cfg.connector_interval()));

    tracing::info!(
        "++ Starting integration hub REST on {} (capacity {})",
        rest_addr,
        store.capacity()
    );
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let served = axum::serve(listener, api_rest::router(store.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        tracing::error!("REST server error: {:?}", e);
    }

    if let Some(path) = cfg.persist_path() {
        persist::save(path, &store.persisted_state())?;
        tracing::info!("-- Saved connector and hospital state to {}", path.display());
    }

    served?;
    Ok(())
}

/// Reads persisted state, falling back to an empty state if the file cannot be used.
fn load_or_default(path: &Path) -> PersistedState {
    persist::load(path).unwrap_or_else(|e| {
        tracing::warn!(
            "ignoring unreadable state file {}: {}; starting empty",
            path.display(),
            e
        );
        PersistedState::default()
    })
}

/// Resolves [`CoreConfig`] from a variable lookup.
fn config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<CoreConfig> {
    let capacity = capacity_from_env_value(lookup("HUB_REQUEST_CAPACITY"))?;
    let persist_path = match lookup("HUB_PERSIST_PATH") {
        None => Some(PathBuf::from(PERSISTED_STATE_FILENAME)),
        Some(p) if p.trim().is_empty() => None,
        Some(p) => Some(PathBuf::from(p.trim())),
    };
    let ingest_min = millis_from_env_value(
        "HUB_INGEST_MIN_MS",
        lookup("HUB_INGEST_MIN_MS"),
        DEFAULT_INGEST_INTERVAL_MIN_MS,
    )?;
    let ingest_max = millis_from_env_value(
        "HUB_INGEST_MAX_MS",
        lookup("HUB_INGEST_MAX_MS"),
        DEFAULT_INGEST_INTERVAL_MAX_MS,
    )?;
    let connector_interval = millis_from_env_value(
        "HUB_CONNECTOR_INTERVAL_MS",
        lookup("HUB_CONNECTOR_INTERVAL_MS"),
        DEFAULT_CONNECTOR_INTERVAL_MS,
    )?;

    Ok(CoreConfig::new(capacity, persist_path)
        .with_ingest_interval(ingest_min, ingest_max)?
        .with_connector_interval(connector_interval)?)
}

/// Ingests one synthetic request after each random delay in `min..=max`.
async fn run_request_feed(store: Arc<AggregationStore>, min: Duration, max: Duration) {
    let mut rng = StdRng::from_entropy();
    let (min_ms, max_ms) = (min.as_millis() as u64, max.as_millis() as u64);
    loop {
        let delay = Duration::from_millis(rng.gen_range(min_ms..=max_ms));
        tokio::time::sleep(delay).await;
        store.ingest_request(RequestFeed::next_event(&mut rng, Utc::now()));
    }
}

/// Pings every connector once per `interval`.
async fn run_connector_pings(store: Arc<AggregationStore>, interval: Duration) {
    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; connectors were just seeded or restored.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        ConnectorStatusSimulator::tick(&store, &mut rng);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down integration hub");
}
