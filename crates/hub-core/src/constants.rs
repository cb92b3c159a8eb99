//! Constants used throughout the hub core crate.

/// Default number of requests the store retains.
pub const DEFAULT_REQUEST_CAPACITY: usize = 100;

/// Number of requests kept by a manual trim of the history.
pub const TRIMMED_REQUEST_CAPACITY: usize = 50;

/// Smallest capacity the store accepts; smaller requests are clamped up to it.
pub const MIN_REQUEST_CAPACITY: usize = 1;

/// Default bounds for the delay between two ingested requests.
pub const DEFAULT_INGEST_INTERVAL_MIN_MS: u64 = 3_000;
pub const DEFAULT_INGEST_INTERVAL_MAX_MS: u64 = 5_000;

/// Default delay between two connector health pings.
pub const DEFAULT_CONNECTOR_INTERVAL_MS: u64 = 5_000;

/// Latency band (ms, half-open) drawn by the connector simulator.
pub const CONNECTOR_LATENCY_MIN_MS: u32 = 50;
pub const CONNECTOR_LATENCY_MAX_MS: u32 = 150;

/// Range (half-open) for the seeded cumulative request counter of a connector.
pub const SEED_REQUESTS_MIN: u64 = 10_000;
pub const SEED_REQUESTS_MAX: u64 = 60_000;

/// Upper bound (exclusive) on requests a connector processes between two pings.
pub const REQUESTS_PER_PING_MAX: u64 = 10;

/// Room numbers assigned to FHIR-sourced requests, which carry no room of their own.
pub const FHIR_ROOM_MIN: u32 = 100;
pub const FHIR_ROOM_MAX: u32 = 499;

/// Filename for the persisted connector/hospital lists.
pub const PERSISTED_STATE_FILENAME: &str = "integration-hub-storage.json";
