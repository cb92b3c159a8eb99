//! Connector and hospital records held by the aggregation store.

use chrono::{DateTime, NaiveDate, Utc};
use hub_types::{ConnectionStatus, NonEmptyText, Vendor};
use serde::{Deserialize, Serialize};

/// A simulated integration endpoint for one nurse-call vendor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRecord {
    pub id: String,
    pub vendor: Vendor,
    pub protocol: String,
    pub status: ConnectionStatus,
    pub latency_ms: u32,
    /// Cumulative, never decreases under the simulator.
    pub requests_processed: u64,
    /// Time of the last health ping; `None` until the first ping.
    pub last_ping: Option<DateTime<Utc>>,
}

impl ConnectorRecord {
    /// A connector for `vendor` keyed by its stable id and protocol label.
    pub fn for_vendor(
        vendor: Vendor,
        status: ConnectionStatus,
        latency_ms: u32,
        requests_processed: u64,
        last_ping: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: vendor.id().to_string(),
            vendor,
            protocol: vendor.protocol().to_string(),
            status,
            latency_ms,
            requests_processed,
            last_ping,
        }
    }
}

/// Partial update applied by [`crate::AggregationStore::update_connector`].
///
/// Unset fields leave the record unchanged. `requests_increment` is added to the cumulative
/// counter, saturating at `u64::MAX`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectorUpdate {
    pub status: Option<ConnectionStatus>,
    /// Signed so that out-of-range latency readings can be clamped rather than rejected.
    pub latency_ms: Option<i64>,
    pub requests_increment: u64,
}

impl ConnectorUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ConnectionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn latency_ms(mut self, latency_ms: i64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    pub fn requests_increment(mut self, increment: u64) -> Self {
        self.requests_increment = increment;
        self
    }
}

/// A hospital site onboarded onto the hub.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRecord {
    pub id: String,
    pub name: NonEmptyText,
    pub beds: u32,
    pub nurse_call_vendor: Vendor,
    pub status: ConnectionStatus,
    pub setup_date: NaiveDate,
    pub location: NonEmptyText,
}
