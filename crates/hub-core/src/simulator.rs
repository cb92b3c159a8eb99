//! Connector health simulation.
//!
//! Seeds one connector per vendor and, on every ping, redraws each connector's latency and
//! status and advances its request counter.

use crate::connector::{ConnectorRecord, ConnectorUpdate};
use crate::constants::{
    CONNECTOR_LATENCY_MAX_MS, CONNECTOR_LATENCY_MIN_MS, REQUESTS_PER_PING_MAX, SEED_REQUESTS_MAX,
    SEED_REQUESTS_MIN,
};
use crate::store::AggregationStore;
use chrono::{DateTime, Utc};
use hub_types::{ConnectionStatus, Vendor, WeightedTable};
use rand::Rng;

/// Initial connector status: 90% connected.
pub const SEED_STATUS_TABLE: WeightedTable<ConnectionStatus> = WeightedTable::new(&[
    (0.9, ConnectionStatus::Connected),
    (1.0, ConnectionStatus::Degraded),
]);

/// Status redrawn on every ping: 95% connected.
pub const PING_STATUS_TABLE: WeightedTable<ConnectionStatus> = WeightedTable::new(&[
    (0.95, ConnectionStatus::Connected),
    (1.0, ConnectionStatus::Degraded),
]);

/// Drives connector records held by an [`AggregationStore`].
///
/// This is a zero-sized type used for namespacing simulation operations.
pub struct ConnectorStatusSimulator;

impl ConnectorStatusSimulator {
    /// One freshly drawn connector per vendor, in [`Vendor::ALL`] order.
    pub fn seed_connectors<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<ConnectorRecord> {
        Vendor::ALL
            .into_iter()
            .map(|vendor| {
                ConnectorRecord::for_vendor(
                    vendor,
                    SEED_STATUS_TABLE.sample(rng),
                    rng.gen_range(CONNECTOR_LATENCY_MIN_MS..CONNECTOR_LATENCY_MAX_MS),
                    rng.gen_range(SEED_REQUESTS_MIN..SEED_REQUESTS_MAX),
                    Some(now),
                )
            })
            .collect()
    }

    /// Registers seeded connectors into `store`.
    pub fn seed_store<R: Rng + ?Sized>(store: &AggregationStore, rng: &mut R, now: DateTime<Utc>) {
        for record in Self::seed_connectors(rng, now) {
            store.register_connector(record);
        }
        tracing::info!(count = Vendor::ALL.len(), "seeded connectors");
    }

    /// Pings every connector currently in `store` once.
    pub fn tick<R: Rng + ?Sized>(store: &AggregationStore, rng: &mut R) {
        Self::tick_at(store, rng, Utc::now());
    }

    pub fn tick_at<R: Rng + ?Sized>(store: &AggregationStore, rng: &mut R, now: DateTime<Utc>) {
        for id in store.connector_ids() {
            let update = ConnectorUpdate::new()
                .latency_ms(i64::from(
                    rng.gen_range(CONNECTOR_LATENCY_MIN_MS..CONNECTOR_LATENCY_MAX_MS),
                ))
                .status(PING_STATUS_TABLE.sample(rng))
                .requests_increment(rng.gen_range(0..REQUESTS_PER_PING_MAX));
            // A connector removed since the ids were read is simply skipped.
            store.update_connector_at(&id, update, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn seeds_one_connector_per_vendor_in_range() {
        let mut rng = StdRng::seed_from_u64(21);
        let connectors = ConnectorStatusSimulator::seed_connectors(&mut rng, t0());
        assert_eq!(connectors.len(), Vendor::ALL.len());
        for (c, vendor) in connectors.iter().zip(Vendor::ALL) {
            assert_eq!(c.vendor, vendor);
            assert!((50..150).contains(&c.latency_ms));
            assert!((10_000..60_000).contains(&c.requests_processed));
            assert_ne!(c.status, ConnectionStatus::Disconnected);
            assert_eq!(c.last_ping, Some(t0()));
        }
    }

    #[test]
    fn tick_perturbs_every_connector() {
        let mut rng = StdRng::seed_from_u64(22);
        let store = AggregationStore::new(10);
        ConnectorStatusSimulator::seed_store(&store, &mut rng, t0());
        let before = store.snapshot().connectors;

        let later = t0() + Duration::seconds(5);
        for _ in 0..50 {
            ConnectorStatusSimulator::tick_at(&store, &mut rng, later);
        }
        let after = store.snapshot();
        for (b, a) in before.iter().zip(&after.connectors) {
            assert_eq!(b.id, a.id);
            assert!(a.requests_processed >= b.requests_processed);
            assert!(a.requests_processed <= b.requests_processed + 50 * 9);
            assert!((50..150).contains(&a.latency_ms));
            assert_eq!(a.last_ping, Some(later));
        }
        let latencies: Vec<f64> = after.connectors.iter().map(|c| f64::from(c.latency_ms)).collect();
        let mean = latencies.iter().sum::<f64>() / latencies.len() as f64;
        assert_eq!(after.metrics.avg_connector_latency_ms, Some(mean));
    }

    #[test]
    fn ping_status_frequency() {
        let mut rng = StdRng::seed_from_u64(23);
        let n = 20_000;
        let connected = (0..n)
            .filter(|_| PING_STATUS_TABLE.sample(&mut rng) == ConnectionStatus::Connected)
            .count();
        assert!((connected as f64 / n as f64 - 0.95).abs() < 0.01);
    }

    #[test]
    fn tick_on_empty_store_does_nothing() {
        let mut rng = StdRng::seed_from_u64(24);
        let store = AggregationStore::new(10);
        ConnectorStatusSimulator::tick(&store, &mut rng);
        assert!(store.snapshot().connectors.is_empty());
    }
}
