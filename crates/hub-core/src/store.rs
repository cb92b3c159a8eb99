//! Bounded, lock-guarded aggregation of recent requests and connector health.
//!
//! [`AggregationStore`] owns every piece of mutable hub state behind one mutex. Each mutation
//! rebuilds the derived [`AggregationMetrics`] from the retained data before the lock is
//! released, so a [`StoreSnapshot`] never shows metrics that disagree with its request list.

use crate::config::{clamp_capacity, CoreConfig};
use crate::connector::{ConnectorRecord, ConnectorUpdate, HospitalRecord};
use crate::constants::TRIMMED_REQUEST_CAPACITY;
use crate::persist::PersistedState;
use crate::request::ClinicalRequestEvent;
use chrono::{DateTime, Utc};
use hub_types::{ConnectionStatus, RequestStatus};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Metrics derived from the store contents. Never mutated independently.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationMetrics {
    /// Requests ingested since start or last reset, including evicted ones.
    pub total_requests: u64,
    /// Retained requests whose status is not completed.
    pub active_requests: usize,
    /// Mean over retained completed requests. Keeps its last value when none remain.
    pub avg_response_time_minutes: Option<f64>,
    pub connected_hospitals: usize,
    pub connected_connectors: usize,
    pub avg_connector_latency_ms: Option<f64>,
}

/// A consistent point-in-time copy of the store.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub metrics: AggregationMetrics,
    /// Newest first.
    pub requests: Vec<ClinicalRequestEvent>,
    pub connectors: Vec<ConnectorRecord>,
    pub hospitals: Vec<HospitalRecord>,
}

#[derive(Debug, Default)]
struct StoreState {
    // Front is newest.
    requests: VecDeque<ClinicalRequestEvent>,
    connectors: Vec<ConnectorRecord>,
    hospitals: Vec<HospitalRecord>,
    total_requests: u64,
    metrics: AggregationMetrics,
}

impl StoreState {
    fn recompute(&mut self) {
        let active_requests = self
            .requests
            .iter()
            .filter(|r| r.status.is_active())
            .count();

        let response_times: Vec<f64> = self
            .requests
            .iter()
            .filter_map(ClinicalRequestEvent::response_minutes)
            .collect();
        let avg_response_time_minutes = mean(&response_times)
            .or(self.metrics.avg_response_time_minutes);

        let latencies: Vec<f64> = self
            .connectors
            .iter()
            .map(|c| f64::from(c.latency_ms))
            .collect();

        self.metrics = AggregationMetrics {
            total_requests: self.total_requests,
            active_requests,
            avg_response_time_minutes,
            connected_hospitals: self
                .hospitals
                .iter()
                .filter(|h| h.status == ConnectionStatus::Connected)
                .count(),
            connected_connectors: self
                .connectors
                .iter()
                .filter(|c| c.status == ConnectionStatus::Connected)
                .count(),
            avg_connector_latency_ms: mean(&latencies),
        };
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn clamp_latency(id: &str, latency_ms: i64) -> u32 {
    match u32::try_from(latency_ms) {
        Ok(v) => v,
        Err(_) => {
            let clamped = if latency_ms < 0 { 0 } else { u32::MAX };
            tracing::warn!(
                connector = %id,
                latency_ms,
                clamped,
                "connector latency out of range; clamping"
            );
            clamped
        }
    }
}

/// The hub's shared state. Share it as `Arc<AggregationStore>`; every method takes `&self`.
#[derive(Debug)]
pub struct AggregationStore {
    capacity: usize,
    inner: Mutex<StoreState>,
}

impl Default for AggregationStore {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

impl AggregationStore {
    /// Creates an empty store retaining at most `capacity` requests (clamped to at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = clamp_capacity(capacity as i128);
        Self {
            capacity,
            inner: Mutex::new(StoreState::default()),
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.request_capacity())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panic mid-mutation can only happen before `recompute`, which rebuilds from the
        // underlying lists, so a poisoned state is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==========================================================================
    // Requests
    // ==========================================================================

    /// Prepends `event`, evicting the oldest retained request once at capacity.
    pub fn ingest_request(&self, event: ClinicalRequestEvent) {
        let mut state = self.lock();
        tracing::debug!(
            id = %event.id,
            protocol = %event.source_protocol,
            priority = %event.priority,
            "ingesting request"
        );
        state.requests.push_front(event);
        while state.requests.len() > self.capacity {
            if let Some(evicted) = state.requests.pop_back() {
                tracing::debug!(id = %evicted.id, "evicted oldest request");
            }
        }
        state.total_requests += 1;
        state.recompute();
    }

    /// Sets the status of a retained request, stamping completion with the current time.
    ///
    /// Returns `false` (and changes nothing) if `id` is not retained.
    pub fn update_request_status(&self, id: &str, status: RequestStatus) -> bool {
        self.update_request_status_at(id, status, Utc::now())
    }

    /// As [`AggregationStore::update_request_status`] with an explicit completion instant.
    ///
    /// `completed_at` is stamped only on the transition into completed and never precedes the
    /// request's origination time. Leaving completed clears it.
    pub fn update_request_status_at(
        &self,
        id: &str,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> bool {
        let mut state = self.lock();
        let Some(request) = state.requests.iter_mut().find(|r| r.id == id) else {
            tracing::debug!(id, "status update for unknown request ignored");
            return false;
        };

        match (request.status, status) {
            (RequestStatus::Completed, RequestStatus::Completed) => {}
            (_, RequestStatus::Completed) => {
                let completed_at = if at < request.timestamp {
                    tracing::warn!(
                        id,
                        at = %at,
                        timestamp = %request.timestamp,
                        "completion precedes origination; clamping"
                    );
                    request.timestamp
                } else {
                    at
                };
                request.completed_at = Some(completed_at);
            }
            (_, _) => request.completed_at = None,
        }
        request.status = status;
        state.recompute();
        true
    }

    /// Trims the retained history to the newest [`TRIMMED_REQUEST_CAPACITY`] entries.
    pub fn clear_old_requests(&self) {
        let mut state = self.lock();
        let before = state.requests.len();
        state.requests.truncate(TRIMMED_REQUEST_CAPACITY);
        tracing::debug!(
            removed = before - state.requests.len(),
            "cleared old requests"
        );
        state.recompute();
    }

    // ==========================================================================
    // Connectors
    // ==========================================================================

    /// Inserts `record`, replacing any connector with the same id.
    pub fn register_connector(&self, record: ConnectorRecord) {
        let mut state = self.lock();
        match state.connectors.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => *existing = record,
            None => state.connectors.push(record),
        }
        state.recompute();
    }

    /// Applies a partial update to a connector and stamps its last ping with the current time.
    ///
    /// Returns `false` (and changes nothing) if `id` is unknown.
    pub fn update_connector(&self, id: &str, update: ConnectorUpdate) -> bool {
        self.update_connector_at(id, update, Utc::now())
    }

    pub fn update_connector_at(
        &self,
        id: &str,
        update: ConnectorUpdate,
        at: DateTime<Utc>,
    ) -> bool {
        let mut state = self.lock();
        let Some(connector) = state.connectors.iter_mut().find(|c| c.id == id) else {
            tracing::debug!(id, "update for unknown connector ignored");
            return false;
        };

        if let Some(status) = update.status {
            connector.status = status;
        }
        if let Some(latency_ms) = update.latency_ms {
            connector.latency_ms = clamp_latency(id, latency_ms);
        }
        connector.requests_processed = connector
            .requests_processed
            .saturating_add(update.requests_increment);
        connector.last_ping = Some(at);

        state.recompute();
        true
    }

    // ==========================================================================
    // Hospitals
    // ==========================================================================

    /// Inserts `record`, replacing any hospital with the same id.
    pub fn add_hospital(&self, record: HospitalRecord) {
        let mut state = self.lock();
        tracing::info!(id = %record.id, name = %record.name, "adding hospital");
        match state.hospitals.iter_mut().find(|h| h.id == record.id) {
            Some(existing) => *existing = record,
            None => state.hospitals.push(record),
        }
        state.recompute();
    }

    /// Returns `false` if no hospital has `id`.
    pub fn remove_hospital(&self, id: &str) -> bool {
        let mut state = self.lock();
        let before = state.hospitals.len();
        state.hospitals.retain(|h| h.id != id);
        if state.hospitals.len() == before {
            tracing::debug!(id, "removal of unknown hospital ignored");
            return false;
        }
        state.recompute();
        true
    }

    /// Returns `false` if no hospital has `id`.
    pub fn update_hospital_status(&self, id: &str, status: ConnectionStatus) -> bool {
        let mut state = self.lock();
        let Some(hospital) = state.hospitals.iter_mut().find(|h| h.id == id) else {
            tracing::debug!(id, "status update for unknown hospital ignored");
            return false;
        };
        hospital.status = status;
        state.recompute();
        true
    }

    // ==========================================================================
    // Whole-store operations
    // ==========================================================================

    /// Returns the store to its initial empty state. Capacity is kept.
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = StoreState::default();
        tracing::info!("store reset");
    }

    /// The subset of state that survives a restart.
    pub fn persisted_state(&self) -> PersistedState {
        let state = self.lock();
        PersistedState {
            connectors: state.connectors.clone(),
            hospitals: state.hospitals.clone(),
        }
    }

    /// Replaces connectors and hospitals with `persisted`. Requests are left alone.
    pub fn restore(&self, persisted: PersistedState) {
        let mut state = self.lock();
        tracing::info!(
            connectors = persisted.connectors.len(),
            hospitals = persisted.hospitals.len(),
            "restoring persisted state"
        );
        state.connectors = persisted.connectors;
        state.hospitals = persisted.hospitals;
        state.recompute();
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.lock();
        StoreSnapshot {
            metrics: state.metrics.clone(),
            requests: state.requests.iter().cloned().collect(),
            connectors: state.connectors.clone(),
            hospitals: state.hospitals.clone(),
        }
    }

    pub fn metrics(&self) -> AggregationMetrics {
        self.lock().metrics.clone()
    }

    /// Ids of the registered connectors, in registration order.
    pub fn connector_ids(&self) -> Vec<String> {
        self.lock().connectors.iter().map(|c| c.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use hub_types::{NonEmptyText, Priority, SourceProtocol, Vendor};
    use std::sync::Arc;
    use std::thread;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn event(id: &str, status: RequestStatus) -> ClinicalRequestEvent {
        ClinicalRequestEvent {
            id: id.to_string(),
            patient_name: "Smith James".into(),
            room_number: "407-B".into(),
            request_type: "Pain medication request".into(),
            priority: Priority::Routine,
            timestamp: t0(),
            vendor: Vendor::Hillrom,
            source_protocol: SourceProtocol::Hl7V2,
            status,
            completed_at: None,
        }
    }

    fn completed(id: &str, minutes: i64) -> ClinicalRequestEvent {
        ClinicalRequestEvent {
            completed_at: Some(t0() + Duration::minutes(minutes)),
            ..event(id, RequestStatus::Completed)
        }
    }

    fn hospital(id: &str, status: ConnectionStatus) -> HospitalRecord {
        HospitalRecord {
            id: id.to_string(),
            name: NonEmptyText::new(format!("Hospital {id}")).expect("name"),
            beds: 200,
            nurse_call_vendor: Vendor::Rauland,
            status,
            setup_date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"),
            location: NonEmptyText::new("York").expect("location"),
        }
    }

    fn assert_active_invariant(store: &AggregationStore) {
        let snap = store.snapshot();
        let active = snap
            .requests
            .iter()
            .filter(|r| r.status != RequestStatus::Completed)
            .count();
        assert_eq!(snap.metrics.active_requests, active);
        assert!(snap.requests.len() <= store.capacity());
    }

    #[test]
    fn scenario_metrics_and_eviction() {
        let store = AggregationStore::new(3);
        store.ingest_request(event("a", RequestStatus::Pending));
        store.ingest_request(event("b", RequestStatus::Pending));
        store.ingest_request(completed("c", 4));

        let snap = store.snapshot();
        assert_eq!(snap.metrics.total_requests, 3);
        assert_eq!(snap.metrics.active_requests, 2);
        assert_eq!(snap.metrics.avg_response_time_minutes, Some(4.0));

        store.ingest_request(completed("d", 2));
        let snap = store.snapshot();
        let ids: Vec<&str> = snap.requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c", "b"]);
        assert_eq!(snap.metrics.total_requests, 4);
        assert_eq!(snap.metrics.active_requests, 1);
        assert_eq!(snap.metrics.avg_response_time_minutes, Some(3.0));
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let store = AggregationStore::new(5);
        for i in 0..40 {
            store.ingest_request(event(&format!("r{i}"), RequestStatus::Pending));
            assert_active_invariant(&store);
        }
        let snap = store.snapshot();
        assert_eq!(snap.requests.len(), 5);
        assert_eq!(snap.requests[0].id, "r39");
        assert!(snap.requests.iter().all(|r| r.id != "r0"));
        assert_eq!(snap.metrics.total_requests, 40);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let store = AggregationStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.ingest_request(event("a", RequestStatus::Pending));
        store.ingest_request(event("b", RequestStatus::Pending));
        assert_eq!(store.snapshot().requests.len(), 1);
    }

    #[test]
    fn unknown_request_update_is_a_no_op() {
        let store = AggregationStore::new(10);
        store.ingest_request(event("a", RequestStatus::Pending));
        let before = store.snapshot();
        assert!(!store.update_request_status("missing", RequestStatus::Completed));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn completing_a_request_stamps_and_recomputes() {
        let store = AggregationStore::new(10);
        store.ingest_request(event("a", RequestStatus::Pending));
        store.ingest_request(event("b", RequestStatus::InProgress));
        assert_eq!(store.metrics().avg_response_time_minutes, None);

        assert!(store.update_request_status_at(
            "a",
            RequestStatus::Completed,
            t0() + Duration::minutes(6)
        ));
        assert_active_invariant(&store);
        let snap = store.snapshot();
        assert_eq!(snap.metrics.active_requests, 1);
        assert_eq!(snap.metrics.avg_response_time_minutes, Some(6.0));

        // A repeated completion keeps the first stamp.
        store.update_request_status_at("a", RequestStatus::Completed, t0() + Duration::hours(1));
        assert_eq!(store.metrics().avg_response_time_minutes, Some(6.0));
    }

    #[test]
    fn completion_before_origination_is_clamped() {
        let store = AggregationStore::new(10);
        store.ingest_request(event("a", RequestStatus::Pending));
        store.update_request_status_at("a", RequestStatus::Completed, t0() - Duration::minutes(3));
        let snap = store.snapshot();
        assert_eq!(snap.requests[0].completed_at, Some(t0()));
        assert_eq!(snap.metrics.avg_response_time_minutes, Some(0.0));
        assert!(snap.requests[0].is_well_formed());
    }

    #[test]
    fn reopening_clears_completion() {
        let store = AggregationStore::new(10);
        store.ingest_request(completed("a", 5));
        store.update_request_status("a", RequestStatus::InProgress);
        let snap = store.snapshot();
        assert_eq!(snap.requests[0].completed_at, None);
        assert_eq!(snap.metrics.active_requests, 1);
        // No completed requests remain, so the previous mean is kept.
        assert_eq!(snap.metrics.avg_response_time_minutes, Some(5.0));
    }

    #[test]
    fn mean_is_recomputed_after_eviction() {
        let store = AggregationStore::new(2);
        store.ingest_request(completed("a", 10));
        store.ingest_request(completed("b", 2));
        assert_eq!(store.metrics().avg_response_time_minutes, Some(6.0));
        store.ingest_request(completed("c", 4));
        assert_eq!(store.metrics().avg_response_time_minutes, Some(3.0));
    }

    #[test]
    fn clear_old_requests_trims_to_floor() {
        let store = AggregationStore::new(100);
        for i in 0..80 {
            store.ingest_request(event(&format!("r{i}"), RequestStatus::Pending));
        }
        store.clear_old_requests();
        let snap = store.snapshot();
        assert_eq!(snap.requests.len(), TRIMMED_REQUEST_CAPACITY);
        assert_eq!(snap.requests[0].id, "r79");
        assert_eq!(snap.metrics.active_requests, TRIMMED_REQUEST_CAPACITY);
        assert_eq!(snap.metrics.total_requests, 80);
    }

    #[test]
    fn connector_upsert_and_partial_update() {
        let store = AggregationStore::new(10);
        store.register_connector(ConnectorRecord::for_vendor(
            Vendor::Ascom,
            ConnectionStatus::Connected,
            100,
            20_000,
            None,
        ));
        store.register_connector(ConnectorRecord::for_vendor(
            Vendor::Hillrom,
            ConnectionStatus::Degraded,
            50,
            10_000,
            None,
        ));
        let metrics = store.metrics();
        assert_eq!(metrics.connected_connectors, 1);
        assert_eq!(metrics.avg_connector_latency_ms, Some(75.0));

        let at = t0() + Duration::seconds(5);
        assert!(store.update_connector_at(
            "hillrom",
            ConnectorUpdate::new()
                .status(ConnectionStatus::Connected)
                .latency_ms(70)
                .requests_increment(3),
            at,
        ));
        let snap = store.snapshot();
        let hillrom = snap
            .connectors
            .iter()
            .find(|c| c.id == "hillrom")
            .expect("hillrom");
        assert_eq!(hillrom.latency_ms, 70);
        assert_eq!(hillrom.requests_processed, 10_003);
        assert_eq!(hillrom.last_ping, Some(at));
        assert_eq!(snap.metrics.connected_connectors, 2);

        // Re-registering replaces rather than duplicating.
        store.register_connector(ConnectorRecord::for_vendor(
            Vendor::Ascom,
            ConnectionStatus::Disconnected,
            100,
            0,
            None,
        ));
        let snap = store.snapshot();
        assert_eq!(snap.connectors.len(), 2);
        assert_eq!(snap.metrics.connected_connectors, 1);
    }

    #[test]
    fn negative_latency_is_clamped() {
        let store = AggregationStore::new(10);
        store.register_connector(ConnectorRecord::for_vendor(
            Vendor::Rauland,
            ConnectionStatus::Connected,
            90,
            0,
            None,
        ));
        store.update_connector("rauland", ConnectorUpdate::new().latency_ms(-15));
        assert_eq!(store.snapshot().connectors[0].latency_ms, 0);
    }

    #[test]
    fn connector_ids_follow_registration_order() {
        let store = AggregationStore::new(10);
        assert!(store.connector_ids().is_empty());
        for vendor in [Vendor::Rauland, Vendor::Ascom] {
            store.register_connector(ConnectorRecord::for_vendor(
                vendor,
                ConnectionStatus::Connected,
                90,
                0,
                None,
            ));
        }
        assert_eq!(store.connector_ids(), vec!["rauland", "ascom"]);
    }

    #[test]
    fn unknown_connector_update_is_a_no_op() {
        let store = AggregationStore::new(10);
        let before = store.snapshot();
        assert!(!store.update_connector("nope", ConnectorUpdate::new().latency_ms(1)));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn hospital_lifecycle() {
        let store = AggregationStore::new(10);
        store.add_hospital(hospital("h1", ConnectionStatus::Connected));
        store.add_hospital(hospital("h2", ConnectionStatus::Degraded));
        assert_eq!(store.metrics().connected_hospitals, 1);

        assert!(store.update_hospital_status("h2", ConnectionStatus::Connected));
        assert_eq!(store.metrics().connected_hospitals, 2);

        assert!(store.remove_hospital("h1"));
        assert!(!store.remove_hospital("h1"));
        assert!(!store.update_hospital_status("h1", ConnectionStatus::Connected));
        let snap = store.snapshot();
        assert_eq!(snap.hospitals.len(), 1);
        assert_eq!(snap.metrics.connected_hospitals, 1);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let store = AggregationStore::new(10);
        store.ingest_request(completed("a", 3));
        store.add_hospital(hospital("h1", ConnectionStatus::Connected));
        store.reset();
        let snap = store.snapshot();
        assert!(snap.requests.is_empty());
        assert!(snap.hospitals.is_empty());
        assert_eq!(snap.metrics, AggregationMetrics::default());
        assert_eq!(store.capacity(), 10);
    }

    #[test]
    fn persisted_state_excludes_requests() {
        let store = AggregationStore::new(10);
        store.ingest_request(event("a", RequestStatus::Pending));
        store.add_hospital(hospital("h1", ConnectionStatus::Connected));
        store.register_connector(ConnectorRecord::for_vendor(
            Vendor::WestCom,
            ConnectionStatus::Connected,
            60,
            1,
            None,
        ));
        let persisted = store.persisted_state();

        let fresh = AggregationStore::new(10);
        fresh.restore(persisted);
        let snap = fresh.snapshot();
        assert!(snap.requests.is_empty());
        assert_eq!(snap.connectors.len(), 1);
        assert_eq!(snap.hospitals.len(), 1);
        assert_eq!(snap.metrics.connected_hospitals, 1);
        assert_eq!(snap.metrics.total_requests, 0);
    }

    #[test]
    fn concurrent_mutations_keep_invariants() {
        let store = Arc::new(AggregationStore::new(25));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..100 {
                        let id = format!("t{t}-{i}");
                        store.ingest_request(event(&id, RequestStatus::Pending));
                        if i % 3 == 0 {
                            store.update_request_status(&id, RequestStatus::Completed);
                        }
                        let snap = store.snapshot();
                        let active = snap
                            .requests
                            .iter()
                            .filter(|r| r.status.is_active())
                            .count();
                        assert_eq!(snap.metrics.active_requests, active);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread");
        }
        let snap = store.snapshot();
        assert_eq!(snap.metrics.total_requests, 800);
        assert_eq!(snap.requests.len(), 25);
    }
}
