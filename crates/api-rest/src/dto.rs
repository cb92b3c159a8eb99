//! JSON response bodies served by the REST API.
//!
//! These mirror the core store types with plain strings for enums and timestamps, so the
//! OpenAPI document describes exactly what goes over the wire.

use hub_core::{
    AggregationMetrics, ClinicalRequestEvent, ConnectorRecord, HospitalRecord, StoreSnapshot,
};
use hub_types::timestamp::fhir_instant;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRes {
    pub total_requests: u64,
    pub active_requests: usize,
    pub avg_response_time_minutes: Option<f64>,
    pub connected_hospitals: usize,
    pub connected_connectors: usize,
    pub avg_connector_latency_ms: Option<f64>,
}

impl From<AggregationMetrics> for MetricsRes {
    fn from(m: AggregationMetrics) -> Self {
        Self {
            total_requests: m.total_requests,
            active_requests: m.active_requests,
            avg_response_time_minutes: m.avg_response_time_minutes,
            connected_hospitals: m.connected_hospitals,
            connected_connectors: m.connected_connectors,
            avg_connector_latency_ms: m.avg_connector_latency_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestRes {
    pub id: String,
    pub patient_name: String,
    pub room_number: String,
    pub request_type: String,
    /// `routine`, `urgent` or `stat`.
    pub priority: String,
    pub timestamp: String,
    pub vendor: String,
    /// `HL7v2` or `FHIR-R4`.
    pub source_protocol: String,
    /// `pending`, `in-progress` or `completed`.
    pub status: String,
    pub completed_at: Option<String>,
}

impl From<ClinicalRequestEvent> for RequestRes {
    fn from(r: ClinicalRequestEvent) -> Self {
        Self {
            id: r.id,
            patient_name: r.patient_name,
            room_number: r.room_number,
            request_type: r.request_type,
            priority: r.priority.to_string(),
            timestamp: fhir_instant(r.timestamp),
            vendor: r.vendor.to_string(),
            source_protocol: r.source_protocol.to_string(),
            status: r.status.to_string(),
            completed_at: r.completed_at.map(fhir_instant),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRes {
    pub id: String,
    pub vendor: String,
    pub protocol: String,
    pub status: String,
    pub latency_ms: u32,
    pub requests_processed: u64,
    pub last_ping: Option<String>,
}

impl From<ConnectorRecord> for ConnectorRes {
    fn from(c: ConnectorRecord) -> Self {
        Self {
            id: c.id,
            vendor: c.vendor.to_string(),
            protocol: c.protocol,
            status: c.status.to_string(),
            latency_ms: c.latency_ms,
            requests_processed: c.requests_processed,
            last_ping: c.last_ping.map(fhir_instant),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRes {
    pub id: String,
    pub name: String,
    pub beds: u32,
    pub nurse_call_vendor: String,
    pub status: String,
    /// `YYYY-MM-DD`.
    pub setup_date: String,
    pub location: String,
}

impl From<HospitalRecord> for HospitalRes {
    fn from(h: HospitalRecord) -> Self {
        Self {
            id: h.id,
            name: h.name.to_string(),
            beds: h.beds,
            nurse_call_vendor: h.nurse_call_vendor.to_string(),
            status: h.status.to_string(),
            setup_date: h.setup_date.to_string(),
            location: h.location.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SnapshotRes {
    pub metrics: MetricsRes,
    pub requests: Vec<RequestRes>,
    pub connectors: Vec<ConnectorRes>,
    pub hospitals: Vec<HospitalRes>,
}

impl From<StoreSnapshot> for SnapshotRes {
    fn from(s: StoreSnapshot) -> Self {
        Self {
            metrics: s.metrics.into(),
            requests: s.requests.into_iter().map(Into::into).collect(),
            connectors: s.connectors.into_iter().map(Into::into).collect(),
            hospitals: s.hospitals.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestsRes {
    /// Newest first.
    pub requests: Vec<RequestRes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConnectorsRes {
    pub connectors: Vec<ConnectorRes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HospitalsRes {
    pub hospitals: Vec<HospitalRes>,
}

/// Query parameters for `GET /requests`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestsQuery {
    /// Return at most this many of the newest requests.
    pub limit: Option<usize>,
}
