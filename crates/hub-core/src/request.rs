//! The normalized request shape both synthesizers fold into.

use chrono::{DateTime, Utc};
use fhir::{CommunicationData, CommunicationStatus};
use hl7::Hl7Message;
use hub_types::{Priority, RequestStatus, SourceProtocol, Vendor};
use serde::{Deserialize, Serialize};

/// A patient request as the store sees it, independent of its source protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRequestEvent {
    pub id: String,
    pub patient_name: String,
    pub room_number: String,
    pub request_type: String,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
    pub vendor: Vendor,
    pub source_protocol: SourceProtocol,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ClinicalRequestEvent {
    /// Normalizes an HL7 message. HL7 carries no vendor, so the caller supplies one.
    pub fn from_hl7(message: &Hl7Message, vendor: Vendor) -> Self {
        Self {
            id: message.message_control_id.to_string(),
            patient_name: message.display_name(),
            room_number: message.room_and_bed(),
            request_type: message.request_type.clone(),
            priority: message.priority,
            timestamp: message.created_at,
            vendor,
            source_protocol: SourceProtocol::Hl7V2,
            status: RequestStatus::Pending,
            completed_at: None,
        }
    }

    /// Normalizes a FHIR communication. The resource carries no room, so the caller supplies one.
    pub fn from_fhir(data: &CommunicationData, room_number: impl Into<String>) -> Self {
        let status = request_status(data.status);
        let completed_at = match status {
            RequestStatus::Completed => data.received,
            _ => None,
        };
        Self {
            id: data.id.to_string(),
            patient_name: data.subject.display.clone(),
            room_number: room_number.into(),
            request_type: data.payload.clone(),
            priority: data.priority.into(),
            timestamp: data.sent,
            vendor: data.vendor,
            source_protocol: SourceProtocol::FhirR4,
            status,
            completed_at,
        }
    }

    /// Minutes from origination to completion, when both are known.
    pub fn response_minutes(&self) -> Option<f64> {
        if self.status != RequestStatus::Completed {
            return None;
        }
        let completed_at = self.completed_at?;
        let elapsed = completed_at - self.timestamp;
        Some(elapsed.num_milliseconds() as f64 / 60_000.0)
    }

    /// Checks the common schema: non-empty display fields and `completed_at` only on
    /// completed requests, never before the origination time.
    pub fn is_well_formed(&self) -> bool {
        let text_ok = !self.id.trim().is_empty()
            && !self.patient_name.trim().is_empty()
            && !self.room_number.trim().is_empty()
            && !self.request_type.trim().is_empty();
        let completion_ok = match (self.status, self.completed_at) {
            (RequestStatus::Completed, Some(at)) => at >= self.timestamp,
            (RequestStatus::Completed, None) => true,
            (_, completed_at) => completed_at.is_none(),
        };
        text_ok && completion_ok
    }
}

/// Maps the FHIR communication lifecycle onto the store's request lifecycle.
pub fn request_status(status: CommunicationStatus) -> RequestStatus {
    match status {
        CommunicationStatus::Preparation | CommunicationStatus::OnHold => RequestStatus::Pending,
        CommunicationStatus::InProgress => RequestStatus::InProgress,
        CommunicationStatus::Completed => RequestStatus::Completed,
    }
}
