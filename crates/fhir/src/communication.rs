//! FHIR R4 `Communication` domain types, wire model and translation helpers.
//!
//! Responsibilities:
//! - Define public domain-level types for the rest of the workspace
//! - Define a strict wire model (`CommunicationWire`) for JSON serialisation/deserialisation
//! - Provide translation helpers between domain primitives and the wire model
//! - Enforce that `received` appears only on completed calls and is not earlier than `sent`
//!
//! Notes:
//! - Only the subset of `Communication` used by nurse-call requests is modelled
//! - `sender` always mirrors `subject`: the patient raises the call

use crate::{FhirError, FhirResult};
use chrono::{DateTime, Utc};
use hub_ids::ResourceId;
use hub_types::timestamp::{fhir_instant, parse_fhir_instant};
use hub_types::{Priority, Vendor};
use serde::{Deserialize, Serialize};

/// `resourceType` of every resource this module reads or writes.
pub const RESOURCE_TYPE: &str = "Communication";

/// Code system for the category coding.
pub const CATEGORY_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/communication-category";

/// `meta.versionId` of freshly synthesized resources.
pub const INITIAL_VERSION_ID: &str = "1";

const PATIENT_REFERENCE_PREFIX: &str = "Patient/";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for a nurse-call `Communication`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommunicationData {
    /// Resource id (random v4 UUID).
    pub id: ResourceId,

    /// Workflow status of the call.
    pub status: CommunicationStatus,

    /// Four-level FHIR priority.
    pub priority: FhirPriority,

    /// Single category coding.
    pub category: NurseCallCategory,

    /// Patient raising the call; also rendered as `sender`.
    pub subject: PatientReference,

    /// Nurse station the call is routed to.
    pub recipient: NurseStation,

    /// The request text, rendered as `payload[0].contentString`.
    pub payload: String,

    /// Instant the call was raised. Also rendered as `meta.lastUpdated`.
    pub sent: DateTime<Utc>,

    /// Instant the call was acknowledged; only present once completed.
    pub received: Option<DateTime<Utc>>,

    /// Originating nurse-call system, rendered into `meta.source`.
    pub vendor: Vendor,
}

impl CommunicationData {
    /// `topic.text` derived from the category.
    pub fn topic_text(&self) -> String {
        format!("Nurse Call Request - {}", self.category.display())
    }

    /// Time between `sent` and `received`, if the call has been received.
    pub fn response_time(&self) -> Option<chrono::Duration> {
        self.received.map(|received| received - self.sent)
    }
}

/// `Communication.status` values used by nurse calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommunicationStatus {
    Preparation,
    InProgress,
    Completed,
    OnHold,
}

impl CommunicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparation => "preparation",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }
}

/// `Communication.priority` (FHIR `request-priority` value set).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FhirPriority {
    Routine,
    Urgent,
    Asap,
    Stat,
}

impl FhirPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Urgent => "urgent",
            Self::Asap => "asap",
            Self::Stat => "stat",
        }
    }
}

/// Collapses the four-level FHIR scale into the hub's three-level scale.
///
/// | FHIR      | Hub       |
/// |-----------|-----------|
/// | `routine` | `routine` |
/// | `urgent`  | `urgent`  |
/// | `asap`    | `urgent`  |
/// | `stat`    | `stat`    |
///
/// `asap` to `urgent` is lossy: the hub cannot tell the two apart after normalization.
impl From<FhirPriority> for Priority {
    fn from(value: FhirPriority) -> Self {
        match value {
            FhirPriority::Routine => Priority::Routine,
            FhirPriority::Urgent | FhirPriority::Asap => Priority::Urgent,
            FhirPriority::Stat => Priority::Stat,
        }
    }
}

/// The eight nurse-call categories, each with four canned request phrases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NurseCallCategory {
    Assistance,
    PainManagement,
    Hygiene,
    Medication,
    Nutrition,
    Comfort,
    VitalSigns,
    Emergency,
}

impl NurseCallCategory {
    pub const ALL: [NurseCallCategory; 8] = [
        Self::Assistance,
        Self::PainManagement,
        Self::Hygiene,
        Self::Medication,
        Self::Nutrition,
        Self::Comfort,
        Self::VitalSigns,
        Self::Emergency,
    ];

    /// Coding `code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Assistance => "assistance",
            Self::PainManagement => "pain-management",
            Self::Hygiene => "hygiene",
            Self::Medication => "medication",
            Self::Nutrition => "nutrition",
            Self::Comfort => "comfort",
            Self::VitalSigns => "vital-signs",
            Self::Emergency => "emergency",
        }
    }

    /// Coding `display`.
    pub fn display(&self) -> &'static str {
        match self {
            Self::Assistance => "General Assistance",
            Self::PainManagement => "Pain Management",
            Self::Hygiene => "Hygiene Assistance",
            Self::Medication => "Medication Request",
            Self::Nutrition => "Nutrition/Dietary",
            Self::Comfort => "Comfort Request",
            Self::VitalSigns => "Vital Signs Check",
            Self::Emergency => "Emergency",
        }
    }

    /// Canned request phrases for this category.
    pub fn requests(&self) -> &'static [&'static str; 4] {
        match self {
            Self::Assistance => &[
                "Patient requires assistance getting out of bed",
                "Help needed with mobility",
                "Assistance requested for bathroom visit",
                "Patient needs help adjusting position",
            ],
            Self::PainManagement => &[
                "Patient reports pain level 7/10",
                "Pain medication requested",
                "Patient experiencing discomfort",
                "Pain assessment needed",
            ],
            Self::Hygiene => &[
                "Patient requests bed bath",
                "Oral care assistance needed",
                "Patient needs help with grooming",
                "Bedpan requested",
            ],
            Self::Medication => &[
                "Scheduled medication reminder",
                "Patient requesting PRN medication",
                "IV medication due",
                "Pain relief medication needed",
            ],
            Self::Nutrition => &[
                "Patient requesting water",
                "Meal tray assistance needed",
                "Dietary restrictions question",
                "Patient requesting snack",
            ],
            Self::Comfort => &[
                "Extra blanket requested",
                "Room temperature adjustment needed",
                "Pillow adjustment requested",
                "Lighting adjustment needed",
            ],
            Self::VitalSigns => &[
                "Scheduled vital signs check",
                "Patient reports feeling unwell",
                "Blood pressure check requested",
                "Temperature check needed",
            ],
            Self::Emergency => &[
                "Patient experiencing chest pain",
                "Sudden change in condition",
                "Fall detected",
                "Patient in distress",
            ],
        }
    }

    /// Parses a coding `code`.
    pub fn parse(code: &str) -> Result<Self, FhirError> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| FhirError::InvalidInput(format!("Invalid category code: {code}")))
    }
}

/// Reference to the patient raising the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientReference {
    /// Six-digit patient number.
    pub id: u32,

    /// `First Last`.
    pub display: String,
}

impl PatientReference {
    /// `Patient/<id>`.
    pub fn reference(&self) -> String {
        format!("{PATIENT_REFERENCE_PREFIX}{}", self.id)
    }
}

/// Nurse stations a call can be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NurseStation {
    Station2A,
    Station2B,
    Station3A,
    StationIcu,
}

impl NurseStation {
    pub const ALL: [NurseStation; 4] = [
        Self::Station2A,
        Self::Station2B,
        Self::Station3A,
        Self::StationIcu,
    ];

    /// `Practitioner/nurse-station-*` reference.
    pub fn reference(&self) -> &'static str {
        match self {
            Self::Station2A => "Practitioner/nurse-station-2a",
            Self::Station2B => "Practitioner/nurse-station-2b",
            Self::Station3A => "Practitioner/nurse-station-3a",
            Self::StationIcu => "Practitioner/nurse-station-icu",
        }
    }

    /// Display label derived from the reference, e.g. `NURSE STATION ICU`.
    pub fn display(&self) -> String {
        display_from_reference(self.reference())
    }

    /// Inverse of [`NurseStation::reference`].
    pub fn from_reference(reference: &str) -> Result<Self, FhirError> {
        Self::ALL
            .into_iter()
            .find(|s| s.reference() == reference)
            .ok_or_else(|| {
                FhirError::InvalidInput(format!("Unknown nurse station reference: {reference}"))
            })
    }
}

/// Upper-cases the trailing segment of a reference and replaces hyphens with spaces.
fn display_from_reference(reference: &str) -> String {
    reference
        .rsplit('/')
        .next()
        .unwrap_or(reference)
        .to_uppercase()
        .replace('-', " ")
}

// ============================================================================
// Public Communication operations
// ============================================================================

/// Communication resource operations.
///
/// This is a zero-sized type used for namespacing render/parse operations.
pub struct Communication;

impl Communication {
    /// Render a communication as compact FHIR JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialization fails.
    pub fn render(data: &CommunicationData) -> FhirResult<String> {
        Ok(serde_json::to_string(&domain_to_wire(data))?)
    }

    /// Render a communication as indented FHIR JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialization fails.
    pub fn render_pretty(data: &CommunicationData) -> FhirResult<String> {
        Ok(serde_json::to_string_pretty(&domain_to_wire(data))?)
    }

    /// Render a communication as a JSON value (useful for embedding in larger documents).
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialization fails.
    pub fn to_value(data: &CommunicationData) -> FhirResult<serde_json::Value> {
        Ok(serde_json::to_value(domain_to_wire(data))?)
    }

    /// Parse a communication from FHIR JSON.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `category[0].coding`)
    /// to the failing field when the JSON does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the JSON does not match the wire schema or contains unknown keys,
    /// - `resourceType` is not `Communication`,
    /// - `id` is not a hyphenated v4 UUID,
    /// - a reference, category code or `meta.source` is not one the hub knows,
    /// - `sender` does not mirror `subject`,
    /// - `received` is earlier than `sent`.
    pub fn parse(json_text: &str) -> FhirResult<CommunicationData> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let wire = match serde_path_to_error::deserialize::<_, CommunicationWire>(&mut deserializer)
        {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Communication schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_domain(wire)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a `Communication` resource.
///
/// Field order matches the order consumers see in rendered JSON.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CommunicationWire {
    resource_type: String,
    id: String,
    status: CommunicationStatus,
    priority: FhirPriority,
    category: Vec<CodeableConcept>,
    subject: Reference,
    topic: Topic,
    sent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    received: Option<String>,
    recipient: Vec<Reference>,
    sender: Reference,
    payload: Vec<Payload>,
    meta: Meta,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct CodeableConcept {
    coding: Vec<Coding>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct Coding {
    system: String,
    code: String,
    display: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct Reference {
    reference: String,
    display: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct Topic {
    text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Payload {
    content_string: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Meta {
    source: String,
    version_id: String,
    last_updated: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Convert domain types to the wire format.
fn domain_to_wire(data: &CommunicationData) -> CommunicationWire {
    let subject = Reference {
        reference: data.subject.reference(),
        display: data.subject.display.clone(),
    };
    let sent = fhir_instant(data.sent);

    CommunicationWire {
        resource_type: RESOURCE_TYPE.to_owned(),
        id: data.id.to_string(),
        status: data.status,
        priority: data.priority,
        category: vec![CodeableConcept {
            coding: vec![Coding {
                system: CATEGORY_SYSTEM.to_owned(),
                code: data.category.code().to_owned(),
                display: data.category.display().to_owned(),
            }],
        }],
        sender: subject.clone(),
        subject,
        topic: Topic {
            text: data.topic_text(),
        },
        received: data.received.map(fhir_instant),
        recipient: vec![Reference {
            reference: data.recipient.reference().to_owned(),
            display: data.recipient.display(),
        }],
        payload: vec![Payload {
            content_string: data.payload.clone(),
        }],
        meta: Meta {
            source: data.vendor.source_urn(),
            version_id: INITIAL_VERSION_ID.to_owned(),
            last_updated: sent.clone(),
        },
        sent,
    }
}

/// Convert the wire format to domain types, validating identifiers and references.
fn wire_to_domain(wire: CommunicationWire) -> FhirResult<CommunicationData> {
    if wire.resource_type != RESOURCE_TYPE {
        return Err(FhirError::InvalidInput(format!(
            "Expected resourceType {RESOURCE_TYPE}, got {}",
            wire.resource_type
        )));
    }

    let id = ResourceId::parse(&wire.id)
        .map_err(|e| FhirError::InvalidUuid(format!("Invalid id: {e}")))?;

    let coding = wire
        .category
        .first()
        .and_then(|c| c.coding.first())
        .ok_or_else(|| FhirError::InvalidInput("category[0].coding[0] is required".into()))?;
    let category = NurseCallCategory::parse(&coding.code)?;

    let patient_id = wire
        .subject
        .reference
        .strip_prefix(PATIENT_REFERENCE_PREFIX)
        .and_then(|n| n.parse::<u32>().ok())
        .ok_or_else(|| {
            FhirError::InvalidInput(format!(
                "Invalid subject reference: {}",
                wire.subject.reference
            ))
        })?;

    if wire.sender != wire.subject {
        return Err(FhirError::InvalidInput(
            "sender must reference the same patient as subject".into(),
        ));
    }

    let recipient_ref = wire
        .recipient
        .first()
        .ok_or_else(|| FhirError::InvalidInput("recipient[0] is required".into()))?;
    let recipient = NurseStation::from_reference(&recipient_ref.reference)?;

    let payload = wire
        .payload
        .into_iter()
        .next()
        .map(|p| p.content_string)
        .ok_or_else(|| FhirError::InvalidInput("payload[0] is required".into()))?;

    let sent = parse_fhir_instant(&wire.sent)
        .map_err(|e| FhirError::InvalidInput(format!("Invalid sent instant: {e}")))?;
    let received = wire
        .received
        .as_deref()
        .map(parse_fhir_instant)
        .transpose()
        .map_err(|e| FhirError::InvalidInput(format!("Invalid received instant: {e}")))?;
    if let Some(received) = received {
        if wire.status != CommunicationStatus::Completed {
            return Err(FhirError::InvalidInput(format!(
                "received is only allowed on completed calls, status is {}",
                wire.status.as_str()
            )));
        }
        if received < sent {
            return Err(FhirError::InvalidInput(format!(
                "received ({}) is earlier than sent ({})",
                fhir_instant(received),
                fhir_instant(sent)
            )));
        }
    }

    let vendor = Vendor::from_source_urn(&wire.meta.source).ok_or_else(|| {
        FhirError::InvalidInput(format!("Unknown meta.source: {}", wire.meta.source))
    })?;

    Ok(CommunicationData {
        id,
        status: wire.status,
        priority: wire.priority,
        category,
        subject: PatientReference {
            id: patient_id,
            display: wire.subject.display,
        },
        recipient,
        payload,
        sent,
        received,
        vendor,
    })
}
