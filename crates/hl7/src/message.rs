//! The structured form of a synthesized HL7 v2 message.

use crate::wire::{self, Segment};
use chrono::{DateTime, Utc};
use hub_ids::ControlId;
use hub_types::Priority;
use serde::Serialize;

/// Message type emitted in `MSH-9`.
pub const MESSAGE_TYPE: &str = "ADT^A01";

/// HL7 version emitted in `MSH-12`.
pub const HL7_VERSION: &str = "2.5";

/// A synthesized nurse-call event in HL7 v2 form.
///
/// Values are created fresh per synthesis and never mutated; `raw_message` is assembled from
/// the other fields at construction time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hl7Message {
    /// `MSH-9`, always [`MESSAGE_TYPE`].
    pub message_type: &'static str,

    /// `MSH-10`, random and near-unique.
    pub message_control_id: ControlId,

    /// Instant the message was synthesized.
    pub created_at: DateTime<Utc>,

    /// `MSH-7` in `YYYYMMDDHHMMSS` form.
    pub timestamp: String,

    /// `PID-3`, e.g. `MRN482913`.
    pub patient_id: String,

    /// `PID-5` in `Last^First` form.
    pub patient_name: String,

    /// Floor digit followed by a two-digit room, e.g. `407`.
    pub room_number: String,

    /// `A` or `B`.
    pub bed_number: String,

    /// Canned clinical phrase carried in `OBX|1`.
    pub request_type: String,

    /// Carried in `OBX|2`.
    pub priority: Priority,

    /// Nurse station carried in `PV1-3.1`, e.g. `NS-3B`.
    pub nurse_station_id: String,

    /// CR-joined wire text.
    pub raw_message: String,
}

impl Hl7Message {
    /// Splits [`Hl7Message::raw_message`] into segments.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        wire::split_segments(&self.raw_message)
    }

    /// Patient name with the component separator replaced by a space (`Smith James`).
    pub fn display_name(&self) -> String {
        self.patient_name.replacen('^', " ", 1)
    }

    /// Room and bed as shown on dashboards (`407-B`).
    pub fn room_and_bed(&self) -> String {
        format!("{}-{}", self.room_number, self.bed_number)
    }
}
