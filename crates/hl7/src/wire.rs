//! HL7 v2 wire assembly and splitting.
//!
//! Layout of every message the hub emits (segments joined by `\r`):
//!
//! ```text
//! MSH|^~\&|NURSE_CALL|HOSPITAL|PATIENT_COMPANION|INTEGRATION_HUB|<ts>||ADT^A01|<ctrlId>|P|2.5
//! PID|1||<patientId>||<last^first>||19800101|M|||<room>^<bed>|||||||
//! PV1|1|I|<station>^<room>^<bed>||||||||||||||||
//! OBX|1|ST|REQUEST_TYPE||<request>||||||F
//! OBX|2|ST|PRIORITY||<priority>||||||F
//! ```
//!
//! Downstream compatibility demos compare this text byte for byte.

use crate::message::{HL7_VERSION, MESSAGE_TYPE};
use crate::{Hl7Error, Hl7Result};
use hub_types::Priority;

pub const SEGMENT_SEPARATOR: char = '\r';
pub const FIELD_SEPARATOR: char = '|';
pub const COMPONENT_SEPARATOR: char = '^';
/// `MSH-2`: component, repetition, escape and sub-component characters.
pub const ENCODING_CHARACTERS: &str = "^~\\&";

pub const SENDING_APPLICATION: &str = "NURSE_CALL";
pub const SENDING_FACILITY: &str = "HOSPITAL";
pub const RECEIVING_APPLICATION: &str = "PATIENT_COMPANION";
pub const RECEIVING_FACILITY: &str = "INTEGRATION_HUB";
/// `MSH-11`: production.
pub const PROCESSING_ID: &str = "P";

/// Placeholder demographics carried in `PID-7` and `PID-8`.
const PLACEHOLDER_BIRTH_DATE: &str = "19800101";
const PLACEHOLDER_SEX: &str = "M";

const OBX_REQUEST_TYPE: &str = "REQUEST_TYPE";
const OBX_PRIORITY: &str = "PRIORITY";

/// Field values needed to assemble one message.
#[derive(Debug, Clone, Copy)]
pub struct WireFields<'a> {
    pub timestamp: &'a str,
    pub control_id: &'a str,
    pub patient_id: &'a str,
    pub patient_name: &'a str,
    pub room_number: &'a str,
    pub bed_number: &'a str,
    pub nurse_station_id: &'a str,
    pub request_type: &'a str,
    pub priority: Priority,
}

/// Assembles the five-segment wire text.
pub fn assemble(f: &WireFields<'_>) -> String {
    let segments = [
        format!(
            "MSH|{ENCODING_CHARACTERS}|{SENDING_APPLICATION}|{SENDING_FACILITY}|{RECEIVING_APPLICATION}|{RECEIVING_FACILITY}|{}||{MESSAGE_TYPE}|{}|{PROCESSING_ID}|{HL7_VERSION}",
            f.timestamp, f.control_id
        ),
        format!(
            "PID|1||{}||{}||{PLACEHOLDER_BIRTH_DATE}|{PLACEHOLDER_SEX}|||{}^{}|||||||",
            f.patient_id, f.patient_name, f.room_number, f.bed_number
        ),
        format!(
            "PV1|1|I|{}^{}^{}||||||||||||||||",
            f.nurse_station_id, f.room_number, f.bed_number
        ),
        format!("OBX|1|ST|{OBX_REQUEST_TYPE}||{}||||||F", f.request_type),
        format!("OBX|2|ST|{OBX_PRIORITY}||{}||||||F", f.priority.as_str()),
    ];

    segments.join(&SEGMENT_SEPARATOR.to_string())
}

/// One `|`-delimited line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Segment<'a> {
    /// Segment identifier (`MSH`, `PID`, ...).
    pub fn id(&self) -> &'a str {
        self.fields[0]
    }

    /// Field `n` counted from the segment identifier.
    ///
    /// For every segment except `MSH` this matches HL7 numbering (`PID-3` is `field(3)`).
    /// In `MSH` the field separator itself is `MSH-1`, so `field(n)` is `MSH-(n+1)`.
    pub fn field(&self, n: usize) -> Option<&'a str> {
        self.fields.get(n).copied()
    }

    /// Number of fields including the identifier.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.len() <= 1
    }
}

/// Splits wire text into segments. Empty lines are skipped.
pub fn split_segments(raw: &str) -> Vec<Segment<'_>> {
    raw.split(SEGMENT_SEPARATOR)
        .filter(|line| !line.is_empty())
        .map(|line| Segment {
            fields: line.split(FIELD_SEPARATOR).collect(),
        })
        .collect()
}

/// The nurse-call payload read back from wire text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hl7Summary {
    pub timestamp: String,
    pub control_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub room_number: String,
    pub bed_number: String,
    pub nurse_station_id: String,
    pub request_type: String,
    pub priority: Priority,
}

/// Reads the nurse-call payload back out of wire text produced by [`assemble`].
///
/// # Errors
///
/// Returns [`Hl7Error`] if a required segment or field is missing, or if the priority
/// observation is not one of `routine`, `urgent` or `stat`.
pub fn read(raw: &str) -> Hl7Result<Hl7Summary> {
    let segments = split_segments(raw);
    let find = |id: &'static str| {
        segments
            .iter()
            .find(|s| s.id() == id)
            .ok_or(Hl7Error::MissingSegment(id))
    };
    let observation = |code: &'static str| {
        segments
            .iter()
            .find(|s| s.id() == "OBX" && s.field(3) == Some(code))
            .ok_or(Hl7Error::MissingSegment(code))
    };
    let field = |segment: &Segment<'_>, id: &'static str, n: usize| {
        segment
            .field(n)
            .map(str::to_owned)
            .ok_or(Hl7Error::MissingField { segment: id, field: n })
    };

    let msh = find("MSH")?;
    let pid = find("PID")?;
    let pv1 = find("PV1")?;
    let obx_request = observation(OBX_REQUEST_TYPE)?;
    let obx_priority = observation(OBX_PRIORITY)?;

    let location = field(pv1, "PV1", 3)?;
    let mut components = location.split(COMPONENT_SEPARATOR);
    let (station, room, bed) = match (components.next(), components.next(), components.next()) {
        (Some(station), Some(room), Some(bed)) => (station, room, bed),
        _ => {
            return Err(Hl7Error::InvalidField(format!(
                "PV1-3 must be station^room^bed, got '{location}'"
            )))
        }
    };

    let priority_text = field(obx_priority, "OBX", 5)?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        Hl7Error::InvalidField(format!("unknown priority '{priority_text}'"))
    })?;

    Ok(Hl7Summary {
        timestamp: field(msh, "MSH", 6)?,
        control_id: field(msh, "MSH", 9)?,
        patient_id: field(pid, "PID", 3)?,
        patient_name: field(pid, "PID", 5)?,
        room_number: room.to_owned(),
        bed_number: bed.to_owned(),
        nurse_station_id: station.to_owned(),
        request_type: field(obx_request, "OBX", 5)?,
        priority,
    })
}
