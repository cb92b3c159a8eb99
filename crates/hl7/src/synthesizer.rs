//! Random synthesis of nurse-call `ADT^A01` messages.

use crate::message::{Hl7Message, MESSAGE_TYPE};
use crate::wire::{self, WireFields};
use chrono::{DateTime, Utc};
use hub_ids::ControlId;
use hub_types::timestamp::hl7_timestamp;
use hub_types::weighted::pick_uniform;
use hub_types::{Priority, WeightedTable};
use rand::Rng;

/// Canned clinical phrases carried in `OBX|1`.
pub const REQUEST_TYPES: [&str; 10] = [
    "Pain medication needed",
    "Assistance to bathroom",
    "Request for water",
    "Need blanket",
    "Call button pressed",
    "Family visitor assistance",
    "IV bag replacement",
    "Vitals check requested",
    "Dietary request",
    "Room temperature adjustment",
];

pub const NURSE_STATIONS: [&str; 6] = ["NS-2A", "NS-2B", "NS-3A", "NS-3B", "NS-4A", "NS-ICU"];

pub const FIRST_NAMES: [&str; 10] = [
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Barbara",
];

pub const LAST_NAMES: [&str; 10] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez",
];

pub const BEDS: [&str; 2] = ["A", "B"];

pub const PATIENT_ID_PREFIX: &str = "MRN";

pub const ROUTINE_THRESHOLD: f64 = 0.60;
pub const URGENT_THRESHOLD: f64 = 0.90;

/// 60% routine, 30% urgent, 10% stat.
pub const PRIORITY_TABLE: WeightedTable<Priority> = WeightedTable::new(&[
    (ROUTINE_THRESHOLD, Priority::Routine),
    (URGENT_THRESHOLD, Priority::Urgent),
    (1.0, Priority::Stat),
]);

/// Synthesizes HL7 v2 nurse-call messages.
///
/// This is a zero-sized type used for namespacing synthesis operations.
pub struct Hl7Synthesizer;

impl Hl7Synthesizer {
    /// Synthesizes one message using the thread RNG and the current time.
    pub fn synthesize() -> Hl7Message {
        Self::synthesize_with(&mut rand::thread_rng(), Utc::now())
    }

    /// Synthesizes `count` messages using the thread RNG and the current time.
    pub fn synthesize_batch(count: usize) -> Vec<Hl7Message> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| Self::synthesize_with(&mut rng, Utc::now()))
            .collect()
    }

    /// Synthesizes one message from an explicit RNG and clock reading.
    ///
    /// Every field is an independent draw; duplicates across messages (same patient name,
    /// same room) are expected.
    pub fn synthesize_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Hl7Message {
        let patient_id = format!("{PATIENT_ID_PREFIX}{}", rng.gen_range(100_000..=999_999));
        let first = pick_uniform(rng, &FIRST_NAMES);
        let last = pick_uniform(rng, &LAST_NAMES);
        let patient_name = format!("{last}^{first}");
        let room_number = format!("{}{:02}", rng.gen_range(2..=6), rng.gen_range(1..=50));
        let bed_number = pick_uniform(rng, &BEDS);
        let request_type = pick_uniform(rng, &REQUEST_TYPES);
        let message_control_id = ControlId::generate(rng);
        let nurse_station_id = pick_uniform(rng, &NURSE_STATIONS);
        let priority = PRIORITY_TABLE.sample(rng);
        let timestamp = hl7_timestamp(now);

        let raw_message = wire::assemble(&WireFields {
            timestamp: &timestamp,
            control_id: message_control_id.as_str(),
            patient_id: &patient_id,
            patient_name: &patient_name,
            room_number: &room_number,
            bed_number,
            nurse_station_id,
            request_type,
            priority,
        });

        Hl7Message {
            message_type: MESSAGE_TYPE,
            message_control_id,
            created_at: now,
            timestamp,
            patient_id,
            patient_name,
            room_number,
            bed_number: bed_number.to_owned(),
            request_type: request_type.to_owned(),
            priority,
            nurse_station_id: nurse_station_id.to_owned(),
            raw_message,
        }
    }
}
