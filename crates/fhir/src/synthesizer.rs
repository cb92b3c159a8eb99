//! Random synthesis of nurse-call `Communication` resources.
//!
//! Distribution policies:
//! - category: uniform over the eight [`NurseCallCategory`] values, phrase uniform within it
//! - priority: depends on category (see [`priority_policy`])
//! - status: 10% preparation, 70% in-progress, 20% completed
//! - completed calls are received within ten minutes of being sent

use crate::communication::{
    CommunicationData, CommunicationStatus, FhirPriority, NurseCallCategory, NurseStation,
    PatientReference,
};
use chrono::{DateTime, Duration, DurationRound, Utc};
use hub_ids::ResourceId;
use hub_types::weighted::pick_uniform;
use hub_types::{Vendor, WeightedTable};
use rand::Rng;

pub const FIRST_NAMES: [&str; 6] = ["James", "Mary", "John", "Patricia", "Robert", "Jennifer"];
pub const LAST_NAMES: [&str; 5] = ["Smith", "Johnson", "Williams", "Brown", "Jones"];

/// Upper bound (exclusive) on `received - sent` for completed calls.
pub const MAX_RECEIVE_DELAY_MS: i64 = 10 * 60 * 1000;

pub const PREPARATION_THRESHOLD: f64 = 0.1;
pub const IN_PROGRESS_THRESHOLD: f64 = 0.8;

pub const STATUS_TABLE: WeightedTable<CommunicationStatus> = WeightedTable::new(&[
    (PREPARATION_THRESHOLD, CommunicationStatus::Preparation),
    (IN_PROGRESS_THRESHOLD, CommunicationStatus::InProgress),
    (1.0, CommunicationStatus::Completed),
]);

/// Pain management and medication calls: even split between urgent and asap.
pub const MEDICATION_PRIORITY_TABLE: WeightedTable<FhirPriority> =
    WeightedTable::new(&[(0.5, FhirPriority::Urgent), (1.0, FhirPriority::Asap)]);

/// Every other non-emergency call: 80% routine, 20% urgent.
pub const GENERAL_PRIORITY_TABLE: WeightedTable<FhirPriority> =
    WeightedTable::new(&[(0.8, FhirPriority::Routine), (1.0, FhirPriority::Urgent)]);

/// Draws a priority for `category`. Emergencies are always `stat`.
pub fn priority_policy<R: Rng + ?Sized>(category: NurseCallCategory, rng: &mut R) -> FhirPriority {
    match category {
        NurseCallCategory::Emergency => FhirPriority::Stat,
        NurseCallCategory::PainManagement | NurseCallCategory::Medication => {
            MEDICATION_PRIORITY_TABLE.sample(rng)
        }
        _ => GENERAL_PRIORITY_TABLE.sample(rng),
    }
}

/// Synthesizes FHIR nurse-call communications.
///
/// This is a zero-sized type used for namespacing synthesis operations.
pub struct CommunicationSynthesizer;

impl CommunicationSynthesizer {
    /// Synthesizes one communication using the thread RNG and the current time.
    pub fn synthesize() -> CommunicationData {
        Self::synthesize_with(&mut rand::thread_rng(), Utc::now())
    }

    /// Synthesizes `count` communications using the thread RNG and the current time.
    pub fn synthesize_batch(count: usize) -> Vec<CommunicationData> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| Self::synthesize_with(&mut rng, Utc::now()))
            .collect()
    }

    /// Synthesizes one communication from an explicit RNG and clock reading.
    ///
    /// `now` is truncated to millisecond precision so the value survives a JSON round trip.
    pub fn synthesize_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> CommunicationData {
        let sent = now
            .duration_trunc(Duration::milliseconds(1))
            .unwrap_or(now);

        let category = pick_uniform(rng, &NurseCallCategory::ALL);
        let payload = pick_uniform(rng, category.requests()).to_owned();
        let subject = PatientReference {
            id: rng.gen_range(100_000..=999_999),
            display: format!(
                "{} {}",
                pick_uniform(rng, &FIRST_NAMES),
                pick_uniform(rng, &LAST_NAMES)
            ),
        };
        let recipient = pick_uniform(rng, &NurseStation::ALL);
        let vendor = pick_uniform(rng, &Vendor::ALL);
        let priority = priority_policy(category, rng);
        let status = STATUS_TABLE.sample(rng);

        let received = match status {
            CommunicationStatus::Completed => {
                Some(sent + Duration::milliseconds(rng.gen_range(0..MAX_RECEIVE_DELAY_MS)))
            }
            _ => None,
        };

        CommunicationData {
            id: ResourceId::generate(rng),
            status,
            priority,
            category,
            subject,
            recipient,
            payload,
            sent,
            received,
            vendor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Communication;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 7).unwrap() + Duration::microseconds(123_456)
    }

    #[test]
    fn emergency_calls_are_always_stat() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut emergencies = 0;
        for _ in 0..5_000 {
            let comm = CommunicationSynthesizer::synthesize_with(&mut rng, fixed_now());
            if comm.category == NurseCallCategory::Emergency {
                emergencies += 1;
                assert_eq!(comm.priority, FhirPriority::Stat);
            }
        }
        assert!(emergencies > 0);
    }

    #[test]
    fn priority_policy_respects_category() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..2_000 {
            let p = priority_policy(NurseCallCategory::Medication, &mut rng);
            assert!(matches!(p, FhirPriority::Urgent | FhirPriority::Asap));
            let p = priority_policy(NurseCallCategory::Comfort, &mut rng);
            assert!(matches!(p, FhirPriority::Routine | FhirPriority::Urgent));
        }
    }

    #[test]
    fn completed_calls_are_received_within_ten_minutes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut completed = 0;
        for _ in 0..5_000 {
            let comm = CommunicationSynthesizer::synthesize_with(&mut rng, fixed_now());
            match comm.status {
                CommunicationStatus::Completed => {
                    completed += 1;
                    let received = comm.received.expect("completed calls carry received");
                    assert!(received >= comm.sent);
                    assert!(received - comm.sent < Duration::minutes(10));
                }
                _ => assert!(comm.received.is_none()),
            }
        }
        assert!(completed > 0);
    }

    #[test]
    fn status_frequencies_match_policy() {
        let mut rng = StdRng::seed_from_u64(4);
        let n = 20_000;
        let mut counts = [0usize; 3];
        for _ in 0..n {
            match CommunicationSynthesizer::synthesize_with(&mut rng, fixed_now()).status {
                CommunicationStatus::Preparation => counts[0] += 1,
                CommunicationStatus::InProgress => counts[1] += 1,
                CommunicationStatus::Completed => counts[2] += 1,
                CommunicationStatus::OnHold => panic!("on-hold is never drawn"),
            }
        }
        let freq = |c: usize| c as f64 / n as f64;
        assert!((freq(counts[0]) - 0.1).abs() < 0.02);
        assert!((freq(counts[1]) - 0.7).abs() < 0.02);
        assert!((freq(counts[2]) - 0.2).abs() < 0.02);
    }

    #[test]
    fn payload_comes_from_the_category_list() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1_000 {
            let comm = CommunicationSynthesizer::synthesize_with(&mut rng, fixed_now());
            assert!(comm.category.requests().contains(&comm.payload.as_str()));
            assert!((100_000..=999_999).contains(&comm.subject.id));
            let (first, last) = comm.subject.display.split_once(' ').expect("first last");
            assert!(FIRST_NAMES.contains(&first));
            assert!(LAST_NAMES.contains(&last));
        }
    }

    #[test]
    fn synthesized_resources_survive_a_json_round_trip() {
        let mut rng = StdRng::seed_from_u64(6);
        let comm = CommunicationSynthesizer::synthesize_with(&mut rng, fixed_now());
        assert_eq!(comm.sent.timestamp_subsec_micros() % 1_000, 0);

        let json = Communication::render(&comm).expect("render");
        assert_eq!(Communication::parse(&json).expect("parse"), comm);
    }

    #[test]
    fn batch_produces_unique_ids() {
        let batch = CommunicationSynthesizer::synthesize_batch(50);
        let mut ids: Vec<String> = batch.iter().map(|c| c.id.to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }
}
