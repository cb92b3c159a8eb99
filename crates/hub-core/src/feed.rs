//! The synthetic request feed: draws an HL7 or FHIR event and normalizes it.

use crate::constants::{FHIR_ROOM_MAX, FHIR_ROOM_MIN};
use crate::request::ClinicalRequestEvent;
use chrono::{DateTime, Utc};
use fhir::CommunicationSynthesizer;
use hl7::Hl7Synthesizer;
use hub_types::weighted::pick_uniform;
use hub_types::Vendor;
use rand::Rng;

/// Zero-sized namespace for feed operations.
pub struct RequestFeed;

impl RequestFeed {
    /// Draws the next normalized request: HL7 or FHIR with equal probability.
    pub fn next_event<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> ClinicalRequestEvent {
        if rng.gen_bool(0.5) {
            Self::next_hl7(rng, now)
        } else {
            Self::next_fhir(rng, now)
        }
    }

    /// An HL7-sourced request attributed to a uniformly drawn vendor.
    pub fn next_hl7<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> ClinicalRequestEvent {
        let message = Hl7Synthesizer::synthesize_with(rng, now);
        let vendor = pick_uniform(rng, &Vendor::ALL);
        ClinicalRequestEvent::from_hl7(&message, vendor)
    }

    /// A FHIR-sourced request placed in a uniformly drawn room.
    pub fn next_fhir<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> ClinicalRequestEvent {
        let data = CommunicationSynthesizer::synthesize_with(rng, now);
        let room = rng.gen_range(FHIR_ROOM_MIN..=FHIR_ROOM_MAX);
        ClinicalRequestEvent::from_fhir(&data, room.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AggregationStore;
    use chrono::TimeZone;
    use hub_types::{RequestStatus, SourceProtocol};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn both_protocols_produce_the_common_schema() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut hl7 = 0;
        let mut fhir = 0;
        for _ in 0..2_000 {
            let event = RequestFeed::next_event(&mut rng, now());
            assert!(event.is_well_formed(), "{event:?}");
            match event.source_protocol {
                SourceProtocol::Hl7V2 => {
                    hl7 += 1;
                    assert_eq!(event.status, RequestStatus::Pending);
                    assert!(event.room_number.contains('-'));
                }
                SourceProtocol::FhirR4 => {
                    fhir += 1;
                    let room: u32 = event.room_number.parse().expect("numeric room");
                    assert!((FHIR_ROOM_MIN..=FHIR_ROOM_MAX).contains(&room));
                }
            }
        }
        assert!((hl7 as f64 / 2_000.0 - 0.5).abs() < 0.05);
        assert!((fhir as f64 / 2_000.0 - 0.5).abs() < 0.05);
    }

    #[test]
    fn feeding_a_store_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(32);
        let store = AggregationStore::new(20);
        for _ in 0..200 {
            store.ingest_request(RequestFeed::next_event(&mut rng, now()));
        }
        let snap = store.snapshot();
        assert_eq!(snap.requests.len(), 20);
        assert_eq!(snap.metrics.total_requests, 200);
        let active = snap.requests.iter().filter(|r| r.status.is_active()).count();
        assert_eq!(snap.metrics.active_requests, active);
    }
}
