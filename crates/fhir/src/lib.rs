//! FHIR R4 wire/boundary support for the nurse-call integration hub.
//!
//! This crate provides **domain models**, **wire models** and **synthesis** for the one FHIR
//! resource the hub exchanges, `Communication`:
//! - [`CommunicationData`] is the domain-level carrier used by the rest of the workspace
//! - [`Communication`] renders it to (and parses it from) FHIR JSON through a strict wire model
//! - [`CommunicationSynthesizer`] draws realistic nurse-call communications
//!
//! This crate focuses on:
//! - field names and nesting that FHIR consumers can parse
//! - translation between domain primitives and wire structs
//!
//! It does not validate against the official FHIR schemas and performs no transport.

pub mod communication;
pub mod synthesizer;

// Re-export facades
pub use communication::Communication;
pub use synthesizer::CommunicationSynthesizer;

// Re-export public domain-level types
pub use communication::{
    CommunicationData, CommunicationStatus, FhirPriority, NurseCallCategory, NurseStation,
    PatientReference,
};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
