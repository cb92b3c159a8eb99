//! HL7 v2 wire support for the nurse-call integration hub.
//!
//! This crate provides:
//! - [`Hl7Synthesizer`], which draws realistic nurse-call events and renders them as
//!   `ADT^A01` messages (MSH, PID, PV1 and two OBX segments)
//! - [`wire`] helpers that assemble and split the pipe-delimited wire text
//!
//! No transport is involved: messages exist only as in-process values and strings.

pub mod message;
pub mod synthesizer;
pub mod wire;

pub use message::Hl7Message;
pub use synthesizer::Hl7Synthesizer;
pub use wire::{Hl7Summary, Segment};

/// Errors returned when reading HL7 wire text back.
#[derive(Debug, thiserror::Error)]
pub enum Hl7Error {
    #[error("missing {0} segment")]
    MissingSegment(&'static str),

    #[error("segment {segment} has no field {field}")]
    MissingField { segment: &'static str, field: usize },

    #[error("invalid field value: {0}")]
    InvalidField(String),
}

/// Type alias for Results that can fail with an [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;
