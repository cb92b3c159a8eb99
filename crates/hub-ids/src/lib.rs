//! Message and resource identifiers.
//!
//! The hub mints two kinds of identifier, one per message family:
//!
//! ## HL7 v2 message control ID (`MSH-10`)
//! - Characters: `0-9` and `A-Z` (upper-case base-36)
//! - Length: 10 to 13 characters
//! - Example: `K3J9QZ0T1B7`
//!
//! Control IDs are random and collisions are not checked. Across a retained window of a few
//! hundred messages they are unique with overwhelming probability, which is all the demo needs.
//!
//! ## FHIR resource id
//! - A random version-4 UUID in hyphenated lower-case form
//! - Example: `550e8400-e29b-41d4-a716-446655440000`
//!
//! Both types guarantee their canonical form once constructed; use `parse` to validate
//! externally supplied strings.

mod service;

pub use service::{ControlId, ResourceId};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
