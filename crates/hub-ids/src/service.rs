//! Identifier implementations.

use crate::{IdError, IdResult};
use rand::Rng;
use std::{fmt, str::FromStr};

use ::uuid::Uuid;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// HL7 v2 message control ID (upper-case base-36, 10 to 13 characters).
///
/// # Construction
/// - [`ControlId::generate`] draws a fresh random identifier.
/// - [`ControlId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(String);

impl ControlId {
    /// Shortest control ID the hub emits.
    pub const MIN_LEN: usize = 10;
    /// Longest control ID the hub emits.
    pub const MAX_LEN: usize = 13;

    /// Generates a new random control ID.
    ///
    /// The length is drawn uniformly from `MIN_LEN..=MAX_LEN`; every character is drawn
    /// uniformly from the base-36 alphabet.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let len = rng.gen_range(Self::MIN_LEN..=Self::MAX_LEN);
        let id = (0..len)
            .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    /// Validates a control ID that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` has the wrong length or contains anything
    /// other than `0-9` and `A-Z`.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(IdError::InvalidInput(format!(
            "control ID must be {}-{} upper-case base-36 characters, got: '{}'",
            Self::MIN_LEN,
            Self::MAX_LEN,
            input
        )))
    }

    /// Returns true if `input` is a canonical control ID.
    pub fn is_canonical(input: &str) -> bool {
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&input.len())
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'Z'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ControlId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlId::parse(s)
    }
}

/// FHIR resource id: a random version-4 UUID, displayed hyphenated and lower-case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Generates a new resource id from `rng`.
    ///
    /// The version nibble is forced to `4` and the variant bits to RFC 4122, so the textual form
    /// always matches `xxxxxxxx-xxxx-4xxx-[89ab]xxx-xxxxxxxxxxxx`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes: [u8; 16] = rng.gen();
        Self(::uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Validates a hyphenated lower-case version-4 UUID.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_canonical(input) {
            let uuid = Uuid::parse_str(input)
                .map_err(|e| IdError::InvalidInput(format!("invalid resource id: {e}")))?;
            return Ok(Self(uuid));
        }
        Err(IdError::InvalidInput(format!(
            "resource id must be a hyphenated lower-case v4 UUID, got: '{}'",
            input
        )))
    }

    /// Returns true if `input` is a hyphenated lower-case version-4 UUID.
    pub fn is_canonical(input: &str) -> bool {
        let bytes = input.as_bytes();
        if bytes.len() != 36 {
            return false;
        }
        for (idx, b) in bytes.iter().enumerate() {
            let ok = match idx {
                8 | 13 | 18 | 23 => *b == b'-',
                14 => *b == b'4',
                19 => matches!(b, b'8' | b'9' | b'a' | b'b'),
                _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ResourceId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{ControlId, ResourceId};

    impl serde::Serialize for ControlId {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> serde::Deserialize<'de> for ControlId {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            ControlId::parse(&s).map_err(serde::de::Error::custom)
        }
    }

    impl serde::Serialize for ResourceId {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> serde::Deserialize<'de> for ResourceId {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            ResourceId::parse(&s).map_err(serde::de::Error::custom)
        }
    }
}
