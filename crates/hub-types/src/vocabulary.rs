//! Enumerations shared by the synthesizers, the store and the presentation layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-level clinical priority used by the normalized request shape and by HL7 `OBX|2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Routine,
    Urgent,
    Stat,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Routine, Self::Urgent, Self::Stat];

    /// Returns the wire spelling (`routine`, `urgent`, `stat`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Urgent => "urgent",
            Self::Stat => "stat",
        }
    }

    /// Parses the wire spelling, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "routine" => Some(Self::Routine),
            "urgent" => Some(Self::Urgent),
            "stat" => Some(Self::Stat),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a patient request inside the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// A request is active until it reaches [`RequestStatus::Completed`].
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health of a connector or hospital link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Degraded,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Degraded => "degraded",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which synthesizer produced a request. Attribution only; never used by aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceProtocol {
    #[serde(rename = "HL7v2")]
    Hl7V2,
    #[serde(rename = "FHIR-R4")]
    FhirR4,
}

impl SourceProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hl7V2 => "HL7v2",
            Self::FhirR4 => "FHIR-R4",
        }
    }
}

impl fmt::Display for SourceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated nurse-call vendors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Vendor {
    Hillrom,
    Rauland,
    Ascom,
    CriticalAlert,
    WestCom,
}

/// URN prefix carried in FHIR `meta.source`.
pub const SOURCE_URN_PREFIX: &str = "urn:nurse-call-system:";

impl Vendor {
    pub const ALL: [Vendor; 5] = [
        Self::Hillrom,
        Self::Rauland,
        Self::Ascom,
        Self::CriticalAlert,
        Self::WestCom,
    ];

    /// Stable connector identifier, e.g. `critical-alert`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Hillrom => "hillrom",
            Self::Rauland => "rauland",
            Self::Ascom => "ascom",
            Self::CriticalAlert => "critical-alert",
            Self::WestCom => "west-com",
        }
    }

    /// Display name, e.g. `Critical Alert`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hillrom => "Hillrom",
            Self::Rauland => "Rauland",
            Self::Ascom => "Ascom",
            Self::CriticalAlert => "Critical Alert",
            Self::WestCom => "West-Com",
        }
    }

    /// Integration protocol the vendor's connector speaks.
    pub fn protocol(&self) -> &'static str {
        match self {
            Self::Hillrom => "HL7 v2.5",
            Self::Rauland => "RELL Protocol",
            Self::Ascom => "Unite API",
            Self::CriticalAlert => "REST API",
            Self::WestCom => "FHIR R4",
        }
    }

    /// `meta.source` value: the URN prefix followed by the lower-cased display name.
    pub fn source_urn(&self) -> String {
        format!("{SOURCE_URN_PREFIX}{}", self.name().to_lowercase())
    }

    /// Inverse of [`Vendor::source_urn`].
    pub fn from_source_urn(urn: &str) -> Option<Self> {
        let name = urn.strip_prefix(SOURCE_URN_PREFIX)?;
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Looks a vendor up by display name or connector id.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s) || v.id().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_urn_round_trips_for_every_vendor() {
        for vendor in Vendor::ALL {
            let urn = vendor.source_urn();
            assert!(urn.starts_with(SOURCE_URN_PREFIX));
            assert_eq!(urn, urn.to_lowercase());
            assert_eq!(Vendor::from_source_urn(&urn), Some(vendor));
        }
        assert_eq!(
            Vendor::CriticalAlert.source_urn(),
            "urn:nurse-call-system:critical alert"
        );
        assert_eq!(Vendor::from_source_urn("urn:other:hillrom"), None);
    }

    #[test]
    fn request_status_serialises_kebab_case() {
        let json = serde_json::to_string(&RequestStatus::InProgress).expect("serialise");
        assert_eq!(json, "\"in-progress\"");
        assert!(RequestStatus::InProgress.is_active());
        assert!(RequestStatus::Pending.is_active());
        assert!(!RequestStatus::Completed.is_active());
    }

    #[test]
    fn source_protocol_uses_attribution_labels() {
        assert_eq!(
            serde_json::to_string(&SourceProtocol::FhirR4).expect("serialise"),
            "\"FHIR-R4\""
        );
        assert_eq!(SourceProtocol::Hl7V2.to_string(), "HL7v2");
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse("STAT"), Some(Priority::Stat));
        assert_eq!(Priority::parse("asap"), None);
    }
}
