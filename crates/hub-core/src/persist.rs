//! Saving and restoring the connector and hospital lists.
//!
//! Request history and metrics are never written; they regenerate after a restart.

use crate::connector::{ConnectorRecord, HospitalRecord};
use crate::{HubError, HubResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// The part of the store that survives a restart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub connectors: Vec<ConnectorRecord>,
    #[serde(default)]
    pub hospitals: Vec<HospitalRecord>,
}

/// Reads persisted state from `path`. A missing file yields an empty state.
///
/// # Errors
///
/// Returns [`HubError::PersistRead`] on I/O failure and [`HubError::Deserialization`] if the
/// file is not valid JSON for [`PersistedState`].
pub fn load(path: &Path) -> HubResult<PersistedState> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no persisted state found; starting empty");
            return Ok(PersistedState::default());
        }
        Err(e) => return Err(HubError::PersistRead(e)),
    };
    serde_json::from_str(&contents).map_err(HubError::Deserialization)
}

/// Writes `state` to `path` as pretty JSON, creating parent directories as needed.
///
/// The file is written to a sibling temporary path and renamed into place so a crash never
/// leaves a truncated file behind.
///
/// # Errors
///
/// Returns [`HubError::Serialization`] or [`HubError::PersistWrite`].
pub fn save(path: &Path, state: &PersistedState) -> HubResult<()> {
    let json = serde_json::to_string_pretty(state).map_err(HubError::Serialization)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(HubError::PersistWrite)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(HubError::PersistWrite)?;
    fs::rename(&tmp, path).map_err(HubError::PersistWrite)?;
    tracing::debug!(
        path = %path.display(),
        connectors = state.connectors.len(),
        hospitals = state.hospitals.len(),
        "saved persisted state"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PERSISTED_STATE_FILENAME;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hub_types::{ConnectionStatus, NonEmptyText, Vendor};
    use tempfile::TempDir;

    fn sample_state() -> PersistedState {
        PersistedState {
            connectors: vec![ConnectorRecord::for_vendor(
                Vendor::Hillrom,
                ConnectionStatus::Connected,
                88,
                31_000,
                Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()),
            )],
            hospitals: vec![HospitalRecord {
                id: "h-1".into(),
                name: NonEmptyText::new("General").unwrap(),
                beds: 410,
                nurse_call_vendor: Vendor::Hillrom,
                status: ConnectionStatus::Degraded,
                setup_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                location: NonEmptyText::new("Bristol").unwrap(),
            }],
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().expect("tempdir");
        let state = load(&dir.path().join(PERSISTED_STATE_FILENAME)).expect("load");
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn save_then_load_restores_lists() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join(PERSISTED_STATE_FILENAME);
        let state = sample_state();
        save(&path, &state).expect("save");
        assert_eq!(load(&path).expect("load"), state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_deserialization_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(PERSISTED_STATE_FILENAME);
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(load(&path), Err(HubError::Deserialization(_))));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(PERSISTED_STATE_FILENAME);
        fs::write(&path, r#"{"hospitals": []}"#).expect("write");
        assert_eq!(load(&path).expect("load"), PersistedState::default());
    }
}
