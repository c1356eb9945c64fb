//! Snapshot import/export.
//!
//! A snapshot is a versioned JSON envelope wrapping one complete Analysis.
//! The field names are byte-exact compatibility contract; unknown extra
//! fields are tolerated on import. Import validates only the envelope tag
//! and version before decoding the body through the typed model: missing
//! optional fields fill with defaults, type-level corruption fails the
//! import, and a failed import never mutates the in-memory Analysis.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SnapshotError, SnapshotResult};
use crate::model::Analysis;
use crate::store::AnalysisStore;

/// Envelope format tag. Exact match required on import.
pub const SNAPSHOT_FORMAT: &str = "firstp-analysis";

/// Envelope schema version. Exact match required on import.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The portable envelope wrapping an exported Analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEnvelope {
    /// Fixed format tag.
    pub format: String,
    /// Fixed schema version.
    pub version: u32,
    /// When the envelope was produced.
    pub exported_at: DateTime<Utc>,
    /// The wrapped document.
    pub analysis: Analysis,
}

/// Produce an envelope for the store's current document.
///
/// Bumps the aggregate's export counter first, so the side effect is
/// observable on the live document and the envelope carries the bumped
/// value.
pub fn export(store: &mut AnalysisStore) -> SnapshotEnvelope {
    store.record_export();
    let analysis = store.analysis().clone();
    info!(
        analysis_id = %analysis.id,
        export_count = analysis.metadata.export_count,
        "Exported analysis snapshot"
    );
    SnapshotEnvelope {
        format: SNAPSHOT_FORMAT.to_string(),
        version: SNAPSHOT_VERSION,
        exported_at: Utc::now(),
        analysis,
    }
}

/// Validate an envelope and return the contained Analysis.
///
/// Fails fast on a tag or version mismatch. The caller replaces its
/// document only on success, so a failed import leaves the current
/// analysis untouched.
pub fn import(envelope: SnapshotEnvelope) -> SnapshotResult<Analysis> {
    if envelope.format != SNAPSHOT_FORMAT {
        return Err(SnapshotError::InvalidFormat {
            expected: SNAPSHOT_FORMAT.to_string(),
            found: envelope.format,
        });
    }
    if envelope.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            expected: SNAPSHOT_VERSION,
            found: envelope.version,
        });
    }
    Ok(envelope.analysis)
}

/// Parse and validate a snapshot from raw JSON.
pub fn import_json(json: &str) -> SnapshotResult<Analysis> {
    // Peek at the envelope tag before decoding the full body, so a wrong
    // format is reported as such rather than as an arbitrary decode error.
    #[derive(Deserialize)]
    struct EnvelopeHead {
        format: Option<String>,
        version: Option<u32>,
    }

    let head: EnvelopeHead = serde_json::from_str(json)?;
    match head.format {
        Some(ref format) if format == SNAPSHOT_FORMAT => {}
        Some(format) => {
            return Err(SnapshotError::InvalidFormat {
                expected: SNAPSHOT_FORMAT.to_string(),
                found: format,
            })
        }
        None => {
            return Err(SnapshotError::InvalidFormat {
                expected: SNAPSHOT_FORMAT.to_string(),
                found: "(missing)".to_string(),
            })
        }
    }
    match head.version {
        Some(SNAPSHOT_VERSION) => {}
        Some(version) => {
            return Err(SnapshotError::UnsupportedVersion {
                expected: SNAPSHOT_VERSION,
                found: version,
            })
        }
        None => {
            return Err(SnapshotError::UnsupportedVersion {
                expected: SNAPSHOT_VERSION,
                found: 0,
            })
        }
    }

    let envelope: SnapshotEnvelope = serde_json::from_str(json)?;
    import(envelope)
}

/// Export the store's document to a pretty-printed snapshot file.
pub fn write_snapshot(store: &mut AnalysisStore, path: &Path) -> SnapshotResult<()> {
    let envelope = export(store);
    let json = serde_json::to_string_pretty(&envelope)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "Wrote snapshot file");
    Ok(())
}

/// Read and validate a snapshot file, returning the contained Analysis.
pub fn read_snapshot(path: &Path) -> SnapshotResult<Analysis> {
    let json = fs::read_to_string(path)?;
    let analysis = import_json(&json)?;
    info!(path = %path.display(), analysis_id = %analysis.id, "Read snapshot file");
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_bumps_export_count() {
        let mut store = AnalysisStore::new();
        assert_eq!(store.analysis().metadata.export_count, 0);

        let envelope = export(&mut store);

        assert_eq!(envelope.format, SNAPSHOT_FORMAT);
        assert_eq!(envelope.version, SNAPSHOT_VERSION);
        assert_eq!(envelope.analysis.metadata.export_count, 1);
        assert_eq!(store.analysis().metadata.export_count, 1);
    }

    #[test]
    fn test_round_trip_preserves_document() {
        let mut store = AnalysisStore::new();
        store.set_original_input("why is shipping slow");
        store.select_framing("what makes shipping feel slow to customers");

        let before = store.analysis().clone();
        let envelope = export(&mut store);
        let imported = import(envelope).unwrap();

        assert_eq!(imported.id, before.id);
        assert_eq!(imported.framing, before.framing);
        assert_eq!(
            imported.metadata.export_count,
            before.metadata.export_count + 1
        );
    }

    #[test]
    fn test_import_rejects_wrong_format() {
        let mut store = AnalysisStore::new();
        let mut envelope = export(&mut store);
        envelope.format = "not-an-analysis".to_string();

        let err = import(envelope).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat { .. }));
    }

    #[test]
    fn test_import_rejects_wrong_version() {
        let mut store = AnalysisStore::new();
        let mut envelope = export(&mut store);
        envelope.version = 2;

        let err = import(envelope).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion {
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_import_json_reports_missing_tag() {
        let err = import_json(r#"{"analysis": {}}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat { .. }));
    }

    #[test]
    fn test_import_json_tolerates_unknown_envelope_fields() {
        let mut store = AnalysisStore::new();
        let envelope = export(&mut store);
        let mut value = serde_json::to_value(&envelope).unwrap();
        value["futureExtension"] = serde_json::json!(true);

        let analysis = import_json(&value.to_string()).unwrap();
        assert_eq!(analysis.id, store.analysis().id);
    }

    #[test]
    fn test_import_json_rejects_type_corruption() {
        let mut store = AnalysisStore::new();
        let envelope = export(&mut store);
        let mut value = serde_json::to_value(&envelope).unwrap();
        // assumptions must be a list; a string is type-level corruption.
        value["analysis"]["assumptions"] = serde_json::json!("oops");

        let err = import_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed { .. }));
    }

    #[test]
    fn test_import_json_fills_missing_collections() {
        let mut store = AnalysisStore::new();
        let envelope = export(&mut store);
        let mut value = serde_json::to_value(&envelope).unwrap();
        value["analysis"]
            .as_object_mut()
            .unwrap()
            .remove("solutions");

        let analysis = import_json(&value.to_string()).unwrap();
        assert!(analysis.solutions.is_empty());
    }
}
