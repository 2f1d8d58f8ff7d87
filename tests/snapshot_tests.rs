//! Snapshot document and store tests

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use relsnap::snapshot::{Row, Snapshot, SnapshotMetadata, store};

fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    let mut row = Row::new();
    for (key, value) in pairs {
        row.insert(key.to_string(), value.clone());
    }
    row
}

fn sample_snapshot() -> Snapshot {
    let mut data = BTreeMap::new();
    data.insert(
        "parent".to_string(),
        vec![row(&[
            ("id", serde_json::json!(1)),
            ("name", serde_json::json!("A")),
            ("created_at", serde_json::json!("2026-08-01T10:00:00+00:00")),
        ])],
    );
    data.insert(
        "child".to_string(),
        vec![row(&[
            ("id", serde_json::json!(1)),
            ("parent_id", serde_json::json!(1)),
        ])],
    );

    let mut sequences = BTreeMap::new();
    sequences.insert("parent".to_string(), 1);
    sequences.insert("child".to_string(), 1);

    Snapshot {
        metadata: SnapshotMetadata {
            exported_at: Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap(),
            source: "staging".to_string(),
            schema: "public".to_string(),
            table_count: 3,
            export_order: vec![
                "parent".to_string(),
                "child".to_string(),
                "empty_table".to_string(),
            ],
        },
        sequences,
        data,
    }
}

mod document {
    use super::*;

    #[test]
    fn serde_round_trip_is_lossless() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn metadata_uses_camel_case_wire_names() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();
        let metadata = &json["metadata"];
        assert!(metadata.get("exportedAt").is_some());
        assert!(metadata.get("tableCount").is_some());
        assert_eq!(
            metadata["exportOrder"],
            serde_json::json!(["parent", "child", "empty_table"])
        );
        assert_eq!(metadata["schema"], "public");
        assert_eq!(metadata["source"], "staging");
    }

    #[test]
    fn column_order_survives_the_round_trip() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(
            restored.columns_of("parent"),
            vec!["id", "name", "created_at"]
        );
    }

    #[test]
    fn data_keys_are_a_subset_of_export_order() {
        let snapshot = sample_snapshot();
        for table in snapshot.data.keys() {
            assert!(snapshot.metadata.export_order.contains(table));
        }
        // table_count covers empty tables too
        assert_eq!(snapshot.metadata.table_count, 3);
        assert_eq!(snapshot.row_count("empty_table"), 0);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let json = r#"{
            "metadata": {
                "exportedAt": "2026-08-01T10:00:00Z",
                "source": "staging",
                "schema": "public",
                "tableCount": 0,
                "exportOrder": []
            }
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.sequences.is_empty());
        assert!(snapshot.data.is_empty());
        assert_eq!(snapshot.total_rows(), 0);
    }
}

mod file_store {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let snapshot = sample_snapshot();
        store::save(&path, &snapshot).unwrap();
        let restored = store::load(&path).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backups").join("2026").join("snap.json");

        store::save(&path, &sample_snapshot()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn loading_a_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = store::load(&dir.path().join("absent.json"));
        assert!(matches!(
            result,
            Err(relsnap::snapshot::SnapshotStoreError::Read { .. })
        ));
    }

    #[test]
    fn loading_malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = store::load(&path);
        assert!(matches!(
            result,
            Err(relsnap::snapshot::SnapshotStoreError::Parse { .. })
        ));
    }
}
