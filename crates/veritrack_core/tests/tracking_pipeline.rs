use std::collections::BTreeSet;
use veritrack_core::reconcile::reconcile_all;
use veritrack_core::status::partition_verification;
use veritrack_core::{decode_name, encode_name, AtomBatch, CertStore, IntervalIndex, Structure};

const ATOMS: &str = r#"{
    "ns:demo/1.0/group#mul_assoc()": {
        "code-path": "src/group.rs",
        "code-text": {"lines-start": 12, "lines-end": 30},
        "code-module": "group",
        "display-name": "mul_assoc"
    },
    "ns:demo/1.0/group#mul_comm()": {
        "code-path": "src/group.rs",
        "code-text": {"lines-start": 40, "lines-end": 55},
        "code-module": "group",
        "dependencies": ["ns:demo/1.0/group#mul_assoc()"],
        "display-name": "mul_comm"
    }
}"#;

const STRUCTURE: &str = r#"{
    "group/mul_assoc.md": {
        "code-path": "src/group.rs",
        "code-line": 12,
        "code-name": null
    },
    "group/mul_comm.md": {
        "code-path": "src/old_group.rs",
        "code-line": 40,
        "code-name": "ns:demo/1.0/group#mul_comm()"
    },
    "group/ghost.md": {
        "code-path": "src/group.rs",
        "code-line": 99,
        "code-name": null
    }
}"#;

#[test]
fn reconcile_then_certify_end_to_end() {
    let atoms = AtomBatch::from_json(ATOMS).unwrap();
    let index = IntervalIndex::build(&atoms);
    let mut structure = Structure::from_json_str(STRUCTURE).unwrap();

    let report = reconcile_all(structure.entries_mut(), &index, &atoms);
    assert_eq!(report.resolved, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 0);
    // mul_comm had a live id with a stale path: overwritten, warned.
    assert_eq!(report.warnings.len(), 1);

    let resolved = structure.get("group/mul_assoc.md").unwrap();
    assert_eq!(
        resolved.atom_id.as_deref(),
        Some("ns:demo/1.0/group#mul_assoc()")
    );
    let corrected = structure.get("group/mul_comm.md").unwrap();
    assert_eq!(corrected.recorded_file.as_deref(), Some("src/group.rs"));

    // The failed entry stays tracked but contributes nothing to scope.
    let scope = structure.names();
    assert_eq!(scope.len(), 2);

    let results = partition_verification(&serde_json::json!({
        "ns:demo/1.0/group#mul_assoc()": {"verified": true},
        "ns:demo/1.0/group#mul_comm()": {"verified": false}
    }))
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = CertStore::new(dir.path());
    let sync = store.sync(&results.verified, &scope).unwrap();
    assert_eq!(sync.created_count(), 1);
    assert_eq!(sync.deleted_count(), 0);
    assert_eq!(
        store.existing().unwrap(),
        BTreeSet::from(["ns:demo/1.0/group#mul_assoc()".to_string()])
    );

    // A later run where the proof regressed revokes the certificate.
    let sync = store.sync(&BTreeSet::new(), &scope).unwrap();
    assert_eq!(sync.deleted_count(), 1);
    assert!(store.existing().unwrap().is_empty());
}

#[test]
fn enrichment_fills_provenance_after_reconciliation() {
    let atoms = AtomBatch::from_json(ATOMS).unwrap();
    let index = IntervalIndex::build(&atoms);
    let mut structure = Structure::from_json_str(STRUCTURE).unwrap();

    reconcile_all(structure.entries_mut(), &index, &atoms);
    let report = structure.enrich(&atoms);
    assert_eq!(report.enriched, 2);
    assert_eq!(report.skipped, 1);

    let entry = structure.get("group/mul_comm.md").unwrap();
    assert_eq!(
        entry.metadata.get("dependencies"),
        Some(&serde_json::json!(["ns:demo/1.0/group#mul_assoc()"]))
    );
    assert_eq!(
        entry.metadata.get("code-lines-start"),
        Some(&serde_json::json!(40))
    );
    assert_eq!(
        entry.metadata.get("code-lines-end"),
        Some(&serde_json::json!(55))
    );
}

#[test]
fn certificate_names_survive_full_identifier_syntax() {
    let id = "ns:crate/1.0/path::to::mod#Type::method()";
    let encoded = encode_name(id);
    assert!(encoded
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '%'));
    assert_eq!(decode_name(&encoded), id);

    let dir = tempfile::tempdir().unwrap();
    let store = CertStore::new(dir.path());
    store.create(id).unwrap();
    assert!(store.existing().unwrap().contains(id));
    assert!(store.delete(id).unwrap().is_some());
}
