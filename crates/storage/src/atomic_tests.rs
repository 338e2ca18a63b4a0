use super::*;
use serde::Deserialize;
use std::io::Write;
use tempfile::tempdir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Doc {
    n: u32,
    label: String,
}

#[test]
fn round_trips_through_write_and_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    let doc = Doc {
        n: 7,
        label: "spec".into(),
    };
    write_json(&path, &doc).unwrap();
    let loaded: Doc = read_json_strict(&path).unwrap().unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn write_leaves_no_tmp_file_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    write_json(&path, &Doc { n: 1, label: "x".into() }).unwrap();
    assert!(!path.with_extension("tmp").exists());
    assert!(path.exists());
}

#[test]
fn read_missing_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let result: Option<Doc> = read_json_quarantine_on_corrupt(&path).unwrap();
    assert!(result.is_none());
}

#[test]
fn corrupt_document_is_quarantined_to_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    let mut f = File::create(&path).unwrap();
    f.write_all(b"not json").unwrap();
    drop(f);

    let result: Option<Doc> = read_json_quarantine_on_corrupt(&path).unwrap();
    assert!(result.is_none());
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn bak_rotation_keeps_at_most_three() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");

    for i in 1..=4u8 {
        let mut f = File::create(&path).unwrap();
        f.write_all(&[i; 4]).unwrap();
        drop(f);
        let _: Option<Doc> = read_json_quarantine_on_corrupt(&path).unwrap();
    }

    assert!(path.with_extension("bak").exists());
    assert!(path.with_extension("bak.2").exists());
    assert!(path.with_extension("bak.3").exists());
    assert!(!path.with_extension("bak.4").exists());
}

#[test]
fn read_json_strict_propagates_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, b"{ not valid").unwrap();
    let result: Result<Option<Doc>, StorageError> = read_json_strict(&path);
    assert!(result.is_err());
}
