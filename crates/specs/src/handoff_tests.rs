// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;

use tempfile::tempdir;

use super::*;

#[test]
fn load_returns_none_when_manifest_is_absent() {
    let dir = tempdir().unwrap();
    let manifest = HandoffManifest::load(&dir.path().join("handoff.json")).unwrap();
    assert!(manifest.is_none());
}

#[test]
fn load_parses_a_declared_manifest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("handoff.json");
    fs::write(
        &path,
        r#"{"sourceProject":"legacy-billing","specs":["00-00-billing"],"capabilities":["invoicing"],"gaps":["no audit trail"]}"#
            .replace("sourceProject", "source_project"),
    )
    .unwrap();

    let manifest = HandoffManifest::load(&path).unwrap().unwrap();
    assert_eq!(manifest.source_project, "legacy-billing");
    assert_eq!(manifest.expected_capabilities(), ["invoicing".to_string()]);
    assert_eq!(manifest.gaps, vec!["no audit trail".to_string()]);
}

#[test]
fn infer_capabilities_from_lexicon_collects_tagged_lines() {
    let texts = vec![
        "Some requirements.\ncapability: invoicing\nmore text".to_string(),
        "Capability: reporting\ncapability: invoicing".to_string(),
    ];
    let caps = infer_capabilities_from_lexicon(&texts);
    assert_eq!(caps, vec!["invoicing".to_string(), "reporting".to_string()]);
}

#[test]
fn infer_capabilities_from_lexicon_is_empty_for_plain_text() {
    let texts = vec!["no tagged capabilities here".to_string()];
    assert!(infer_capabilities_from_lexicon(&texts).is_empty());
}
