use super::*;
use chrono::Utc;
use tempfile::tempdir;

fn archive() -> (tempfile::TempDir, SessionArchive) {
    let dir = tempdir().unwrap();
    let archive = SessionArchive::new(dir.path());
    (dir, archive)
}

#[test]
fn create_then_load_roundtrips() {
    let (_dir, archive) = archive();
    let id = SessionId::new("0-20260727120000");
    archive
        .create(SessionKind::CloseLoop, id.clone(), Utc::now(), Value::Null)
        .unwrap();

    let loaded = archive.load(SessionKind::CloseLoop, &id).unwrap().unwrap();
    assert_eq!(loaded.session_id, id);
    assert_eq!(loaded.status, SessionStatus::Running);
}

#[test]
fn create_rejects_id_collision() {
    let (_dir, archive) = archive();
    let id = SessionId::new("0-20260727120000");
    archive
        .create(SessionKind::Batch, id.clone(), Utc::now(), Value::Null)
        .unwrap();
    let result = archive.create(SessionKind::Batch, id, Utc::now(), Value::Null);
    assert!(matches!(result, Err(StorageError::SessionCollision { .. })));
}

#[test]
fn append_event_then_finalize_then_rewrite_rejected() {
    let (_dir, archive) = archive();
    let id = SessionId::new("0-20260727120000");
    let mut envelope = archive
        .create(SessionKind::CloseLoop, id, Utc::now(), Value::Null)
        .unwrap();

    archive
        .append_event(
            SessionKind::CloseLoop,
            &mut envelope,
            Event::new("decomposed", Utc::now()),
        )
        .unwrap();
    assert_eq!(envelope.events.len(), 1);

    archive
        .finalize(
            SessionKind::CloseLoop,
            &mut envelope,
            SessionStatus::Completed,
            Value::Null,
            Utc::now(),
        )
        .unwrap();
    assert!(envelope.is_finalized());

    let result = archive.append_event(
        SessionKind::CloseLoop,
        &mut envelope,
        Event::new("late", Utc::now()),
    );
    assert!(matches!(result, Err(StorageError::SessionFinalized { .. })));

    let result = archive.finalize(
        SessionKind::CloseLoop,
        &mut envelope,
        SessionStatus::Failed,
        Value::Null,
        Utc::now(),
    );
    assert!(matches!(result, Err(StorageError::SessionFinalized { .. })));
}

#[test]
fn list_sorts_newest_first_and_skips_corrupt() {
    let (_dir, archive) = archive();
    archive
        .create(
            SessionKind::Batch,
            SessionId::new("0-20260727120000"),
            Utc::now(),
            Value::Null,
        )
        .unwrap();
    archive
        .create(
            SessionKind::Batch,
            SessionId::new("0-20260727130000"),
            Utc::now(),
            Value::Null,
        )
        .unwrap();

    // Write an unrelated corrupt json file into the same kind directory.
    let corrupt_path = archive.kind_dir(SessionKind::Batch).join("garbage.json");
    std::fs::write(&corrupt_path, b"not json").unwrap();

    let listed = archive.list(SessionKind::Batch).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].session_id.as_str(), "0-20260727130000");
}

#[test]
fn resume_latest_and_interrupted() {
    let (_dir, archive) = archive();
    let older = SessionId::new("0-20260727120000");
    let newer = SessionId::new("0-20260727130000");
    archive
        .create(SessionKind::CloseLoop, older.clone(), Utc::now(), Value::Null)
        .unwrap();
    let mut newer_env = archive
        .create(SessionKind::CloseLoop, newer.clone(), Utc::now(), Value::Null)
        .unwrap();

    let latest = archive
        .resume(SessionKind::CloseLoop, &ResumeSelector::Latest)
        .unwrap()
        .unwrap();
    assert_eq!(latest.session_id, newer);

    archive
        .finalize(
            SessionKind::CloseLoop,
            &mut newer_env,
            SessionStatus::Completed,
            Value::Null,
            Utc::now(),
        )
        .unwrap();

    let interrupted = archive
        .resume(SessionKind::CloseLoop, &ResumeSelector::Interrupted)
        .unwrap()
        .unwrap();
    assert_eq!(interrupted.session_id, older);
}

#[test]
fn prune_keeps_newest_and_protected_respects_age() {
    let (_dir, archive) = archive();
    let ids = [
        "0-20260701120000",
        "0-20260710120000",
        "0-20260720120000",
    ];
    for id in ids {
        archive
            .create(
                SessionKind::Governance,
                SessionId::new(id),
                Utc::now() - chrono::Duration::days(40),
                Value::Null,
            )
            .unwrap();
    }

    let removed = archive
        .prune(
            SessionKind::Governance,
            1,
            30,
            &[SessionId::new("0-20260701120000")],
            Utc::now(),
        )
        .unwrap();

    // Newest kept by `keep=1`, oldest kept by protect, middle one removed.
    assert_eq!(removed, 1);
    assert!(archive
        .load(SessionKind::Governance, &SessionId::new("0-20260710120000"))
        .unwrap()
        .is_none());
    assert!(archive
        .load(SessionKind::Governance, &SessionId::new("0-20260701120000"))
        .unwrap()
        .is_some());
    assert!(archive
        .load(SessionKind::Governance, &SessionId::new("0-20260720120000"))
        .unwrap()
        .is_some());
}
