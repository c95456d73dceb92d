use super::*;

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get(ACCESS_TOKEN_KEY), None);

    store.set(ACCESS_TOKEN_KEY, "T1").unwrap();
    assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));

    store.set(ACCESS_TOKEN_KEY, "T2").unwrap();
    assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("T2"));

    store.remove(ACCESS_TOKEN_KEY).unwrap();
    assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
}

#[test]
fn memory_store_remove_missing_is_ok() {
    let store = MemoryStore::new();
    assert!(store.remove(USER_KEY).is_ok());
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("session.json")).unwrap();
    for key in SESSION_KEYS {
        assert_eq!(store.get(key), None);
    }
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let store = FileStore::open(&path).unwrap();
    store.set(ACCESS_TOKEN_KEY, "T1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();
    store.set(USER_KEY, r#"{"email":"a@b.com"}"#).unwrap();
    drop(store);

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.path(), path.as_path());
    assert_eq!(reopened.get(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
    assert_eq!(reopened.get(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
    assert_eq!(reopened.get(USER_KEY).as_deref(), Some(r#"{"email":"a@b.com"}"#));
}

#[test]
fn file_store_remove_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = FileStore::open(&path).unwrap();
    store.set(ACCESS_TOKEN_KEY, "T1").unwrap();
    store.remove(ACCESS_TOKEN_KEY).unwrap();
    drop(store);

    assert_eq!(FileStore::open(&path).unwrap().get(ACCESS_TOKEN_KEY), None);
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, ApiError::Storage(msg) if msg.contains("corrupt session file")));
}

#[test]
fn file_store_empty_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "").unwrap();

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get(USER_KEY), None);
}
