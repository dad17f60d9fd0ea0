use esdraft_core::db::{open_db, open_db_in_memory};
use esdraft_core::{
    DraftRecord, DraftStore, QuestionAnswer, RepoError, SlotRepository, SqliteSlotRepository,
    DEFAULT_STORAGE_KEY,
};

fn sample_records() -> Vec<DraftRecord> {
    vec![
        DraftRecord::new(
            20,
            "Beta",
            "Second",
            vec![
                QuestionAnswer::new("Q1", "A1"),
                QuestionAnswer::new("", ""),
            ],
            20,
        )
        .unwrap(),
        DraftRecord::new(10, "Acme", "First\nline", Vec::new(), 10).unwrap(),
    ]
}

#[test]
fn absent_slot_loads_empty_without_warning() {
    let mut conn = open_db_in_memory().unwrap();
    let store = DraftStore::new(SqliteSlotRepository::new(&mut conn));

    let snapshot = store.load().unwrap();
    assert!(snapshot.records.is_empty());
    assert_eq!(snapshot.revision, 0);
    assert_eq!(snapshot.warning, None);
}

#[test]
fn load_save_load_preserves_collection() {
    let mut conn = open_db_in_memory().unwrap();
    let store = DraftStore::new(SqliteSlotRepository::new(&mut conn));
    store.save(&sample_records()).unwrap();

    let first = store.load().unwrap();
    store.save(&first.records).unwrap();
    let second = store.load().unwrap();

    assert_eq!(first.records, sample_records());
    assert_eq!(second.records, first.records);
    assert_eq!(second.revision, first.revision + 1);
}

#[test]
fn saved_blob_is_a_json_array_in_collection_order() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let store = DraftStore::new(SqliteSlotRepository::new(&mut conn));
        store.save(&sample_records()).unwrap();
    }

    let raw: String = conn
        .query_row(
            "SELECT value FROM kv_slots WHERE key = ?1;",
            [DEFAULT_STORAGE_KEY],
            |row| row.get(0),
        )
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let ids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![20, 10]);
}

#[test]
fn malformed_blob_loads_empty_with_warning_and_backup() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&mut conn);
    repo.put_slot(DEFAULT_STORAGE_KEY, "{not json").unwrap();
    let store = DraftStore::new(repo);

    let snapshot = store.load().unwrap();
    assert!(snapshot.records.is_empty());
    assert_eq!(snapshot.revision, 1);
    let warning = snapshot.warning.expect("malformed blob must surface a warning");
    assert!(warning.reason.contains("invalid JSON"));
    assert_eq!(warning.backup_key, "esDrafts.malformed");

    store.save(&sample_records()).unwrap();
    assert_eq!(store.load().unwrap().records, sample_records());
    drop(store);

    let repo = SqliteSlotRepository::new(&mut conn);
    let backup = repo.get_slot("esDrafts.malformed").unwrap().unwrap();
    assert_eq!(backup.value, "{not json");
}

#[test]
fn repeated_malformed_loads_do_not_rewrite_backup() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&mut conn);
    repo.put_slot(DEFAULT_STORAGE_KEY, "42").unwrap();
    let store = DraftStore::new(repo);

    let first = store.load().unwrap();
    let second = store.load().unwrap();
    assert!(first.warning.unwrap().reason.contains("a number"));
    assert!(second.warning.is_some());
    drop(store);

    let repo = SqliteSlotRepository::new(&mut conn);
    assert_eq!(repo.get_slot("esDrafts.malformed").unwrap().unwrap().revision, 1);
}

#[test]
fn later_malformed_blob_gets_its_own_backup() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteSlotRepository::new(&mut conn)
        .put_slot(DEFAULT_STORAGE_KEY, "42")
        .unwrap();
    let first = DraftStore::new(SqliteSlotRepository::new(&mut conn))
        .load()
        .unwrap();
    assert_eq!(first.warning.unwrap().backup_key, "esDrafts.malformed");

    SqliteSlotRepository::new(&mut conn)
        .put_slot(DEFAULT_STORAGE_KEY, "{oops")
        .unwrap();
    let second = DraftStore::new(SqliteSlotRepository::new(&mut conn))
        .load()
        .unwrap();
    assert_eq!(second.revision, 2);
    assert_eq!(second.warning.unwrap().backup_key, "esDrafts.malformed.2");

    let repo = SqliteSlotRepository::new(&mut conn);
    assert_eq!(repo.get_slot("esDrafts.malformed").unwrap().unwrap().value, "42");
    assert_eq!(repo.get_slot("esDrafts.malformed.2").unwrap().unwrap().value, "{oops");
}

#[test]
fn custom_key_isolates_collections() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let store = DraftStore::with_key(SqliteSlotRepository::new(&mut conn), "otherDrafts");
        store.save(&sample_records()).unwrap();
    }

    let store = DraftStore::new(SqliteSlotRepository::new(&mut conn));
    assert!(store.load().unwrap().records.is_empty());
}

#[test]
fn checked_save_detects_writer_in_another_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drafts.sqlite3");
    let mut conn_a = open_db(&path).unwrap();
    let mut conn_b = open_db(&path).unwrap();
    let mut store_a = DraftStore::new(SqliteSlotRepository::new(&mut conn_a));
    let store_b = DraftStore::new(SqliteSlotRepository::new(&mut conn_b));

    let seen_by_a = store_a.load().unwrap();
    store_b.save(&sample_records()).unwrap();

    let err = store_a
        .save_if_unchanged(&[], seen_by_a.revision)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::RevisionConflict {
            expected: 0,
            actual: 1,
            ..
        }
    ));
    assert_eq!(store_a.load().unwrap().records, sample_records());
}
