use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_kv_roundtrip_overwrite_and_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("session").await.unwrap(), None);

    repo.set("session", "{\"a\":1}").await.unwrap();
    repo.set("session", "{\"a\":2}").await.unwrap();
    assert_eq!(
        repo.get("session").await.unwrap().as_deref(),
        Some("{\"a\":2}")
    );

    repo.remove("session").await.unwrap();
    repo.remove("session").await.unwrap();
    assert_eq!(repo.get("session").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn storage_sqlite_exposes_kv_backend() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set("completed_sessions", "[]").await.unwrap();
    assert_eq!(
        storage.kv.get("completed_sessions").await.unwrap().as_deref(),
        Some("[]")
    );
}
