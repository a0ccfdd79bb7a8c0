use docshare::{
    backend::{BackendImpl, CredentialStore, FileRegistry, database::InMemory},
    user::Role,
};

use crate::helpers::test_backend;

#[tokio::test]
async fn test_find_missing_user() {
    let backend = test_backend().await;
    assert!(backend.find_user("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_user_assigns_distinct_ids() {
    let backend = test_backend().await;
    let a = backend.create_user("a", "hash-a", Role::Client).await.unwrap();
    let b = backend
        .create_user("b", "hash-b", Role::Operation)
        .await
        .unwrap();
    assert_ne!(a.id, b.id);

    let found = backend.find_user("b").await.unwrap().unwrap();
    assert_eq!(found, b);
}

#[tokio::test]
async fn test_username_uniqueness_is_exact() {
    let backend = test_backend().await;
    backend.create_user("alice", "h1", Role::Client).await.unwrap();

    let err = backend
        .create_user("alice", "h2", Role::Operation)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    // Case differs, so this is another account
    backend.create_user("Alice", "h3", Role::Client).await.unwrap();
    assert_eq!(backend.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_registry_keeps_insertion_order_and_duplicates() {
    let backend = test_backend().await;
    backend.record_file("b.docx", "ops").await.unwrap();
    let first = backend.record_file("a.xlsx", "ops").await.unwrap();
    backend.record_file("a.xlsx", "other").await.unwrap();

    let files = backend.list_files().await.unwrap();
    let pairs: Vec<(&str, &str)> = files
        .iter()
        .map(|f| (f.filename.as_str(), f.uploader.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [("b.docx", "ops"), ("a.xlsx", "ops"), ("a.xlsx", "other")]
    );

    let found = backend.find_file("a.xlsx").await.unwrap().unwrap();
    assert_eq!(found, first);
    assert!(backend.find_file("c.pptx").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_signups_one_winner() {
    let backend: std::sync::Arc<dyn BackendImpl> = std::sync::Arc::from(test_backend().await);

    let mut handles = Vec::new();
    for i in 0..8 {
        let backend = backend.clone();
        handles.push(tokio::spawn(async move {
            backend
                .create_user("racer", &format!("hash-{i}"), Role::Client)
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(e.is_conflict()),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(backend.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_backend_downcast() {
    let backend: Box<dyn BackendImpl> = Box::new(InMemory::new());
    assert_eq!(backend.kind_label(), "inmemory");
    assert!(backend.as_any().downcast_ref::<InMemory>().is_some());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_file_persists_across_reopen() {
    use docshare::backend::database::Sqlite;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docshare.db");

    {
        let backend = Sqlite::open_sqlite(&path).await.unwrap();
        assert_eq!(backend.kind_label(), "sqlite");
        backend.create_user("alice", "h", Role::Client).await.unwrap();
        backend.record_file("a.docx", "ops").await.unwrap();
        backend.pool().close().await;
    }

    let backend = Sqlite::open_sqlite(&path).await.unwrap();
    assert!(backend.find_user("alice").await.unwrap().is_some());
    assert_eq!(backend.list_files().await.unwrap().len(), 1);
    let err = backend
        .create_user("alice", "h2", Role::Client)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}
