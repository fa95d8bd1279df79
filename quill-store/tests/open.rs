//! Opening a store against backends that cannot be reached

use std::time::{Duration, Instant};

use quill_store::{PoolConfig, Postgres, Sqlite, Store, StoreError};

#[tokio::test]
async fn test_open_on_directory_is_connectivity_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = Store::open(Sqlite::new(dir.path())).await.unwrap_err();
    assert!(matches!(err, StoreError::Connectivity(_)), "got {err:?}");
}

#[tokio::test]
async fn test_open_unreachable_postgres_fails_fast() {
    let config = PoolConfig {
        acquire_timeout_secs: 2,
        ..PoolConfig::default()
    };
    let started = Instant::now();

    let err = Store::open_with(Postgres::new("postgres://u:p@127.0.0.1:1/x"), config)
        .await
        .unwrap_err();

    assert!(
        matches!(err, StoreError::Connectivity(_) | StoreError::Timeout),
        "got {err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}
