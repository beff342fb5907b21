//! Migration smoke tests: the embedded migrations produce the expected
//! schema and are idempotent.

use specsmith_db::pool;
use specsmith_test_utils::{create_test_db, drop_test_db};

#[tokio::test]
async fn migrations_create_all_four_tables() {
    let (pool, db_name) = create_test_db().await;

    let counts = pool::table_counts(&pool).await.expect("table_counts");
    let tables: Vec<&str> = counts.iter().map(|(name, _)| name.as_str()).collect();

    for expected in ["specs", "user_stories", "engineering_tasks", "risks"] {
        assert!(
            tables.contains(&expected),
            "expected table {expected}, got: {tables:?}"
        );
    }

    // Fresh database: every table is empty.
    for (table, count) in &counts {
        if table.starts_with('_') {
            continue;
        }
        assert_eq!(*count, 0, "table {table} should start empty");
    }

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let (pool, db_name) = create_test_db().await;

    // create_test_db already ran migrations once; a second run is a no-op.
    pool::run_migrations(&pool)
        .await
        .expect("re-running migrations should succeed");

    pool.close().await;
    drop_test_db(&db_name).await;
}
