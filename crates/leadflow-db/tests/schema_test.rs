//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    leadflow_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("user"), "missing user table");
    assert!(info_str.contains("lead"), "missing lead table");
    assert!(
        info_str.contains("lead_modification"),
        "missing lead_modification table"
    );
    assert!(
        info_str.contains("chat_message"),
        "missing chat_message table"
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    leadflow_db::run_migrations(&db).await.unwrap();
    // A second run must not re-apply v1 (DEFINE TABLE would fail).
    leadflow_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn lead_status_is_asserted() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leadflow_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE lead SET contact_number = '1', first_name = 'x', \
             status = 'WON'",
        )
        .await
        .unwrap();
    assert!(result.check().is_err());
}
