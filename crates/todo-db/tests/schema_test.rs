//! Schema migrations against an in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn fresh() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[tokio::test]
async fn migrations_create_the_tables() {
    let db = fresh().await;
    todo_db::run_migrations(&db).await.unwrap();

    let mut response = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = response.take(0).unwrap();
    let info = format!("{:?}", info.unwrap());
    for table in ["user", "session", "task", "schema_version"] {
        assert!(info.contains(table), "missing table {table}");
    }
}

#[tokio::test]
async fn running_twice_is_harmless() {
    let db = fresh().await;
    todo_db::run_migrations(&db).await.unwrap();
    todo_db::run_migrations(&db).await.unwrap();

    let mut response = db
        .query("SELECT count() AS n FROM schema_version GROUP ALL")
        .await
        .unwrap();
    let n: Option<i64> = response.take("n").unwrap();
    assert_eq!(n, Some(1));
}

#[tokio::test]
async fn blank_titles_are_refused_by_the_store() {
    let db = fresh().await;
    todo_db::run_migrations(&db).await.unwrap();

    let result = db
        .query("CREATE task SET owner_id = 'someone', title = '   '")
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}
