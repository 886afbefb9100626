//! Drives the command facade end to end against an in-memory connection:
//! template rendering, result shaping, DDL-triggered cache invalidation
//! and transaction bracketing.

use std::sync::Arc;

use sqlprep_cmd::mock::{single_row, MockConnection};
use sqlprep_cmd::{CmdError, Command, ResultOptions, SchemaCache, ShapedRow};
use sqlprep_core::TemplateEnvironment;
use sqlprep_quote::{Quoter, Value};

fn env() -> TemplateEnvironment {
    TemplateEnvironment::new(Arc::new(Quoter::mysql()))
}

#[tokio::test]
async fn template_rendering_then_shaping_round_trip() {
    let mut conn = MockConnection::new();
    conn.on_query(
        "SELECT * FROM users WHERE id = 7",
        single_row(&[("id", Value::number(7)), ("name", Value::str("ada"))]),
    );
    let mut cmd = Command::new(Box::new(conn), ("db.internal".to_string(), 3306), Arc::new(SchemaCache::new()));

    let mut e = env();
    e.args = vec![Value::number(7)];
    let outcome = cmd
        .query("SELECT * FROM users WHERE id = ?", &e, &ResultOptions::default())
        .await
        .unwrap();

    match &outcome.rows[0] {
        ShapedRow::Map(pairs) => {
            assert_eq!(pairs[0], ("id".to_string(), Value::number(7)));
            assert_eq!(pairs[1], ("name".to_string(), Value::str("ada")));
        }
        ShapedRow::Array(_) => panic!("expected a map row by default"),
    }
}

#[tokio::test]
async fn ddl_statement_invalidates_the_server_schema_cache() {
    use sqlprep_quote::Engine;
    use sqlprep_schema::Schema;

    let mut conn = MockConnection::new();
    conn.on_any(sqlprep_cmd::QueryResult::default());
    let cache = Arc::new(SchemaCache::new());
    let key = ("db.internal".to_string(), 3306);
    cache.install(key.clone(), Arc::new(Schema::new(Engine::MySql)));

    let mut cmd = Command::new(Box::new(conn), key.clone(), cache.clone());
    cmd.exec("alter table users add column age int", &env()).await.unwrap();

    assert!(cache.get(&key).is_none(), "DDL execution must evict the cached schema");
}

#[tokio::test]
async fn atomic_rolls_back_and_propagates_the_failure() {
    let mut conn = MockConnection::new();
    conn.on_any(sqlprep_cmd::QueryResult::default());
    let mut cmd = Command::new(Box::new(conn), ("db.internal".to_string(), 3306), Arc::new(SchemaCache::new()));

    let result: Result<(), CmdError> = cmd
        .atomic(|inner| {
            Box::pin(async move {
                inner.exec("update users set name = 'x'", &env()).await?;
                Err(CmdError::StatementFreed)
            })
        })
        .await;

    assert!(matches!(result, Err(CmdError::StatementFreed)));
}

#[tokio::test]
async fn prepared_statement_rebinds_named_parameters_per_execution() {
    let mut conn = MockConnection::new();
    conn.on_query(
        "SELECT * FROM users WHERE name = ?",
        single_row(&[("name", Value::str("ada"))]),
    );
    let mut cmd = Command::new(Box::new(conn), ("db.internal".to_string(), 3306), Arc::new(SchemaCache::new()));

    let mut e = env();
    e.params.insert("name".to_string(), Value::str("ada"));
    let mut stmt = cmd.prepare("SELECT * FROM users WHERE name = :name", &e).await.unwrap();
    let outcome = stmt.execute(&e, &ResultOptions::default()).await.unwrap();
    assert_eq!(outcome.rows.len(), 1);
    stmt.free().await.unwrap();
}
