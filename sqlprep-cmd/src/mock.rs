//! A programmable in-memory [`Connection`], generalizing the fixture-driven
//! mock metadata loader pattern into a reusable test double instead of a
//! single hardcoded fixture: callers register a canned [`QueryResult`] (or
//! error) per exact SQL string, then assert on what was actually sent.
//!
//! Exported behind the `test-util` feature so `sqlprep-cmd`'s own tests and
//! downstream integration tests can share one fixture implementation.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use sqlprep_quote::Value;

use crate::connection::{ConnectOptions, Connection, FieldMeta, PreparedStatement, QueryResult, Row};
use crate::error::DbError;

#[derive(Debug, Clone)]
enum Canned {
    Result(QueryResult),
    Error(DbError),
}

/// A mock prepared statement that replays the same canned result on every
/// `execute`, recording the bind values it was called with.
pub struct MockStatement {
    response: Canned,
    pub calls: Vec<Vec<Value>>,
}

#[async_trait]
impl PreparedStatement for MockStatement {
    async fn execute(&mut self, values: Vec<Value>) -> Result<QueryResult, DbError> {
        self.calls.push(values);
        match &self.response {
            Canned::Result(r) => Ok(r.clone()),
            Canned::Error(e) => Err(e.clone()),
        }
    }

    async fn free(&mut self) -> Result<(), DbError> {
        Ok(())
    }
}

/// An in-memory [`Connection`] fixture. Register responses with
/// [`MockConnection::on_query`]/[`MockConnection::on_query_err`], then drive
/// it through [`crate::Command`]; [`MockConnection::statements`] records
/// every SQL string passed to `query` in call order.
#[derive(Default)]
pub struct MockConnection {
    responses: HashMap<String, VecDeque<Canned>>,
    default_response: Option<Canned>,
    pub statements: Vec<String>,
    pub prepared: Vec<String>,
    pub transactions: Vec<&'static str>,
}

impl MockConnection {
    pub fn new() -> MockConnection {
        MockConnection::default()
    }

    pub fn on_query(&mut self, sql: impl Into<String>, result: QueryResult) -> &mut Self {
        self.responses.entry(sql.into()).or_default().push_back(Canned::Result(result));
        self
    }

    pub fn on_query_err(&mut self, sql: impl Into<String>, err: DbError) -> &mut Self {
        self.responses.entry(sql.into()).or_default().push_back(Canned::Error(err));
        self
    }

    /// Served when `sql` matches no registered exact string; useful for
    /// DDL statements a test doesn't care to assert on individually.
    pub fn on_any(&mut self, result: QueryResult) -> &mut Self {
        self.default_response = Some(Canned::Result(result));
        self
    }

    fn resolve(&mut self, sql: &str) -> Result<QueryResult, DbError> {
        if let Some(queue) = self.responses.get_mut(sql) {
            if let Some(canned) = queue.pop_front() {
                return match canned {
                    Canned::Result(r) => Ok(r),
                    Canned::Error(e) => Err(e),
                };
            }
        }
        match &self.default_response {
            Some(Canned::Result(r)) => Ok(r.clone()),
            Some(Canned::Error(e)) => Err(e.clone()),
            None => Ok(QueryResult::default()),
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn connect(&mut self, _opts: &ConnectOptions) -> Result<(), DbError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DbError> {
        Ok(())
    }

    async fn use_db(&mut self, _db: &str) -> Result<(), DbError> {
        Ok(())
    }

    fn esc(&self, s: &str) -> String {
        s.replace('\\', "\\\\").replace('\'', "\\'")
    }

    async fn query(&mut self, sql: &str) -> Result<QueryResult, DbError> {
        self.statements.push(sql.to_string());
        self.resolve(sql)
    }

    async fn read_result(&mut self) -> Result<Option<QueryResult>, DbError> {
        Ok(None)
    }

    async fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement>, DbError> {
        self.prepared.push(sql.to_string());
        let response = self.responses.get_mut(sql).and_then(|q| q.pop_front()).unwrap_or_else(|| {
            self.default_response.clone().unwrap_or(Canned::Result(QueryResult::default()))
        });
        Ok(Box::new(MockStatement { response, calls: Vec::new() }))
    }

    async fn start_transaction(&mut self) -> Result<(), DbError> {
        self.transactions.push("start");
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        self.transactions.push("commit");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        self.transactions.push("rollback");
        Ok(())
    }
}

/// Builds a one-row, one-column result set; the common case for tests that
/// just need `query` to return something shaped.
pub fn single_row(columns: &[(&str, Value)]) -> QueryResult {
    let row: Row = columns.iter().map(|(name, v)| (name.to_string(), v.clone())).collect();
    let fields = columns
        .iter()
        .map(|(name, _)| FieldMeta { name: name.to_string(), table: None })
        .collect();
    QueryResult { rows: vec![row], has_more: false, fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_statements_and_replays_canned_result() {
        let mut conn = MockConnection::new();
        conn.on_query("select 1", single_row(&[("one", Value::number(1))]));
        let result = conn.query("select 1").await.unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(conn.statements, vec!["select 1".to_string()]);
    }

    #[tokio::test]
    async fn transactions_are_recorded_in_order() {
        let mut conn = MockConnection::new();
        conn.start_transaction().await.unwrap();
        conn.commit().await.unwrap();
        assert_eq!(conn.transactions, vec!["start", "commit"]);
    }
}
