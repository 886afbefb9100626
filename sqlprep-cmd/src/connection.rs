//! The external connection collaborator (component design §6): the
//! minimal surface a real driver implements so `Command` can route
//! queries, prepared statements and transactions through it.

use async_trait::async_trait;
use sqlprep_quote::Value;

use crate::error::DbError;

#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
}

/// One row, as an ordered `(column, value)` list so callers can project
/// it either as a name map or, for `compact`, as a positional sequence.
pub type Row = Vec<(String, Value)>;

#[derive(Debug, Clone)]
pub struct FieldMeta {
    pub name: String,
    pub table: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub has_more: bool,
    pub fields: Vec<FieldMeta>,
}

/// A prepared statement handle. `execute` rebinds `values` (already
/// resolved from a `param_map` by the caller) into driver parameters at
/// each call.
#[async_trait]
pub trait PreparedStatement: Send {
    async fn execute(&mut self, values: Vec<Value>) -> Result<QueryResult, DbError>;
    async fn free(&mut self) -> Result<(), DbError>;
}

/// The underlying connection collaborator (component design §6).
#[async_trait]
pub trait Connection: Send {
    async fn connect(&mut self, opts: &ConnectOptions) -> Result<(), DbError>;
    async fn close(&mut self) -> Result<(), DbError>;
    async fn use_db(&mut self, db: &str) -> Result<(), DbError>;

    /// Engine-safe string body escape, used by [`sqlprep_quote::Quoter`]'s
    /// collaborator contract when a driver offers a faster native escape
    /// than the built-in one.
    fn esc(&self, s: &str) -> String;

    async fn query(&mut self, sql: &str) -> Result<QueryResult, DbError>;
    /// Reads the next result set of a multi-statement query; `None` once
    /// exhausted.
    async fn read_result(&mut self) -> Result<Option<QueryResult>, DbError>;

    async fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement>, DbError>;

    async fn start_transaction(&mut self) -> Result<(), DbError>;
    async fn commit(&mut self) -> Result<(), DbError>;
    async fn rollback(&mut self) -> Result<(), DbError>;
}
