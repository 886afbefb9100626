use thiserror::Error;

use sqlprep_core::TemplateError;
use sqlprep_quote::QuoteError;
use sqlprep_schema::SchemaError;

/// A normalized backend failure, enriched by a [`crate::Classifier`] when
/// one is registered for the active engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DbError {
    pub sqlcode: i32,
    pub sqlstate: String,
    pub message: String,
    pub code: Option<String>,
    pub col: Option<String>,
    pub table: Option<String>,
    pub fk_table: Option<String>,
    pub fk_col: Option<String>,
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "db error {} ({}): {}", self.sqlcode, self.sqlstate, self.message)
    }
}

impl std::error::Error for DbError {}

/// Failures the command facade can raise. Template/quoting/schema
/// failures abort the current operation without touching the connection;
/// backend failures inside `atomic` trigger a rollback before
/// re-raising.
#[derive(Debug, Error)]
pub enum CmdError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Backend(#[from] DbError),

    #[error("prepared statement already freed")]
    StatementFreed,

    #[error("named and positional bind sites both present; this should have been rejected by TPL")]
    MixedBindSites,

    #[error("connection has an abandoned transaction from a prior atomic() call that was dropped without commit or rollback")]
    AbandonedTransaction,
}
