use thiserror::Error;

use sqlprep_cmd::{CmdError, DbError};
use sqlprep_core::TemplateError;
use sqlprep_introspect::IntrospectError;
use sqlprep_quote::QuoteError;
use sqlprep_schema::SchemaError;

/// The top-level error type, composing every crate boundary's own error
/// enum via `#[from]` rather than re-deriving their variants.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Introspect(#[from] IntrospectError),

    #[error(transparent)]
    Command(#[from] CmdError),

    #[error(transparent)]
    Backend(#[from] DbError),
}
