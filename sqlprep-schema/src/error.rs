use thiserror::Error;

/// Failures raised by SCM, DDL and DIFF.
///
/// All variants are fatal: the schema layer never partially applies a
/// malformed table or plan.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("table '{table}' has more than one primary key")]
    MultiplePrimaryKeys { table: String },

    #[error("table '{table}' has more than one auto_increment column")]
    MultipleAutoIncrement { table: String },

    #[error("foreign key '{fk}' on table '{table}' has {cols} columns but {ref_cols} referenced columns")]
    ForeignKeyArityMismatch {
        table: String,
        fk: String,
        cols: usize,
        ref_cols: usize,
    },

    #[error("'{column}' in {constraint} of table '{table}' is not a column of that table")]
    UnknownColumn {
        table: String,
        constraint: String,
        column: String,
    },

    #[error("foreign key '{fk}' on table '{table}' references unresolved column '{column}' on '{ref_table}'")]
    UnresolvedForeignKey {
        table: String,
        fk: String,
        ref_table: String,
        column: String,
    },

    #[error("diff references unknown table '{0}'")]
    UnknownTable(String),

    #[error("diff references unknown column '{column}' on table '{table}'")]
    DiffUnknownColumn { table: String, column: String },
}
