//! CMD: the command facade, schema/reserved-word caches, error
//! classifier and connection collaborator contract that sit above STR/
//! CPP/TPL and SCM/INS/DDL/DIFF.

mod cache;
mod classifier;
mod command;
mod connection;
mod ddl_detect;
mod error;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use cache::{ReservedWordCache, SchemaCache};
pub use classifier::{is_primary_key_message, Classifier, ErrorTag, MysqlClassifier};
pub use command::{Command, PreparedCommand, QueryOutcome, ResultOptions, ShapedField, ShapedRow};
pub use connection::{ConnectOptions, Connection, FieldMeta, PreparedStatement, QueryResult, Row};
pub use ddl_detect::is_ddl;
pub use error::{CmdError, DbError};
