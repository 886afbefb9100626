//! `sqlprep`: the facade crate re-exporting the SQL template pipeline
//! (STR/CPP/TPL/QTE), schema introspection/diff/DDL generation (SCM/INS/
//! DDL/DIFF) and the command facade (CMD) as one coherent public API,
//! plus the ambient stack (logging, process-wide default registries,
//! optional configuration) a finished embedding application needs.

mod error;
pub mod logging;
pub mod registry;

#[cfg(feature = "config")]
pub mod config;

pub use error::Error;

pub use sqlprep_cmd::{
    is_ddl, is_primary_key_message, CmdError, Command, ConnectOptions, Connection, Classifier,
    DbError, ErrorTag, FieldMeta, MysqlClassifier, PreparedCommand, PreparedStatement,
    QueryOutcome, QueryResult, ReservedWordCache, ResultOptions, Row, SchemaCache, ShapedField,
    ShapedRow,
};
pub use sqlprep_core::{render, prepare, BindSite, EnvironmentBuilder, Expanded, Macro, Mode, TemplateEnvironment, TemplateError};
pub use sqlprep_introspect::{
    canonical_for, default_display_width, integer_range, introspect_schema, native_type_for,
    parse_enum_values, AttrRegistry, CatalogSource, ColumnRow, ConstraintKind, ConstraintRow,
    FieldAttrs, IndexRow, IntrospectError, ProcedureRow, TriggerEvent, TriggerRow, TriggerTiming,
};
pub use sqlprep_quote::{Engine, Keyword, QuoteError, Quoter, Value};
pub use sqlprep_schema::{
    plan as plan_ddl, sorted_triggers, sqlcheck, sqlcol, sqldb, sqlfk, sqlix, sqlpk, sqlproc,
    sqltable, sqltrigger, AttrDiff, CanonicalType, Check, Field, FkAction, ForeignKey, Index,
    NativeType, Procedure, Schema, SchemaDiff, SchemaError, ServerKey, Table, TableUpdate,
    ToSqlHook, Trigger, TriggerOp, TriggerWhen, UniqueKey,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn facade_reexports_the_full_pipeline() {
        let quoter = Arc::new(Quoter::mysql());
        let env = TemplateEnvironment::new(quoter);
        assert_eq!(render("select 1", &env).unwrap(), "select 1");
    }
}
