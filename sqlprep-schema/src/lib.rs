//! SCM + DDL + DIFF: the normalized schema model, its DDL emitter, and the
//! schema differ/planner.
//!
//! Tables are plain value types once constructed; the only concurrent,
//! mutable state around a [`Schema`] lives in `sqlprep-cmd`'s schema
//! cache, which swaps whole `Arc<Schema>` snapshots rather than mutating
//! one in place.

mod ddl;
mod diff;
mod error;
mod field;
mod schema;
mod table;

pub use ddl::{sqlcheck, sqlcol, sqldb, sqlfk, sqlix, sqlpk, sqlproc, sqltable, sqltrigger, sorted_triggers};
pub use diff::{plan, AttrDiff, SchemaDiff, TableUpdate};
pub use error::SchemaError;
pub use field::{CanonicalType, Field, NativeType, ToSqlHook};
pub use schema::{Schema, ServerKey};
pub use table::{
    sort_triggers, Check, ForeignKey, FkAction, Index, Procedure, Table, Trigger, TriggerOp,
    TriggerWhen, UniqueKey,
};

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprep_quote::{Engine, Quoter};

    #[test]
    fn schema_rejects_foreign_key_to_missing_table() {
        let mut schema = Schema::new(Engine::MySql);
        let mut orders = Table::new("app", "orders");
        orders.push_field(Field::new("id", 0, CanonicalType::Number));
        orders.push_field(Field::new("customer_id", 1, CanonicalType::Number));
        orders.pk = vec!["id".to_string()];
        orders.fks.insert(
            "fk_customer".to_string(),
            ForeignKey {
                ref_table: "app.customers".to_string(),
                cols: vec!["customer_id".to_string()],
                ref_cols: vec!["id".to_string()],
                onupdate: None,
                ondelete: None,
            },
        );
        schema.insert_table(orders);
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::UnresolvedForeignKey { .. })
        ));
    }

    #[test]
    fn schema_accepts_resolved_foreign_key() {
        let mut schema = Schema::new(Engine::MySql);
        let mut customers = Table::new("app", "customers");
        customers.push_field(Field::new("id", 0, CanonicalType::Number));
        customers.pk = vec!["id".to_string()];
        schema.insert_table(customers);

        let mut orders = Table::new("app", "orders");
        orders.push_field(Field::new("id", 0, CanonicalType::Number));
        orders.push_field(Field::new("customer_id", 1, CanonicalType::Number));
        orders.pk = vec!["id".to_string()];
        orders.fks.insert(
            "fk_customer".to_string(),
            ForeignKey {
                ref_table: "app.customers".to_string(),
                cols: vec!["customer_id".to_string()],
                ref_cols: vec!["id".to_string()],
                onupdate: None,
                ondelete: None,
            },
        );
        schema.insert_table(orders);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn table_rejects_second_primary_key_column_set() {
        let mut table = Table::new("app", "widgets");
        let mut a = Field::new("a", 0, CanonicalType::Number);
        a.auto_increment = true;
        table.push_field(a);
        let mut b = Field::new("b", 1, CanonicalType::Number);
        b.auto_increment = true;
        table.push_field(b);
        assert!(matches!(
            table.validate(),
            Err(SchemaError::MultipleAutoIncrement { .. })
        ));
    }

    #[test]
    fn sqltable_renders_full_create_statement() {
        let quoter = Quoter::mysql();
        let mut table = Table::new("app", "tags");
        let mut id = Field::new("id", 0, CanonicalType::Number);
        id.auto_increment = true;
        id.not_null = true;
        table.push_field(id);
        table.pk = vec!["id".to_string()];
        let ddl = sqltable(&table, &quoter).unwrap();
        assert!(ddl.starts_with("create table app.tags ("));
        assert!(ddl.contains("auto_increment"));
    }
}
