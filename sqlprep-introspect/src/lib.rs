//! Schema Introspector (INS): gathers columns, constraints, indexes,
//! triggers and procedures from a [`CatalogSource`] and assembles them
//! into a `sqlprep_schema::Schema`.

mod catalog;
mod error;
mod introspect;
mod native;
mod overlay;

pub use catalog::{
    CatalogSource, ColumnRow, ConstraintKind, ConstraintRow, IndexRow, ProcedureRow, TriggerEvent,
    TriggerRow, TriggerTiming,
};
pub use error::IntrospectError;
pub use introspect::introspect_schema;
pub use native::{canonical_for, default_display_width, integer_range, native_type_for, parse_enum_values};
pub use overlay::{AttrRegistry, FieldAttrs};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::convert::Infallible;

    struct FixtureCatalog;

    #[async_trait]
    impl CatalogSource for FixtureCatalog {
        type Error = Infallible;

        async fn tables(&self, _schema: &str) -> Result<Vec<String>, Infallible> {
            Ok(vec!["users".to_string()])
        }

        async fn columns(&self, _schema: &str, _table: &str) -> Result<Vec<ColumnRow>, Infallible> {
            Ok(vec![
                ColumnRow {
                    ordinal_position: 1,
                    column_name: "id".to_string(),
                    data_type: "int".to_string(),
                    column_type: "int(11) unsigned".to_string(),
                    is_nullable: false,
                    column_default: None,
                    extra: "auto_increment".to_string(),
                    character_maximum_length: None,
                    numeric_precision: Some(10),
                    numeric_scale: Some(0),
                    character_set_name: None,
                    collation_name: None,
                    column_comment: None,
                },
                ColumnRow {
                    ordinal_position: 2,
                    column_name: "status".to_string(),
                    data_type: "enum".to_string(),
                    column_type: "enum('active','closed')".to_string(),
                    is_nullable: true,
                    column_default: None,
                    extra: String::new(),
                    character_maximum_length: None,
                    numeric_precision: None,
                    numeric_scale: None,
                    character_set_name: None,
                    collation_name: None,
                    column_comment: None,
                },
            ])
        }

        async fn constraints(&self, _schema: &str, _table: &str) -> Result<Vec<ConstraintRow>, Infallible> {
            Ok(vec![ConstraintRow {
                constraint_name: "PRIMARY".to_string(),
                kind: ConstraintKind::PrimaryKey,
                column_name: "id".to_string(),
                ordinal_position: 1,
                ref_schema: None,
                ref_table: None,
                ref_column: None,
                update_rule: None,
                delete_rule: None,
            }])
        }

        async fn indexes(&self, _schema: &str, _table: &str) -> Result<Vec<IndexRow>, Infallible> {
            Ok(vec![])
        }

        async fn triggers(&self, _schema: &str, _table: &str) -> Result<Vec<TriggerRow>, Infallible> {
            Ok(vec![])
        }

        async fn procedures(&self, _schema: &str) -> Result<Vec<ProcedureRow>, Infallible> {
            Ok(vec![])
        }

        async fn table_comment(&self, _schema: &str, _table: &str) -> Result<Option<String>, Infallible> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn introspects_columns_pk_and_enum_values() {
        let registry = AttrRegistry::new();
        let schema = introspect_schema(&FixtureCatalog, "app", None, &registry).await.unwrap();
        let table = schema.table("app.users").unwrap();
        assert_eq!(table.pk, vec!["id".to_string()]);
        assert_eq!(table.ai_col, Some("id".to_string()));
        let status = table.field("status").unwrap();
        assert_eq!(status.enum_values, vec!["active".to_string(), "closed".to_string()]);
        let id = table.field("id").unwrap();
        assert!(id.unsigned);
        assert_eq!(id.min, Some(0));
    }
}
