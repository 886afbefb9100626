//! Introspects a fixture catalog into a [`Schema`], diffs it against an
//! evolved version, and checks the generated DDL against the ordering
//! rule (drop removed fks/tables before creating, defer new fks until
//! their referenced tables exist).

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use sqlprep_introspect::{
    introspect_schema, AttrRegistry, CatalogSource, ColumnRow, ConstraintKind, ConstraintRow,
    IndexRow, ProcedureRow, TriggerRow,
};
use sqlprep_quote::Quoter;
use sqlprep_schema::{plan, AttrDiff, SchemaDiff, TableUpdate};

struct FixtureCatalog {
    tables: Vec<&'static str>,
}

#[async_trait]
impl CatalogSource for FixtureCatalog {
    type Error = Infallible;

    async fn tables(&self, _schema: &str) -> Result<Vec<String>, Infallible> {
        Ok(self.tables.iter().map(|t| t.to_string()).collect())
    }

    async fn columns(&self, _schema: &str, table: &str) -> Result<Vec<ColumnRow>, Infallible> {
        let mut cols = vec![ColumnRow {
            ordinal_position: 1,
            column_name: "id".to_string(),
            data_type: "int".to_string(),
            column_type: "int(11) unsigned".to_string(),
            is_nullable: false,
            column_default: None,
            extra: "auto_increment".to_string(),
            character_maximum_length: None,
            numeric_precision: None,
            numeric_scale: None,
            character_set_name: None,
            collation_name: None,
            column_comment: None,
        }];
        if table == "orders" {
            cols.push(ColumnRow {
                ordinal_position: 2,
                column_name: "user_id".to_string(),
                data_type: "int".to_string(),
                column_type: "int(11) unsigned".to_string(),
                is_nullable: false,
                column_default: None,
                extra: String::new(),
                character_maximum_length: None,
                numeric_precision: None,
                numeric_scale: None,
                character_set_name: None,
                collation_name: None,
                column_comment: None,
            });
        }
        Ok(cols)
    }

    async fn constraints(&self, _schema: &str, table: &str) -> Result<Vec<ConstraintRow>, Infallible> {
        let mut rows = vec![ConstraintRow {
            constraint_name: "PRIMARY".to_string(),
            kind: ConstraintKind::PrimaryKey,
            column_name: "id".to_string(),
            ordinal_position: 1,
            ref_schema: None,
            ref_table: None,
            ref_column: None,
            update_rule: None,
            delete_rule: None,
        }];
        if table == "orders" {
            rows.push(ConstraintRow {
                constraint_name: "fk_orders_user_id".to_string(),
                kind: ConstraintKind::ForeignKey,
                column_name: "user_id".to_string(),
                ordinal_position: 1,
                ref_schema: Some("shop".to_string()),
                ref_table: Some("users".to_string()),
                ref_column: Some("id".to_string()),
                update_rule: Some("CASCADE".to_string()),
                delete_rule: Some("RESTRICT".to_string()),
            });
        }
        Ok(rows)
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
async fn introspected_schema_resolves_its_own_foreign_keys() {
    let catalog = FixtureCatalog { tables: vec!["users", "orders"] };
    let schema = introspect_schema(&catalog, "shop", None, &AttrRegistry::new()).await.unwrap();
    assert!(schema.validate().is_ok());
    let orders = schema.table("shop.orders").unwrap();
    let fk = &orders.fks["fk_orders_user_id"];
    assert_eq!(fk.ref_table, "shop.users");
}

#[tokio::test]
async fn diff_plan_drops_before_creating_and_defers_new_foreign_keys() {
    let catalog = FixtureCatalog { tables: vec!["users", "orders"] };
    let schema = introspect_schema(&catalog, "shop", None, &AttrRegistry::new()).await.unwrap();
    let orders = schema.table("shop.orders").unwrap().clone();

    let mut archive = orders.clone();
    archive.name = "orders_archive".to_string();
    archive.fks.clear();

    let mut diff = SchemaDiff::default();
    diff.tables_remove.push("shop.users".to_string());
    diff.tables_add.push(archive);
    let mut update = TableUpdate::default();
    update.fks = AttrDiff { add: vec![], remove: vec!["fk_orders_user_id".to_string()], update: vec![] };
    diff.tables_update.push(("shop.orders".to_string(), update));

    let quoter = Quoter::mysql();
    let statements = plan(&diff, &quoter).unwrap();

    let drop_fk = statements.iter().position(|s| s.contains("drop foreign key")).unwrap();
    let drop_users = statements.iter().position(|s| s.to_lowercase().contains("drop table") && s.contains("users")).unwrap();
    assert!(drop_fk < drop_users, "removed fks must be dropped before the tables they used to reference");
}
