//! Schema Differ + DDL Planner: turns a structured diff between two
//! schemas into an ordered list of DDL statements that is always
//! applyable (drops that would violate a still-standing foreign key never
//! precede the drop of that key; adds of a foreign key never precede the
//! creation of its referenced table).

use sqlprep_quote::Quoter;

use crate::ddl;
use crate::error::SchemaError;
use crate::field::Field;
use crate::table::{Check, ForeignKey, Index, Table, Trigger, UniqueKey};

/// Add/remove/update buckets for one named collection (fields, uks, ixs,
/// fks, checks, triggers), in the insertion order the caller supplied —
/// deterministic output requires a caller-sorted diff, as noted in the
/// component design.
#[derive(Debug, Clone)]
pub struct AttrDiff<T> {
    pub add: Vec<(String, T)>,
    pub remove: Vec<String>,
    pub update: Vec<(String, T)>,
}

impl<T> Default for AttrDiff<T> {
    fn default() -> Self {
        Self {
            add: Vec::new(),
            remove: Vec::new(),
            update: Vec::new(),
        }
    }
}

impl<T> AttrDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.update.is_empty()
    }
}

/// Per-attribute sub-diffs for one updated table.
#[derive(Debug, Clone, Default)]
pub struct TableUpdate {
    pub fields: AttrDiff<Field>,
    pub pk: Option<(Vec<String>, Vec<String>)>, // (old, new); None = unchanged
    pub uks: AttrDiff<UniqueKey>,
    pub ixs: AttrDiff<Index>,
    pub fks: AttrDiff<ForeignKey>,
    pub checks: AttrDiff<Check>,
    pub triggers: AttrDiff<Trigger>,
}

/// `{tables: {add, remove, update}, procs: {add, remove}}` — the
/// structured diff input to the planner.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    pub tables_add: Vec<Table>,
    pub tables_remove: Vec<String>,
    pub tables_update: Vec<(String, TableUpdate)>,
    pub procs_add: Vec<(String, crate::table::Procedure)>,
    pub procs_remove: Vec<String>,
}

/// Renders a [`SchemaDiff`] into an ordered list of DDL statements,
/// following the eight-step emission order: drop procs, drop removed fks
/// on updated tables, drop removed tables, create added tables (bodies
/// only) and their triggers, per-table field/constraint changes, add fks
/// on updated tables, add fks on newly-added tables (deferred so
/// referenced tables exist), create added procs.
pub fn plan(diff: &SchemaDiff, quoter: &Quoter) -> Result<Vec<String>, SchemaError> {
    let mut stmts = Vec::new();

    // 1. Drop procs marked for removal.
    for name in &diff.procs_remove {
        let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.clone());
        stmts.push(format!("drop procedure {ident}"));
    }

    // 2. For every updated table: drop its removed foreign keys.
    for (name, update) in &diff.tables_update {
        for fk_name in &update.fks.remove {
            let table_ident = quoter.quote_ident(name).unwrap_or_else(|_| name.clone());
            let fk_ident = quoter.quote_ident(fk_name).unwrap_or_else(|_| fk_name.clone());
            stmts.push(format!("alter table {table_ident} drop foreign key {fk_ident}"));
        }
    }

    // 3. Drop tables marked for removal.
    for name in &diff.tables_remove {
        let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.clone());
        stmts.push(format!("drop table {ident}"));
    }

    // 4. Create added tables (bodies only, no outgoing fks yet) and their
    // triggers, sorted by (op, timing, pos).
    for table in &diff.tables_add {
        stmts.push(create_table_without_fks(table, quoter)?);
        for (trigger_name, trigger) in ddl::sorted_triggers(table) {
            stmts.push(ddl::sqltrigger(trigger_name, trigger, table, quoter));
        }
    }

    // 5. For every updated table, in order: drop columns; add columns;
    // change columns; drop/add pk; drop uks; add uks; drop ixs; add ixs;
    // drop checks; add checks; drop triggers; add triggers.
    for (name, update) in &diff.tables_update {
        let table_ident = quoter.quote_ident(name).unwrap_or_else(|_| name.clone());

        for col in &update.fields.remove {
            let col_ident = quoter.quote_ident(col).unwrap_or_else(|_| col.clone());
            stmts.push(format!("alter table {table_ident} drop column {col_ident}"));
        }
        for (_, field) in &update.fields.add {
            let placeholder = Table::new("", name.as_str());
            let col = ddl::sqlcol(field, &placeholder, quoter, None)?;
            stmts.push(format!("alter table {table_ident} add column {col}"));
        }
        for (_, field) in &update.fields.update {
            let placeholder = Table::new("", name.as_str());
            let col = ddl::sqlcol(field, &placeholder, quoter, None)?;
            stmts.push(format!("alter table {table_ident} modify column {col}"));
        }

        if let Some((old, new)) = &update.pk {
            if !old.is_empty() {
                stmts.push(format!("alter table {table_ident} drop primary key"));
            }
            if !new.is_empty() {
                let cols: Vec<String> = new.iter().map(|c| quoter.quote_ident(c)).collect::<Result<_, _>>().map_err(|_| {
                    SchemaError::UnknownColumn {
                        table: name.clone(),
                        constraint: "pk".to_string(),
                        column: String::new(),
                    }
                })?;
                stmts.push(format!("alter table {table_ident} add primary key ({})", cols.join(", ")));
            }
        }

        for uk_name in &update.uks.remove {
            let ident = quoter.quote_ident(uk_name).unwrap_or_else(|_| uk_name.clone());
            stmts.push(format!("alter table {table_ident} drop index {ident}"));
        }
        for (uk_name, uk) in &update.uks.add {
            stmts.push(format!("alter table {table_ident} add {}", ddl::sqluk(uk_name, uk, quoter)?));
        }
        for ix_name in &update.ixs.remove {
            let ident = quoter.quote_ident(ix_name).unwrap_or_else(|_| ix_name.clone());
            stmts.push(format!("alter table {table_ident} drop index {ident}"));
        }
        for (ix_name, ix) in &update.ixs.add {
            stmts.push(format!("alter table {table_ident} add {}", ddl::sqlix(ix_name, ix, quoter)?));
        }
        for check_name in &update.checks.remove {
            let ident = quoter.quote_ident(check_name).unwrap_or_else(|_| check_name.clone());
            stmts.push(format!("alter table {table_ident} drop check {ident}"));
        }
        for (check_name, check) in &update.checks.add {
            stmts.push(format!("alter table {table_ident} add {}", ddl::sqlcheck(check_name, check, quoter)));
        }
        for trigger_name in &update.triggers.remove {
            let ident = quoter.quote_ident(trigger_name).unwrap_or_else(|_| trigger_name.clone());
            stmts.push(format!("drop trigger {ident}"));
        }
        for (trigger_name, trigger) in &update.triggers.add {
            let placeholder = Table::new("", name.as_str());
            stmts.push(ddl::sqltrigger(trigger_name, trigger, &placeholder, quoter));
        }
    }

    // 6. For every updated table: add foreign keys.
    for (name, update) in &diff.tables_update {
        let table_ident = quoter.quote_ident(name).unwrap_or_else(|_| name.clone());
        let placeholder = Table::new("", name.as_str());
        for (fk_name, fk) in &update.fks.add {
            stmts.push(format!(
                "alter table {table_ident} add {}",
                ddl::sqlfk(fk_name, fk, &placeholder, quoter)?
            ));
        }
    }

    // 7. For every added table: add its foreign keys (deferred so
    // referenced tables exist).
    for table in &diff.tables_add {
        let table_ident = quoter.quote_ident(&table.qualified_name()).unwrap_or_else(|_| table.qualified_name());
        for (fk_name, fk) in &table.fks {
            stmts.push(format!(
                "alter table {table_ident} add {}",
                ddl::sqlfk(fk_name, fk, table, quoter)?
            ));
        }
    }

    // 8. Create added procs.
    for (name, proc) in &diff.procs_add {
        stmts.push(ddl::sqlproc(name, proc, quoter));
    }

    Ok(stmts)
}

/// `create table` for a table with its foreign keys held back for step 7
/// of the planner — everything else (columns, pk, uks, ixs, checks) is
/// safe to create immediately.
fn create_table_without_fks(table: &Table, quoter: &Quoter) -> Result<String, SchemaError> {
    let mut bare = Table::new(table.schema.clone(), table.name.clone());
    for field in table.fields() {
        bare.push_field(field.clone());
    }
    bare.pk = table.pk.clone();
    bare.ai_col = table.ai_col.clone();
    bare.uks = table.uks.clone();
    bare.ixs = table.ixs.clone();
    bare.checks = table.checks.clone();
    bare.comment = table.comment.clone();
    ddl::sqltable(&bare, quoter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CanonicalType;
    use sqlprep_quote::Quoter;

    fn table_with_fk(name: &str, ref_table: &str) -> Table {
        let mut t = Table::new("app", name);
        t.push_field(Field::new("id", 0, CanonicalType::Number));
        t.push_field(Field::new("ref_id", 1, CanonicalType::Number));
        t.pk = vec!["id".to_string()];
        t.fks.insert(
            format!("fk_{name}_ref"),
            ForeignKey {
                ref_table: ref_table.to_string(),
                cols: vec!["ref_id".to_string()],
                ref_cols: vec!["id".to_string()],
                onupdate: None,
                ondelete: None,
            },
        );
        t
    }

    /// Diff ordering: remove table A, add table B with fk -> A
    /// (pre-existing), add table C with fk -> B. Expected order: drop fks
    /// on updated tables, drop A, create B (no fks), create C (no fks),
    /// add fks of B, then C.
    fn diff_ordering_respects_drop_before_create_before_fk_attach() {
        let b = table_with_fk("b", "app.a");
        let c = table_with_fk("c", "app.b");
        let diff = SchemaDiff {
            tables_add: vec![b, c],
            tables_remove: vec!["app.a".to_string()],
            tables_update: vec![],
            procs_add: vec![],
            procs_remove: vec![],
        };
        let quoter = Quoter::mysql();
        let stmts = plan(&diff, &quoter).unwrap();

        let drop_a = stmts.iter().position(|s| s.starts_with("drop table")).unwrap();
        let create_b = stmts.iter().position(|s| s.contains("create table app.b")).unwrap();
        let create_c = stmts.iter().position(|s| s.contains("create table app.c")).unwrap();
        let fk_b = stmts.iter().position(|s| s.contains("alter table app.b add constraint")).unwrap();
        let fk_c = stmts.iter().position(|s| s.contains("alter table app.c add constraint")).unwrap();

        assert!(drop_a < create_b);
        assert!(create_b < fk_b);
        assert!(create_c < fk_c);
        assert!(fk_b < fk_c);
    }

    #[test]
    fn diff_ordering_scenario() {
        diff_ordering_respects_drop_before_create_before_fk_attach();
    }

    #[test]
    fn dropped_fks_precede_dropped_tables() {
        let mut update = TableUpdate::default();
        update.fks.remove.push("fk_old".to_string());
        let diff = SchemaDiff {
            tables_add: vec![],
            tables_remove: vec!["app.legacy".to_string()],
            tables_update: vec![("app.legacy".to_string(), update)],
            procs_add: vec![],
            procs_remove: vec![],
        };
        let quoter = Quoter::mysql();
        let stmts = plan(&diff, &quoter).unwrap();
        let drop_fk = stmts.iter().position(|s| s.contains("drop foreign key")).unwrap();
        let drop_table = stmts.iter().position(|s| s.starts_with("drop table")).unwrap();
        assert!(drop_fk < drop_table);
    }
}
