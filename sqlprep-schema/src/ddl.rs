//! DDL Emitter: renders `Field`/`Table`/`Schema` values as SQL DDL text.

use sqlprep_quote::Quoter;

use crate::error::SchemaError;
use crate::field::{CanonicalType, Field};
use crate::schema::Schema;
use crate::table::{sort_triggers, Check, ForeignKey, Index, Table, Trigger, UniqueKey};

/// Default native-type rendering for fields introspection never tagged
/// with a native type (hand-built tables).
fn default_native_keyword(ty: CanonicalType) -> &'static str {
    match ty {
        CanonicalType::Number => "int",
        CanonicalType::Date => "datetime",
        CanonicalType::Enum => "enum",
        CanonicalType::String => "varchar",
        CanonicalType::Blob => "blob",
        CanonicalType::Bool => "tinyint",
    }
}

fn type_keyword(field: &Field) -> &'static str {
    field
        .native_type
        .map(|nt| nt.keyword())
        .unwrap_or_else(|| default_native_keyword(field.r#type))
}

/// Renders a column's type clause, e.g. `varchar(64)`, `decimal(10,2)`,
/// `enum('a','b')`.
fn type_clause(field: &Field, quoter: &Quoter) -> Result<String, SchemaError> {
    let kw = type_keyword(field);
    if field.r#type == CanonicalType::Enum && !field.enum_values.is_empty() {
        let values: Result<Vec<String>, _> = field
            .enum_values
            .iter()
            .map(|v| quoter.quote_value(&sqlprep_quote::Value::str(v.clone())))
            .collect();
        return Ok(format!("{kw}({})", values.map_err(|_| SchemaError::UnknownColumn {
            table: String::new(),
            constraint: "enum".to_string(),
            column: field.col.clone(),
        })?.join(",")));
    }
    if let (Some(digits), Some(decimals)) = (field.digits, field.decimals) {
        return Ok(format!("{kw}({digits},{decimals})"));
    }
    if let Some(size) = field.size {
        return Ok(format!("{kw}({size})"));
    }
    Ok(kw.to_string())
}

/// `sqlcol`: a column definition — type, unsigned, collate-if-different
/// from the table default, not null, auto_increment, inline primary key
/// if this is the table's sole pk column, default, comment.
pub fn sqlcol(field: &Field, table: &Table, quoter: &Quoter, table_collation: Option<&str>) -> Result<String, SchemaError> {
    let ident = quoter.quote_ident(&field.col).map_err(|_| SchemaError::UnknownColumn {
        table: table.qualified_name(),
        constraint: "column".to_string(),
        column: field.col.clone(),
    })?;
    let mut parts = vec![ident, type_clause(field, quoter)?];

    if field.unsigned {
        parts.push("unsigned".to_string());
    }
    if let Some(collation) = &field.collation {
        if Some(collation.as_str()) != table_collation {
            parts.push(format!("collate {collation}"));
        }
    }
    if field.not_null {
        parts.push("not null".to_string());
    }
    if field.auto_increment {
        parts.push("auto_increment".to_string());
    }
    if table.pk.len() == 1 && table.pk[0] == field.col {
        parts.push("primary key".to_string());
    }
    if let Some(default) = &field.default {
        let rendered = field.render_value(quoter, default).map_err(|_| SchemaError::UnknownColumn {
            table: table.qualified_name(),
            constraint: "default".to_string(),
            column: field.col.clone(),
        })?;
        parts.push(format!("default {rendered}"));
    }
    if let Some(comment) = &field.comment {
        let quoted = quoter
            .quote_value(&sqlprep_quote::Value::str(comment.clone()))
            .unwrap_or_else(|_| "''".to_string());
        parts.push(format!("comment {quoted}"));
    }
    Ok(parts.join(" "))
}

/// `sqlpk`: the composite primary key clause (omitted by the caller when
/// the pk is a single column already inlined by [`sqlcol`]).
pub fn sqlpk(pk: &[String], quoter: &Quoter) -> Result<String, SchemaError> {
    let cols: Result<Vec<String>, _> = pk.iter().map(|c| quoter.quote_ident(c)).collect();
    let cols = cols.map_err(|_| SchemaError::UnknownColumn {
        table: String::new(),
        constraint: "pk".to_string(),
        column: String::new(),
    })?;
    Ok(format!("primary key ({})", cols.join(", ")))
}

pub fn sqluk(name: &str, uk: &UniqueKey, quoter: &Quoter) -> Result<String, SchemaError> {
    let cols: Vec<String> = uk.cols.iter().map(|c| quoter.quote_ident(c)).collect::<Result<_, _>>().map_err(|_| {
        SchemaError::UnknownColumn {
            table: String::new(),
            constraint: format!("uk '{name}'"),
            column: String::new(),
        }
    })?;
    let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.to_string());
    Ok(format!("constraint {ident} unique ({})", cols.join(", ")))
}

pub fn sqlix(name: &str, ix: &Index, quoter: &Quoter) -> Result<String, SchemaError> {
    let cols: Vec<String> = ix
        .cols
        .iter()
        .zip(ix.desc.iter().chain(std::iter::repeat(&false)))
        .map(|(c, desc)| {
            quoter
                .quote_ident(c)
                .map(|q| if *desc { format!("{q} desc") } else { q })
        })
        .collect::<Result<_, _>>()
        .map_err(|_| SchemaError::UnknownColumn {
            table: String::new(),
            constraint: format!("ix '{name}'"),
            column: String::new(),
        })?;
    let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.to_string());
    Ok(format!("index {ident} ({})", cols.join(", ")))
}

/// `sqlfk`: fails if `ref_cols` is empty (unresolved); omits `on
/// update`/`on delete` clauses that are the default ("no action").
pub fn sqlfk(name: &str, fk: &ForeignKey, table: &Table, quoter: &Quoter) -> Result<String, SchemaError> {
    if fk.ref_cols.is_empty() || fk.ref_cols.len() != fk.cols.len() {
        return Err(SchemaError::ForeignKeyArityMismatch {
            table: table.qualified_name(),
            fk: name.to_string(),
            cols: fk.cols.len(),
            ref_cols: fk.ref_cols.len(),
        });
    }
    let cols: Vec<String> = fk.cols.iter().map(|c| quoter.quote_ident(c)).collect::<Result<_, _>>().map_err(|_| {
        SchemaError::UnknownColumn {
            table: table.qualified_name(),
            constraint: format!("fk '{name}'"),
            column: String::new(),
        }
    })?;
    let ref_cols: Vec<String> = fk.ref_cols.iter().map(|c| quoter.quote_ident(c)).collect::<Result<_, _>>().map_err(|_| {
        SchemaError::UnresolvedForeignKey {
            table: table.qualified_name(),
            fk: name.to_string(),
            ref_table: fk.ref_table.clone(),
            column: String::new(),
        }
    })?;
    let ref_table = quoter.quote_ident(&fk.ref_table).unwrap_or_else(|_| fk.ref_table.clone());
    let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.to_string());
    let mut clause = format!(
        "constraint {ident} foreign key ({}) references {ref_table} ({})",
        cols.join(", "),
        ref_cols.join(", ")
    );
    if let Some(onupdate) = fk.onupdate {
        if onupdate != crate::table::FkAction::NoAction {
            clause.push_str(&format!(" on update {}", onupdate.sql()));
        }
    }
    if let Some(ondelete) = fk.ondelete {
        if ondelete != crate::table::FkAction::NoAction {
            clause.push_str(&format!(" on delete {}", ondelete.sql()));
        }
    }
    Ok(clause)
}

pub fn sqlcheck(name: &str, check: &Check, quoter: &Quoter) -> String {
    let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.to_string());
    format!("constraint {ident} check ({})", check.expr)
}

pub fn sqltrigger(name: &str, trigger: &Trigger, table: &Table, quoter: &Quoter) -> String {
    let when = match trigger.when {
        crate::table::TriggerWhen::Before => "before",
        crate::table::TriggerWhen::After => "after",
    };
    let op = match trigger.op {
        crate::table::TriggerOp::Insert => "insert",
        crate::table::TriggerOp::Update => "update",
        crate::table::TriggerOp::Delete => "delete",
    };
    let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.to_string());
    let table_ident = quoter.quote_ident(&table.qualified_name()).unwrap_or_else(|_| table.qualified_name());
    format!(
        "create trigger {ident} {when} {op} on {table_ident} for each row {}",
        trigger.body
    )
}

/// `sqlproc`: `name` is already the qualified `schema.procname` key used
/// by `Schema::procs`.
pub fn sqlproc(name: &str, proc: &crate::table::Procedure, quoter: &Quoter) -> String {
    let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.to_string());
    let params = proc.params.join(", ");
    let returns = proc
        .returns
        .as_ref()
        .map(|r| format!(" returns {r}"))
        .unwrap_or_default();
    format!("create procedure {ident}({params}){returns}\n{}", proc.body)
}

/// `sqltable`: the full `create table` body — column list, composite pk
/// if any, then uks, ixs, fks, checks, each sub-group iterated in sorted
/// key order (the `BTreeMap`s on [`Table`] already guarantee this).
pub fn sqltable(table: &Table, quoter: &Quoter) -> Result<String, SchemaError> {
    table.validate()?;
    let mut lines = Vec::new();
    for field in table.fields() {
        lines.push(sqlcol(field, table, quoter, table.comment.as_deref())?);
    }
    if table.has_composite_pk() {
        lines.push(sqlpk(&table.pk, quoter)?);
    }
    for (name, uk) in &table.uks {
        lines.push(sqluk(name, uk, quoter)?);
    }
    for (name, ix) in &table.ixs {
        lines.push(sqlix(name, ix, quoter)?);
    }
    for (name, fk) in &table.fks {
        lines.push(sqlfk(name, fk, table, quoter)?);
    }
    for (name, check) in &table.checks {
        lines.push(sqlcheck(name, check, quoter));
    }

    let table_ident = quoter.quote_ident(&table.qualified_name()).map_err(|_| SchemaError::UnknownColumn {
        table: table.qualified_name(),
        constraint: "table name".to_string(),
        column: String::new(),
    })?;
    let mut out = format!("create table {table_ident} (\n  {}\n)", lines.join(",\n  "));
    if let Some(comment) = &table.comment {
        let quoted = quoter
            .quote_value(&sqlprep_quote::Value::str(comment.clone()))
            .unwrap_or_else(|_| "''".to_string());
        out.push_str(&format!(" comment={quoted}"));
    }
    Ok(out)
}

/// Triggers in declaration order sorted by `(op, when, pos)`, the
/// corrected comparator for the reference implementation's undefined
/// `cmd_trg` sort.
pub fn sorted_triggers(table: &Table) -> Vec<(&String, &Trigger)> {
    let mut entries: Vec<(&String, &Trigger)> = table.triggers.iter().collect();
    sort_triggers(&mut entries);
    entries
}

/// `sqldb`: a `create database` statement for `schema.charset`/`collation`
/// defaults.
pub fn sqldb(schema: &Schema, name: &str, quoter: &Quoter) -> String {
    let ident = quoter.quote_ident(name).unwrap_or_else(|_| name.to_string());
    let mut out = format!("create database {ident}");
    if let Some(charset) = &schema.charset {
        out.push_str(&format!(" character set {charset}"));
    }
    if let Some(collation) = &schema.collation {
        out.push_str(&format!(" collate {collation}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CanonicalType;
    use sqlprep_quote::{Quoter, Value};

    fn sample_table() -> Table {
        let mut table = Table::new("app", "users");
        let mut id = Field::new("id", 0, CanonicalType::Number);
        id.auto_increment = true;
        id.not_null = true;
        table.push_field(id);
        let mut name = Field::new("name", 1, CanonicalType::String);
        name.size = Some(64);
        name.not_null = true;
        table.push_field(name);
        table.pk = vec!["id".to_string()];
        table
    }

    #[test]
    fn single_column_pk_is_inlined_on_the_column() {
        let quoter = Quoter::mysql();
        let table = sample_table();
        let field = table.field("id").unwrap();
        let col = sqlcol(field, &table, &quoter, None).unwrap();
        assert!(col.contains("primary key"));
        assert!(col.contains("auto_increment"));
    }

    #[test]
    fn composite_pk_emits_separate_clause() {
        let quoter = Quoter::mysql();
        let mut table = Table::new("app", "memberships");
        table.push_field(Field::new("user_id", 0, CanonicalType::Number));
        table.push_field(Field::new("group_id", 1, CanonicalType::Number));
        table.pk = vec!["user_id".to_string(), "group_id".to_string()];
        let ddl = sqltable(&table, &quoter).unwrap();
        assert!(ddl.contains("primary key (user_id, group_id)"));
    }

    #[test]
    fn foreign_key_without_ref_cols_is_fatal() {
        let quoter = Quoter::mysql();
        let mut table = sample_table();
        table.fks.insert(
            "fk_owner".to_string(),
            ForeignKey {
                ref_table: "app.orgs".to_string(),
                cols: vec!["id".to_string()],
                ref_cols: vec![],
                onupdate: None,
                ondelete: None,
            },
        );
        assert!(matches!(
            sqltable(&table, &quoter),
            Err(SchemaError::ForeignKeyArityMismatch { .. })
        ));
    }

    #[test]
    fn default_value_is_rendered_via_quoter() {
        let quoter = Quoter::mysql();
        let table = sample_table();
        let mut status = Field::new("status", 2, CanonicalType::String);
        status.default = Some(Value::str("active"));
        let col = sqlcol(&status, &table, &quoter, None).unwrap();
        assert!(col.contains("default 'active'"));
    }

    #[test]
    fn triggers_sort_by_op_then_when_then_pos() {
        let mut table = Table::new("app", "orders");
        table.triggers.insert(
            "t_after_insert".to_string(),
            Trigger { when: crate::table::TriggerWhen::After, op: crate::table::TriggerOp::Insert, pos: 1, body: "begin end".into() },
        );
        table.triggers.insert(
            "t_before_insert".to_string(),
            Trigger { when: crate::table::TriggerWhen::Before, op: crate::table::TriggerOp::Insert, pos: 1, body: "begin end".into() },
        );
        table.triggers.insert(
            "t_before_update".to_string(),
            Trigger { when: crate::table::TriggerWhen::Before, op: crate::table::TriggerOp::Update, pos: 1, body: "begin end".into() },
        );
        let ordered = sorted_triggers(&table);
        let names: Vec<&str> = ordered.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["t_before_insert", "t_after_insert", "t_before_update"]);
    }
}
