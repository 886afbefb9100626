//! Populates a [`Schema`] by querying a [`CatalogSource`] and applying
//! the canonical native-type mapping plus any caller-supplied overlays.

use sqlprep_quote::{Engine, Keyword, Value};
use sqlprep_schema::{
    Field, FkAction, ForeignKey, Index, Procedure, Schema, ServerKey, Table, Trigger, TriggerOp,
    TriggerWhen, UniqueKey,
};

use crate::catalog::{
    CatalogSource, ConstraintKind, TriggerEvent, TriggerTiming,
};
use crate::error::IntrospectError;
use crate::native;
use crate::overlay::AttrRegistry;

/// Introspects every table of `schema_name` visible through `source`,
/// applying `overlay` last, and returns a populated [`Schema`] keyed
/// `schema.table` as the component design requires.
pub async fn introspect_schema<C: CatalogSource>(
    source: &C,
    schema_name: &str,
    server_key: Option<ServerKey>,
    overlay: &AttrRegistry,
) -> Result<Schema, IntrospectError>
where
    C::Error: 'static,
{
    let mut schema = Schema::new(Engine::MySql);
    if let Some(key) = server_key {
        schema = schema.with_server_key(key);
    }

    let table_names = source
        .tables(schema_name)
        .await
        .map_err(|e| IntrospectError::Catalog(Box::new(e)))?;

    for table_name in &table_names {
        let table = introspect_table(source, schema_name, table_name, overlay).await?;
        schema.insert_table(table);
    }

    for proc_row in source
        .procedures(schema_name)
        .await
        .map_err(|e| IntrospectError::Catalog(Box::new(e)))?
    {
        schema.procs.insert(
            format!("{schema_name}.{}", proc_row.routine_name),
            Procedure {
                params: proc_row.params,
                returns: proc_row.returns,
                body: proc_row.routine_definition,
            },
        );
    }

    Ok(schema)
}

async fn introspect_table<C: CatalogSource>(
    source: &C,
    schema_name: &str,
    table_name: &str,
    overlay: &AttrRegistry,
) -> Result<Table, IntrospectError>
where
    C::Error: 'static,
{
    let mut table = Table::new(schema_name, table_name);
    table.comment = source
        .table_comment(schema_name, table_name)
        .await
        .map_err(|e| IntrospectError::Catalog(Box::new(e)))?;

    let columns = source
        .columns(schema_name, table_name)
        .await
        .map_err(|e| IntrospectError::Catalog(Box::new(e)))?;

    for row in columns {
        let native_type = native::native_type_for(&row.data_type)?;
        let mut field = Field::new(row.column_name.clone(), row.ordinal_position as usize, native_type.canonical());
        field.native_type = Some(native_type);
        field.not_null = !row.is_nullable;
        field.charset = row.character_set_name;
        field.collation = row.collation_name;
        field.comment = row.column_comment.filter(|c| !c.is_empty());
        field.auto_increment = row.extra.to_ascii_lowercase().contains("auto_increment");
        field.default = row.column_default.map(|text| {
            if text.eq_ignore_ascii_case("current_timestamp") {
                Value::Keyword(Keyword::CurrentTimestamp)
            } else {
                Value::Str(text)
            }
        });

        let unsigned = row.column_type.to_ascii_lowercase().contains("unsigned");
        field.unsigned = unsigned;

        match native_type.canonical() {
            sqlprep_schema::CanonicalType::Number => {
                field.digits = row.numeric_precision;
                field.decimals = row.numeric_scale;
                let wide = native::is_wide_decimal(row.numeric_precision);
                if !wide {
                    if let Some((min, max)) = native::integer_range(native_type, unsigned) {
                        field.min = Some(min);
                        field.max = Some(max);
                    }
                }
                if let Some(default_width) = native::default_display_width(native_type) {
                    let reported = extract_display_width(&row.column_type);
                    if reported != Some(default_width) {
                        field.size = reported;
                    }
                }
            }
            sqlprep_schema::CanonicalType::Date => {
                field.has_time = matches!(
                    native_type,
                    sqlprep_schema::NativeType::DateTime | sqlprep_schema::NativeType::Timestamp
                );
            }
            sqlprep_schema::CanonicalType::Enum => {
                field.enum_values = native::parse_enum_values(&row.column_type)?;
            }
            sqlprep_schema::CanonicalType::String => {
                field.padded = matches!(
                    native_type,
                    sqlprep_schema::NativeType::Char | sqlprep_schema::NativeType::Binary
                );
                field.size = row.character_maximum_length;
            }
            sqlprep_schema::CanonicalType::Blob | sqlprep_schema::CanonicalType::Bool => {}
        }

        let qualified_col = format!("{schema_name}.{table_name}.{}", field.col);
        overlay.overlay(&qualified_col, &mut field);

        table.push_field(field);
    }

    let constraints = source
        .constraints(schema_name, table_name)
        .await
        .map_err(|e| IntrospectError::Catalog(Box::new(e)))?;

    #[derive(Default)]
    struct FkGroup {
        cols: Vec<(u32, String)>,
        ref_cols: Vec<String>,
        ref_schema: Option<String>,
        ref_table: Option<String>,
        onupdate: Option<String>,
        ondelete: Option<String>,
    }

    let mut pk_cols: Vec<(u32, String)> = Vec::new();
    let mut uk_groups: std::collections::BTreeMap<String, Vec<(u32, String)>> = Default::default();
    let mut fk_groups: std::collections::BTreeMap<String, FkGroup> = Default::default();

    for row in constraints {
        match row.kind {
            ConstraintKind::PrimaryKey => pk_cols.push((row.ordinal_position, row.column_name)),
            ConstraintKind::Unique => {
                uk_groups
                    .entry(row.constraint_name)
                    .or_default()
                    .push((row.ordinal_position, row.column_name));
            }
            ConstraintKind::ForeignKey => {
                let entry = fk_groups.entry(row.constraint_name).or_default();
                entry.cols.push((row.ordinal_position, row.column_name));
                if let Some(ref_col) = row.ref_column {
                    entry.ref_cols.push(ref_col);
                }
                entry.ref_schema = row.ref_schema.or_else(|| entry.ref_schema.take());
                entry.ref_table = row.ref_table.or_else(|| entry.ref_table.take());
                entry.onupdate = row.update_rule.or_else(|| entry.onupdate.take());
                entry.ondelete = row.delete_rule.or_else(|| entry.ondelete.take());
            }
        }
    }

    pk_cols.sort_by_key(|(pos, _)| *pos);
    table.pk = pk_cols.into_iter().map(|(_, col)| col).collect();
    if let Some(ai_col) = table
        .fields()
        .iter()
        .find(|f| f.auto_increment)
        .map(|f| f.col.clone())
    {
        table.ai_col = Some(ai_col);
    }

    for (name, mut cols) in uk_groups {
        cols.sort_by_key(|(pos, _)| *pos);
        table.uks.insert(name, UniqueKey { cols: cols.into_iter().map(|(_, c)| c).collect() });
    }

    for (name, mut group) in fk_groups {
        group.cols.sort_by_key(|(pos, _)| *pos);
        let ref_table_name = match (group.ref_schema, group.ref_table) {
            (Some(s), Some(t)) => format!("{s}.{t}"),
            (None, Some(t)) => t,
            _ => String::new(),
        };
        table.fks.insert(
            name,
            ForeignKey {
                ref_table: ref_table_name,
                cols: group.cols.into_iter().map(|(_, c)| c).collect(),
                ref_cols: group.ref_cols,
                onupdate: group.onupdate.as_deref().and_then(parse_fk_action),
                ondelete: group.ondelete.as_deref().and_then(parse_fk_action),
            },
        );
    }

    let indexes = source
        .indexes(schema_name, table_name)
        .await
        .map_err(|e| IntrospectError::Catalog(Box::new(e)))?;
    let mut ix_groups: std::collections::BTreeMap<String, Vec<(u32, String, bool)>> = Default::default();
    for row in indexes {
        ix_groups
            .entry(row.index_name)
            .or_default()
            .push((row.seq_in_index, row.column_name, row.descending));
    }
    for (name, mut cols) in ix_groups {
        cols.sort_by_key(|(pos, _, _)| *pos);
        let (cols, desc): (Vec<String>, Vec<bool>) =
            cols.into_iter().map(|(_, c, d)| (c, d)).unzip();
        table.ixs.insert(name, Index { cols, desc });
    }

    let triggers = source
        .triggers(schema_name, table_name)
        .await
        .map_err(|e| IntrospectError::Catalog(Box::new(e)))?;
    for row in triggers {
        let when = match row.timing {
            TriggerTiming::Before => TriggerWhen::Before,
            TriggerTiming::After => TriggerWhen::After,
        };
        let op = match row.event {
            TriggerEvent::Insert => TriggerOp::Insert,
            TriggerEvent::Update => TriggerOp::Update,
            TriggerEvent::Delete => TriggerOp::Delete,
        };
        table.triggers.insert(
            row.trigger_name,
            Trigger { when, op, pos: row.action_order, body: row.action_statement },
        );
    }

    Ok(table)
}

/// Parses an information_schema `update_rule`/`delete_rule` value;
/// `NO ACTION` (the default) is returned as `None` so it is stored absent
/// rather than written out on DDL emission.
fn parse_fk_action(rule: &str) -> Option<FkAction> {
    match rule.to_ascii_uppercase().as_str() {
        "NO ACTION" => None,
        "RESTRICT" => Some(FkAction::Restrict),
        "CASCADE" => Some(FkAction::Cascade),
        "SET NULL" => Some(FkAction::SetNull),
        "SET DEFAULT" => Some(FkAction::SetDefault),
        _ => None,
    }
}

fn extract_display_width(column_type: &str) -> Option<u32> {
    let open = column_type.find('(')?;
    let close = column_type[open..].find(')')? + open;
    column_type[open + 1..close].parse().ok()
}
