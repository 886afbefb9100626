use std::collections::{BTreeMap, HashMap};

use crate::error::SchemaError;
use crate::field::Field;

/// `ON UPDATE`/`ON DELETE` action for a foreign key. `NoAction` is the
/// default and, per the data model, stored absent (not emitted) rather
/// than written out explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl FkAction {
    pub fn sql(&self) -> &'static str {
        match self {
            FkAction::NoAction => "no action",
            FkAction::Restrict => "restrict",
            FkAction::Cascade => "cascade",
            FkAction::SetNull => "set null",
            FkAction::SetDefault => "set default",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub ref_table: String,
    pub cols: Vec<String>,
    pub ref_cols: Vec<String>,
    pub onupdate: Option<FkAction>,
    pub ondelete: Option<FkAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub cols: Vec<String>,
    /// `true` for a descending column at the matching position in `cols`.
    pub desc: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueKey {
    pub cols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub expr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TriggerWhen {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TriggerOp {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub when: TriggerWhen,
    pub op: TriggerOp,
    /// Action order among triggers that share (op, when) on this table.
    pub pos: u32,
    pub body: String,
}

impl Trigger {
    /// Sort key resolving the reference implementation's undefined
    /// `cmd_trg` comparator: order by operation, then timing, then
    /// declared position.
    fn sort_key(&self) -> (TriggerOp, TriggerWhen, u32) {
        (self.op, self.when, self.pos)
    }
}

pub fn sort_triggers(triggers: &mut [(&String, &Trigger)]) {
    triggers.sort_by_key(|(_, t)| t.sort_key());
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    /// Ordered parameter names (in/out direction is not modeled; the
    /// reference engine treats procedure parameters opaquely beyond name
    /// and declared position).
    pub params: Vec<String>,
    pub returns: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub schema: String,
    pub name: String,
    fields: Vec<Field>,
    field_index: HashMap<String, usize>,
    pub pk: Vec<String>,
    pub ai_col: Option<String>,
    pub uks: BTreeMap<String, UniqueKey>,
    pub ixs: BTreeMap<String, Index>,
    pub fks: BTreeMap<String, ForeignKey>,
    pub checks: BTreeMap<String, Check>,
    pub triggers: BTreeMap<String, Trigger>,
    pub comment: Option<String>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Table {
        Table {
            schema: schema.into(),
            name: name.into(),
            fields: Vec::new(),
            field_index: HashMap::new(),
            pk: Vec::new(),
            ai_col: None,
            uks: BTreeMap::new(),
            ixs: BTreeMap::new(),
            fks: BTreeMap::new(),
            checks: BTreeMap::new(),
            triggers: BTreeMap::new(),
            comment: None,
        }
    }

    /// `schema.table`, the key `Schema::tables` uses for this table.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, col: &str) -> Option<&Field> {
        self.field_index.get(col).map(|&i| &self.fields[i])
    }

    /// Appends `field`, keeping the name index in sync. Panics if `col` is
    /// already present — callers build a table's column list once, in
    /// order, before wiring constraints.
    pub fn push_field(&mut self, field: Field) {
        assert!(
            !self.field_index.contains_key(&field.col),
            "duplicate column '{}' on table '{}'",
            field.col,
            self.name
        );
        self.field_index.insert(field.col.clone(), self.fields.len());
        self.fields.push(field);
    }

    fn has_column(&self, col: &str) -> bool {
        self.field_index.contains_key(col)
    }

    fn check_cols(&self, constraint: &str, cols: &[String]) -> Result<(), SchemaError> {
        for col in cols {
            if !self.has_column(col) {
                return Err(SchemaError::UnknownColumn {
                    table: self.qualified_name(),
                    constraint: constraint.to_string(),
                    column: col.clone(),
                });
            }
        }
        Ok(())
    }

    /// Validates the invariants from the data model: pk/uk/ix/fk column
    /// references resolve to real columns, at most one primary key, at
    /// most one auto_increment column, and fk `cols`/`ref_cols` have equal
    /// length.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.check_cols("pk", &self.pk)?;

        let ai_from_fields: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.auto_increment)
            .map(|f| f.col.as_str())
            .collect();
        if ai_from_fields.len() > 1 {
            return Err(SchemaError::MultipleAutoIncrement {
                table: self.qualified_name(),
            });
        }
        if let Some(col) = &self.ai_col {
            if !self.has_column(col) {
                return Err(SchemaError::UnknownColumn {
                    table: self.qualified_name(),
                    constraint: "ai_col".to_string(),
                    column: col.clone(),
                });
            }
        }

        for (name, uk) in &self.uks {
            self.check_cols(&format!("uk '{name}'"), &uk.cols)?;
        }
        for (name, ix) in &self.ixs {
            self.check_cols(&format!("ix '{name}'"), &ix.cols)?;
        }
        for (name, fk) in &self.fks {
            if fk.cols.len() != fk.ref_cols.len() {
                return Err(SchemaError::ForeignKeyArityMismatch {
                    table: self.qualified_name(),
                    fk: name.clone(),
                    cols: fk.cols.len(),
                    ref_cols: fk.ref_cols.len(),
                });
            }
            self.check_cols(&format!("fk '{name}'"), &fk.cols)?;
        }
        for (name, chk) in &self.checks {
            let _ = (name, chk); // free-form expression text, not column-checked here
        }
        Ok(())
    }

    /// Whether this table's pk is composite (more than one column); DDL
    /// inlines a single-column pk on the column definition instead.
    pub fn has_composite_pk(&self) -> bool {
        self.pk.len() > 1
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| a == b)
            && self.pk == other.pk
            && self.ai_col == other.ai_col
            && self.uks == other.uks
            && self.ixs == other.ixs
            && self.fks == other.fks
            && self.checks == other.checks
            && self.triggers == other.triggers
            && self.comment == other.comment
    }
}
