//! The minimal async trait INS issues its information-schema queries
//! through. A real implementation routes these through the same
//! `Connection` the command facade uses; tests and the mock implementation
//! in `sqlprep-cmd` supply canned rows instead.

use async_trait::async_trait;

/// One row of `information_schema.columns` plus the handful of
/// MySQL-specific extras (`column_type`, `extra`) the canonical mapping
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRow {
    pub ordinal_position: u32,
    pub column_name: String,
    pub data_type: String,
    pub column_type: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub extra: String,
    pub character_maximum_length: Option<u32>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    pub character_set_name: Option<String>,
    pub collation_name: Option<String>,
    pub column_comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
}

/// One row of `key_column_usage`/`table_constraints`, covering pk, uk and
/// fk membership uniformly; `ref_*` fields are only populated for
/// `ForeignKey` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    pub constraint_name: String,
    pub kind: ConstraintKind,
    pub column_name: String,
    pub ordinal_position: u32,
    pub ref_schema: Option<String>,
    pub ref_table: Option<String>,
    pub ref_column: Option<String>,
    pub update_rule: Option<String>,
    pub delete_rule: Option<String>,
}

/// One row of `statistics`, filtered by the caller to indexes not already
/// covered by a pk/uk constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub index_name: String,
    pub column_name: String,
    pub seq_in_index: u32,
    /// `true` when `collation` is `D` (descending).
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

/// One row of `triggers`, already filtered to those owned by the current
/// user.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRow {
    pub trigger_name: String,
    pub timing: TriggerTiming,
    pub event: TriggerEvent,
    pub action_order: u32,
    pub action_statement: String,
}

/// One row of `routines`, parameters already resolved in declaration
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureRow {
    pub routine_name: String,
    pub params: Vec<String>,
    pub returns: Option<String>,
    pub routine_definition: String,
}

/// The catalog queries INS needs for one `schema.table`.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn tables(&self, schema: &str) -> Result<Vec<String>, Self::Error>;
    async fn columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnRow>, Self::Error>;
    async fn constraints(&self, schema: &str, table: &str) -> Result<Vec<ConstraintRow>, Self::Error>;
    async fn indexes(&self, schema: &str, table: &str) -> Result<Vec<IndexRow>, Self::Error>;
    async fn triggers(&self, schema: &str, table: &str) -> Result<Vec<TriggerRow>, Self::Error>;
    async fn procedures(&self, schema: &str) -> Result<Vec<ProcedureRow>, Self::Error>;
    async fn table_comment(&self, schema: &str, table: &str) -> Result<Option<String>, Self::Error>;
}
