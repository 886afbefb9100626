use std::sync::Arc;

use sqlprep_quote::Value;

/// Canonical, engine-independent column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    Number,
    Date,
    Enum,
    String,
    Blob,
    Bool,
}

/// MySQL-specific type tag, distinct from [`CanonicalType`]. DDL renders
/// from this when present, falling back to a canonical-type default
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Decimal,
    Float,
    Double,
    Year,
    Date,
    DateTime,
    Timestamp,
    Char,
    VarChar,
    Binary,
    VarBinary,
    Text,
    Blob,
    Enum,
    Set,
    Bool,
}

impl NativeType {
    /// The bare SQL keyword for this type, before size/attribute suffixes.
    pub fn keyword(&self) -> &'static str {
        match self {
            NativeType::TinyInt => "tinyint",
            NativeType::SmallInt => "smallint",
            NativeType::MediumInt => "mediumint",
            NativeType::Int => "int",
            NativeType::BigInt => "bigint",
            NativeType::Decimal => "decimal",
            NativeType::Float => "float",
            NativeType::Double => "double",
            NativeType::Year => "year",
            NativeType::Date => "date",
            NativeType::DateTime => "datetime",
            NativeType::Timestamp => "timestamp",
            NativeType::Char => "char",
            NativeType::VarChar => "varchar",
            NativeType::Binary => "binary",
            NativeType::VarBinary => "varbinary",
            NativeType::Text => "text",
            NativeType::Blob => "blob",
            NativeType::Enum => "enum",
            NativeType::Set => "set",
            NativeType::Bool => "tinyint",
        }
    }

    /// The default canonical type that maps to this native type, used by
    /// DDL and introspection when no overlay says otherwise.
    pub fn canonical(&self) -> CanonicalType {
        match self {
            NativeType::TinyInt
            | NativeType::SmallInt
            | NativeType::MediumInt
            | NativeType::Int
            | NativeType::BigInt
            | NativeType::Decimal
            | NativeType::Float
            | NativeType::Double
            | NativeType::Year => CanonicalType::Number,
            NativeType::Date | NativeType::DateTime | NativeType::Timestamp => CanonicalType::Date,
            NativeType::Char | NativeType::VarChar => CanonicalType::String,
            NativeType::Binary | NativeType::VarBinary | NativeType::Text | NativeType::Blob => {
                CanonicalType::Blob
            }
            NativeType::Enum | NativeType::Set => CanonicalType::Enum,
            NativeType::Bool => CanonicalType::Bool,
        }
    }
}

/// Hook a [`Field`] may install to override how its values are rendered as
/// SQL literals, e.g. a numeric unix timestamp that should render through
/// `from_unixtime(...)` instead of a plain quoted number.
pub type ToSqlHook = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Column descriptor.
///
/// Plain, cloneable value type: once a [`Table`](crate::Table) is
/// constructed, its fields are never mutated in place — an update replaces
/// the whole field.
#[derive(Clone)]
pub struct Field {
    pub col: String,
    pub col_index: usize,
    pub r#type: CanonicalType,
    pub native_type: Option<NativeType>,
    pub size: Option<u32>,
    pub digits: Option<u32>,
    pub decimals: Option<u32>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub unsigned: bool,
    pub not_null: bool,
    pub auto_increment: bool,
    pub default: Option<Value>,
    pub has_time: bool,
    pub padded: bool,
    pub enum_values: Vec<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub ref_table: Option<String>,
    pub ref_col: Option<String>,
    pub comment: Option<String>,
    pub to_sql: Option<ToSqlHook>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("col", &self.col)
            .field("col_index", &self.col_index)
            .field("type", &self.r#type)
            .field("native_type", &self.native_type)
            .field("not_null", &self.not_null)
            .field("auto_increment", &self.auto_increment)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.col == other.col
            && self.col_index == other.col_index
            && self.r#type == other.r#type
            && self.native_type == other.native_type
            && self.size == other.size
            && self.digits == other.digits
            && self.decimals == other.decimals
            && self.min == other.min
            && self.max == other.max
            && self.unsigned == other.unsigned
            && self.not_null == other.not_null
            && self.auto_increment == other.auto_increment
            && self.default == other.default
            && self.has_time == other.has_time
            && self.padded == other.padded
            && self.enum_values == other.enum_values
            && self.charset == other.charset
            && self.collation == other.collation
            && self.ref_table == other.ref_table
            && self.ref_col == other.ref_col
            && self.comment == other.comment
    }
}

impl Field {
    /// Builds a bare field with every optional attribute unset; callers
    /// typically customize the result with struct-update syntax.
    pub fn new(col: impl Into<String>, col_index: usize, r#type: CanonicalType) -> Field {
        Field {
            col: col.into(),
            col_index,
            r#type,
            native_type: None,
            size: None,
            digits: None,
            decimals: None,
            min: None,
            max: None,
            unsigned: false,
            not_null: false,
            auto_increment: false,
            default: None,
            has_time: false,
            padded: false,
            enum_values: Vec::new(),
            charset: None,
            collation: None,
            ref_table: None,
            ref_col: None,
            comment: None,
            to_sql: None,
        }
    }

    /// Renders `value` as a SQL literal for this field, honoring a
    /// `to_sql` override if one is installed.
    pub fn render_value(&self, quoter: &sqlprep_quote::Quoter, value: &Value) -> Result<String, sqlprep_quote::QuoteError> {
        if let Some(hook) = &self.to_sql {
            Ok(hook(value))
        } else {
            quoter.quote_value(value)
        }
    }
}
