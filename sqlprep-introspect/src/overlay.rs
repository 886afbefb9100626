//! Caller-supplied attribute overlays, applied last over the canonical
//! mapping INS derives from the catalog (component design §4.5, design
//! notes §9: "attribute overlay order").
//!
//! Four registries, applied least- to most-specific so a later overlay's
//! present fields win over an earlier one's: `col_attrs` (keyed by the
//! fully qualified `schema.table.col`), `col_name_attrs` (keyed by bare
//! column name), `col_type_attrs` (keyed by canonical type), then
//! `mysql_col_type_attrs` (keyed by native type) applied last so it can
//! tighten a type any of the others loosened.

use std::collections::HashMap;

use sqlprep_schema::{CanonicalType, Field, NativeType};

/// A sparse set of field attribute overrides; `None` means "don't touch
/// this attribute".
#[derive(Debug, Clone, Default)]
pub struct FieldAttrs {
    pub not_null: Option<bool>,
    pub unsigned: Option<bool>,
    pub auto_increment: Option<bool>,
    pub size: Option<u32>,
    pub digits: Option<u32>,
    pub decimals: Option<u32>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub has_time: Option<bool>,
    pub padded: Option<bool>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
}

impl FieldAttrs {
    fn apply(&self, field: &mut Field) {
        if let Some(v) = self.not_null {
            field.not_null = v;
        }
        if let Some(v) = self.unsigned {
            field.unsigned = v;
        }
        if let Some(v) = self.auto_increment {
            field.auto_increment = v;
        }
        if let Some(v) = self.size {
            field.size = Some(v);
        }
        if let Some(v) = self.digits {
            field.digits = Some(v);
        }
        if let Some(v) = self.decimals {
            field.decimals = Some(v);
        }
        if let Some(v) = self.min {
            field.min = Some(v);
        }
        if let Some(v) = self.max {
            field.max = Some(v);
        }
        if let Some(v) = self.has_time {
            field.has_time = v;
        }
        if let Some(v) = self.padded {
            field.padded = v;
        }
        if let Some(v) = &self.charset {
            field.charset = Some(v.clone());
        }
        if let Some(v) = &self.collation {
            field.collation = Some(v.clone());
        }
        if let Some(v) = &self.comment {
            field.comment = Some(v.clone());
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttrRegistry {
    pub col_attrs: HashMap<String, FieldAttrs>,
    pub col_name_attrs: HashMap<String, FieldAttrs>,
    pub col_type_attrs: HashMap<CanonicalType, FieldAttrs>,
    pub mysql_col_type_attrs: HashMap<NativeType, FieldAttrs>,
}

impl AttrRegistry {
    pub fn new() -> AttrRegistry {
        AttrRegistry::default()
    }

    /// Applies every matching overlay to `field` in ascending priority
    /// order, so `mysql_col_type_attrs` has the final word.
    pub fn overlay(&self, qualified_col: &str, field: &mut Field) {
        if let Some(attrs) = self.col_attrs.get(qualified_col) {
            attrs.apply(field);
        }
        if let Some(attrs) = self.col_name_attrs.get(&field.col) {
            attrs.apply(field);
        }
        if let Some(attrs) = self.col_type_attrs.get(&field.r#type) {
            attrs.apply(field);
        }
        if let Some(nt) = field.native_type {
            if let Some(attrs) = self.mysql_col_type_attrs.get(&nt) {
                attrs.apply(field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprep_schema::CanonicalType;

    #[test]
    fn more_specific_registries_win_over_less_specific() {
        let mut registry = AttrRegistry::new();
        registry.col_type_attrs.insert(
            CanonicalType::Number,
            FieldAttrs { unsigned: Some(false), ..Default::default() },
        );
        registry.mysql_col_type_attrs.insert(
            NativeType::TinyInt,
            FieldAttrs { unsigned: Some(true), ..Default::default() },
        );
        let mut field = Field::new("flag", 0, CanonicalType::Number);
        field.native_type = Some(NativeType::TinyInt);
        registry.overlay("app.t.flag", &mut field);
        assert!(field.unsigned);
    }

    #[test]
    fn col_attrs_is_overridden_by_col_name_attrs() {
        let mut registry = AttrRegistry::new();
        registry.col_attrs.insert(
            "app.t.id".to_string(),
            FieldAttrs { not_null: Some(false), ..Default::default() },
        );
        registry.col_name_attrs.insert(
            "id".to_string(),
            FieldAttrs { not_null: Some(true), ..Default::default() },
        );
        let mut field = Field::new("id", 0, CanonicalType::Number);
        registry.overlay("app.t.id", &mut field);
        assert!(field.not_null);
    }
}
