//! Native → canonical type mapping (component design §4.5).

use sqlprep_schema::{CanonicalType, NativeType};

use crate::error::IntrospectError;

/// Maps an information_schema `data_type` string (`tinyint`, `varchar`,
/// `decimal`, ...) to a [`NativeType`].
pub fn native_type_for(data_type: &str) -> Result<NativeType, IntrospectError> {
    Ok(match data_type.to_ascii_lowercase().as_str() {
        "tinyint" => NativeType::TinyInt,
        "smallint" => NativeType::SmallInt,
        "mediumint" => NativeType::MediumInt,
        "int" | "integer" => NativeType::Int,
        "bigint" => NativeType::BigInt,
        "decimal" | "numeric" => NativeType::Decimal,
        "float" => NativeType::Float,
        "double" | "double precision" | "real" => NativeType::Double,
        "year" => NativeType::Year,
        "date" => NativeType::Date,
        "datetime" => NativeType::DateTime,
        "timestamp" => NativeType::Timestamp,
        "char" => NativeType::Char,
        "varchar" => NativeType::VarChar,
        "binary" => NativeType::Binary,
        "varbinary" => NativeType::VarBinary,
        "text" | "tinytext" | "mediumtext" | "longtext" => NativeType::Text,
        "blob" | "tinyblob" | "mediumblob" | "longblob" => NativeType::Blob,
        "enum" => NativeType::Enum,
        "set" => NativeType::Set,
        other => return Err(IntrospectError::UnknownNativeType(other.to_string())),
    })
}

/// Default display width MySQL assigns an integer type, used to decide
/// whether a catalog-reported `display_width` is worth preserving (the
/// component design says it's "preserved only when it differs from the
/// integer type's default").
pub fn default_display_width(nt: NativeType) -> Option<u32> {
    match nt {
        NativeType::TinyInt => Some(4),
        NativeType::SmallInt => Some(6),
        NativeType::MediumInt => Some(9),
        NativeType::Int => Some(11),
        NativeType::BigInt => Some(20),
        _ => None,
    }
}

/// `(min, max)` range for a signed/unsigned integer native type, used to
/// populate `Field::min`/`max` for integer- and `year`-typed columns.
pub fn integer_range(nt: NativeType, unsigned: bool) -> Option<(i64, i64)> {
    Some(match (nt, unsigned) {
        (NativeType::TinyInt, false) => (-128, 127),
        (NativeType::TinyInt, true) => (0, 255),
        (NativeType::SmallInt, false) => (-32_768, 32_767),
        (NativeType::SmallInt, true) => (0, 65_535),
        (NativeType::MediumInt, false) => (-8_388_608, 8_388_607),
        (NativeType::MediumInt, true) => (0, 16_777_215),
        (NativeType::Int, false) => (-2_147_483_648, 2_147_483_647),
        (NativeType::Int, true) => (0, 4_294_967_295),
        (NativeType::BigInt, false) => (i64::MIN, i64::MAX),
        (NativeType::BigInt, true) => (0, i64::MAX),
        (NativeType::Year, _) => (1901, 2055),
        _ => return None,
    })
}

/// The canonical bucket a native type falls into absent any attribute
/// overlay, per the mapping table: big decimals keep arbitrary precision
/// (no computed range) while everything else numeric gets a computed
/// `min`/`max`; dates carry a `has_time` flag; enums parse their value
/// list; char/binary are `string` with `padded = true`.
pub fn canonical_for(nt: NativeType) -> CanonicalType {
    nt.canonical()
}

/// `true` when decimal precision exceeds 15 digits — kept at arbitrary
/// precision (no computed `min`/`max`) rather than coerced into the
/// `i64`-range integer treatment the mapping gives smaller decimals.
pub fn is_wide_decimal(digits: Option<u32>) -> bool {
    digits.map(|d| d > 15).unwrap_or(false)
}

/// Parses a `column_type` enum/set definition body, e.g.
/// `enum('a','b','c')`, into its ordered value list.
pub fn parse_enum_values(column_type: &str) -> Result<Vec<String>, IntrospectError> {
    let open = column_type.find('(').ok_or_else(|| {
        IntrospectError::MalformedEnumValues(column_type.to_string(), "missing '('".to_string())
    })?;
    let close = column_type.rfind(')').ok_or_else(|| {
        IntrospectError::MalformedEnumValues(column_type.to_string(), "missing ')'".to_string())
    })?;
    if close <= open {
        return Err(IntrospectError::MalformedEnumValues(
            column_type.to_string(),
            "')' before '('".to_string(),
        ));
    }
    let body = &column_type[open + 1..close];
    let mut values = Vec::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            continue;
        }
        let mut value = String::new();
        loop {
            match chars.next() {
                None => {
                    return Err(IntrospectError::MalformedEnumValues(
                        column_type.to_string(),
                        "unterminated value".to_string(),
                    ))
                }
                Some('\'') if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                Some('\'') => break,
                Some(c) => value.push(c),
            }
        }
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_data_types() {
        assert_eq!(native_type_for("int").unwrap(), NativeType::Int);
        assert_eq!(native_type_for("VARCHAR").unwrap(), NativeType::VarChar);
        assert_eq!(native_type_for("mediumtext").unwrap(), NativeType::Text);
    }

    #[test]
    fn unknown_data_type_is_an_error() {
        assert!(native_type_for("geometry").is_err());
    }

    #[test]
    fn integer_ranges_match_mysql_limits() {
        assert_eq!(integer_range(NativeType::TinyInt, false), Some((-128, 127)));
        assert_eq!(integer_range(NativeType::Int, true), Some((0, 4_294_967_295)));
        assert_eq!(integer_range(NativeType::Year, false), Some((1901, 2055)));
    }

    #[test]
    fn parses_enum_value_list_with_escaped_quote() {
        let values = parse_enum_values("enum('a','b''s','c')").unwrap();
        assert_eq!(values, vec!["a", "b's", "c"]);
    }

    #[test]
    fn wide_decimal_skips_range_computation() {
        assert!(is_wide_decimal(Some(20)));
        assert!(!is_wide_decimal(Some(10)));
        assert!(!is_wide_decimal(None));
    }
}
