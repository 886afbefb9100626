use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::keyword::Keyword;

/// A host-language value bound into a template call, a tagged-enum
/// redesign of the reference implementation's sentinel objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Default,
    Bool(bool),
    /// Stored pre-formatted so integers and decimals round-trip losslessly.
    /// `f64::NAN`/`INFINITY` are normalized to this variant's `"nan"`/`"inf"`
    /// text by the caller and rendered as `null` by the quoter; every other
    /// value passes through [`BigDecimal`] so the text is exact, canonical
    /// decimal notation rather than whatever a float formatter produced.
    Number(String),
    Str(String),
    Keyword(Keyword),
    List(Vec<Value>),
}

impl Value {
    pub fn number(n: impl std::fmt::Display) -> Value {
        Value::Number(n.to_string())
    }

    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    /// True for NaN/±Infinity textual markers produced by [`Value::from_f64`].
    fn is_non_finite_text(s: &str) -> bool {
        matches!(s, "nan" | "NaN" | "inf" | "-inf" | "Infinity" | "-Infinity")
    }

    /// Builds a [`Value::Number`] from a float, collapsing non-finite values
    /// to the textual markers the quoter recognizes as `null`. Finite values
    /// are rounded through [`BigDecimal`] so the stored text is exact decimal
    /// notation rather than whatever trailing noise `f64` formatting leaves
    /// behind, the same `str::parse` into `BigDecimal` the reference
    /// workspace uses to canonicalize decimal column text.
    pub fn from_f64(n: f64) -> Value {
        if n.is_nan() {
            Value::Number("nan".to_string())
        } else if n.is_infinite() {
            Value::Number(if n > 0.0 { "inf" } else { "-inf" }.to_string())
        } else {
            let raw = format!("{:.17}", n);
            let decimal = BigDecimal::from_str(&raw).unwrap_or_default();
            Value::Number(decimal.normalized().to_string())
        }
    }

    pub(crate) fn is_non_finite(&self) -> bool {
        matches!(self, Value::Number(n) if Value::is_non_finite_text(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(s: &'a str) -> Value {
        Value::Str(s.to_string())
    }
}
