use crate::error::QuoteError;
use crate::keyword::{Engine, Keyword};
use crate::reserved::ReservedWords;
use crate::value::Value;

/// The quoting service.
///
/// `Quoter` is engine-parameterized rather than hard-coded to MySQL so the
/// core stays engine-agnostic, with MySQL as the reference
/// backend via [`Quoter::mysql`].
pub struct Quoter {
    engine: Engine,
    reserved: ReservedWords,
}

impl Quoter {
    pub fn new(engine: Engine, reserved: ReservedWords) -> Self {
        Quoter { engine, reserved }
    }

    pub fn mysql() -> Self {
        Quoter::new(Engine::MySql, ReservedWords::default())
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn reserved_words(&self) -> &ReservedWords {
        &self.reserved
    }

    /// Escapes the body of a single-quoted string literal: backslash and
    /// single-quote are doubled via backslash-escaping, matching the
    /// reference backend's `esc` collaborator.
    fn escape_string_body(s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 4);
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                _ => out.push(c),
            }
        }
        out
    }

    /// Renders a host [`Value`] as a SQL literal.
    pub fn quote_value(&self, value: &Value) -> Result<String, QuoteError> {
        match value {
            Value::Null => Ok(Keyword::Null.spelling(self.engine).to_string()),
            Value::Default => Ok(Keyword::Default.spelling(self.engine).to_string()),
            Value::Bool(b) => {
                let kw = if *b { Keyword::True } else { Keyword::False };
                Ok(kw.spelling(self.engine).to_string())
            }
            Value::Number(n) => {
                if value.is_non_finite() {
                    Ok(Keyword::Null.spelling(self.engine).to_string())
                } else {
                    Ok(n.clone())
                }
            }
            Value::Str(s) => Ok(format!("'{}'", Self::escape_string_body(s))),
            Value::Keyword(k) => Ok(k.spelling(self.engine).to_string()),
            Value::List(items) => {
                if items.is_empty() {
                    // Documented footgun for `NOT IN (...)`: an empty list
                    // quotes to `null`, not `()`.
                    Ok(Keyword::Null.spelling(self.engine).to_string())
                } else {
                    let parts: Result<Vec<String>, QuoteError> =
                        items.iter().map(|v| self.quote_value(v)).collect();
                    Ok(parts?.join(", "))
                }
            }
        }
    }

    /// Renders a [`Value`] as raw, unquoted text — used for macro arguments,
    /// which splice into the surrounding SQL rather than standing as a
    /// literal.
    pub fn render_raw(&self, value: &Value) -> Result<String, QuoteError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Default => Ok(Keyword::Default.spelling(self.engine).to_string()),
            Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            Value::Number(n) => Ok(n.clone()),
            Value::Str(s) => Ok(s.clone()),
            Value::Keyword(k) => Ok(k.spelling(self.engine).to_string()),
            Value::List(items) => {
                let parts: Result<Vec<String>, QuoteError> =
                    items.iter().map(|v| self.render_raw(v)).collect();
                Ok(parts?.join(", "))
            }
        }
    }

    /// Quotes an identifier, possibly dotted (`schema.table`), back-quoting
    /// each segment iff it is a reserved word. A leading
    /// backtick means the caller already quoted it; it is returned verbatim.
    pub fn quote_ident(&self, ident: &str) -> Result<String, QuoteError> {
        let trimmed = ident.trim();
        if trimmed.is_empty() {
            return Err(QuoteError::EmptyIdentifier);
        }
        if trimmed.starts_with('`') {
            return Ok(trimmed.to_string());
        }
        let parts: Result<Vec<String>, QuoteError> = trimmed
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    return Err(QuoteError::EmptyIdentifierSegment(trimmed.to_string()));
                }
                if self.reserved.is_reserved(seg) {
                    Ok(format!("`{}`", seg))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect();
        Ok(parts?.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_default_and_bool() {
        let q = Quoter::mysql();
        assert_eq!(q.quote_value(&Value::Null).unwrap(), "null");
        assert_eq!(q.quote_value(&Value::Default).unwrap(), "default");
        assert_eq!(q.quote_value(&Value::Bool(true)).unwrap(), "1");
        assert_eq!(q.quote_value(&Value::Bool(false)).unwrap(), "0");
    }

    #[test]
    fn nan_and_infinity_quote_to_null() {
        let q = Quoter::mysql();
        assert_eq!(q.quote_value(&Value::from_f64(f64::NAN)).unwrap(), "null");
        assert_eq!(q.quote_value(&Value::from_f64(f64::INFINITY)).unwrap(), "null");
    }

    #[test]
    fn string_escapes_quote_and_backslash() {
        let q = Quoter::mysql();
        assert_eq!(
            q.quote_value(&Value::str("it's a \\test")).unwrap(),
            "'it\\'s a \\\\test'"
        );
    }

    #[test]
    fn empty_list_quotes_to_null() {
        let q = Quoter::mysql();
        assert_eq!(q.quote_value(&Value::List(vec![])).unwrap(), "null");
    }

    #[test]
    fn nonempty_list_comma_joins() {
        let q = Quoter::mysql();
        let list = Value::List(vec![Value::number(1), Value::number(2), Value::number(3)]);
        assert_eq!(q.quote_value(&list).unwrap(), "1, 2, 3");
    }

    #[test]
    fn identifier_quoting_reserves_only_keywords() {
        let q = Quoter::mysql();
        assert_eq!(q.quote_ident("Order").unwrap(), "`Order`");
        assert_eq!(q.quote_ident("Order.col").unwrap(), "`Order`.col");
        assert_eq!(q.quote_ident("customer_id").unwrap(), "customer_id");
        assert_eq!(q.quote_ident("`already`").unwrap(), "`already`");
    }
}
