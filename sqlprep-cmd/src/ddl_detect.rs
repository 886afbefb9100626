//! Detects whether executed SQL was DDL, so the command facade knows
//! when to invalidate the server's schema cache (component design §4.8).

const DDL_PREFIXES: &[&str] = &["create", "alter", "drop", "grant", "revoke"];

/// `true` if `sql`'s first statement (after skipping a leading `;` and
/// whitespace/comments) begins with one of the DDL keywords.
pub fn is_ddl(sql: &str) -> bool {
    let mut s = sql.trim_start();
    while let Some(rest) = s.strip_prefix(';') {
        s = rest.trim_start();
    }
    let first_word: String = s
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    DDL_PREFIXES.contains(&first_word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_each_ddl_prefix() {
        for kw in DDL_PREFIXES {
            assert!(is_ddl(&format!("{kw} table t")), "{kw} should be DDL");
            assert!(is_ddl(&format!("{} table t", kw.to_uppercase())));
        }
    }

    #[test]
    fn recognizes_ddl_preceded_by_semicolon() {
        assert!(is_ddl("; create table t (id int)"));
    }

    #[test]
    fn dml_is_not_ddl() {
        assert!(!is_ddl("select 1"));
        assert!(!is_ddl("insert into t values (1)"));
    }
}
