//! STR + CPP + TPL: the SQL template pipeline.
//!
//! [`render`] and [`prepare`] are the two public entry points: both run the
//! conditional preprocessor (CPP) over the input SQL against a
//! [`TemplateEnvironment`], then hand the result to the template expander
//! (TPL) in literal or prepare mode respectively.

mod cpp;
mod env;
mod error;
mod expr;
mod marker;
mod str_scan;
mod tpl;

pub use env::{EnvironmentBuilder, Macro, TemplateEnvironment};
pub use error::TemplateError;
pub use tpl::{BindSite, Expanded, Mode};

/// Runs CPP then TPL in literal mode, returning the final SQL string with
/// every parameter quoted and inlined.
pub fn render(sql: &str, env: &TemplateEnvironment) -> Result<String, TemplateError> {
    let preprocessed = cpp::run(sql, env)?;
    Ok(tpl::expand(&preprocessed, env, tpl::Mode::Literal)?.sql)
}

/// Runs CPP then TPL in prepare mode, returning the `?`-parameterized SQL
/// string together with its ordered bind-site map.
pub fn prepare(sql: &str, env: &TemplateEnvironment) -> Result<Expanded, TemplateError> {
    let preprocessed = cpp::run(sql, env)?;
    tpl::expand(&preprocessed, env, tpl::Mode::Prepare)
}

/// Exposed for tests and for callers that already have CPP-free SQL and
/// want to drive TPL directly (e.g. the schema layer's DDL templates,
/// which never contain `#if` directives).
pub fn expand(sql: &str, env: &TemplateEnvironment, mode: Mode) -> Result<Expanded, TemplateError> {
    tpl::expand(sql, env, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprep_quote::{Quoter, Value};
    use std::sync::Arc;

    fn env_with(params: &[(&str, Value)], args: Vec<Value>) -> TemplateEnvironment {
        let mut env = TemplateEnvironment::new(Arc::new(Quoter::mysql()));
        for (k, v) in params {
            env.params.insert(k.to_string(), v.clone());
        }
        env.args = args;
        env
    }

    #[test]
    fn boundary_1_literal_with_escaped_quote() {
        let env = env_with(&[], vec![Value::number(1)]);
        let sql = r"SELECT 'it\'s', ?";
        assert_eq!(render(sql, &env).unwrap(), r"SELECT 'it\'s', 1");
    }

    #[test]
    fn boundary_2_named_vs_identifier() {
        let env = env_with(&[("t", Value::str("Order")), ("v", Value::number(7))], vec![]);
        let sql = "SELECT ::t.col FROM ::t WHERE x=:v";
        assert_eq!(
            render(sql, &env).unwrap(),
            "SELECT `Order`.col FROM `Order` WHERE x=7"
        );
    }

    #[test]
    fn boundary_3_conditional() {
        let env = env_with(&[("flag", Value::Bool(true))], vec![]);
        let sql = "SELECT *\n#if flag\nFROM a\n#else\nFROM b\n#endif";
        assert_eq!(render(sql, &env).unwrap(), "SELECT *\nFROM a");
    }

    #[test]
    fn boundary_4_empty_in_list() {
        let env = env_with(&[], vec![Value::List(vec![])]);
        let sql = "SELECT 1 WHERE x IN (?)";
        assert_eq!(render(sql, &env).unwrap(), "SELECT 1 WHERE x IN (null)");
    }

    #[test]
    fn boundary_5_macro_expansion() {
        let quoter = Arc::new(Quoter::mysql());
        let env = EnvironmentBuilder::new()
            .macro_fn("fk", |args| {
                let [tbl, col, ftbl] = [&args[0], &args[1], &args[2]];
                Ok(format!(
                    "constraint fk_{tbl}_{col} foreign key ({col}) references {ftbl} ({col})"
                ))
            })
            .build(quoter);
        let sql = "alter table t add $fk(t, a, u)";
        assert_eq!(
            render(sql, &env).unwrap(),
            "alter table t add constraint fk_t_a foreign key (a) references u (a)"
        );
    }

    #[test]
    fn boundary_6_named_and_positional_are_exclusive() {
        let env = env_with(&[("v", Value::number(1))], vec![Value::number(2)]);
        let err = render("SELECT :v, ?", &env).unwrap_err();
        assert!(matches!(err, TemplateError::MixedBindStyles));
    }

    #[test]
    fn idempotent_no_op_when_no_sentinels_present() {
        let env = env_with(&[], vec![]);
        let sql = "SELECT * FROM plain_table";
        assert_eq!(render(sql, &env).unwrap(), sql);
    }

    #[test]
    fn prepare_mode_emits_placeholders_and_bind_map() {
        let env = env_with(&[("name", Value::str("abc"))], vec![]);
        let expanded = prepare("SELECT * FROM t WHERE name = :name", &env).unwrap();
        assert_eq!(expanded.sql, "SELECT * FROM t WHERE name = ?");
        assert_eq!(expanded.param_map, vec![BindSite::Named("name".to_string())]);
        assert_eq!(expanded.param_names, vec!["name".to_string()]);
    }

    #[test]
    fn double_question_mark_quotes_as_identifier() {
        let env = env_with(&[], vec![Value::str("customers")]);
        assert_eq!(
            render("SELECT * FROM ??", &env).unwrap(),
            "SELECT * FROM customers"
        );
    }

    #[test]
    fn verbatim_slot_is_not_quoted() {
        let env = env_with(&[("cols", Value::str("a, b, c"))], vec![]);
        assert_eq!(
            render("SELECT {cols} FROM t", &env).unwrap(),
            "SELECT a, b, c FROM t"
        );
    }

    #[test]
    fn unknown_constant_is_fatal() {
        let env = env_with(&[], vec![]);
        assert!(matches!(
            render("SELECT $nope", &env),
            Err(TemplateError::UnknownConstant(_))
        ));
    }
}
