//! Template Expander (TPL).3.
//!
//! Performs marker-based substitution of macros, constants, verbatim
//! slots, named parameters and positional arguments, producing either a
//! literalized SQL string (literal mode) or a prepared-statement SQL
//! string plus a parameter-map (prepare mode).

use crate::env::TemplateEnvironment;
use crate::error::TemplateError;
use crate::marker::{self, ReplTable};
use crate::str_scan;

/// Sanity ceiling on live substitutions in one query. This lifts the
/// reference implementation's 254-marker ceiling; this is not
/// that ceiling, just a backstop against runaway input.
const MAX_SUBSTITUTIONS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Literal,
    Prepare,
}

/// One entry of the prepared statement's bind plan.
#[derive(Debug, Clone, PartialEq)]
pub enum BindSite {
    Positional(usize),
    Named(String),
}

/// TPL's output.
#[derive(Debug, Clone)]
pub struct Expanded {
    pub sql: String,
    /// Every named parameter reference encountered, in order, for caller
    /// telemetry — not deduplicated.
    pub param_names: Vec<String>,
    /// Only populated in [`Mode::Prepare`].
    pub param_map: Vec<BindSite>,
}

fn push_checked(repl: &mut ReplTable, text: String) -> Result<String, TemplateError> {
    if repl.len() >= MAX_SUBSTITUTIONS {
        return Err(TemplateError::TooManySubstitutions {
            limit: MAX_SUBSTITUTIONS,
            actual: repl.len() + 1,
        });
    }
    Ok(repl.push(text))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Reads an identifier (`[A-Za-z_][A-Za-z0-9_]*`) starting at byte offset
/// `i` in `s`. Returns `(name, end_offset)`.
fn read_ident(s: &str, i: usize) -> Option<(&str, usize)> {
    let rest = &s[i..];
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;
    if !is_ident_start(first) {
        return None;
    }
    let mut end = first.len_utf8();
    for (off, c) in chars {
        if !is_ident_continue(c) {
            break;
        }
        end = off + c.len_utf8();
    }
    Some((&rest[..end], i + end))
}

/// Expands `::NAME` and `:NAME(:SUFFIX)*` references inside macro-call
/// arguments as raw, unquoted text.
fn expand_macro_arg(arg: &str, env: &TemplateEnvironment) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(arg.len());
    let bytes = arg.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            if bytes.get(i + 1) == Some(&b':') {
                if let Some((name, end)) = read_ident(arg, i + 2) {
                    let value = env.param(name)?;
                    out.push_str(&env.quoter().render_raw(value)?);
                    i = end;
                    continue;
                }
            } else if let Some((_, mut end)) = read_ident(arg, i + 1) {
                let start = i + 1;
                loop {
                    if arg.as_bytes().get(end) == Some(&b':') {
                        if let Some((_, next_end)) = read_ident(arg, end + 1) {
                            end = next_end;
                            continue;
                        }
                    }
                    break;
                }
                let key = &arg[start..end];
                let value = env.param(key)?;
                out.push_str(&env.quoter().render_raw(value)?);
                i = end;
                continue;
            }
        }
        let ch = arg[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    Ok(out)
}

/// Splits the contents of a macro call's parentheses on top-level commas,
/// tracking paren depth so a comma inside a nested call stays part of its
/// argument. `s` starts just after the opening `(`; returns
/// `(args, end_offset_after_closing_paren)`.
fn split_macro_args(s: &str, start: usize, name: &str) -> Result<(Vec<String>, usize), TemplateError> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = start;
    let mut arg_start = start;
    let mut args = Vec::new();
    loop {
        if i >= bytes.len() {
            return Err(TemplateError::UnclosedMacroCall(name.to_string()));
        }
        match bytes[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' if depth == 0 => {
                let piece = s[arg_start..i].trim();
                if !(piece.is_empty() && args.is_empty()) {
                    args.push(piece.to_string());
                }
                return Ok((args, i + 1));
            }
            b')' => {
                depth -= 1;
                i += 1;
            }
            b',' if depth == 0 => {
                args.push(s[arg_start..i].trim().to_string());
                i += 1;
                arg_start = i;
            }
            _ => i += 1,
        }
    }
}

/// Step 2: macro calls `$name(arg1, arg2, ...)`.
fn expand_macro_calls(
    s: &str,
    env: &TemplateEnvironment,
    repl: &mut ReplTable,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            if let Some((name, end)) = read_ident(s, i + 1) {
                if s.as_bytes().get(end) == Some(&b'(') {
                    let (raw_args, after) = split_macro_args(s, end + 1, name)?;
                    let mut expanded_args = Vec::with_capacity(raw_args.len());
                    for a in &raw_args {
                        expanded_args.push(expand_macro_arg(a, env)?);
                    }
                    let macro_fn = env.macro_fn(name)?;
                    let result = macro_fn(&expanded_args)?;
                    out.push_str(&push_checked(repl, result)?);
                    i = after;
                    continue;
                }
            }
        }
        let ch = s[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    Ok(out)
}

/// Step 3: bare constants `$name`.
fn expand_constants(
    s: &str,
    env: &TemplateEnvironment,
    repl: &mut ReplTable,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s.as_bytes()[i] == b'$' {
            if let Some((name, end)) = read_ident(s, i + 1) {
                let fragment = env.define(name)?.to_string();
                out.push_str(&push_checked(repl, fragment)?);
                i = end;
                continue;
            }
        }
        let ch = s[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    Ok(out)
}

/// Step 4: verbatim slots `{name}`.
fn expand_verbatim(
    s: &str,
    env: &TemplateEnvironment,
    repl: &mut ReplTable,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some((name, end)) = read_ident(s, i + 1) {
                if s.as_bytes().get(end) == Some(&b'}') {
                    let value = env
                        .params
                        .get(name)
                        .ok_or_else(|| TemplateError::UnknownVerbatim(name.to_string()))?;
                    let text = env.quoter().render_raw(value)?;
                    out.push_str(&push_checked(repl, text)?);
                    i = end + 1;
                    continue;
                }
            }
        }
        let ch = s[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    Ok(out)
}

/// Step 5: named parameters `::name` and `:name(:suffix)*`.
#[allow(clippy::too_many_arguments)]
fn expand_named(
    s: &str,
    env: &TemplateEnvironment,
    mode: Mode,
    repl: &mut ReplTable,
    param_names: &mut Vec<String>,
    param_map: &mut Vec<BindSite>,
    saw_named: &mut bool,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            if bytes.get(i + 1) == Some(&b':') {
                if let Some((name, end)) = read_ident(s, i + 2) {
                    param_names.push(name.to_string());
                    let value = env.param(name)?;
                    let quoted = env.quoter().quote_ident(&value_as_ident(value)?)?;
                    out.push_str(&push_checked(repl, quoted)?);
                    i = end;
                    continue;
                }
            } else if let Some((_, mut end)) = read_ident(s, i + 1) {
                let start = i + 1;
                loop {
                    if s.as_bytes().get(end) == Some(&b':') {
                        if let Some((_, next_end)) = read_ident(s, end + 1) {
                            end = next_end;
                            continue;
                        }
                    }
                    break;
                }
                let key = s[start..end].to_string();
                param_names.push(key.clone());
                *saw_named = true;
                let replacement = match mode {
                    Mode::Literal => {
                        let value = env.param(&key)?;
                        env.quoter().quote_value(value)?
                    }
                    Mode::Prepare => {
                        param_map.push(BindSite::Named(key));
                        "?".to_string()
                    }
                };
                out.push_str(&push_checked(repl, replacement)?);
                i = end;
                continue;
            }
        }
        let ch = s[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    Ok(out)
}

/// `::name`/`??` bind an identifier, which only ever makes sense as a
/// string value.
fn value_as_ident(value: &sqlprep_quote::Value) -> Result<String, TemplateError> {
    match value {
        sqlprep_quote::Value::Str(s) => Ok(s.clone()),
        other => Err(TemplateError::Quote(sqlprep_quote::QuoteError::UnsupportedValue(format!(
            "{:?} cannot be used as an identifier",
            other
        )))),
    }
}

/// Step 6: positional placeholders `??` and `?`.
fn expand_positional(
    s: &str,
    env: &TemplateEnvironment,
    mode: Mode,
    repl: &mut ReplTable,
    param_map: &mut Vec<BindSite>,
    saw_positional: &mut bool,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut counter = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'?' {
            *saw_positional = true;
            if bytes.get(i + 1) == Some(&b'?') {
                let value = env.arg(counter)?;
                let quoted = env.quoter().quote_ident(&value_as_ident(value)?)?;
                out.push_str(&push_checked(repl, quoted)?);
                counter += 1;
                i += 2;
                continue;
            } else {
                let replacement = match mode {
                    Mode::Literal => {
                        let value = env.arg(counter)?;
                        env.quoter().quote_value(value)?
                    }
                    Mode::Prepare => {
                        // Touch `arg` so a short `args` vector fails fast
                        // even in prepare mode, matching the literal-mode
                        // "missing value" failure.
                        env.arg(counter)?;
                        param_map.push(BindSite::Positional(counter));
                        "?".to_string()
                    }
                };
                out.push_str(&push_checked(repl, replacement)?);
                counter += 1;
                i += 1;
                continue;
            }
        }
        let ch = s[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    Ok(out)
}

/// Expands `s` (already run through CPP) against `env` in `mode`.
pub fn expand(s: &str, env: &TemplateEnvironment, mode: Mode) -> Result<Expanded, TemplateError> {
    if !s.contains(['#', '$', ':', '?', '{']) && !s.contains("--") {
        return Ok(Expanded {
            sql: s.to_string(),
            param_names: Vec::new(),
            param_map: Vec::new(),
        });
    }

    let mut repl = ReplTable::new();
    let pass1 = str_scan::mask(s, &mut repl)?;
    let pass2 = expand_macro_calls(&pass1, env, &mut repl)?;
    let pass3 = expand_constants(&pass2, env, &mut repl)?;
    let pass4 = expand_verbatim(&pass3, env, &mut repl)?;

    let mut param_names = Vec::new();
    let mut param_map = Vec::new();
    let mut saw_named = false;
    let mut saw_positional = false;

    let pass5 = expand_named(
        &pass4,
        env,
        mode,
        &mut repl,
        &mut param_names,
        &mut param_map,
        &mut saw_named,
    )?;
    let pass6 = expand_positional(
        &pass5,
        env,
        mode,
        &mut repl,
        &mut param_map,
        &mut saw_positional,
    )?;

    if saw_named && saw_positional {
        return Err(TemplateError::MixedBindStyles);
    }

    let sql = marker::substitute(&pass6, &repl);
    Ok(Expanded {
        sql,
        param_names,
        param_map,
    })
}
