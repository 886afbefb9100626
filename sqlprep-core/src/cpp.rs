//! Conditional Preprocessor (CPP).2.

use std::ops::Range;

use crate::env::TemplateEnvironment;
use crate::error::TemplateError;
use crate::expr::eval_condition;

struct Frame {
    /// True iff this frame and every enclosing frame are active.
    active: bool,
    /// True iff some branch of this `#if` has already been taken.
    taken: bool,
    in_else: bool,
    /// Whether the *parent* scope (not this frame) is active; a frame's own
    /// branches can only be active when the parent is too.
    parent_active: bool,
    opened_at_line: usize,
}

/// Ranges that must not be inspected for a `--`/`#` end-of-line comment
/// start: string literals and `/* ... */` blocks,
/// which must be preserved verbatim ("they carry
/// optimizer hints").
fn protected_ranges(text: &str) -> Result<Vec<Range<usize>>, TemplateError> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                let start = i;
                i += 1;
                loop {
                    if i >= bytes.len() {
                        return Err(TemplateError::UnclosedLiteral(start));
                    }
                    match bytes[i] {
                        b'\\' if i + 1 < bytes.len() => i += 2,
                        b'\'' if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                        b'\'' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                ranges.push(start..i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                ranges.push(start..i);
            }
            _ => i += 1,
        }
    }
    Ok(ranges)
}

fn in_any(ranges: &[Range<usize>], pos: usize) -> bool {
    ranges.iter().any(|r| r.contains(&pos))
}

/// Strips a `--` or `#` end-of-line comment from `line` (byte range
/// `line_start..line_start+line.len()` within the whole, already-scanned
/// text), respecting `protected`. Trailing whitespace left by the strip is
/// also trimmed.
fn strip_comment<'a>(line: &'a str, line_start: usize, protected: &[Range<usize>]) -> &'a str {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let abs = line_start + i;
        if in_any(protected, abs) {
            i += 1;
            continue;
        }
        if bytes[i] == b'#' || (bytes[i] == b'-' && bytes.get(i + 1) == Some(&b'-')) {
            return line[..i].trim_end();
        }
        i += 1;
    }
    line.trim_end()
}

fn directive(line: &str) -> Option<(&'static str, &str)> {
    let trimmed = line.trim_start();
    for (name, keyword) in [
        ("if", "#if"),
        ("elif", "#elif"),
        ("else", "#else"),
        ("endif", "#endif"),
    ] {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            // Require a word boundary so `#ifdef`-style tokens (not part of
            // this grammar) don't get misread as `#if`.
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Some((name, rest.trim()));
            }
        }
    }
    None
}

/// Runs the conditional preprocessor over `input` against `env`.
///
/// Normalizes line endings to `\n`, evaluates `#if`/`#elif`/`#else`/`#endif`
/// directives, strips `--`/`#` end-of-line comments on emitted lines
/// (preserving `/* ... */` blocks), and drops blank lines.
pub fn run(input: &str, env: &TemplateEnvironment) -> Result<String, TemplateError> {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let protected = protected_ranges(&normalized)?;

    let mut stack: Vec<Frame> = Vec::new();
    let mut out_lines: Vec<String> = Vec::new();
    let mut offset = 0usize;

    for (lineno, line) in normalized.split('\n').enumerate() {
        let line_start = offset;
        offset += line.len() + 1; // account for the '\n' consumed by split

        let parent_active = stack.last().map(|f| f.active).unwrap_or(true);

        if let Some((kind, rest)) = directive(line) {
            match kind {
                "if" => {
                    let active = parent_active && eval_condition("if", rest, env)?;
                    stack.push(Frame {
                        active,
                        taken: active,
                        in_else: false,
                        parent_active,
                        opened_at_line: lineno,
                    });
                }
                "elif" => {
                    let frame = stack
                        .last_mut()
                        .ok_or(TemplateError::UnmatchedDirective { directive: "elif" })?;
                    if frame.in_else {
                        return Err(TemplateError::ElifAfterElse);
                    }
                    if frame.taken {
                        frame.active = false;
                    } else {
                        let active = frame.parent_active && eval_condition("elif", rest, env)?;
                        frame.active = active;
                        frame.taken = active;
                    }
                }
                "else" => {
                    let frame = stack
                        .last_mut()
                        .ok_or(TemplateError::UnmatchedDirective { directive: "else" })?;
                    if frame.in_else {
                        return Err(TemplateError::DuplicateElse);
                    }
                    frame.in_else = true;
                    if frame.taken {
                        frame.active = false;
                    } else {
                        frame.active = frame.parent_active;
                        frame.taken = true;
                    }
                }
                "endif" => {
                    stack
                        .pop()
                        .ok_or(TemplateError::UnmatchedDirective { directive: "endif" })?;
                }
                _ => unreachable!(),
            }
            continue;
        }

        if !parent_active {
            continue;
        }

        let stripped = strip_comment(line, line_start, &protected);
        if stripped.trim().is_empty() {
            continue;
        }
        out_lines.push(stripped.to_string());
    }

    if let Some(frame) = stack.first() {
        return Err(TemplateError::UnterminatedIf(frame.opened_at_line));
    }

    Ok(out_lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprep_quote::{Quoter, Value};
    use std::sync::Arc;

    fn env_with(params: &[(&str, Value)]) -> TemplateEnvironment {
        let mut env = TemplateEnvironment::new(Arc::new(Quoter::mysql()));
        for (k, v) in params {
            env.params.insert(k.to_string(), v.clone());
        }
        env
    }

    #[test]
    fn if_else_endif_picks_active_branch() {
        let sql = "SELECT *\n#if flag\nFROM a\n#else\nFROM b\n#endif";
        let env = env_with(&[("flag", Value::Bool(true))]);
        assert_eq!(run(sql, &env).unwrap(), "SELECT *\nFROM a");
        let env = env_with(&[("flag", Value::Bool(false))]);
        assert_eq!(run(sql, &env).unwrap(), "SELECT *\nFROM b");
    }

    #[test]
    fn elif_chain_picks_first_true_branch() {
        let sql = "#if a\nA\n#elif b\nB\n#elif c\nC\n#else\nD\n#endif";
        let env = env_with(&[
            ("a", Value::Bool(false)),
            ("b", Value::Bool(false)),
            ("c", Value::Bool(true)),
        ]);
        assert_eq!(run(sql, &env).unwrap(), "C");
    }

    #[test]
    fn double_dash_and_hash_comments_stripped_blank_lines_dropped() {
        let sql = "SELECT 1 -- comment\n\nSELECT 2 # comment\n";
        let env = env_with(&[]);
        assert_eq!(run(sql, &env).unwrap(), "SELECT 1\nSELECT 2");
    }

    #[test]
    fn block_comments_are_preserved() {
        let sql = "SELECT /*+ INDEX(t idx) */ 1";
        let env = env_with(&[]);
        assert_eq!(run(sql, &env).unwrap(), "SELECT /*+ INDEX(t idx) */ 1");
    }

    #[test]
    fn dashes_inside_literal_are_not_a_comment() {
        let sql = "SELECT '--not a comment'";
        let env = env_with(&[]);
        assert_eq!(run(sql, &env).unwrap(), "SELECT '--not a comment'");
    }

    #[test]
    fn unmatched_endif_errors() {
        let env = env_with(&[]);
        assert!(matches!(
            run("#endif", &env),
            Err(TemplateError::UnmatchedDirective { directive: "endif" })
        ));
    }

    #[test]
    fn unterminated_if_errors() {
        let env = env_with(&[]);
        assert!(matches!(run("#if true", &env), Err(TemplateError::UnterminatedIf(0))));
    }

    #[test]
    fn duplicate_else_errors() {
        let env = env_with(&[]);
        assert!(matches!(
            run("#if true\n#else\n#else\n#endif", &env),
            Err(TemplateError::DuplicateElse)
        ));
    }

    #[test]
    fn elif_after_else_errors() {
        let env = env_with(&[]);
        assert!(matches!(
            run("#if true\n#else\n#elif true\n#endif", &env),
            Err(TemplateError::ElifAfterElse)
        ));
    }
}
