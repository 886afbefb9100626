use sqlprep_quote::QuoteError;
use thiserror::Error;

/// Failures raised by STR, CPP and TPL.
///
/// All variants are fatal and non-retriable: the current operation aborts
/// without touching the connection.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    #[error("unclosed string literal starting at byte {0}")]
    UnclosedLiteral(usize),

    #[error("#{directive} with no matching #if")]
    UnmatchedDirective { directive: &'static str },

    #[error("#if at line {0} is never closed with #endif")]
    UnterminatedIf(usize),

    #[error("#elif after #else on the same #if")]
    ElifAfterElse,

    #[error("duplicate #else for the same #if")]
    DuplicateElse,

    #[error("malformed #{directive} expression: {message}")]
    BadDirectiveExpr {
        directive: &'static str,
        message: String,
    },

    #[error("unknown macro '{0}'")]
    UnknownMacro(String),

    #[error("unknown constant '{0}'")]
    UnknownConstant(String),

    #[error("unknown verbatim parameter '{0}'")]
    UnknownVerbatim(String),

    #[error("missing value for named parameter '{0}'")]
    MissingNamedParam(String),

    #[error("missing value for positional argument at index {0}")]
    MissingPositionalArg(usize),

    #[error("unclosed macro call '{0}('")]
    UnclosedMacroCall(String),

    #[error("too many substitutions in one query (limit is {limit}, had {actual})")]
    TooManySubstitutions { limit: usize, actual: usize },

    #[error("named parameters (:name, ::name) and positional arguments (?, ??) cannot both appear in the same query")]
    MixedBindStyles,

    #[error(transparent)]
    Quote(#[from] QuoteError),
}
