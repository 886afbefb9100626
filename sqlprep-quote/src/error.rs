use thiserror::Error;

/// Failures raised by the quoting service (QTE).
///
/// These are always fatal to the current template render/prepare call; the
/// core never retries a quoting failure.
#[derive(Debug, Clone, Error)]
pub enum QuoteError {
    #[error("unsupported value type for SQL quoting: {0}")]
    UnsupportedValue(String),

    #[error("identifier is empty")]
    EmptyIdentifier,

    #[error("identifier segment is empty in '{0}'")]
    EmptyIdentifierSegment(String),
}
