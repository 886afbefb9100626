//! Quoting Service (QTE).4.
//!
//! Converts host [`Value`]s into SQL literals and plain strings into
//! back-quoted identifiers, against a lazily-loaded reserved-word table.

mod error;
mod keyword;
mod quote;
mod reserved;
mod value;

pub use error::QuoteError;
pub use keyword::{Engine, Keyword};
pub use quote::Quoter;
pub use reserved::ReservedWords;
pub use value::Value;
