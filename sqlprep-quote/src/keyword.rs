/// Engine-distinguished sentinel keywords.
///
/// The reference implementation modeled `null`/`default` as unique objects
/// identified by reference; this is the portable tagged-variant form used
/// instead here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Null,
    Default,
    CurrentTimestamp,
    True,
    False,
}

impl Keyword {
    /// Canonical SQL spelling for this keyword on the given engine.
    pub fn spelling(self, engine: Engine) -> &'static str {
        match (self, engine) {
            (Keyword::Null, _) => "null",
            (Keyword::Default, _) => "default",
            (Keyword::CurrentTimestamp, _) => "current_timestamp",
            (Keyword::True, Engine::MySql) => "1",
            (Keyword::False, Engine::MySql) => "0",
            (Keyword::True, Engine::Generic) => "true",
            (Keyword::False, Engine::Generic) => "false",
        }
    }

    /// Parses a keyword handle back out of its canonical spelling, the
    /// inverse used by the value quoter's keyword registry.
    pub fn from_spelling(s: &str) -> Option<Keyword> {
        match s.to_ascii_lowercase().as_str() {
            "null" => Some(Keyword::Null),
            "default" => Some(Keyword::Default),
            "current_timestamp" => Some(Keyword::CurrentTimestamp),
            "true" => Some(Keyword::True),
            "false" => Some(Keyword::False),
            _ => None,
        }
    }
}

/// The target SQL dialect. The reference backend is MySQL-compatible;
/// `Generic` is kept for the engine-agnostic core tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    MySql,
    Generic,
}
