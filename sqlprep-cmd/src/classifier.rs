//! Error taxonomy enrichment (component design §7): a per-engine
//! classifier maps a raw `errno` to a normalized `code` tag so callers
//! don't have to special-case engine error numbers themselves.

/// Normalized error tags a classifier can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTag {
    Required,
    NotNull,
    PrimaryKey,
    UniqueKey,
    ForeignKey,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::Required => "required",
            ErrorTag::NotNull => "not_null",
            ErrorTag::PrimaryKey => "pk",
            ErrorTag::UniqueKey => "uk",
            ErrorTag::ForeignKey => "fk",
        }
    }
}

/// Implemented once per backend engine; `classify` never needs the full
/// error text, only the numeric code the driver already surfaced.
pub trait Classifier: Send + Sync {
    fn classify(&self, errno: u16) -> Option<ErrorTag>;
}

/// The default classifier for the reference engine, built from MySQL's
/// documented errno ranges.
#[derive(Debug, Default)]
pub struct MysqlClassifier;

impl Classifier for MysqlClassifier {
    fn classify(&self, errno: u16) -> Option<ErrorTag> {
        match errno {
            1048 => Some(ErrorTag::NotNull),
            1062 => Some(ErrorTag::UniqueKey),
            1216 | 1217 | 1451 | 1452 => Some(ErrorTag::ForeignKey),
            1171 => Some(ErrorTag::Required),
            _ => None,
        }
    }
}

/// MySQL reports a duplicate `PRIMARY` key through the same 1062 errno as
/// any other unique key; distinguishing the two needs the message text,
/// which the classifier only receives as `errno` — `crate::command`
/// upgrades a `UniqueKey` tag to `PrimaryKey` after matching `key
/// 'PRIMARY'` in the raw message, rather than here.
pub fn is_primary_key_message(message: &str) -> bool {
    message.contains("key 'PRIMARY'") || message.contains("key 'primary'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_documented_mysql_errnos() {
        let c = MysqlClassifier;
        assert_eq!(c.classify(1048), Some(ErrorTag::NotNull));
        assert_eq!(c.classify(1062), Some(ErrorTag::UniqueKey));
        assert_eq!(c.classify(1451), Some(ErrorTag::ForeignKey));
        assert_eq!(c.classify(1452), Some(ErrorTag::ForeignKey));
        assert_eq!(c.classify(9999), None);
    }
}
