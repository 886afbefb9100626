//! The marker protocol shared by STR and TPL.
//!
//! The reference design reserves a single byte after `NUL` for the slot
//! index, capping a query at 254 live substitutions. This implementation
//! drops that ceiling, so markers here are `NUL <decimal> NUL` —
//! still anchored on a byte (`\0`) that cannot occur in valid SQL source
//! text, but with no ceiling on the slot count short of `usize`.

/// Ordered table of replacement text, indexed 1-based to match the
/// "1-based index into a side table" design of the reference implementation.
#[derive(Debug, Default)]
pub struct ReplTable {
    entries: Vec<String>,
}

impl ReplTable {
    pub fn new() -> Self {
        ReplTable::default()
    }

    /// Records a replacement and returns the marker text to splice into the
    /// output in its place.
    pub fn push(&mut self, text: String) -> String {
        self.entries.push(text);
        marker_text(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn marker_text(idx: usize) -> String {
    format!("\u{0}{}\u{0}", idx)
}

/// Final pass of TPL: walks `s` once, replacing every
/// `marker_text` occurrence with its slot from `repl`. Since `repl` entries
/// are final text, this is a single linear scan — no marker's own
/// replacement is itself rescanned, which is what gives TPL its
/// no-double-expansion guarantee.
pub fn substitute(s: &str, repl: &ReplTable) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0 {
            if let Some(end) = bytes[i + 1..].iter().position(|&b| b == 0) {
                let digits = &s[i + 1..i + 1 + end];
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    let idx: usize = digits.parse().expect("validated all-digit marker index");
                    out.push_str(&repl.entries[idx - 1]);
                    i = i + 1 + end + 1;
                    continue;
                }
            }
        }
        // Not a recognized marker; copy this char verbatim.
        let ch = s[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_substitute_round_trips() {
        let mut repl = ReplTable::new();
        let m1 = repl.push("'hello'".to_string());
        let m2 = repl.push("42".to_string());
        let s = format!("SELECT {} WHERE x = {}", m1, m2);
        assert_eq!(substitute(&s, &repl), "SELECT 'hello' WHERE x = 42");
    }

    #[test]
    fn stray_nul_without_matching_marker_is_preserved() {
        let repl = ReplTable::new();
        let s = "a\u{0}b";
        assert_eq!(substitute(s, &repl), "a\u{0}b");
    }
}
