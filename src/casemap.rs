//! IRC case-mapping functions.
//!
//! IRC uses a special case-insensitive comparison where some characters
//! are considered equivalent (e.g., `[` and `{`). The server announces the
//! mapping it uses with the `CASEMAPPING` ISUPPORT token; until it does,
//! `rfc1459` applies.

/// Case mapping selected by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseMapping {
    /// `A-Z` → `a-z` only.
    Ascii,
    /// `A-Z` → `a-z` plus `[]\~` → `{}|^`.
    #[default]
    Rfc1459,
}

impl CaseMapping {
    /// Select the mapping for a `CASEMAPPING` token value.
    ///
    /// Only `ascii` selects [`CaseMapping::Ascii`]; every other value,
    /// including an absent one, selects [`CaseMapping::Rfc1459`].
    pub fn from_isupport(value: Option<&str>) -> Self {
        match value {
            Some("ascii") => Self::Ascii,
            _ => Self::Rfc1459,
        }
    }

    /// Map `s` to its canonical comparison form.
    pub fn fold(self, s: &str) -> String {
        match self {
            Self::Ascii => ascii_to_lower(s),
            Self::Rfc1459 => irc_to_lower(s),
        }
    }

    /// Compare two names under this mapping.
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            Self::Ascii => a.eq_ignore_ascii_case(b),
            Self::Rfc1459 => irc_eq(a, b),
        }
    }
}

/// Convert a string to lowercase using the `ascii` case mapping.
pub fn ascii_to_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

#[inline]
fn rfc1459_lower(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(rfc1459_lower).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
///
/// Uses the RFC 1459 case mapping where certain characters are equivalent.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| rfc1459_lower(ca) == rfc1459_lower(cb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc1459_specials() {
        assert_eq!(irc_to_lower("Nick[A]\\~"), "nick{a}|^");
        assert!(irc_eq("FOO[bar]", "foo{BAR}"));
        assert!(!irc_eq("foo", "fooo"));
    }

    #[test]
    fn test_ascii_leaves_specials() {
        assert_eq!(ascii_to_lower("Nick[A]\\~"), "nick[a]\\~");
        assert!(!CaseMapping::Ascii.eq("a[", "A{"));
        assert!(CaseMapping::Ascii.eq("ABC", "abc"));
    }

    #[test]
    fn test_from_isupport() {
        assert_eq!(CaseMapping::from_isupport(Some("ascii")), CaseMapping::Ascii);
        assert_eq!(
            CaseMapping::from_isupport(Some("rfc1459")),
            CaseMapping::Rfc1459
        );
        assert_eq!(
            CaseMapping::from_isupport(Some("rfc7613")),
            CaseMapping::Rfc1459
        );
        assert_eq!(CaseMapping::from_isupport(None), CaseMapping::Rfc1459);
    }

    #[test]
    fn test_fold_is_idempotent() {
        for input in ["Alice", "[Bob]", "~carol\\", "ÉTÉ", ""] {
            for cm in [CaseMapping::Ascii, CaseMapping::Rfc1459] {
                let once = cm.fold(input);
                assert_eq!(cm.fold(&once), once);
            }
        }
    }
}
