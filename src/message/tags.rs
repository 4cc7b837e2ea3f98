//! IRCv3 message tag escaping and parsing.
//!
//! Escape sequences, per the message-tags specification:
//!
//! | raw | escaped |
//! |-----|---------|
//! | `;` | `\:`    |
//! | ` ` | `\s`    |
//! | `\` | `\\`    |
//! | CR  | `\r`    |
//! | LF  | `\n`    |

use std::borrow::Cow;
use std::fmt::{Result as FmtResult, Write};

use super::types::Tag;

/// Escape a tag value for serialization.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Escape a tag value into a new string.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    // Writing into a String cannot fail.
    let _ = escape_tag_value(&mut escaped, value);
    escaped
}

/// Unescape a tag value from wire format.
///
/// Reverses [`escape`]. Unknown escapes drop the backslash, and a trailing
/// lone backslash is dropped.
pub fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

/// Intern tag keys the session looks up on nearly every message.
#[inline]
fn intern_tag_key(key: &str) -> Cow<'static, str> {
    match key {
        "batch" => Cow::Borrowed("batch"),
        "time" => Cow::Borrowed("time"),
        "msgid" => Cow::Borrowed("msgid"),
        "label" => Cow::Borrowed("label"),
        "account" => Cow::Borrowed("account"),
        "+typing" => Cow::Borrowed("+typing"),
        "+draft/channel-context" => Cow::Borrowed("+draft/channel-context"),
        _ => Cow::Owned(key.to_owned()),
    }
}

/// Parse a raw tags string (without the leading `@`) into tags.
///
/// Empty keys are skipped. A key followed by `=` and nothing else has an
/// empty value, which IRCv3 treats the same as no value.
pub(crate) fn parse_tags(tags: &str) -> Vec<Tag> {
    tags.split(';')
        .filter(|s| !s.is_empty())
        .filter_map(|tag| {
            let (key, value) = match tag.split_once('=') {
                Some((k, v)) => (k, Some(unescape(v))),
                None => (tag, None),
            };
            if key.is_empty() {
                return None;
            }
            Some(Tag(intern_tag_key(key), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape("a\\:b"), "a;b");
        assert_eq!(unescape("hello\\sworld"), "hello world");
        assert_eq!(unescape("path\\\\file"), "path\\file");
        assert_eq!(unescape("line\\rend"), "line\rend");
        assert_eq!(unescape("line\\nend"), "line\nend");
    }

    #[test]
    fn test_unescape_trailing_backslash() {
        assert_eq!(unescape("test\\"), "test");
    }

    #[test]
    fn test_unescape_unknown_escape() {
        assert_eq!(unescape("a\\xb"), "axb");
    }

    #[test]
    fn test_escape_then_unescape_is_identity() {
        let values = [
            "simple",
            "with space",
            "with;semicolon",
            "with\\backslash",
            "with\nnewline",
            "with\rcarriage",
            "complex; \\ \n \r all",
            "\\s is not a space",
            "",
        ];

        for original in values {
            let escaped = escape(original);
            assert!(!escaped.contains(' ') && !escaped.contains(';'));
            assert_eq!(unescape(&escaped), original, "escaped form: {escaped:?}");
        }
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags("batch=abc;+typing=active;flag;;=skipped;time=x\\sy");
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0], Tag::new("batch", Some("abc".into())));
        assert!(matches!(tags[0].0, Cow::Borrowed(_)));
        assert_eq!(tags[2], Tag::new("flag", None));
        assert_eq!(tags[3].1.as_deref(), Some("x y"));
    }
}
