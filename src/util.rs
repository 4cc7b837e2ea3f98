//! String helpers for outbound messages.
//!
//! IRC limits lines by bytes, so long text has to be cut without breaking
//! a multi-byte UTF-8 codepoint.

/// Truncates a string to at most `max_bytes` bytes without breaking
/// a multi-byte UTF-8 codepoint at the end.
///
/// # Examples
///
/// ```
/// use slirc_session::util::truncate_utf8_safe;
///
/// // ASCII string truncates normally
/// assert_eq!(truncate_utf8_safe("hello world", 5), "hello");
///
/// // Multi-byte chars are not split
/// let emoji = "Hello 👋 World";
/// let truncated = truncate_utf8_safe(emoji, 8);
/// assert_eq!(truncated, "Hello "); // Stops before the 4-byte emoji
///
/// // String shorter than limit is unchanged
/// assert_eq!(truncate_utf8_safe("hi", 10), "hi");
/// ```
#[inline]
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    // Find the last valid UTF-8 boundary at or before max_bytes
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Splits a long message into chunks of at most `max_bytes` bytes.
///
/// Chunks never break a multi-byte UTF-8 character. A chunk holds at
/// least one character even if that character is wider than
/// `max_bytes`, and a zero budget yields the whole string.
///
/// # Examples
///
/// ```
/// use slirc_session::util::split_message;
///
/// let long_msg = "Hello World! This is a test.";
/// let chunks: Vec<_> = split_message(long_msg, 10).collect();
/// assert_eq!(chunks, vec!["Hello Worl", "d! This is", " a test."]);
/// ```
pub fn split_message(s: &str, max_bytes: usize) -> impl Iterator<Item = &str> {
    SplitMessage {
        remaining: s,
        max_bytes,
    }
}

struct SplitMessage<'a> {
    remaining: &'a str,
    max_bytes: usize,
}

impl<'a> Iterator for SplitMessage<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        if self.max_bytes == 0 {
            return Some(std::mem::take(&mut self.remaining));
        }

        let mut chunk = truncate_utf8_safe(self.remaining, self.max_bytes);
        if chunk.is_empty() {
            let first = self.remaining.chars().next().map_or(0, char::len_utf8);
            chunk = &self.remaining[..first];
        }
        self.remaining = &self.remaining[chunk.len()..];
        Some(chunk)
    }
}
