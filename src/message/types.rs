use std::borrow::Cow;

use chrono::{DateTime, Utc};

use crate::error::MessageParseError;
use crate::ircv3::parse_server_time;
use crate::prefix::Prefix;

/// An owned IRC message.
///
/// Contains the complete parsed representation of an IRC line: optional
/// IRCv3 tags, optional prefix/source, the command and its parameters.
///
/// # Example
///
/// ```
/// use slirc_session::Message;
///
/// // Parse a message
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.params, vec!["#channel", "Hello!"]);
///
/// // Construct a message
/// let msg = Message::new("PRIVMSG", ["#channel", "Hello there"]);
/// assert_eq!(msg.to_string(), "PRIVMSG #channel :Hello there");
/// ```
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// IRCv3 message tags (e.g., `time`, `batch`).
    pub tags: Option<Vec<Tag>>,
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// Command name, uppercased for alphabetic commands.
    pub command: String,
    /// Parameters, the trailing one included.
    pub params: Vec<String>,
}

impl Message {
    /// Create a message from a command and its parameters.
    #[must_use]
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Message {
            tags: None,
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a single IRCv3 tag to this message.
    #[must_use]
    pub fn with_tag<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let tag = Tag::new(key, value.map(|v| v.into()));
        self.tags.get_or_insert_with(Vec::new).push(tag);
        self
    }

    /// Set the prefix/source of this message.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Get the value of an IRCv3 tag by key.
    ///
    /// A tag present without a value yields `Some("")`.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|Tag(k, _)| k.as_ref() == key)
            .map(|Tag(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Get the nickname (or server name) from the prefix, if present.
    pub fn source_name(&self) -> Option<&str> {
        self.prefix.as_ref().map(|p| p.name.as_str())
    }

    /// Timestamp of the message.
    ///
    /// Uses the `server-time` tag when present and valid, the current time
    /// otherwise.
    pub fn time(&self) -> DateTime<Utc> {
        self.tag_value("time")
            .and_then(parse_server_time)
            .unwrap_or_else(Utc::now)
    }

    /// Whether the command is a three-digit numeric reply.
    pub fn is_reply(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// Get a parameter by index.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Check that at least `n` parameters are present.
    pub fn require_params(&self, n: usize) -> Result<&[String], MessageParseError> {
        if self.params.len() < n {
            return Err(MessageParseError::NotEnoughParams {
                expected: n,
                got: self.params.len(),
            });
        }
        Ok(&self.params)
    }

    /// Extract the first `N` parameters positionally.
    ///
    /// Extra parameters are ignored. Bind unwanted positions to `_`.
    ///
    /// ```
    /// use slirc_session::Message;
    ///
    /// let msg: Message = ":bob KICK #chan alice :bye".parse().unwrap();
    /// let [channel, victim] = msg.params_n::<2>().unwrap();
    /// assert_eq!((channel, victim), ("#chan", "alice"));
    /// ```
    pub fn params_n<const N: usize>(&self) -> Result<[&str; N], MessageParseError> {
        let params = self.require_params(N)?;
        Ok(std::array::from_fn(|i| params[i].as_str()))
    }

    /// Copy parameters positionally into destination slots.
    ///
    /// A `None` slot skips that position. Fails with
    /// [`MessageParseError::NotEnoughParams`] if there are fewer parameters
    /// than slots; parameters beyond the last slot are ignored.
    pub fn params_into(&self, out: &mut [Option<&mut String>]) -> Result<(), MessageParseError> {
        let params = self.require_params(out.len())?;
        for (slot, param) in out.iter_mut().zip(params) {
            if let Some(dest) = slot {
                dest.clone_from(param);
            }
        }
        Ok(())
    }
}

/// An IRCv3 message tag.
///
/// Tags are key-value pairs that can be attached to messages.
/// The value is optional (some tags are presence-only flags).
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag(
    /// Tag key (e.g., `time`, `batch`).
    pub Cow<'static, str>,
    /// Optional, unescaped tag value.
    pub Option<String>,
);

impl Tag {
    /// Create a new tag with a key and optional value.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Tag(Cow::Owned(key.into()), value)
    }
}
