//! IRC message prefix types.
//!
//! A prefix identifies the origin of a message. It is either a server name
//! or a user's `nick!user@host` mask; both are stored in the same record,
//! with `user` and `host` left empty when absent.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::str::FromStr;

/// IRC message prefix - identifies the origin of a message.
#[derive(Clone, Default, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    /// Nickname, or server name for server-originated messages.
    pub name: String,
    /// Username (ident), empty when unknown.
    pub user: String,
    /// Hostname, empty when unknown.
    pub host: String,
}

impl Prefix {
    /// Create a user prefix from nick, user, and host components.
    ///
    /// # Example
    ///
    /// ```
    /// use slirc_session::Prefix;
    ///
    /// let prefix = Prefix::new("nick", "user", "host.example.com");
    /// assert_eq!(prefix.to_string(), "nick!user@host.example.com");
    /// ```
    pub fn new(name: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix {
            name: name.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Create a prefix carrying only a name (server name or bare nickname).
    pub fn named(name: impl Into<String>) -> Self {
        Prefix {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a prefix string leniently.
    ///
    /// The first `!` separates name from user, the first `@` after it
    /// separates user from host. Components are not validated.
    pub fn parse(s: &str) -> Self {
        let (rest, host) = match s.find('@') {
            Some(at) => (&s[..at], &s[at + 1..]),
            None => (s, ""),
        };
        let (name, user) = match rest.find('!') {
            Some(bang) => (&rest[..bang], &rest[bang + 1..]),
            None => (rest, ""),
        };
        Prefix::new(name, user, host)
    }

    /// Whether the name looks like a server name rather than a nickname.
    ///
    /// Nicknames cannot contain dots; server names nearly always do.
    pub fn is_server(&self) -> bool {
        self.user.is_empty() && self.host.is_empty() && self.name.contains('.')
    }
}

impl FromStr for Prefix {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Prefix::parse(s))
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_name() {
        let p = Prefix::parse("irc.example.com");
        assert_eq!(p, Prefix::named("irc.example.com"));
        assert!(p.is_server());
    }

    #[test]
    fn test_parse_nick_user_host() {
        let p = Prefix::parse("nick!user@host.com");
        assert_eq!(p, Prefix::new("nick", "user", "host.com"));
        assert!(!p.is_server());
    }

    #[test]
    fn test_parse_nick_host() {
        let p = Prefix::parse("nick@host.com");
        assert_eq!(p, Prefix::new("nick", "", "host.com"));
    }

    #[test]
    fn test_parse_nick_only() {
        let p = Prefix::parse("nickname");
        assert_eq!(p, Prefix::named("nickname"));
        assert!(!p.is_server());
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["nick!user@host", "nick@host", "nick!user", "irc.example.com"] {
            assert_eq!(Prefix::parse(raw).to_string(), raw);
        }
    }
}
