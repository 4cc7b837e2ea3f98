//! Message parsing implementation.
//!
//! This module implements `FromStr` for `Message` using the nom-based parser.

use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

use super::nom_parser::ParsedMessage;
use super::tags::parse_tags;
use super::types::Message;

impl Message {
    /// Parse one IRC line.
    ///
    /// The line may carry its `\r\n` terminator; invalid UTF-8 must have
    /// been replaced by the transport beforehand.
    pub fn parse(s: &str) -> Result<Message, MessageParseError> {
        let line = s.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parsed = ParsedMessage::parse(line).map_err(|e| {
            if e.at_end() {
                MessageParseError::IncompleteMessage
            } else {
                MessageParseError::InvalidCommand
            }
        })?;

        let mut command = parsed.command.to_owned();
        command.make_ascii_uppercase();

        Ok(Message {
            tags: parsed.tags.map(parse_tags),
            prefix: parsed.prefix.map(Prefix::parse),
            command,
            params: parsed.params.into_iter().map(str::to_owned).collect(),
        })
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        Message::parse(s).map_err(|cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_ping() {
        let msg: Message = "PING :server\r\n".parse().unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["server"]);
    }

    #[test]
    fn test_parse_privmsg() {
        let msg = Message::parse(":nick!user@host PRIVMSG #channel :Hello, world!").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.prefix, Some(Prefix::new("nick", "user", "host")));
        assert_eq!(msg.params, vec!["#channel", "Hello, world!"]);
    }

    #[test]
    fn test_parse_lowercase_command() {
        let msg = Message::parse("privmsg #c :x").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
    }

    #[test]
    fn test_parse_escaped_tags() {
        let msg = Message::parse("@key=value\\swith\\sspace PING :test").unwrap();
        assert_eq!(msg.tag_value("key"), Some("value with space"));
    }

    #[test]
    fn test_parse_empty_message() {
        assert_eq!(Message::parse(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(Message::parse("  \r\n"), Err(MessageParseError::EmptyMessage));
    }

    #[test]
    fn test_parse_incomplete_message() {
        assert_eq!(
            Message::parse("@time=x :irc.example.net"),
            Err(MessageParseError::IncompleteMessage)
        );
        assert_eq!(
            Message::parse(":irc.example.net "),
            Err(MessageParseError::IncompleteMessage)
        );
    }

    #[test]
    fn test_from_str_wraps_error() {
        let err = "@only=tags".parse::<Message>().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidMessage {
                cause: MessageParseError::IncompleteMessage,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_numeric_response() {
        let msg = Message::parse(":server 001 nick :Welcome to IRC").unwrap();
        assert!(msg.is_reply());
        assert_eq!(msg.params, vec!["nick", "Welcome to IRC"]);
    }
}
