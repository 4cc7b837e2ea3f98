//! Error types for the IRC session library.
//!
//! This module defines error types for transport-level failures,
//! message parsing failures, channel mode parsing and session handling.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors, as seen by the transport.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the maximum allowed length.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Length of the offending line.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Illegal control character in message.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Tags or prefix were present but no command followed.
    #[error("incomplete message")]
    IncompleteMessage,

    /// Command contained characters outside `[A-Za-z0-9]`.
    #[error("invalid command")]
    InvalidCommand,

    /// Fewer parameters than the handler needs.
    #[error("not enough parameters: expected {expected}, got {got}")]
    NotEnoughParams {
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters.
        got: usize,
    },

    /// Invalid message prefix.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
}

/// Errors encountered when parsing channel mode strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeParseError {
    /// Letter is in none of the CHANMODES classes and is not a prefix mode.
    #[error("unknown mode: {0}")]
    UnknownMode(char),

    /// Parameters ran out before letters did.
    #[error("missing parameter for mode {0}")]
    MissingModeParams(char),
}

/// Errors returned by [`Session::handle_message`](crate::Session::handle_message).
///
/// None of these is fatal to the connection: the caller decides whether to
/// log, drop or disconnect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    /// The message did not carry what its command requires.
    #[error("malformed {command}: {cause}")]
    Parse {
        /// Command of the offending message.
        command: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },

    /// A MODE line could not be applied.
    #[error("malformed mode change: {0}")]
    Mode(#[from] ModeParseError),

    /// An ISUPPORT token carried a value that cannot be applied.
    #[error("invalid ISUPPORT value: {0}")]
    InvalidIsupport(String),

    /// A message referenced a malformed timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl SessionError {
    pub(crate) fn parse(command: &str, cause: MessageParseError) -> Self {
        Self::Parse {
            command: command.to_owned(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::MessageTooLong {
            actual: 1024,
            limit: 512,
        };
        assert_eq!(
            format!("{}", err),
            "message too long: 1024 bytes (limit 512)"
        );

        let err = MessageParseError::NotEnoughParams {
            expected: 2,
            got: 1,
        };
        assert_eq!(
            format!("{}", err),
            "not enough parameters: expected 2, got 1"
        );
    }

    #[test]
    fn test_protocol_error_chaining() {
        let parse_err = MessageParseError::IncompleteMessage;
        let protocol_err = ProtocolError::InvalidMessage {
            string: "@a=b :nick".to_string(),
            cause: parse_err.clone(),
        };

        let source = std::error::Error::source(&protocol_err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), parse_err.to_string());
    }

    #[test]
    fn test_session_error_chaining() {
        let err = SessionError::parse("KICK", MessageParseError::NotEnoughParams {
            expected: 2,
            got: 1,
        });
        assert_eq!(
            err.to_string(),
            "malformed KICK: not enough parameters: expected 2, got 1"
        );
        assert!(std::error::Error::source(&err).is_some());

        let err: SessionError = ModeParseError::UnknownMode('Z').into();
        assert_eq!(err.to_string(), "malformed mode change: unknown mode: Z");
    }

    #[test]
    fn test_error_conversion() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let protocol_err: ProtocolError = io_err.into();

        match protocol_err {
            ProtocolError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }
}
