//! Helper methods and trait implementations for IRC response codes.
//!
//! This module provides utility methods for the Response enum including:
//! - Code conversion (code)
//! - Severity classification of arbitrary numerics
//! - Display/parsing traits

use super::Response;
use std::str::FromStr;

/// How serious a numeric reply is, as far as the user is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// The command failed.
    Fail,
    /// The command succeeded with a caveat.
    Warn,
    /// Informational.
    Note,
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a SASL-related response (900-908)
    #[inline]
    pub fn is_sasl(&self) -> bool {
        let code = self.code();
        (900..=908).contains(&code)
    }

    /// Classify a three-digit reply code.
    ///
    /// - `4xx` and `5xx` fail, except `422` (no MOTD) which is a note.
    /// - `9xx` fails when its last digit is one of `2 4 5 6 7`.
    /// - Everything else, malformed codes included, is a note.
    pub fn severity_of(code: &str) -> Severity {
        let bytes = code.as_bytes();
        if bytes.len() != 3 {
            return Severity::Note;
        }
        match bytes[0] {
            b'4' | b'5' if code == "422" => Severity::Note,
            b'4' | b'5' => Severity::Fail,
            b'9' => match bytes[2] {
                b'2' | b'4' | b'5' | b'6' | b'7' => Severity::Fail,
                _ => Severity::Note,
            },
            _ => Severity::Note,
        }
    }

    /// Severity of this numeric.
    #[inline]
    pub fn severity(&self) -> Severity {
        Response::severity_of(&self.to_string())
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when parsing a response code
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseResponseError {
    /// The string was not a valid number
    InvalidFormat,
    /// The numeric code is not a known response
    UnknownCode(u16),
}

impl std::fmt::Display for ParseResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid response code format"),
            Self::UnknownCode(code) => write!(f, "unknown response code: {}", code),
        }
    }
}

impl std::error::Error for ParseResponseError {}
