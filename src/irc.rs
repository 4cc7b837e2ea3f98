//! IRC message codec for tokio.
//!
//! Wraps [`LineCodec`] and converts lines to and from [`Message`]s.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::{is_illegal_control_char, LineCodec};
use crate::message::Message;

/// Tokio codec for encoding/decoding IRC messages.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a new codec with the specified encoding label.
    pub fn new(label: &str) -> error::Result<Self> {
        LineCodec::new(label).map(|codec| Self { inner: codec })
    }

    /// Create a new codec with a custom line length limit.
    pub fn with_max_len(label: &str, max_len: usize) -> error::Result<Self> {
        LineCodec::with_max_len(label, max_len).map(|codec| Self { inner: codec })
    }

    /// Prepare a serialized message for the wire.
    ///
    /// Anything after the first line break is dropped, so a parameter
    /// cannot smuggle in a second command. Appends `\r\n`.
    pub fn sanitize(mut data: String) -> error::Result<String> {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
        }
        if let Some(ch) = data.chars().find(|c| is_illegal_control_char(*c)) {
            return Err(error::ProtocolError::IllegalControlChar(ch));
        }
        data.push_str("\r\n");
        Ok(data)
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        loop {
            let Some(line) = self.inner.decode(src)? else {
                return Ok(None);
            };
            // Blank keep-alive lines carry nothing.
            if line.trim().is_empty() {
                continue;
            }
            return line.parse::<Message>().map(Some);
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(msg.to_string())?;
        self.inner.encode(sanitized, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_newline() {
        let result = IrcCodec::sanitize("PRIVMSG #test :hello\r\nQUIT".to_string());
        assert_eq!(result.unwrap(), "PRIVMSG #test :hello\r\n");
    }

    #[test]
    fn test_sanitize_rejects_bell() {
        assert!(IrcCodec::sanitize("PRIVMSG #test :\x07".to_string()).is_err());
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let mut codec = IrcCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::from("\r\n\r\n:irc PING :x\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_reports_bad_lines() {
        let mut codec = IrcCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::from("@a=b :nick\r\nPING x\r\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(error::ProtocolError::InvalidMessage { .. })
        ));
        // The next line is still readable.
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().command, "PING");
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = IrcCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::new();
        codec
            .encode(Message::new("PRIVMSG", ["#a", "hi there"]), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #a :hi there\r\n");
    }
}
