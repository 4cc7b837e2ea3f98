//! Line-based codec for tokio.
//!
//! Splits the byte stream on `\n` and decodes each line to a `String`.
//! Servers and bouncers relay whatever bytes other clients send, so invalid
//! UTF-8 is replaced rather than rejected. With the `encoding` feature a
//! legacy charset can be selected by label instead.

use bytes::BytesMut;
#[cfg(feature = "encoding")]
use encoding::Encoding;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default limit for one line: 8191 bytes of tags plus a 512-byte message.
pub const DEFAULT_MAX_LEN: usize = 8191 + 512;

/// Line-based codec that handles newline-terminated messages.
pub struct LineCodec {
    #[cfg(feature = "encoding")]
    encoding: &'static Encoding,
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
}

impl LineCodec {
    /// Create a codec for the given encoding label (e.g. `utf-8`).
    ///
    /// Without the `encoding` feature the label is ignored and lines are
    /// decoded as UTF-8.
    pub fn new(label: &str) -> error::Result<Self> {
        Self::with_max_len(label, DEFAULT_MAX_LEN)
    }

    /// Create a codec with a custom line length limit.
    pub fn with_max_len(_label: &str, max_len: usize) -> error::Result<Self> {
        Ok(Self {
            #[cfg(feature = "encoding")]
            encoding: Encoding::for_label(_label.as_bytes()).ok_or_else(|| {
                error::ProtocolError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("unknown encoding: {_label}"),
                ))
            })?,
            next_index: 0,
            max_len,
        })
    }

    fn decode_bytes(&self, line: &[u8]) -> String {
        #[cfg(feature = "encoding")]
        {
            let (cow, _enc, _had_errors) = self.encoding.decode(line);
            cow.into_owned()
        }
        #[cfg(not(feature = "encoding"))]
        {
            String::from_utf8_lossy(line).into_owned()
        }
    }
}

/// Control characters that never appear in a valid line.
///
/// Formatting codes (bold, colour, CTCP delimiters...) and NUL are allowed.
pub(crate) fn is_illegal_control_char(ch: char) -> bool {
    const FORMAT_CODES: &[char] = &[
        '\x01', '\x02', '\x03', '\x04', '\x0F', '\x11', '\x16', '\x1D', '\x1E', '\x1F',
    ];
    ch == '\x07'
        || (ch.is_control()
            && !matches!(ch, '\r' | '\n' | '\0')
            && !FORMAT_CODES.contains(&ch))
}

fn validate_line(s: &str) -> error::Result<()> {
    let trimmed = s.trim_end_matches(['\r', '\n']);
    match trimmed.chars().find(|c| is_illegal_control_char(*c)) {
        Some(ch) => Err(error::ProtocolError::IllegalControlChar(ch)),
        None => Ok(()),
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let data = self.decode_bytes(&line);
            validate_line(&data)?;
            Ok(Some(data))
        } else {
            self.next_index = src.len();

            if src.len() > self.max_len {
                let actual = src.len();
                // Drop the oversized partial line so the stream can resync.
                src.clear();
                self.next_index = 0;
                return Err(error::ProtocolError::MessageTooLong {
                    actual,
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        #[cfg(feature = "encoding")]
        {
            let (bytes, _enc, _had_errors) = self.encoding.encode(&msg);
            dst.extend_from_slice(&bytes);
        }

        #[cfg(not(feature = "encoding"))]
        {
            dst.extend_from_slice(msg.as_bytes());
        }

        Ok(())
    }
}
