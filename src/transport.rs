//! Framed client transports.
//!
//! A [`Transport`] owns a connected stream and an [`IrcCodec`]. The caller
//! establishes the connection (and, for TLS, performs the handshake with
//! its own `rustls` config) and hands over the stream.

use std::pin::Pin;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_util::codec::Framed;
use tracing::warn;

use crate::error::ProtocolError;
use crate::irc::IrcCodec;
use crate::Message;

/// Longest accepted line: 8191 bytes of tags plus a 512-byte message.
pub const MAX_IRC_LINE_LEN: usize = 8191 + 512;

/// Read half of a split transport.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message, ProtocolError>> + Send>>;

/// Write half of a split transport.
pub type MessageSink = Pin<Box<dyn Sink<Message, Error = ProtocolError> + Send>>;

#[allow(clippy::large_enum_variant)]
pub enum Transport {
    Tcp {
        framed: Framed<TcpStream, IrcCodec>,
    },
    Tls {
        framed: Framed<TlsStream<TcpStream>, IrcCodec>,
    },
}

impl Transport {
    /// Wrap a plain TCP connection.
    pub fn tcp(stream: TcpStream) -> Result<Self, ProtocolError> {
        if let Err(e) = enable_keepalive(&stream) {
            warn!(error = %e, "failed to enable TCP keepalive");
        }

        let codec = IrcCodec::with_max_len("utf-8", MAX_IRC_LINE_LEN)?;
        Ok(Self::Tcp {
            framed: Framed::new(stream, codec),
        })
    }

    /// Wrap a client TLS connection whose handshake has completed.
    pub fn tls(stream: TlsStream<TcpStream>) -> Result<Self, ProtocolError> {
        if let Err(e) = enable_keepalive(stream.get_ref().0) {
            warn!(error = %e, "failed to enable TCP keepalive");
        }

        let codec = IrcCodec::with_max_len("utf-8", MAX_IRC_LINE_LEN)?;
        Ok(Self::Tls {
            framed: Framed::new(stream, codec),
        })
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }

    /// Next message, or `None` once the peer closed the connection.
    pub async fn read_message(&mut self) -> Result<Option<Message>, ProtocolError> {
        macro_rules! read_framed {
            ($framed:expr) => {
                match $framed.next().await {
                    Some(Ok(msg)) => Ok(Some(msg)),
                    Some(Err(e)) => Err(e),
                    None => Ok(None),
                }
            };
        }

        match self {
            Transport::Tcp { framed } => read_framed!(framed),
            Transport::Tls { framed } => read_framed!(framed),
        }
    }

    pub async fn write_message(&mut self, message: Message) -> Result<(), ProtocolError> {
        match self {
            Transport::Tcp { framed } => framed.send(message).await,
            Transport::Tls { framed } => framed.send(message).await,
        }
    }

    /// Split into independently owned write and read halves.
    pub fn split(self) -> (MessageSink, MessageStream) {
        match self {
            Transport::Tcp { framed } => {
                let (sink, stream) = framed.split::<Message>();
                (Box::pin(sink), Box::pin(stream))
            }
            Transport::Tls { framed } => {
                let (sink, stream) = framed.split::<Message>();
                (Box::pin(sink), Box::pin(stream))
            }
        }
    }
}

/// Whether the stream can continue after this error.
///
/// A bad line is dropped; I/O failures end the connection.
pub fn is_recoverable(err: &ProtocolError) -> bool {
    !matches!(err, ProtocolError::Io(_))
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}
