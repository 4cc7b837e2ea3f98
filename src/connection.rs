//! Async driver tying a [`Session`] to a [`Transport`].
//!
//! One task owns the session. A reader task feeds decoded lines into a
//! bounded queue, a writer task drains a bounded queue onto the socket,
//! and the driver loop multiplexes those with caller commands and typing
//! deadlines. Nothing else touches the session, so no locking is needed.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use slirc_session::connection::Connection;
//! use slirc_session::transport::Transport;
//! use slirc_session::{Session, SessionParams};
//!
//! let stream = tokio::net::TcpStream::connect("irc.example.net:6667").await?;
//! let session = Session::new(SessionParams::new("alice", "alice", "Alice"));
//! let (handle, mut events, task) = Connection::new(Transport::tcp(stream)?, session).spawn();
//!
//! handle.with_session(|s| s.join("#rust", "")).await?;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! task.await??;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::{ProtocolError, SessionError};
use crate::event::Event;
use crate::message::Message;
use crate::session::Session;
use crate::transport::{is_recoverable, MessageSink, MessageStream, Transport};

/// Default capacity of every queue between the tasks.
pub const DEFAULT_QUEUE_SIZE: usize = 64;

/// What the driver reports: an event, or a non-fatal handling error.
pub type SessionResult = Result<Event, SessionError>;

/// Work run against the session inside the driver task.
pub type Command = Box<dyn FnOnce(&mut Session) + Send>;

/// The driver task has stopped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("connection closed")]
pub struct ConnectionClosed;

/// A session bound to a transport, not yet running.
pub struct Connection {
    transport: Transport,
    session: Session,
    queue_size: usize,
}

/// Cloneable handle for acting on a running connection.
#[derive(Clone)]
pub struct ConnectionHandle {
    commands: mpsc::Sender<Command>,
    cancel: CancellationToken,
}

impl Connection {
    pub fn new(transport: Transport, session: Session) -> Self {
        Connection {
            transport,
            session,
            queue_size: DEFAULT_QUEUE_SIZE,
        }
    }

    /// Capacity of the inbound, outbound, command and event queues.
    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.queue_size = size.max(1);
        self
    }

    /// Run the connection on the current runtime.
    ///
    /// The event receiver yields until the connection ends. The task
    /// resolves to `Err` only on transport failure.
    pub fn spawn(
        self,
    ) -> (
        ConnectionHandle,
        mpsc::Receiver<SessionResult>,
        JoinHandle<anyhow::Result<()>>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel(self.queue_size);
        let (event_tx, event_rx) = mpsc::channel(self.queue_size);
        let cancel = CancellationToken::new();
        let handle = ConnectionHandle {
            commands: cmd_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(self.run(cmd_rx, event_tx, cancel));
        (handle, event_rx, task)
    }

    /// Drive the session until the peer disconnects, the session closes,
    /// `cancel` fires or the event receiver is dropped.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::Sender<SessionResult>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let Connection {
            transport,
            mut session,
            queue_size,
        } = self;

        let (sink, stream) = transport.split();
        let (in_tx, mut inbound) = mpsc::channel(queue_size);
        let (outbound, out_rx) = mpsc::channel(queue_size);
        let reader = tokio::spawn(read_loop(stream, in_tx, cancel.clone()));
        let writer = tokio::spawn(write_loop(sink, out_rx, cancel.clone()));

        let mut commands_open = true;
        let mut result = Ok(());

        loop {
            if !flush(&mut session, &outbound, &cancel).await {
                break;
            }
            if session.is_closed() {
                debug!("session closed");
                break;
            }

            let deadline = session.next_typing_deadline().map(Instant::from_std);
            let sleep = tokio::time::sleep_until(
                deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)),
            );

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("connection cancelled");
                    break;
                }
                item = inbound.recv() => match item {
                    Some(Ok(msg)) => {
                        trace!(%msg, "received");
                        let outcome = match session.handle_message(msg) {
                            Ok(Some(event)) => Some(Ok(event)),
                            Ok(None) => None,
                            Err(e) => {
                                warn!(error = %e, "failed to handle message");
                                Some(Err(e))
                            }
                        };
                        if let Some(outcome) = outcome {
                            if events.send(outcome).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Err(e)) if is_recoverable(&e) => {
                        warn!(error = %e, "dropping unreadable line");
                    }
                    Some(Err(e)) => {
                        result = Err(e.into());
                        break;
                    }
                    None => {
                        info!("server closed the connection");
                        break;
                    }
                },
                command = commands.recv(), if commands_open => match command {
                    Some(command) => command(&mut session),
                    None => commands_open = false,
                },
                _ = sleep, if deadline.is_some() => {
                    let mut receiver_gone = false;
                    for typing in session.expire_typings(Instant::now().into_std()) {
                        if events.send(Ok(Event::TypingExpired(typing))).await.is_err() {
                            receiver_gone = true;
                            break;
                        }
                    }
                    if receiver_gone {
                        break;
                    }
                }
            }
        }

        // Let the writer finish what the session already queued (a QUIT,
        // for instance) before the socket goes away.
        session.close();
        drop(outbound);
        match writer.await {
            Ok(Err(e)) if result.is_ok() => result = Err(e.into()),
            Err(e) if result.is_ok() => result = Err(e.into()),
            _ => {}
        }
        cancel.cancel();
        reader.abort();
        result
    }
}

impl ConnectionHandle {
    /// Run `f` against the session inside the driver task.
    ///
    /// Anything `f` queues is flushed right after it returns.
    pub async fn with_session<F>(&self, f: F) -> Result<(), ConnectionClosed>
    where
        F: FnOnce(&mut Session) + Send + 'static,
    {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ConnectionClosed),
            sent = self.commands.send(Box::new(f)) => sent.map_err(|_| ConnectionClosed),
        }
    }

    /// Queue a raw message.
    pub async fn send(&self, msg: Message) -> Result<(), ConnectionClosed> {
        self.with_session(move |s| s.send(msg)).await
    }

    /// Stop the connection without sending QUIT.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.commands.is_closed()
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Move the session's outbox into the writer queue.
///
/// Returns `false` once the writer is gone or the connection is cancelled.
async fn flush(
    session: &mut Session,
    outbound: &mpsc::Sender<Message>,
    cancel: &CancellationToken,
) -> bool {
    for msg in session.drain_outbound() {
        tokio::select! {
            _ = cancel.cancelled() => return false,
            sent = outbound.send(msg) => {
                if sent.is_err() {
                    return false;
                }
            }
        }
    }
    true
}

async fn read_loop(
    mut stream: MessageStream,
    tx: mpsc::Sender<Result<Message, ProtocolError>>,
    cancel: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            _ = cancel.cancelled() => break,
            item = stream.next() => item,
        };
        let Some(item) = item else { break };
        let fatal = matches!(&item, Err(e) if !is_recoverable(e));
        if tx.send(item).await.is_err() || fatal {
            break;
        }
    }
}

async fn write_loop(
    mut sink: MessageSink,
    mut rx: mpsc::Receiver<Message>,
    cancel: CancellationToken,
) -> Result<(), ProtocolError> {
    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => break,
            msg = rx.recv() => msg,
        };
        let Some(msg) = msg else { break };
        trace!(%msg, "sending");
        if let Err(e) = sink.send(msg).await {
            if is_recoverable(&e) {
                warn!(error = %e, "dropping unsendable message");
                continue;
            }
            return Err(e);
        }
    }
    sink.close().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionParams;
    use crate::typing::{Typing, TYPING_TIMEOUT};
    use tokio::net::{TcpListener, TcpStream};

    async fn pair() -> (Transport, Transport) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (
            Transport::tcp(client).unwrap(),
            Transport::tcp(server).unwrap(),
        )
    }

    async fn expect_line(server: &mut Transport, line: &str) {
        let msg = server.read_message().await.unwrap().unwrap();
        assert_eq!(msg.to_string(), line);
    }

    #[tokio::test]
    async fn test_registration_and_commands() {
        let (client, mut server) = pair().await;
        let session = Session::new(SessionParams::new("alice", "al", "Alice"));
        let (handle, mut events, task) = Connection::new(client, session).spawn();

        expect_line(&mut server, "CAP LS 302").await;
        for name in crate::caps::immediate_names().filter(|n| *n != "sasl") {
            expect_line(&mut server, &format!("CAP REQ {name}")).await;
        }
        expect_line(&mut server, "NICK alice").await;
        expect_line(&mut server, "USER al 0 * Alice").await;
        expect_line(&mut server, "CAP END").await;
        expect_line(&mut server, "BOUNCER LISTNETWORKS").await;
        expect_line(&mut server, "METADATA * SUB soju.im/pinned soju.im/muted").await;

        for line in [
            ":irc.test 001 alice :Welcome",
            ":irc.test 005 alice CHANTYPES=# :are supported",
        ] {
            server.write_message(line.parse().unwrap()).await.unwrap();
        }
        assert_eq!(events.recv().await, Some(Ok(Event::Registered)));

        handle
            .with_session(|s| s.join("#rust", ""))
            .await
            .unwrap();
        expect_line(&mut server, "JOIN #rust").await;

        server
            .write_message(":irc.test PING :t1".parse().unwrap())
            .await
            .unwrap();
        expect_line(&mut server, "PONG t1").await;

        handle.shutdown();
        task.await.unwrap().unwrap();
        assert!(handle.is_closed());
        assert_eq!(handle.send(Message::new("PING", ["x"])).await, Err(ConnectionClosed));
    }

    #[tokio::test]
    async fn test_typing_expires() {
        tokio::time::pause();
        let (client, mut server) = pair().await;
        let session = Session::new(SessionParams::new("alice", "al", "Alice"));
        let (handle, mut events, task) = Connection::new(client, session).spawn();

        let started = Instant::now();
        server
            .write_message("@+typing=active :bob!b@h TAGMSG alice".parse().unwrap())
            .await
            .unwrap();
        let expected = Typing {
            target: "bob".into(),
            name: "bob".into(),
        };
        assert_eq!(events.recv().await, Some(Ok(Event::TypingExpired(expected))));
        assert!(started.elapsed() >= TYPING_TIMEOUT);

        handle.shutdown();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_peer_close_ends_connection() {
        let (client, server) = pair().await;
        let session = Session::new(SessionParams::new("alice", "al", "Alice"));
        let (_handle, mut events, task) = Connection::new(client, session).spawn();
        drop(server);

        assert_eq!(events.recv().await, None);
        // Either a clean EOF or a reset, depending on timing.
        let _ = task.await.unwrap();
    }
}
