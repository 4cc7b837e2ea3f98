//! # slirc-session
//!
//! An IRCv3 client session state machine.
//!
//! ## Features
//!
//! - IRC message parsing and serialization with tags and prefixes
//! - Capability negotiation (`CAP LS 302`) and SASL (PLAIN, EXTERNAL)
//! - Channel, membership, topic and user tracking with server casemapping
//! - CHATHISTORY, search and targets batches
//! - Typing notifications, read markers, MONITOR and METADATA
//! - soju bouncer network support
//! - Optional Tokio codec, transports and a connection driver
//!
//! The [`Session`] does no I/O: feed it parsed lines with
//! [`Session::handle_message`] and write out whatever
//! [`Session::drain_outbound`] returns.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```rust
//! use slirc_session::{Event, Session, SessionParams};
//!
//! let mut session = Session::new(SessionParams::new("alice", "alice", "Alice"));
//! let burst: Vec<String> = session
//!     .drain_outbound()
//!     .iter()
//!     .map(|m| m.to_string())
//!     .collect();
//! assert_eq!(burst[0], "CAP LS 302");
//!
//! for line in [
//!     ":irc.example.net 001 alice :Welcome",
//!     ":irc.example.net 005 alice CASEMAPPING=rfc1459 CHANTYPES=# :are supported",
//! ] {
//!     let event = session.handle_message(line.parse().unwrap()).unwrap();
//!     if let Some(Event::Registered) = event {
//!         session.join("#rust", "");
//!     }
//! }
//! assert_eq!(session.drain_outbound()[0].to_string(), "JOIN #rust");
//! ```
//!
//! ## Acknowledgments
//!
//! This project was inspired by the architectural patterns established by
//! [Aaron Weiss (aatxe)](https://github.com/aatxe) in the
//! [irc](https://github.com/aatxe/irc) crate.

pub mod caps;
pub mod casemap;
pub mod error;
pub mod event;
pub mod history;
#[cfg(feature = "tokio")]
pub mod irc;
pub mod ircv3;
pub mod isupport;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod response;
pub mod sasl;
pub mod session;
pub mod typing;
pub mod util;

#[cfg(feature = "tokio")]
pub mod connection;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::casemap::{irc_eq, irc_to_lower, CaseMapping};
pub use self::error::{MessageParseError, ModeParseError, ProtocolError, SessionError};
pub use self::event::{ErrorEvent, Event, ListItem, MessageEvent};
pub use self::history::HistoryRequest;
pub use self::ircv3::{format_bound, parse_bound, BatchKind};
pub use self::isupport::{Features, Isupport, IsupportEntry};
pub use self::message::{Message, Tag};
pub use self::mode::{parse_channel_mode, ChannelModeTable, Mode};
pub use self::prefix::Prefix;
pub use self::response::{Response, Severity};
pub use self::sasl::{SaslClient, SaslExternal, SaslPlain};
pub use self::session::{
    Channel, ChannelMember, Metadata, Registration, Session, SessionConfig, SessionParams, User,
};
pub use self::typing::{Typing, Typings};

#[cfg(feature = "tokio")]
pub use self::connection::{Connection, ConnectionClosed, ConnectionHandle};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::transport::{Transport, MAX_IRC_LINE_LEN};
