//! High-level events produced by the session.
//!
//! [`Session::handle_message`](crate::Session::handle_message) returns at
//! most one [`Event`] per protocol line. Events carry display names as the
//! server sent them; compare them with [`Session::casemap`](crate::Session::casemap).

use chrono::{DateTime, Utc};

use crate::response::Severity;
use crate::typing::Typing;

/// A PRIVMSG or NOTICE.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageEvent {
    /// Sender nickname (or server name).
    pub user: String,
    /// Buffer the message belongs to, as sent.
    pub target: String,
    /// Whether `target` is a channel.
    pub target_is_channel: bool,
    /// `PRIVMSG` or `NOTICE`.
    pub command: String,
    /// Message text.
    pub content: String,
    /// Server time, or reception time.
    pub time: DateTime<Utc>,
}

/// A server-reported problem or notice.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorEvent {
    pub severity: Severity,
    /// Numeric or standard-reply code (e.g. `433`, `NEED_MORE_PARAMS`).
    pub code: String,
    /// Human-readable text.
    pub message: String,
}

/// One row of a LIST reply.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListItem {
    pub channel: String,
    pub count: usize,
    pub topic: String,
}

/// Events emitted by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Event {
    /// The first `RPL_ISUPPORT` arrived; registration is functionally
    /// complete.
    Registered,
    /// Our nickname changed.
    SelfNick { former_nick: String },
    UserNick {
        user: String,
        former_nick: String,
        time: DateTime<Utc>,
    },
    /// We joined a channel and its member list is complete.
    SelfJoin {
        channel: String,
        /// The join was requested through [`Session::join`](crate::Session::join)
        /// in the last five seconds.
        requested: bool,
        topic: String,
        read: Option<DateTime<Utc>>,
    },
    UserJoin {
        user: String,
        channel: String,
        time: DateTime<Utc>,
    },
    SelfPart { channel: String },
    UserPart {
        user: String,
        channel: String,
        time: DateTime<Utc>,
    },
    /// A user quit; `channels` lists the shared channels they left.
    UserQuit {
        user: String,
        channels: Vec<String>,
        time: DateTime<Utc>,
    },
    /// Monitored users came online.
    UserOnline { users: Vec<String> },
    /// Monitored users went offline.
    UserOffline { users: Vec<String> },
    TopicChange {
        channel: String,
        topic: String,
        time: DateTime<Utc>,
    },
    ModeChange {
        channel: String,
        mode: String,
        time: DateTime<Utc>,
    },
    Invite {
        inviter: String,
        invitee: String,
        channel: String,
    },
    Message(MessageEvent),
    /// Completed LIST reply.
    List(Vec<ListItem>),
    /// Completed chathistory batch, in arrival order.
    History { target: String, events: Vec<Event> },
    /// Completed `CHATHISTORY TARGETS` batch.
    HistoryTargets {
        targets: Vec<(String, DateTime<Utc>)>,
    },
    /// Read marker for a target.
    Read {
        target: String,
        timestamp: DateTime<Utc>,
    },
    /// Completed search batch.
    Search { messages: Vec<MessageEvent> },
    /// Pinned/muted metadata of a target changed.
    MetadataChange {
        target: String,
        pinned: bool,
        muted: bool,
    },
    /// A bouncer network was added, updated or deleted.
    BouncerNetwork {
        id: String,
        name: String,
        delete: bool,
    },
    /// Informational reply, pre-formatted.
    Info { prefix: String, message: String },
    /// Someone's typing indicator timed out.
    TypingExpired(Typing),
    Error(ErrorEvent),
}

impl From<MessageEvent> for Event {
    fn from(ev: MessageEvent) -> Self {
        Event::Message(ev)
    }
}

impl From<ErrorEvent> for Event {
    fn from(ev: ErrorEvent) -> Self {
        Event::Error(ev)
    }
}
