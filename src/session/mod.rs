//! Sans-IO IRC client session.
//!
//! A [`Session`] turns decoded server lines into a queryable model of the
//! connection (capabilities, channels, members, topics, metadata, monitored
//! users and typing state) and into high-level [`Event`](crate::Event)s. It performs no
//! I/O: outbound lines accumulate in an internal outbox that the caller
//! drains with [`Session::drain_outbound`] and writes to the wire.
//!
//! # Example
//!
//! ```
//! use slirc_session::{Event, Message, Session, SessionParams};
//!
//! let mut session = Session::new(SessionParams::new("alice", "alice", "Alice"));
//! let hello: Vec<String> = session
//!     .drain_outbound()
//!     .iter()
//!     .map(|m| m.to_string())
//!     .collect();
//! assert_eq!(hello[0], "CAP LS 302");
//!
//! let welcome: Message = ":irc.example.net 001 alice :Welcome".parse().unwrap();
//! assert_eq!(session.handle_message(welcome).unwrap(), None);
//!
//! let isupport: Message = ":irc.example.net 005 alice CHANTYPES=# :are supported"
//!     .parse()
//!     .unwrap();
//! assert_eq!(session.handle_message(isupport).unwrap(), Some(Event::Registered));
//! ```

mod batch;
mod handle;
mod model;
mod outbound;
mod registration;

pub use self::model::{Channel, ChannelMember, Metadata, User};

use std::collections::{HashMap, HashSet, VecDeque};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::debug;

use crate::caps::CapState;
use crate::event::{ListItem, MessageEvent};
use crate::isupport::Features;
use crate::error::SessionError;
use crate::message::Message;
use crate::prefix::Prefix;
use crate::sasl::SaslClient;
use crate::typing::{Typing, Typings};

use self::batch::Batch;

/// A join requested this recently is reported as `requested` in
/// [`Event::SelfJoin`](crate::Event::SelfJoin).
const JOIN_REQUEST_WINDOW: Duration = Duration::from_secs(5);

/// Outbound typing notifications allowed per second, and burst size.
const TYPING_RATE: NonZeroU32 = NonZeroU32::MIN;
const TYPING_BURST: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Plain-data connection settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Desired nickname.
    pub nickname: String,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
    /// Bouncer network to bind to; empty for the bouncer connection itself
    /// or a plain server.
    #[cfg_attr(feature = "serde", serde(default))]
    pub net_id: String,
}

impl SessionConfig {
    /// Attach an authenticator.
    pub fn with_auth(self, auth: Box<dyn SaslClient>) -> SessionParams {
        SessionParams {
            auth: Some(auth),
            ..self.into()
        }
    }
}

/// Everything a [`Session`] needs at construction.
pub struct SessionParams {
    pub nickname: String,
    pub username: String,
    pub realname: String,
    pub net_id: String,
    pub auth: Option<Box<dyn SaslClient>>,
}

impl SessionParams {
    pub fn new(
        nickname: impl Into<String>,
        username: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        SessionParams {
            nickname: nickname.into(),
            username: username.into(),
            realname: realname.into(),
            net_id: String::new(),
            auth: None,
        }
    }
}

impl From<SessionConfig> for SessionParams {
    fn from(config: SessionConfig) -> Self {
        SessionParams {
            nickname: config.nickname,
            username: config.username,
            realname: config.realname,
            net_id: config.net_id,
            auth: None,
        }
    }
}

impl std::fmt::Debug for SessionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionParams")
            .field("nickname", &self.nickname)
            .field("username", &self.username)
            .field("realname", &self.realname)
            .field("net_id", &self.net_id)
            .field("auth", &self.auth.as_ref().map(|a| a.mechanism().to_owned()))
            .finish()
    }
}

/// Registration progress, as seen by the message filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// Waiting for `RPL_WELCOME`.
    Unregistered,
    /// `RPL_WELCOME` received.
    Registered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TypingState {
    Active,
    Done,
}

#[derive(Debug, Default)]
struct Outbox {
    queue: VecDeque<Message>,
    closed: bool,
}

impl Outbox {
    fn push(&mut self, msg: Message) {
        if self.closed {
            debug!(command = %msg.command, "outbox closed, dropping message");
            return;
        }
        self.queue.push_back(msg);
    }
}

/// IRC client session state machine.
///
/// One session serves one connection attempt; reconnecting means building
/// a new session. [`Session::handle_message`] must be called with the
/// server's lines in order.
pub struct Session {
    outbox: Outbox,

    username: String,
    realname: String,
    net_id: String,
    auth: Option<Box<dyn SaslClient>>,
    sasl_started: bool,
    sasl_buffer: String,
    account: Option<String>,

    registration: Registration,
    cap_ended: bool,
    isupport_seen: bool,
    server_name: Option<String>,

    nick: String,
    nick_cf: String,
    user: String,
    host: String,

    caps: CapState,
    ls_names: Vec<String>,
    ls_complete: bool,
    labeled_response: bool,
    features: Features,

    users: HashMap<String, User>,
    channels: HashMap<String, Channel>,
    metadata: HashMap<String, Metadata>,
    metadata_subs: HashSet<String>,
    monitors: HashSet<String>,
    pending_joins: HashMap<String, Instant>,

    history_requests: HashSet<String>,
    batches: HashMap<String, Batch>,
    list: Vec<ListItem>,

    typings: Typings,
    typing_sent: HashMap<String, (TypingState, Instant)>,
    typing_limiter: DefaultDirectRateLimiter,
}

impl Session {
    /// Create a session and queue the registration burst.
    ///
    /// Sends `CAP LS 302`, requests the immediate capabilities (deferred on
    /// bouncer network connections), `NICK` and `USER`, then either starts
    /// SASL or ends registration right away.
    pub fn new(params: SessionParams) -> Self {
        let features = Features::default();
        let nick_cf = features.casemap.fold(&params.nickname);
        let mut session = Session {
            outbox: Outbox::default(),
            username: params.username,
            realname: params.realname,
            net_id: params.net_id,
            auth: params.auth,
            sasl_started: false,
            sasl_buffer: String::new(),
            account: None,
            registration: Registration::Unregistered,
            cap_ended: false,
            isupport_seen: false,
            server_name: None,
            nick: params.nickname,
            nick_cf,
            user: String::new(),
            host: String::new(),
            caps: CapState::default(),
            ls_names: Vec::new(),
            ls_complete: false,
            labeled_response: false,
            typings: Typings::new(features.casemap),
            features,
            users: HashMap::new(),
            channels: HashMap::new(),
            metadata: HashMap::new(),
            metadata_subs: HashSet::new(),
            monitors: HashSet::new(),
            pending_joins: HashMap::new(),
            history_requests: HashSet::new(),
            batches: HashMap::new(),
            list: Vec::new(),
            typing_sent: HashMap::new(),
            typing_limiter: RateLimiter::direct(
                Quota::per_second(TYPING_RATE).allow_burst(TYPING_BURST),
            ),
        };
        session.start_registration();
        session
    }

    /// Take every queued outbound message, oldest first.
    pub fn drain_outbound(&mut self) -> Vec<Message> {
        self.outbox.queue.drain(..).collect()
    }

    /// Close the outbox and stop tracking typing. Idempotent.
    ///
    /// Queued messages are discarded and later sends are dropped.
    pub fn close(&mut self) {
        if self.outbox.closed {
            return;
        }
        debug!("closing session");
        self.outbox.closed = true;
        self.outbox.queue.clear();
        self.typings.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.outbox.closed
    }

    pub(crate) fn push(&mut self, msg: Message) {
        self.outbox.push(msg);
    }

    // Read accessors.

    /// Our current nickname.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Whether `name` is our nickname.
    pub fn is_me(&self, name: &str) -> bool {
        self.casemap(name) == self.nick_cf
    }

    /// Whether `name` is a channel name.
    pub fn is_channel(&self, name: &str) -> bool {
        self.features.is_channel(name)
    }

    /// Map a nickname or channel to its lookup key.
    pub fn casemap(&self, name: &str) -> String {
        self.features.casemap.fold(name)
    }

    pub fn registration(&self) -> Registration {
        self.registration
    }

    /// Account we authenticated as, if any.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(&self.casemap(nick))
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&self.casemap(name))
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Members of a channel, most powerful first, then by nickname.
    pub fn channel_members(&self, channel: &str) -> Vec<(&User, &ChannelMember)> {
        let Some(c) = self.channel(channel) else {
            return Vec::new();
        };
        let rank = |m: &ChannelMember| {
            m.membership
                .chars()
                .next()
                .and_then(|s| self.features.symbol_rank(s))
                .unwrap_or(usize::MAX)
        };
        let mut members: Vec<(&User, &ChannelMember)> = c
            .members
            .iter()
            .filter_map(|(handle, m)| Some((self.users.get(handle)?, m)))
            .collect();
        members.sort_by_cached_key(|(u, m)| (rank(m), self.casemap(&u.name.name)));
        members
    }

    /// Topic of a channel, with who set it and when.
    pub fn topic(&self, channel: &str) -> Option<(&str, Option<&Prefix>, Option<DateTime<Utc>>)> {
        let c = self.channel(channel)?;
        Some((c.topic.as_str(), c.topic_who.as_ref(), c.topic_time))
    }

    /// Pinned/muted flags of a target.
    pub fn metadata(&self, target: &str) -> Metadata {
        self.metadata
            .get(&self.casemap(target))
            .copied()
            .unwrap_or_default()
    }

    pub fn enabled_caps(&self) -> &HashSet<String> {
        self.caps.enabled()
    }

    pub fn has_cap(&self, name: &str) -> bool {
        self.caps.is_enabled(name)
    }

    pub fn available_caps(&self) -> &HashMap<String, Option<String>> {
        self.caps.available()
    }

    /// Server parameters from ISUPPORT.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Bouncer network this session is bound to, empty if none.
    pub fn net_id(&self) -> &str {
        &self.net_id
    }

    /// File upload endpoint advertised by the bouncer.
    pub fn upload_url(&self) -> Option<&str> {
        self.features.upload_url.as_deref()
    }

    /// Whether labeled-response is active.
    pub fn labeled_response(&self) -> bool {
        self.labeled_response
    }

    /// Monitored nicknames, casemapped.
    pub fn monitors(&self) -> &HashSet<String> {
        &self.monitors
    }

    pub fn typings(&self) -> &Typings {
        &self.typings
    }

    /// When the next inbound typing indicator expires.
    pub fn next_typing_deadline(&self) -> Option<Instant> {
        self.typings.next_deadline()
    }

    /// Expire stale typing indicators.
    pub fn expire_typings(&mut self, now: Instant) -> Vec<Typing> {
        self.typings.expire(now)
    }

    /// Build the event the server would echo for a message we send.
    ///
    /// Used when `echo-message` is not enabled, so local messages render
    /// like the echoed ones.
    pub fn local_message_event(&self, command: &str, target: &str, content: &str) -> MessageEvent {
        MessageEvent {
            user: self.nick.clone(),
            target: target.to_owned(),
            target_is_channel: self.is_channel(target),
            command: command.to_owned(),
            content: content.to_owned(),
            time: Utc::now(),
        }
    }

    // Model bookkeeping.

    /// Find or create the user of a prefix and return its handle.
    fn ensure_user(&mut self, prefix: &Prefix) -> String {
        let handle = self.casemap(&prefix.name);
        self.users
            .entry(handle.clone())
            .and_modify(|u| {
                u.update_mask(prefix);
                u.disconnected = false;
            })
            .or_insert_with(|| User::new(prefix.clone()));
        handle
    }

    /// Remove a user that is neither monitored nor in any channel.
    fn cleanup_user(&mut self, handle: &str) {
        if self.monitors.contains(handle) {
            return;
        }
        if self
            .channels
            .values()
            .any(|c| c.members.contains_key(handle))
        {
            return;
        }
        if self.users.remove(handle).is_some() {
            debug!(user = handle, "forgetting user");
        }
    }

    fn pending_join_requested(&mut self, channel_cf: &str) -> bool {
        self.pending_joins
            .remove(channel_cf)
            .is_some_and(|at| at.elapsed() < JOIN_REQUEST_WINDOW)
    }

    /// Refresh derived keys after ISUPPORT changed the case mapping.
    ///
    /// Keys already in the user and channel tables stay under the previous
    /// mapping.
    fn casemap_changed(&mut self) {
        let casemap = self.features.casemap;
        debug!(?casemap, "case mapping changed");
        self.nick_cf = casemap.fold(&self.nick);
        self.typings.set_casemap(casemap);
    }

    fn message_event(&self, msg: &Message) -> Result<MessageEvent, SessionError> {
        let [target, content] = params::<2>(msg)?;
        let mut target = target.to_owned();
        if self.is_me(&target) {
            if let Some(ctx) = msg.tag_value("+draft/channel-context") {
                if self.is_channel(ctx) {
                    target = ctx.to_owned();
                }
            }
        }
        Ok(MessageEvent {
            user: msg.source_name().unwrap_or("*").to_owned(),
            target_is_channel: self.is_channel(&target),
            target,
            command: msg.command.clone(),
            content: content.to_owned(),
            time: msg.time(),
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("nick", &self.nick)
            .field("registration", &self.registration)
            .field("net_id", &self.net_id)
            .field("channels", &self.channels.len())
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}

/// Positional parameters of a message, or a parse error naming its command.
pub(super) fn params<const N: usize>(msg: &Message) -> Result<[&str; N], SessionError> {
    msg.params_n::<N>()
        .map_err(|e| SessionError::parse(&msg.command, e))
}
