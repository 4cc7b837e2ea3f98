//! Commands the caller sends through the session.
//!
//! Every method queues zero or more lines on the outbox. Commands that
//! need a capability the server did not grant are dropped with a debug
//! log, so callers can issue them unconditionally.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::registration::{MUTED_KEY, PINNED_KEY};
use super::{Session, TypingState, JOIN_REQUEST_WINDOW};
use crate::error::MessageParseError;
use crate::history::HistoryRequest;
use crate::ircv3::format_bound;
use crate::message::{tags, Message};
use crate::util::split_message;

/// Minimum delay between two `active` notifications for one target.
const TYPING_DEBOUNCE: Duration = Duration::from_secs(3);

/// Host length assumed while the server has not told us ours.
const MAX_HOST_LEN: usize = 63;

impl Session {
    /// Queue a message as-is.
    pub fn send(&mut self, msg: Message) {
        self.push(msg);
    }

    /// Parse and queue a raw protocol line.
    pub fn send_raw(&mut self, line: &str) -> Result<(), MessageParseError> {
        let msg = Message::parse(line)?;
        self.push(msg);
        Ok(())
    }

    /// Join a channel. The resulting [`SelfJoin`](crate::Event::SelfJoin)
    /// is marked `requested`.
    pub fn join(&mut self, channel: &str, key: &str) {
        // Failed joins never get a JOIN back.
        self.pending_joins
            .retain(|_, at| at.elapsed() < JOIN_REQUEST_WINDOW);
        self.pending_joins
            .insert(self.casemap(channel), Instant::now());
        let msg = if key.is_empty() {
            Message::new("JOIN", [channel])
        } else {
            Message::new("JOIN", [channel, key])
        };
        self.push(msg);
    }

    pub fn part(&mut self, channel: &str, reason: &str) {
        self.push(with_optional("PART", &[channel], reason));
    }

    pub fn change_topic(&mut self, channel: &str, topic: &str) {
        self.push(Message::new("TOPIC", [channel, topic]));
    }

    pub fn quit(&mut self, reason: &str) {
        self.push(with_optional("QUIT", &[], reason));
    }

    pub fn change_nick(&mut self, nick: &str) {
        self.push(Message::new("NICK", [nick]));
    }

    /// Request WHO for a channel or mask, using WHOX when available.
    pub fn who(&mut self, target: &str) {
        let msg = if self.features.whox {
            Message::new("WHO", [target, "%uhnf"])
        } else {
            Message::new("WHO", [target])
        };
        self.push(msg);
    }

    pub fn change_mode(&mut self, channel: &str, flags: &str, args: &[&str]) {
        let mut params = vec![channel, flags];
        params.extend_from_slice(args);
        self.push(Message::new("MODE", params));
    }

    /// Search the bouncer's message store. An empty `target` searches
    /// every buffer.
    pub fn search(&mut self, target: &str, text: &str) {
        if !self.has_cap("soju.im/search") {
            debug!("search unsupported");
            return;
        }
        let mut attrs = Vec::with_capacity(2);
        if !target.is_empty() {
            attrs.push(format!("in={}", tags::escape(target)));
        }
        attrs.push(format!("text={}", tags::escape(text)));
        self.push(Message::new("SEARCH", [attrs.join(";")]));
    }

    /// Set (`Some`) or clear (`None`) our away message.
    pub fn away(&mut self, reason: Option<&str>) {
        let msg = match reason {
            Some(reason) => Message::new("AWAY", [reason]),
            None => Message::new("AWAY", Vec::<String>::new()),
        };
        self.push(msg);
    }

    /// Send a PRIVMSG, split to fit the line length.
    pub fn privmsg(&mut self, target: &str, content: &str) {
        self.send_text("PRIVMSG", target, content);
    }

    /// Send a NOTICE, split to fit the line length.
    pub fn notice(&mut self, target: &str, content: &str) {
        self.send_text("NOTICE", target, content);
    }

    fn send_text(&mut self, command: &str, target: &str, content: &str) {
        let budget = self.text_budget(command, target);
        let chunks: Vec<&str> = split_message(content, budget).collect();
        for chunk in chunks {
            self.push(Message::new(command, [target, chunk]));
        }
        let cf = self.casemap(target);
        self.typing_sent.remove(&cf);
    }

    /// Bytes left for text once the server prefixes our full mask.
    fn text_budget(&self, command: &str, target: &str) -> usize {
        let user = if self.user.is_empty() {
            &self.username
        } else {
            &self.user
        };
        let host = if self.host.is_empty() {
            MAX_HOST_LEN
        } else {
            self.host.len()
        };
        // ":nick!user@host CMD target :text\r\n"
        let overhead = 9 + command.len() + self.nick.len() + user.len() + host + target.len();
        self.features.linelen.saturating_sub(overhead)
    }

    /// Tell `target` we are typing.
    pub fn typing(&mut self, target: &str) {
        if !self.has_cap("message-tags") {
            return;
        }
        let cf = self.casemap(target);
        let now = Instant::now();
        if let Some((TypingState::Active, at)) = self.typing_sent.get(&cf) {
            if now.duration_since(*at) < TYPING_DEBOUNCE {
                return;
            }
        }
        if self.typing_limiter.check().is_err() {
            debug!(target, "typing notification rate limited");
            return;
        }
        self.typing_sent.insert(cf, (TypingState::Active, now));
        self.push(Message::new("TAGMSG", [target]).with_tag("+typing", Some("active")));
    }

    /// Tell `target` we stopped typing.
    ///
    /// Only follows an `active`: nothing is sent when the last notification
    /// for `target` was already `done`, when none was sent, or when a message
    /// to `target` has since cleared the indicator.
    pub fn typing_stop(&mut self, target: &str) {
        if !self.has_cap("message-tags") {
            return;
        }
        let cf = self.casemap(target);
        match self.typing_sent.get(&cf) {
            None | Some((TypingState::Done, _)) => return,
            Some((TypingState::Active, _)) => {}
        }
        if self.typing_limiter.check().is_err() {
            debug!(target, "typing notification rate limited");
            return;
        }
        self.typing_sent
            .insert(cf, (TypingState::Done, Instant::now()));
        self.push(Message::new("TAGMSG", [target]).with_tag("+typing", Some("done")));
    }

    fn read_marker_supported(&self) -> bool {
        self.has_cap("draft/read-marker") || self.has_cap("soju.im/read")
    }

    /// Ask for the read marker of `target`.
    pub fn read_get(&mut self, target: &str) {
        if self.read_marker_supported() {
            self.push(Message::new("MARKREAD", [target]));
        }
    }

    /// Move the read marker of `target`.
    pub fn read_set(&mut self, target: &str, timestamp: DateTime<Utc>) {
        if self.read_marker_supported() {
            self.push(Message::new(
                "MARKREAD",
                [target.to_owned(), format_bound(timestamp)],
            ));
        }
    }

    fn metadata_get(&mut self, target: &str, key: &str) {
        if self.has_cap("draft/metadata-2") {
            self.push(Message::new("METADATA", [target, "GET", key]));
        }
    }

    fn metadata_set(&mut self, target: &str, key: &str, value: bool) {
        if !self.has_cap("draft/metadata-2") {
            return;
        }
        let msg = if value {
            Message::new("METADATA", [target, "SET", key, "1"])
        } else {
            Message::new("METADATA", [target, "SET", key])
        };
        self.push(msg);
    }

    pub fn muted_get(&mut self, target: &str) {
        self.metadata_get(target, MUTED_KEY);
    }

    pub fn set_muted(&mut self, target: &str, muted: bool) {
        self.metadata_set(target, MUTED_KEY, muted);
    }

    pub fn pinned_get(&mut self, target: &str) {
        self.metadata_get(target, PINNED_KEY);
    }

    pub fn set_pinned(&mut self, target: &str, pinned: bool) {
        self.metadata_set(target, PINNED_KEY, pinned);
    }

    /// Track a nickname's presence. Adding an already monitored nick does
    /// nothing.
    ///
    /// Before the server announces MONITOR support the nick is only
    /// recorded; it is sent once ISUPPORT arrives.
    pub fn monitor_add(&mut self, target: &str) {
        if !self.monitors.insert(self.casemap(target)) {
            return;
        }
        if self.features.monitor {
            self.push(Message::new("MONITOR", ["+", target]));
        }
    }

    pub fn monitor_remove(&mut self, target: &str) {
        let cf = self.casemap(target);
        if !self.monitors.remove(&cf) {
            return;
        }
        if self.features.monitor {
            self.push(Message::new("MONITOR", ["-", target]));
        }
        self.cleanup_user(&cf);
    }

    /// Start building a CHATHISTORY request for `target`.
    pub fn new_history_request(&mut self, target: &str) -> HistoryRequest<'_> {
        HistoryRequest::new(self, target)
    }

    /// Queue a CHATHISTORY command unless one for the same target is in
    /// flight. Returns whether it was sent.
    pub(crate) fn request_history(&mut self, key: &str, params: Vec<String>) -> bool {
        if !self.has_cap("draft/chathistory") {
            debug!("chathistory unsupported");
            return false;
        }
        let key = self.casemap(key);
        if !self.history_requests.insert(key) {
            debug!(params = ?params, "history request already in flight");
            return false;
        }
        self.push(Message::new("CHATHISTORY", params));
        true
    }

    pub fn whois(&mut self, nick: &str) {
        self.push(Message::new("WHOIS", [nick]));
    }

    pub fn whowas(&mut self, nick: &str) {
        self.push(Message::new("WHOWAS", [nick]));
    }

    pub fn invite(&mut self, nick: &str, channel: &str) {
        self.push(Message::new("INVITE", [nick, channel]));
    }

    pub fn kick(&mut self, nick: &str, channel: &str, comment: &str) {
        self.push(with_optional("KICK", &[channel, nick], comment));
    }

    /// List channels. The mask is sent only if the server accepts one.
    pub fn list(&mut self, mask: &str) {
        let msg = if mask.is_empty() || !self.features.list_mask {
            Message::new("LIST", Vec::<String>::new())
        } else {
            Message::new("LIST", [mask])
        };
        self.push(msg);
    }
}

/// Build `command params... [last]`, omitting an empty `last`.
fn with_optional(command: &str, params: &[&str], last: &str) -> Message {
    let mut all = params.to_vec();
    if !last.is_empty() {
        all.push(last);
    }
    Message::new(command, all)
}
