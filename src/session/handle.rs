//! Inbound dispatch: turns server lines into model updates and events.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::registration::{trailing_text, MUTED_KEY, PINNED_KEY};
use super::{params, Channel, ChannelMember, Registration, Session, User};
use crate::error::SessionError;
use crate::event::{ErrorEvent, Event, ListItem};
use crate::ircv3::parse_bound;
use crate::isupport::Isupport;
use crate::message::{tags, Message};
use crate::mode::{parse_channel_mode, ChannelModeTable};
use crate::prefix::Prefix;
use crate::response::{Response, Severity};

impl Session {
    /// Process one line from the server.
    ///
    /// Returns at most one event. Lines without a prefix are attributed to
    /// the server. Lines belonging to an open chathistory, targets or search
    /// batch are folded into it and reported when the batch closes.
    ///
    /// An `Err` means this line was malformed; the session stays usable.
    pub fn handle_message(&mut self, mut msg: Message) -> Result<Option<Event>, SessionError> {
        if msg.prefix.is_none() {
            let server = self.server_name.as_deref().unwrap_or("*");
            msg.prefix = Some(Prefix::named(server));
        }

        if let Some(id) = msg.tag_value("batch") {
            if self.batches.contains_key(id) {
                let id = id.to_owned();
                self.fold_into_batch(&id, &msg)?;
                return Ok(None);
            }
        }

        if self.registration == Registration::Unregistered {
            if let Some(res) = self.handle_unregistered(&msg) {
                return res;
            }
        }
        self.handle_registered(&msg)
    }

    fn handle_registered(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        if let Ok(code) = msg.command.parse::<Response>() {
            return self.handle_numeric(code, msg);
        }

        match msg.command.as_str() {
            "CAP" => self.handle_cap(msg),
            "AUTHENTICATE" => Ok(None),
            "PING" => {
                self.push(Message::new("PONG", msg.params.iter().cloned()));
                Ok(None)
            }
            "ERROR" => {
                warn!(reason = msg.param(0).unwrap_or(""), "server closed the connection");
                self.close();
                Ok(None)
            }
            "JOIN" => self.handle_join(msg),
            "PART" => {
                let [channel] = params::<1>(msg)?;
                self.handle_leave(msg, channel, source(msg))
            }
            "KICK" => {
                let [channel, victim] = params::<2>(msg)?;
                self.handle_leave(msg, channel, victim)
            }
            "QUIT" => Ok(self.handle_quit(msg)),
            "NICK" => self.handle_nick(msg),
            "AWAY" => {
                let handle = self.casemap(source(msg));
                if let Some(user) = self.users.get_mut(&handle) {
                    user.away = !msg.params.is_empty();
                }
                Ok(None)
            }
            "CHGHOST" => {
                let [user, host] = params::<2>(msg)?;
                let nick = source(msg);
                if self.is_me(nick) {
                    self.user = user.to_owned();
                    self.host = host.to_owned();
                }
                let handle = self.casemap(nick);
                if let Some(u) = self.users.get_mut(&handle) {
                    u.name.user = user.to_owned();
                    u.name.host = host.to_owned();
                }
                Ok(None)
            }
            "ACCOUNT" | "SETNAME" => Ok(None),
            "TOPIC" => {
                let [channel, topic] = params::<2>(msg)?;
                let cf = self.casemap(channel);
                let Some(c) = self.channels.get_mut(&cf) else {
                    return Ok(None);
                };
                let time = msg.time();
                c.topic = topic.to_owned();
                c.topic_who.clone_from(&msg.prefix);
                c.topic_time = Some(time);
                Ok(Some(Event::TopicChange {
                    channel: channel.to_owned(),
                    topic: topic.to_owned(),
                    time,
                }))
            }
            "MODE" => self.handle_mode(msg),
            "PRIVMSG" | "NOTICE" => self.handle_privmsg(msg),
            "TAGMSG" => self.handle_tagmsg(msg),
            "INVITE" => {
                let [invitee, channel] = params::<2>(msg)?;
                Ok(Some(Event::Invite {
                    inviter: source(msg).to_owned(),
                    invitee: invitee.to_owned(),
                    channel: channel.to_owned(),
                }))
            }
            "BATCH" => self.handle_batch(msg),
            "MARKREAD" => self.handle_markread(msg),
            "BOUNCER" => self.handle_bouncer(msg),
            "METADATA" => {
                let [target, key] = params::<2>(msg)?;
                Ok(self.apply_metadata(target, key, msg.param(3)))
            }
            "FAIL" | "WARN" | "NOTE" => self.handle_standard_reply(msg),
            _ if msg.is_reply() => Ok(Some(reply_error(msg))),
            other => {
                debug!(command = other, "unhandled command");
                Ok(None)
            }
        }
    }

    fn handle_numeric(&mut self, code: Response, msg: &Message) -> Result<Option<Event>, SessionError> {
        match code {
            Response::RPL_WELCOME => {
                let [nick] = params::<1>(msg)?;
                self.registration = Registration::Registered;
                self.nick = nick.to_owned();
                self.nick_cf = self.casemap(nick);
                self.server_name = msg.source_name().map(str::to_owned);
                debug!(nick, server = ?self.server_name, "registered");
                Ok(None)
            }
            Response::RPL_YOURHOST
            | Response::RPL_CREATED
            | Response::RPL_MYINFO
            | Response::RPL_UMODEIS
            | Response::RPL_ENDOFWHO
            | Response::RPL_MONLIST
            | Response::RPL_ENDOFMONLIST => Ok(None),
            Response::RPL_ISUPPORT => self.handle_isupport(msg),
            Response::RPL_LOGGEDIN => {
                self.account = msg.param(2).map(str::to_owned);
                Ok(None)
            }
            Response::RPL_LOGGEDOUT => {
                self.account = None;
                Ok(None)
            }
            Response::RPL_VISIBLEHOST => {
                let [_, host] = params::<2>(msg)?;
                self.host = host.to_owned();
                Ok(None)
            }
            Response::RPL_TOPIC => {
                let [_, channel, topic] = params::<3>(msg)?;
                if let Some(c) = self.channels.get_mut(&self.features.casemap.fold(channel)) {
                    c.topic = topic.to_owned();
                }
                Ok(None)
            }
            Response::RPL_NOTOPIC => {
                let [_, channel] = params::<2>(msg)?;
                if let Some(c) = self.channels.get_mut(&self.features.casemap.fold(channel)) {
                    c.topic.clear();
                }
                Ok(None)
            }
            Response::RPL_TOPICWHOTIME => {
                let [_, channel, who, time] = params::<4>(msg)?;
                let time = parse_unix(time)?;
                if let Some(c) = self.channels.get_mut(&self.features.casemap.fold(channel)) {
                    c.topic_who = Some(Prefix::parse(who));
                    c.topic_time = Some(time);
                }
                Ok(None)
            }
            Response::RPL_NAMREPLY => {
                let [_, _, channel, names] = params::<4>(msg)?;
                self.handle_names(channel, names);
                Ok(None)
            }
            Response::RPL_ENDOFNAMES => {
                let [_, channel] = params::<2>(msg)?;
                Ok(self.handle_end_of_names(channel))
            }
            Response::RPL_WHOREPLY => {
                let [_, _, user, host, _, nick, flags] = params::<7>(msg)?;
                self.update_from_who(nick, user, host, flags);
                Ok(None)
            }
            Response::RPL_WHOSPCRPL => {
                let [_, user, host, nick, flags] = params::<5>(msg)?;
                self.update_from_who(nick, user, host, flags);
                Ok(None)
            }
            Response::RPL_LISTSTART => {
                self.list.clear();
                Ok(None)
            }
            Response::RPL_LIST => {
                let [_, channel, count] = params::<3>(msg)?;
                self.list.push(ListItem {
                    channel: channel.to_owned(),
                    count: count.parse().unwrap_or(0),
                    topic: msg.param(3).unwrap_or("").to_owned(),
                });
                Ok(None)
            }
            Response::RPL_LISTEND => Ok(Some(Event::List(std::mem::take(&mut self.list)))),
            Response::RPL_MONONLINE => {
                let [_, targets] = params::<2>(msg)?;
                Ok(Some(self.handle_monitor_online(targets)))
            }
            Response::RPL_MONOFFLINE => {
                let [_, targets] = params::<2>(msg)?;
                Ok(Some(self.handle_monitor_offline(targets)))
            }
            Response::ERR_MONLISTFULL => {
                let [_, _, targets] = params::<3>(msg)?;
                warn!(targets, "monitor list is full");
                for target in targets.split(',').filter(|t| !t.is_empty()) {
                    let handle = self.casemap(target);
                    self.monitors.remove(&handle);
                    self.cleanup_user(&handle);
                }
                Ok(None)
            }
            Response::RPL_KEYVALUE => {
                let [_, target, key] = params::<3>(msg)?;
                Ok(self.apply_metadata(target, key, msg.param(4)))
            }
            Response::RPL_KEYNOTSET => {
                let [_, target, key] = params::<3>(msg)?;
                Ok(self.apply_metadata(target, key, None))
            }
            Response::ERR_UNKNOWNCOMMAND
                if matches!(msg.param(1), Some("BOUNCER" | "METADATA")) =>
            {
                debug!(command = msg.param(1), "server lacks optional command");
                Ok(None)
            }
            _ => Ok(Some(info_event(code, msg).unwrap_or_else(|| reply_error(msg)))),
        }
    }

    fn handle_isupport(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let isupport = Isupport::from_message(msg).ok_or_else(|| {
            SessionError::parse(
                &msg.command,
                crate::error::MessageParseError::NotEnoughParams {
                    expected: 2,
                    got: msg.params.len(),
                },
            )
        })?;

        let casemap_before = self.features.casemap;
        let monitor_before = self.features.monitor;
        let res = self.features.apply(&isupport);

        if self.features.casemap != casemap_before {
            self.casemap_changed();
        }
        if let Some(net_id) = &self.features.bouncer_netid {
            self.net_id.clone_from(net_id);
        }
        if !monitor_before && self.features.monitor && !self.monitors.is_empty() {
            let mut targets: Vec<&str> = self.monitors.iter().map(String::as_str).collect();
            targets.sort_unstable();
            let msg = Message::new("MONITOR", ["+".to_owned(), targets.join(",")]);
            self.push(msg);
        }

        let first = !self.isupport_seen;
        self.isupport_seen = true;
        match res {
            Ok(()) => Ok(first.then_some(Event::Registered)),
            Err(e) if first => {
                warn!(error = %e, "ignoring malformed ISUPPORT token");
                Ok(Some(Event::Registered))
            }
            Err(e) => Err(e),
        }
    }

    fn handle_join(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [channel] = params::<1>(msg)?;
        let prefix = msg.prefix.clone().unwrap_or_default();
        let cf = self.casemap(channel);

        if self.is_me(&prefix.name) {
            if !prefix.user.is_empty() {
                self.user.clone_from(&prefix.user);
            }
            if !prefix.host.is_empty() {
                self.host.clone_from(&prefix.host);
            }
            debug!(channel, "joined");
            // A repeated JOIN starts over; NAMES follows.
            if let Some(stale) = self.channels.insert(cf, Channel::new(channel)) {
                for handle in stale.members.keys() {
                    self.cleanup_user(handle);
                }
            }
            if self.has_cap("away-notify") {
                self.who(channel);
            }
            return Ok(None);
        }

        if !self.channels.contains_key(&cf) {
            debug!(channel, "JOIN for a channel we are not in");
            return Ok(None);
        }
        let handle = self.ensure_user(&prefix);
        if let Some(c) = self.channels.get_mut(&cf) {
            c.members.insert(handle, ChannelMember::default());
        }
        Ok(Some(Event::UserJoin {
            user: prefix.name,
            channel: channel.to_owned(),
            time: msg.time(),
        }))
    }

    /// PART and KICK: `nick` leaves `channel`.
    fn handle_leave(
        &mut self,
        msg: &Message,
        channel: &str,
        nick: &str,
    ) -> Result<Option<Event>, SessionError> {
        let cf = self.casemap(channel);

        if self.is_me(nick) {
            let Some(c) = self.channels.remove(&cf) else {
                return Ok(None);
            };
            debug!(channel, "left");
            self.typings.remove_target(channel);
            self.pending_joins.remove(&cf);
            for handle in c.members.keys() {
                self.cleanup_user(handle);
            }
            return Ok(Some(Event::SelfPart { channel: c.name }));
        }

        let handle = self.casemap(nick);
        let removed = self
            .channels
            .get_mut(&cf)
            .is_some_and(|c| c.members.remove(&handle).is_some());
        if !removed {
            return Ok(None);
        }
        self.typings.done(channel, nick);
        self.cleanup_user(&handle);
        Ok(Some(Event::UserPart {
            user: nick.to_owned(),
            channel: channel.to_owned(),
            time: msg.time(),
        }))
    }

    fn handle_quit(&mut self, msg: &Message) -> Option<Event> {
        let nick = source(msg);
        let handle = self.casemap(nick);
        if !self.users.contains_key(&handle) {
            return None;
        }

        let mut channels: Vec<String> = self
            .channels
            .values_mut()
            .filter_map(|c| c.members.remove(&handle).map(|_| c.name.clone()))
            .collect();
        channels.sort();

        if let Some(u) = self.users.get_mut(&handle) {
            u.disconnected = true;
        }
        self.typings.remove_user(nick);
        self.cleanup_user(&handle);
        Some(Event::UserQuit {
            user: nick.to_owned(),
            channels,
            time: msg.time(),
        })
    }

    fn handle_nick(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [new_nick] = params::<1>(msg)?;
        let former = source(msg);
        let old_handle = self.casemap(former);
        let new_handle = self.casemap(new_nick);

        let known = match self.users.remove(&old_handle) {
            Some(mut user) => {
                user.name.name = new_nick.to_owned();
                self.users.insert(new_handle.clone(), user);
                if old_handle != new_handle {
                    for c in self.channels.values_mut() {
                        if let Some(m) = c.members.remove(&old_handle) {
                            c.members.insert(new_handle.clone(), m);
                        }
                    }
                }
                self.cleanup_user(&new_handle);
                true
            }
            None => false,
        };
        self.typings.remove_user(former);

        if self.is_me(former) {
            let former_nick = std::mem::replace(&mut self.nick, new_nick.to_owned());
            self.nick_cf = new_handle;
            return Ok(Some(Event::SelfNick { former_nick }));
        }
        if !known {
            return Ok(None);
        }
        Ok(Some(Event::UserNick {
            user: new_nick.to_owned(),
            former_nick: former.to_owned(),
            time: msg.time(),
        }))
    }

    fn handle_mode(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [target, modes] = params::<2>(msg)?;
        if !self.is_channel(target) {
            return Ok(None);
        }
        let cf = self.casemap(target);
        if !self.channels.contains_key(&cf) {
            return Ok(None);
        }

        let args: Vec<&str> = msg.params[2..].iter().map(String::as_str).collect();
        let changes = {
            let table = ChannelModeTable::from_features(&self.features);
            parse_channel_mode(&table, modes, &args)?
        };

        let features = &self.features;
        if let Some(c) = self.channels.get_mut(&cf) {
            for change in &changes {
                let Some(symbol) = features.symbol_for_mode(change.letter()) else {
                    continue;
                };
                let Some(nick) = change.arg() else {
                    continue;
                };
                let Some(member) = c.members.get_mut(&features.casemap.fold(nick)) else {
                    continue;
                };
                let mut membership = member.membership.clone();
                if change.is_set() {
                    membership.push(symbol);
                } else {
                    membership.retain(|s| s != symbol);
                }
                member.membership = features.sort_membership(&membership);
            }
        }

        Ok(Some(Event::ModeChange {
            channel: target.to_owned(),
            mode: msg.params[1..].join(" "),
            time: msg.time(),
        }))
    }

    fn handle_privmsg(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let ev = self.message_event(msg)?;

        if !self.is_me(&ev.user) {
            let buffer = if ev.target_is_channel {
                ev.target.as_str()
            } else {
                ev.user.as_str()
            };
            self.typings.done(buffer, &ev.user);
        }

        if ev.target_is_channel {
            let cf = self.casemap(&ev.target);
            let handle = self.casemap(&ev.user);
            if let Some(member) = self
                .channels
                .get_mut(&cf)
                .and_then(|c| c.members.get_mut(&handle))
            {
                member.last_active = Some(ev.time);
            }
        }
        Ok(Some(Event::Message(ev)))
    }

    fn handle_tagmsg(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [target] = params::<1>(msg)?;
        let nick = source(msg);
        if self.is_me(nick) {
            return Ok(None);
        }
        let buffer = if self.is_me(target) { nick } else { target };
        match msg.tag_value("+typing") {
            Some("active") => self.typings.active(buffer, nick, Instant::now()),
            Some("paused" | "done") => {
                self.typings.done(buffer, nick);
            }
            _ => {}
        }
        Ok(None)
    }

    fn handle_names(&mut self, channel: &str, names: &str) {
        let cf = self.casemap(channel);
        if !self.channels.contains_key(&cf) {
            return;
        }
        for entry in names.split_whitespace() {
            let (symbols, mask) = self.features.split_membership(entry);
            let membership = self.features.sort_membership(symbols);
            let handle = self.ensure_user(&Prefix::parse(mask));
            if let Some(c) = self.channels.get_mut(&cf) {
                c.members.entry(handle).or_default().membership = membership;
            }
        }
    }

    fn handle_end_of_names(&mut self, channel: &str) -> Option<Event> {
        let cf = self.casemap(channel);
        let c = self.channels.get_mut(&cf)?;
        if c.complete {
            return None;
        }
        c.complete = true;
        let (channel, topic, read) = (c.name.clone(), c.topic.clone(), c.read);
        let requested = self.pending_join_requested(&cf);
        Some(Event::SelfJoin {
            channel,
            requested,
            topic,
            read,
        })
    }

    fn update_from_who(&mut self, nick: &str, user: &str, host: &str, flags: &str) {
        if self.is_me(nick) {
            self.user = user.to_owned();
            self.host = host.to_owned();
        }
        let handle = self.casemap(nick);
        if let Some(u) = self.users.get_mut(&handle) {
            u.name.user = user.to_owned();
            u.name.host = host.to_owned();
            u.away = flags.starts_with('G');
        }
    }

    fn handle_monitor_online(&mut self, targets: &str) -> Event {
        let mut users = Vec::new();
        for target in targets.split(',').filter(|t| !t.is_empty()) {
            let prefix = Prefix::parse(target);
            let handle = self.casemap(&prefix.name);
            if self.monitors.contains(&handle) || self.users.contains_key(&handle) {
                self.ensure_user(&prefix);
            }
            users.push(prefix.name);
        }
        Event::UserOnline { users }
    }

    fn handle_monitor_offline(&mut self, targets: &str) -> Event {
        let mut users = Vec::new();
        for target in targets.split(',').filter(|t| !t.is_empty()) {
            let name = Prefix::parse(target).name;
            let handle = self.casemap(&name);
            if self.monitors.contains(&handle) {
                self.users
                    .entry(handle)
                    .or_insert_with(|| User::new(Prefix::named(name.clone())))
                    .disconnected = true;
            }
            users.push(name);
        }
        Event::UserOffline { users }
    }

    fn handle_markread(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [target] = params::<1>(msg)?;
        let bound = msg.param(1).unwrap_or("*");
        if bound == "*" {
            return Ok(None);
        }
        let timestamp =
            parse_bound(bound).ok_or_else(|| SessionError::InvalidTimestamp(bound.to_owned()))?;

        let cf = self.casemap(target);
        if let Some(c) = self.channels.get_mut(&cf) {
            c.read = Some(timestamp);
            // Reported with SelfJoin once NAMES completes.
            if !c.complete {
                return Ok(None);
            }
        }
        Ok(Some(Event::Read {
            target: target.to_owned(),
            timestamp,
        }))
    }

    fn handle_bouncer(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [subcommand] = params::<1>(msg)?;
        if subcommand != "NETWORK" {
            return Ok(None);
        }
        let [_, id, attrs] = params::<3>(msg)?;
        if attrs == "*" {
            return Ok(Some(Event::BouncerNetwork {
                id: id.to_owned(),
                name: String::new(),
                delete: true,
            }));
        }
        let name = attrs
            .split(';')
            .filter_map(|kv| kv.split_once('='))
            .find(|(k, _)| *k == "name")
            .map(|(_, v)| tags::unescape(v))
            .unwrap_or_default();
        Ok(Some(Event::BouncerNetwork {
            id: id.to_owned(),
            name,
            delete: false,
        }))
    }

    fn apply_metadata(&mut self, target: &str, key: &str, value: Option<&str>) -> Option<Event> {
        let flag = value == Some("1");
        let entry = self.metadata.entry(self.features.casemap.fold(target)).or_default();
        match key {
            PINNED_KEY => entry.pinned = flag,
            MUTED_KEY => entry.muted = flag,
            _ => return None,
        }
        Some(Event::MetadataChange {
            target: target.to_owned(),
            pinned: entry.pinned,
            muted: entry.muted,
        })
    }

    fn handle_standard_reply(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [command, code] = params::<2>(msg)?;
        if msg.command == "FAIL"
            && (command == "BOUNCER"
                || (command == "METADATA" && matches!(code, "KEY_INVALID" | "KEY_NO_PERMISSION")))
        {
            debug!(command, code, "ignoring standard reply");
            return Ok(None);
        }

        let severity = match msg.command.as_str() {
            "FAIL" => Severity::Fail,
            "WARN" => Severity::Warn,
            _ => Severity::Note,
        };
        let description = if msg.params.len() > 2 {
            msg.params.last().map(String::as_str).unwrap_or("")
        } else {
            ""
        };
        let message = if command == "*" {
            description.to_owned()
        } else {
            format!("{command}: {description}")
        };
        Ok(Some(Event::Error(ErrorEvent {
            severity,
            code: code.to_owned(),
            message,
        })))
    }
}

/// Nickname or server name of the sender.
fn source(msg: &Message) -> &str {
    msg.source_name().unwrap_or("*")
}

fn parse_unix(value: &str) -> Result<DateTime<Utc>, SessionError> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| SessionError::InvalidTimestamp(value.to_owned()))
}

fn format_unix(value: &str) -> String {
    parse_unix(value)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|_| value.to_owned())
}

/// An unhandled numeric, classified by code.
fn reply_error(msg: &Message) -> Event {
    Event::Error(ErrorEvent {
        severity: Response::severity_of(&msg.command),
        code: msg.command.clone(),
        message: trailing_text(msg),
    })
}

/// Pre-formatted text for informational numerics.
fn info_event(code: Response, msg: &Message) -> Option<Event> {
    let p = |i: usize| msg.param(i).unwrap_or("");
    let rest = |i: usize| msg.params.get(i..).map(|p| p.join(" ")).unwrap_or_default();

    let (prefix, message) = match code {
        Response::RPL_AWAY => ("Away", format!("{} is away: {}", p(1), p(2))),
        Response::RPL_UNAWAY | Response::RPL_NOWAWAY => ("Away", rest(1)),
        Response::RPL_WHOISUSER => ("Whois", format!("{} is {}@{} ({})", p(1), p(2), p(3), p(5))),
        Response::RPL_WHOISSERVER => {
            ("Whois", format!("{} is connected to {} ({})", p(1), p(2), p(3)))
        }
        Response::RPL_WHOISOPERATOR => ("Whois", format!("{} is an IRC operator", p(1))),
        Response::RPL_WHOISIDLE => (
            "Whois",
            format!(
                "{} has been idle for {}s, signed on {}",
                p(1),
                p(2),
                format_unix(p(3))
            ),
        ),
        Response::RPL_WHOISCHANNELS => ("Whois", format!("{} is in {}", p(1), p(2))),
        Response::RPL_WHOISACCOUNT => ("Whois", format!("{} is logged in as {}", p(1), p(2))),
        Response::RPL_WHOISSECURE => ("Whois", format!("{} is using a secure connection", p(1))),
        Response::RPL_ENDOFWHOIS => ("Whois", format!("End of WHOIS for {}", p(1))),
        Response::RPL_WHOWASUSER => {
            ("Whowas", format!("{} was {}@{} ({})", p(1), p(2), p(3), p(5)))
        }
        Response::RPL_ENDOFWHOWAS => ("Whowas", format!("End of WHOWAS for {}", p(1))),
        Response::RPL_INVITING => ("Invite", format!("{} has been invited to {}", p(1), p(2))),
        Response::RPL_CHANNELMODEIS => ("Mode", format!("Modes of {}: {}", p(1), rest(2))),
        Response::RPL_CREATIONTIME => {
            ("Mode", format!("{} was created on {}", p(1), format_unix(p(2))))
        }
        Response::RPL_VERSION => ("Version", rest(1)),
        Response::RPL_TIME => ("Time", rest(1)),
        Response::RPL_ADMINME | Response::RPL_ADMINEMAIL => ("Admin", rest(1)),
        Response::RPL_LUSERCLIENT
        | Response::RPL_LUSEROP
        | Response::RPL_LUSERUNKNOWN
        | Response::RPL_LUSERCHANNELS
        | Response::RPL_LUSERME
        | Response::RPL_LOCALUSERS
        | Response::RPL_GLOBALUSERS => ("Lusers", rest(1)),
        Response::RPL_LINKS | Response::RPL_ENDOFLINKS => ("Links", rest(1)),
        Response::RPL_STATSLINKINFO
        | Response::RPL_STATSCOMMANDS
        | Response::RPL_ENDOFSTATS
        | Response::RPL_STATSUPTIME
        | Response::RPL_STATSOLINE => ("Stats", rest(1)),
        Response::RPL_MOTDSTART | Response::RPL_MOTD | Response::RPL_ENDOFMOTD => {
            ("MOTD", rest(1))
        }
        Response::RPL_INFO | Response::RPL_ENDOFINFO => ("Info", rest(1)),
        _ => return None,
    };
    Some(Event::Info {
        prefix: prefix.to_owned(),
        message,
    })
}
