//! Server batches: chathistory playback, history targets and search.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{params, Session};
use crate::error::SessionError;
use crate::event::{Event, MessageEvent};
use crate::ircv3::{parse_bound, BatchKind};
use crate::message::Message;

/// An open batch and what it has collected so far.
#[derive(Debug)]
pub(super) enum Batch {
    History { target: String, events: Vec<Event> },
    Targets { targets: Vec<(String, DateTime<Utc>)> },
    Search { messages: Vec<MessageEvent> },
}

impl Session {
    pub(super) fn handle_batch(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [reference] = params::<1>(msg)?;

        if let Some(id) = reference.strip_prefix('+') {
            let [_, kind] = params::<2>(msg)?;
            let batch = match BatchKind::parse(kind) {
                BatchKind::ChatHistory => {
                    let [_, _, target] = params::<3>(msg)?;
                    Batch::History {
                        target: target.to_owned(),
                        events: Vec::new(),
                    }
                }
                BatchKind::ChatHistoryTargets => Batch::Targets {
                    targets: Vec::new(),
                },
                BatchKind::Search => Batch::Search {
                    messages: Vec::new(),
                },
                BatchKind::Other(kind) => {
                    debug!(id, kind, "not collecting batch");
                    return Ok(None);
                }
            };
            self.batches.insert(id.to_owned(), batch);
            return Ok(None);
        }

        let Some(id) = reference.strip_prefix('-') else {
            debug!(reference, "malformed BATCH reference");
            return Ok(None);
        };
        let event = match self.batches.remove(id) {
            Some(Batch::History { target, events }) => {
                self.history_requests.remove(&self.casemap(&target));
                Event::History { target, events }
            }
            Some(Batch::Targets { targets }) => {
                self.history_requests.remove("");
                Event::HistoryTargets { targets }
            }
            Some(Batch::Search { messages }) => Event::Search { messages },
            None => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Add a line tagged with an open batch to it.
    pub(super) fn fold_into_batch(&mut self, id: &str, msg: &Message) -> Result<(), SessionError> {
        let collects_targets = matches!(self.batches.get(id), Some(Batch::Targets { .. }));
        if collects_targets {
            if msg.command != "CHATHISTORY" || msg.param(0) != Some("TARGETS") {
                return Ok(());
            }
            let [_, target, bound] = params::<3>(msg)?;
            let time = parse_bound(bound)
                .ok_or_else(|| SessionError::InvalidTimestamp(bound.to_owned()))?;
            if let Some(Batch::Targets { targets }) = self.batches.get_mut(id) {
                targets.push((target.to_owned(), time));
            }
            return Ok(());
        }

        let Some(event) = self.handle_playback(msg)? else {
            return Ok(());
        };
        match self.batches.get_mut(id) {
            Some(Batch::History { events, .. }) => events.push(event),
            Some(Batch::Search { messages }) => {
                if let Event::Message(m) = event {
                    messages.push(m);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Events for history lines. The model is left untouched.
    fn handle_playback(&self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let user = msg.source_name().unwrap_or("*").to_owned();
        let time = msg.time();
        let event = match msg.command.as_str() {
            "JOIN" => {
                let [channel] = params::<1>(msg)?;
                Event::UserJoin {
                    user,
                    channel: channel.to_owned(),
                    time,
                }
            }
            "PART" => {
                let [channel] = params::<1>(msg)?;
                Event::UserPart {
                    user,
                    channel: channel.to_owned(),
                    time,
                }
            }
            "KICK" => {
                let [channel, victim] = params::<2>(msg)?;
                Event::UserPart {
                    user: victim.to_owned(),
                    channel: channel.to_owned(),
                    time,
                }
            }
            "QUIT" => Event::UserQuit {
                user,
                channels: Vec::new(),
                time,
            },
            "NICK" => {
                let [nick] = params::<1>(msg)?;
                Event::UserNick {
                    user: nick.to_owned(),
                    former_nick: user,
                    time,
                }
            }
            "TOPIC" => {
                let [channel, topic] = params::<2>(msg)?;
                Event::TopicChange {
                    channel: channel.to_owned(),
                    topic: topic.to_owned(),
                    time,
                }
            }
            "MODE" => {
                let [channel, _] = params::<2>(msg)?;
                Event::ModeChange {
                    channel: channel.to_owned(),
                    mode: msg.params[1..].join(" "),
                    time,
                }
            }
            "PRIVMSG" | "NOTICE" => Event::Message(self.message_event(msg)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}
