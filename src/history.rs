//! CHATHISTORY request builder.
//!
//! Requests are deduplicated per target: while a request for a target is
//! in flight (its `chathistory` batch has not closed), further requests
//! for it are dropped. The result arrives as
//! [`Event::History`](crate::Event::History) or
//! [`Event::HistoryTargets`](crate::Event::HistoryTargets).
//!
//! # Example
//!
//! ```
//! use slirc_session::{Session, SessionParams};
//!
//! let mut session = Session::new(SessionParams::new("alice", "alice", "Alice"));
//! for line in [
//!     ":irc.example.net CAP * ACK draft/chathistory",
//!     ":irc.example.net 001 alice :Welcome",
//!     ":irc.example.net 005 alice CHATHISTORY=50 :are supported",
//! ] {
//!     session.handle_message(line.parse().unwrap()).unwrap();
//! }
//! session.drain_outbound();
//!
//! assert!(session.new_history_request("#rust").with_limit(20).latest());
//! assert_eq!(
//!     session.drain_outbound()[0].to_string(),
//!     "CHATHISTORY LATEST #rust * 20"
//! );
//! ```

use chrono::{DateTime, Utc};

use crate::ircv3::format_bound;
use crate::session::Session;

/// A pending CHATHISTORY request.
///
/// Built with [`Session::new_history_request`]; one of the terminal
/// methods sends it and reports whether it went out.
#[must_use = "a history request does nothing until sent"]
pub struct HistoryRequest<'s> {
    session: &'s mut Session,
    target: String,
    limit: usize,
}

impl<'s> HistoryRequest<'s> {
    pub(crate) fn new(session: &'s mut Session, target: &str) -> Self {
        let limit = session.features().history_limit;
        HistoryRequest {
            session,
            target: target.to_owned(),
            limit,
        }
    }

    /// Ask for at most `limit` messages, capped by the server's limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(self.session.features().history_limit);
        self
    }

    /// Messages after `t`, oldest first.
    pub fn after(self, t: DateTime<Utc>) -> bool {
        let bound = format_bound(t);
        self.send("AFTER", bound)
    }

    /// Messages before `t`.
    pub fn before(self, t: DateTime<Utc>) -> bool {
        let bound = format_bound(t);
        self.send("BEFORE", bound)
    }

    /// The most recent messages.
    pub fn latest(self) -> bool {
        self.send("LATEST", "*".to_owned())
    }

    /// Targets with activity between `start` and `end`.
    ///
    /// The request target is ignored; the dedup key is the empty string.
    pub fn targets(self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let params = vec![
            "TARGETS".to_owned(),
            format_bound(start),
            format_bound(end),
            self.limit.to_string(),
        ];
        self.session.request_history("", params)
    }

    fn send(self, subcommand: &str, bound: String) -> bool {
        let params = vec![
            subcommand.to_owned(),
            self.target.clone(),
            bound,
            self.limit.to_string(),
        ];
        self.session.request_history(&self.target, params)
    }
}

impl std::fmt::Debug for HistoryRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRequest")
            .field("target", &self.target)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
