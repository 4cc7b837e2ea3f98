//! Inbound typing indicator tracking.
//!
//! Remote users announce typing with the `+typing` client tag. An
//! `active` notification that is never followed by `done` must not stay
//! forever, so every entry expires [`TYPING_TIMEOUT`] after its last
//! refresh. The tracker owns no timer: the caller asks for
//! [`Typings::next_deadline`] and calls [`Typings::expire`] when it passes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::casemap::CaseMapping;

/// How long an `active` notification lasts without a refresh.
pub const TYPING_TIMEOUT: Duration = Duration::from_secs(6);

/// A user typing in a buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Typing {
    /// Buffer name: a channel, or the other party of a query.
    pub target: String,
    /// Nickname of the typing user.
    pub name: String,
}

#[derive(Debug)]
struct Entry {
    typing: Typing,
    since: Instant,
}

/// Per-target, per-user typing state.
#[derive(Debug)]
pub struct Typings {
    casemap: CaseMapping,
    timeout: Duration,
    entries: HashMap<(String, String), Entry>,
}

impl Default for Typings {
    fn default() -> Self {
        Typings::new(CaseMapping::default())
    }
}

impl Typings {
    pub fn new(casemap: CaseMapping) -> Self {
        Typings::with_timeout(casemap, TYPING_TIMEOUT)
    }

    pub fn with_timeout(casemap: CaseMapping, timeout: Duration) -> Self {
        Typings {
            casemap,
            timeout,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn set_casemap(&mut self, casemap: CaseMapping) {
        self.casemap = casemap;
    }

    fn key(&self, target: &str, name: &str) -> (String, String) {
        (self.casemap.fold(target), self.casemap.fold(name))
    }

    /// Record an `active` notification at `now`.
    pub fn active(&mut self, target: &str, name: &str, now: Instant) {
        let key = self.key(target, name);
        self.entries.insert(
            key,
            Entry {
                typing: Typing {
                    target: target.to_owned(),
                    name: name.to_owned(),
                },
                since: now,
            },
        );
    }

    /// Record a `done` or `paused` notification. Returns whether the user
    /// was typing.
    pub fn done(&mut self, target: &str, name: &str) -> bool {
        let key = self.key(target, name);
        self.entries.remove(&key).is_some()
    }

    /// Forget every entry of a user, in all targets.
    pub fn remove_user(&mut self, name: &str) {
        let name = self.casemap.fold(name);
        self.entries.retain(|(_, n), _| *n != name);
    }

    /// Forget every entry of a target.
    pub fn remove_target(&mut self, target: &str) {
        let target = self.casemap.fold(target);
        self.entries.retain(|(t, _), _| *t != target);
    }

    /// Users typing in `target`, sorted by nickname.
    pub fn list(&self, target: &str) -> Vec<&str> {
        let target = self.casemap.fold(target);
        let mut names: Vec<&str> = self
            .entries
            .iter()
            .filter(|((t, _), _)| *t == target)
            .map(|(_, e)| e.typing.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// When the oldest entry expires.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .values()
            .map(|e| e.since + self.timeout)
            .min()
    }

    /// Remove and return the entries that expired at `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<Typing> {
        let timeout = self.timeout;
        let mut expired = Vec::new();
        self.entries.retain(|_, e| {
            if now.duration_since(e.since) >= timeout {
                expired.push(e.typing.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_done_list() {
        let now = Instant::now();
        let mut t = Typings::default();
        t.active("#Chan", "Bob", now);
        t.active("#chan", "alice", now);
        assert_eq!(t.list("#CHAN"), vec!["Bob", "alice"]);

        assert!(t.done("#chan", "BOB"));
        assert!(!t.done("#chan", "bob"));
        assert_eq!(t.list("#chan"), vec!["alice"]);
    }

    #[test]
    fn test_expiry() {
        let start = Instant::now();
        let mut t = Typings::default();
        t.active("#chan", "bob", start);
        t.active("#chan", "alice", start + Duration::from_secs(2));
        assert_eq!(t.next_deadline(), Some(start + TYPING_TIMEOUT));

        assert!(t.expire(start + Duration::from_secs(5)).is_empty());
        let expired = t.expire(start + Duration::from_secs(6));
        assert_eq!(
            expired,
            vec![Typing {
                target: "#chan".into(),
                name: "bob".into()
            }]
        );
        assert_eq!(t.list("#chan"), vec!["alice"]);
        assert_eq!(
            t.next_deadline(),
            Some(start + Duration::from_secs(2) + TYPING_TIMEOUT)
        );
    }

    #[test]
    fn test_refresh_pushes_deadline() {
        let start = Instant::now();
        let mut t = Typings::default();
        t.active("#chan", "bob", start);
        t.active("#chan", "bob", start + Duration::from_secs(4));
        assert!(t.expire(start + Duration::from_secs(7)).is_empty());
        assert_eq!(t.expire(start + Duration::from_secs(10)).len(), 1);
        assert!(t.is_empty());
    }

    #[test]
    fn test_remove_user_and_target() {
        let now = Instant::now();
        let mut t = Typings::default();
        t.active("#a", "bob", now);
        t.active("#b", "bob", now);
        t.active("#b", "carol", now);
        t.remove_user("BOB");
        assert_eq!(t.list("#a"), Vec::<&str>::new());
        t.remove_target("#b");
        assert!(t.is_empty());
    }
}
