//! Records owned by the session: users, channels and per-target metadata.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::prefix::Prefix;

/// A user known to the session.
///
/// The session's user table owns every `User`; channels refer to users by
/// their handle, the casemapped nickname.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Nickname and, once known, user and host.
    pub name: Prefix,
    /// Marked away.
    pub away: bool,
    /// Monitored user that is currently offline.
    pub disconnected: bool,
}

impl User {
    pub(crate) fn new(name: Prefix) -> Self {
        User {
            name,
            away: false,
            disconnected: false,
        }
    }

    /// Fill in user and host when the new prefix knows them.
    pub(crate) fn update_mask(&mut self, prefix: &Prefix) {
        if !prefix.user.is_empty() {
            self.name.user.clone_from(&prefix.user);
        }
        if !prefix.host.is_empty() {
            self.name.host.clone_from(&prefix.host);
        }
    }
}

/// A user's role and activity in one channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelMember {
    /// Membership symbols ordered by rank, e.g. `@+`.
    pub membership: String,
    /// Time of the member's last message.
    pub last_active: Option<DateTime<Utc>>,
}

/// A joined channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    /// Name as first seen.
    pub name: String,
    /// Members keyed by user handle.
    pub members: HashMap<String, ChannelMember>,
    pub topic: String,
    pub topic_who: Option<Prefix>,
    pub topic_time: Option<DateTime<Utc>>,
    /// Read marker.
    pub read: Option<DateTime<Utc>>,
    /// The end of the NAMES reply was received.
    pub complete: bool,
}

impl Channel {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Channel {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Pinned and muted flags of a target (channel or query).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    pub pinned: bool,
    pub muted: bool,
}
