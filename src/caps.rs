//! IRCv3 capability negotiation support.
//!
//! [`CAPABILITIES`] is the immutable table of capabilities this client
//! understands. Each session keeps its own [`CapState`] with what the
//! server advertised and what it acknowledged; the table itself is never
//! mutated.
//!
//! # Reference
//! - IRCv3 Capability Negotiation: <https://ircv3.net/specs/extensions/capability-negotiation>
//! - Individual capability specifications: <https://ircv3.net/irc/>

use std::collections::{HashMap, HashSet};

/// Definition of a capability the client supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDef {
    /// Capability name (e.g., "multi-prefix")
    pub name: &'static str,
    /// Requested on connect, before the server lists it.
    ///
    /// Vendor and draft capabilities wait for `CAP LS` so strict servers
    /// are not flooded with speculative requests before registration.
    pub immediate: bool,
    /// Human-readable description
    pub description: &'static str,
}

macro_rules! caps {
    ($($name:literal, $immediate:literal, $desc:literal;)*) => {
        /// Static list of supported capabilities, sorted by name.
        pub const CAPABILITIES: &[CapabilityDef] = &[
            $(CapabilityDef { name: $name, immediate: $immediate, description: $desc },)*
        ];
    };
}

caps! {
    "account-notify", true, "ACCOUNT command for login/logout";
    "account-tag", true, "Add account tag to messages from logged-in users";
    "away-notify", true, "Broadcast AWAY status changes to channel members";
    "batch", true, "Multi-line response grouping";
    "cap-notify", true, "Server notifies clients of capability changes (CAP NEW/DEL)";
    "chghost", true, "Notify when user's hostname changes (CHGHOST command)";
    "draft/chathistory", false, "CHATHISTORY playback";
    "draft/event-playback", false, "Non-message events in history batches";
    "draft/metadata-2", false, "Per-target key/value metadata";
    "draft/read-marker", false, "Read markers synchronized across clients";
    "echo-message", true, "Send copy of PRIVMSG/NOTICE back to sender";
    "extended-join", true, "JOIN includes account + realname";
    "invite-notify", true, "Notify channel members when someone is invited";
    "labeled-response", true, "Echo label tag for request/response correlation";
    "message-tags", true, "Parse client tags from incoming messages";
    "multi-prefix", true, "Show all user modes in NAMES (@+nick for op+voice)";
    "sasl", true, "SASL authentication";
    "server-time", true, "Add time tag to messages (ISO 8601)";
    "setname", true, "Change realname with SETNAME command";
    "soju.im/bouncer-networks", false, "Bouncer network list";
    "soju.im/bouncer-networks-notify", false, "Bouncer network change notifications";
    "soju.im/read", false, "Read markers (soju vendor variant)";
    "soju.im/search", false, "Message search";
    "userhost-in-names", true, "Include full nick!user@host in NAMES replies";
}

/// Look up a supported capability by name.
pub fn find(name: &str) -> Option<&'static CapabilityDef> {
    CAPABILITIES.iter().find(|cap| cap.name == name)
}

/// Check if a capability name is supported.
pub fn is_supported(name: &str) -> bool {
    find(name).is_some()
}

/// Names of the capabilities requested on connect.
pub fn immediate_names() -> impl Iterator<Item = &'static str> {
    CAPABILITIES
        .iter()
        .filter(|cap| cap.immediate)
        .map(|cap| cap.name)
}

/// Split a `name=value` capability token.
fn split_token(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    }
}

/// Per-session capability state.
#[derive(Debug, Clone, Default)]
pub struct CapState {
    available: HashMap<String, Option<String>>,
    enabled: HashSet<String>,
}

impl CapState {
    /// Record capabilities from `CAP LS` or `CAP NEW`.
    ///
    /// Returns the names of the capabilities in the list.
    pub fn add_available(&mut self, list: &str) -> Vec<String> {
        list.split_whitespace()
            .map(|token| {
                let (name, value) = split_token(token);
                self.available
                    .insert(name.to_owned(), value.map(str::to_owned));
                name.to_owned()
            })
            .collect()
    }

    /// Remove capabilities from `CAP DEL`, from both sets.
    pub fn remove(&mut self, list: &str) {
        for token in list.split_whitespace() {
            let (name, _) = split_token(token);
            self.available.remove(name);
            self.enabled.remove(name);
        }
    }

    /// Apply a `CAP ACK` list.
    ///
    /// Entries prefixed with `-` disable. Returns each change as
    /// `(name, enabled)`, in list order.
    pub fn acknowledge(&mut self, list: &str) -> Vec<(String, bool)> {
        list.split_whitespace()
            .map(|token| match token.strip_prefix('-') {
                Some(name) => {
                    self.enabled.remove(name);
                    (name.to_owned(), false)
                }
                None => {
                    let (name, _) = split_token(token);
                    self.enabled.insert(name.to_owned());
                    (name.to_owned(), true)
                }
            })
            .collect()
    }

    /// Select which of `names` to request.
    ///
    /// Keeps supported capabilities that are not yet enabled. Immediate
    /// ones are skipped when `skip_immediate` is set, since they were
    /// already requested on connect.
    pub fn wanted<'n>(&self, names: &'n [String], skip_immediate: bool) -> Vec<&'n str> {
        names
            .iter()
            .map(String::as_str)
            .filter(|name| match find(name) {
                Some(def) => !self.enabled.contains(*name) && !(skip_immediate && def.immediate),
                None => false,
            })
            .collect()
    }

    /// Whether a capability has been acknowledged.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// Whether the server advertised a capability.
    pub fn is_available(&self, name: &str) -> bool {
        self.available.contains_key(name)
    }

    /// The advertised value of a capability.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.available.get(name)?.as_deref()
    }

    /// Advertised capabilities and their values.
    pub fn available(&self) -> &HashMap<String, Option<String>> {
        &self.available
    }

    /// Acknowledged capabilities.
    pub fn enabled(&self) -> &HashSet<String> {
        &self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_sorted_and_unique() {
        let names: Vec<_> = CAPABILITIES.iter().map(|c| c.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_vendor_caps_deferred() {
        assert!(find("batch").unwrap().immediate);
        assert!(!find("draft/chathistory").unwrap().immediate);
        assert!(!find("soju.im/bouncer-networks").unwrap().immediate);
        assert!(immediate_names().all(|n| !n.contains('/')));
    }

    #[test]
    fn test_available_and_del() {
        let mut caps = CapState::default();
        let names = caps.add_available("sasl=PLAIN,EXTERNAL batch vendor/unknown");
        assert_eq!(names, vec!["sasl", "batch", "vendor/unknown"]);
        assert_eq!(caps.value("sasl"), Some("PLAIN,EXTERNAL"));
        assert!(caps.is_available("batch"));

        caps.acknowledge("batch");
        caps.remove("batch");
        assert!(!caps.is_available("batch"));
        assert!(!caps.is_enabled("batch"));
    }

    #[test]
    fn test_acknowledge_disable() {
        let mut caps = CapState::default();
        let changes = caps.acknowledge("multi-prefix echo-message");
        assert_eq!(changes.len(), 2);
        assert!(caps.is_enabled("echo-message"));

        let changes = caps.acknowledge("-echo-message");
        assert_eq!(changes, vec![("echo-message".to_owned(), false)]);
        assert!(!caps.is_enabled("echo-message"));
    }

    #[test]
    fn test_wanted() {
        let mut caps = CapState::default();
        let names = caps.add_available("batch draft/chathistory vendor/x multi-prefix");
        caps.acknowledge("multi-prefix");
        assert_eq!(caps.wanted(&names, true), vec!["draft/chathistory"]);
        assert_eq!(caps.wanted(&names, false), vec!["batch", "draft/chathistory"]);
    }
}
