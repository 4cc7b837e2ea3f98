//! Property-based tests for parsing, tag escaping and casemapping.
//!
//! Uses proptest to generate random IRC components and verify that:
//! 1. Serialized messages can be re-parsed (roundtrip)
//! 2. Tag escaping is reversible
//! 3. Case folding is idempotent and agrees with comparison
//! 4. Message splitting never breaks a character or exceeds its budget

use proptest::prelude::*;
use slirc_session::message::tags;
use slirc_session::util::split_message;
use slirc_session::{CaseMapping, Message, Prefix, Tag};

// =============================================================================
// STRATEGIES - Generators for valid IRC components
// =============================================================================

/// Valid IRC nickname: starts with letter or special char, followed by
/// letters, digits, or special chars.
fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,15}")
        .expect("valid regex")
}

/// Valid IRC username (ident): alphanumeric, no spaces or @ or !
fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z~][a-zA-Z0-9]{0,9}").expect("valid regex")
}

/// Valid hostname: simplified version
fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+)*").expect("valid regex")
}

/// Valid IRC channel name
fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Message text that doesn't contain CR/LF (which would break IRC protocol)
fn message_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,400}").expect("valid regex")
}

/// Tag key: alphanumeric with optional client prefix and vendor
fn tag_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("\\+?([a-z]+\\.[a-z]+/)?[a-zA-Z][a-zA-Z0-9\\-]{0,30}")
        .expect("valid regex")
}

/// Tag value: anything, escaping takes care of the rest
fn tag_value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\0]{0,100}").expect("valid regex")
}

fn prefix_strategy() -> impl Strategy<Value = Prefix> {
    prop_oneof![
        prop::string::string_regex("[a-z]+\\.[a-z]+\\.[a-z]+")
            .expect("valid regex")
            .prop_map(Prefix::named),
        (nickname_strategy(), username_strategy(), hostname_strategy())
            .prop_map(|(nick, user, host)| Prefix::new(nick, user, host)),
    ]
}

/// Distinct tag keys, so lookups are unambiguous.
fn tags_strategy() -> impl Strategy<Value = Option<Vec<Tag>>> {
    prop::option::of(
        prop::collection::btree_map(
            tag_key_strategy(),
            prop::option::of(tag_value_strategy()),
            1..5,
        )
        .prop_map(|map| map.into_iter().map(|(k, v)| Tag::new(k, v)).collect()),
    )
}

/// Simple commands with a realistic parameter shape
fn command_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    prop_oneof![
        (channel_strategy(), message_text_strategy())
            .prop_map(|(target, text)| ("PRIVMSG".to_owned(), vec![target, text])),
        (nickname_strategy(), message_text_strategy())
            .prop_map(|(target, text)| ("NOTICE".to_owned(), vec![target, text])),
        nickname_strategy().prop_map(|nick| ("NICK".to_owned(), vec![nick])),
        channel_strategy().prop_map(|chan| ("JOIN".to_owned(), vec![chan])),
        (channel_strategy(), message_text_strategy())
            .prop_map(|(chan, reason)| ("PART".to_owned(), vec![chan, reason])),
        hostname_strategy().prop_map(|server| ("PING".to_owned(), vec![server])),
        channel_strategy().prop_map(|chan| ("TAGMSG".to_owned(), vec![chan])),
        (channel_strategy(), nickname_strategy(), message_text_strategy())
            .prop_map(|(chan, nick, reason)| ("KICK".to_owned(), vec![chan, nick, reason])),
        (0u16..1000, nickname_strategy(), message_text_strategy())
            .prop_map(|(code, nick, text)| (format!("{code:03}"), vec![nick, text])),
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (
        tags_strategy(),
        prop::option::of(prefix_strategy()),
        command_strategy(),
    )
        .prop_map(|(tags, prefix, (command, params))| Message {
            tags,
            prefix,
            command,
            params,
        })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// parse → serialize → parse = identity
    #[test]
    fn message_roundtrip(msg in message_strategy()) {
        let serialized = msg.to_string();
        let parsed: Message = serialized.parse()
            .expect("Serialized message should be parseable");
        prop_assert_eq!(&msg, &parsed,
            "Roundtrip failed for serialized: {}", serialized);
    }

    #[test]
    fn prefix_roundtrip(prefix in prefix_strategy()) {
        let serialized = prefix.to_string();
        let parsed = Prefix::parse(&serialized);
        prop_assert_eq!(&prefix, &parsed,
            "Prefix roundtrip failed for: {}", serialized);
    }

    #[test]
    fn tag_escape_roundtrip(value in tag_value_strategy()) {
        let escaped = tags::escape(&value);
        prop_assert!(!escaped.contains([' ', ';', '\r', '\n']));
        prop_assert_eq!(tags::unescape(&escaped), value);
    }

    #[test]
    fn tag_in_message_roundtrip(
        key in tag_key_strategy(),
        value in tag_value_strategy()
    ) {
        let msg = Message::new("PING", ["test"]).with_tag(key.clone(), Some(value.clone()));
        let parsed: Message = msg.to_string().parse()
            .expect("Tagged message should parse");
        prop_assert_eq!(parsed.tag_value(&key), Some(value.as_str()));
    }

    #[test]
    fn source_name_extraction(
        nick in nickname_strategy(),
        user in username_strategy(),
        host in hostname_strategy()
    ) {
        let line = format!(":{nick}!{user}@{host} PING test");
        let msg: Message = line.parse().expect("should parse");
        prop_assert_eq!(msg.source_name(), Some(nick.as_str()));
    }

    #[test]
    fn casemap_fold_is_idempotent(name in nickname_strategy()) {
        for mapping in [CaseMapping::Ascii, CaseMapping::Rfc1459] {
            let once = mapping.fold(&name);
            prop_assert_eq!(mapping.fold(&once), once.clone());
            prop_assert!(mapping.eq(&name, &once));
            prop_assert!(mapping.eq(&name.to_uppercase(), &name));
        }
    }

    #[test]
    fn split_respects_budget_and_boundaries(
        text in "\\PC{0,600}",
        budget in 4usize..200
    ) {
        let chunks: Vec<&str> = split_message(&text, budget).collect();
        for chunk in &chunks {
            prop_assert!(chunk.len() <= budget);
            prop_assert!(!chunk.is_empty());
        }
        prop_assert_eq!(chunks.concat(), text);
    }
}
