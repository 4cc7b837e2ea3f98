//! Fuzz target for IRC message parsing
//!
//! Feeds arbitrary input to the parser and the codec sanitizer. Neither
//! may panic, and anything that parses must survive a serialize/parse
//! round trip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_session::Message;
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.is_empty() || input.len() > 8703 {
        return;
    }

    if let Ok(msg) = input.parse::<Message>() {
        let reparsed: Message = msg.to_string().parse().expect("serialized message reparses");
        assert_eq!(msg.command, reparsed.command);
    }

    let _ = slirc_session::IrcCodec::sanitize(input.to_string());
});
