//! Fuzz target feeding arbitrary lines to a registered session.
//!
//! Errors are fine; panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_session::{Message, Session, SessionParams};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let mut session = Session::new(SessionParams::new("alice", "alice", "Alice"));
    for line in [
        ":irc.test CAP * ACK :batch draft/chathistory message-tags",
        ":irc.test 001 alice :Welcome",
        ":irc.test 005 alice PREFIX=(ov)@+ CHANTYPES=# MONITOR=10 :are supported",
        ":alice!al@host JOIN #a",
        ":irc.test 366 alice #a :End",
    ] {
        if let Ok(msg) = line.parse::<Message>() {
            let _ = session.handle_message(msg);
        }
    }

    for line in input.lines() {
        if let Ok(msg) = line.parse::<Message>() {
            let _ = session.handle_message(msg);
        }
    }
    session.drain_outbound();
});
