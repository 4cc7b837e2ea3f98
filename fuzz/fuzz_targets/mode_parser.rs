//! Fuzz target for channel mode parsing against a typical server table.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_session::{parse_channel_mode, ChannelModeTable};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let mut words = input.split(' ');
    let modes = words.next().unwrap_or("");
    let params: Vec<&str> = words.collect();

    let table = ChannelModeTable::new(["beI", "k", "l", "imnpst"], "qaohv");
    let _ = parse_channel_mode(&table, modes, &params);
});
