//! Channel mode classification and parsing.
//!
//! Mode letters are classified by the server's `CHANMODES` and `PREFIX`
//! tokens; see [`ChannelModeTable`].

mod parse;

pub use self::parse::{parse_channel_mode, ChannelModeTable, Mode, ModeClass};
