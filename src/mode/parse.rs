//! IRC channel mode parsing.

use crate::error::ModeParseError;
use crate::isupport::Features;

/// How a channel mode letter consumes parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeClass {
    /// List mode: always takes a parameter.
    A,
    /// Always takes a parameter.
    B,
    /// Takes a parameter only when set.
    C,
    /// Never takes a parameter.
    D,
}

impl ModeClass {
    fn takes_arg(self, set: bool) -> bool {
        match self {
            ModeClass::A | ModeClass::B => true,
            ModeClass::C => set,
            ModeClass::D => false,
        }
    }
}

/// A single mode change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Mode enabled, with its parameter if the class consumes one.
    Plus(char, Option<String>),
    /// Mode disabled, with its parameter if the class consumes one.
    Minus(char, Option<String>),
}

impl Mode {
    /// The mode letter.
    pub fn letter(&self) -> char {
        match self {
            Mode::Plus(c, _) | Mode::Minus(c, _) => *c,
        }
    }

    /// Whether the mode is being enabled.
    pub fn is_set(&self) -> bool {
        matches!(self, Mode::Plus(..))
    }

    /// The consumed parameter, if any.
    pub fn arg(&self) -> Option<&str> {
        match self {
            Mode::Plus(_, arg) | Mode::Minus(_, arg) => arg.as_deref(),
        }
    }
}

/// Classification of channel mode letters.
///
/// Letters in the membership prefix table are always class B, whatever
/// `CHANMODES` says.
#[derive(Clone, Copy, Debug)]
pub struct ChannelModeTable<'a> {
    chanmodes: [&'a str; 4],
    prefix_modes: &'a str,
}

impl<'a> ChannelModeTable<'a> {
    /// Build a table from CHANMODES classes and PREFIX mode letters.
    pub fn new(chanmodes: [&'a str; 4], prefix_modes: &'a str) -> Self {
        ChannelModeTable {
            chanmodes,
            prefix_modes,
        }
    }

    /// Build a table from the session's current server parameters.
    pub fn from_features(features: &'a Features) -> Self {
        let [a, b, c, d] = &features.chanmodes;
        ChannelModeTable::new([a, b, c, d], &features.prefix_modes)
    }

    /// Classify a mode letter.
    pub fn classify(&self, letter: char) -> Option<ModeClass> {
        if self.prefix_modes.contains(letter) {
            return Some(ModeClass::B);
        }
        let classes = [ModeClass::A, ModeClass::B, ModeClass::C, ModeClass::D];
        self.chanmodes
            .iter()
            .zip(classes)
            .find(|(letters, _)| letters.contains(letter))
            .map(|(_, class)| class)
    }

    /// Whether the letter grants a membership prefix.
    pub fn is_prefix_mode(&self, letter: char) -> bool {
        self.prefix_modes.contains(letter)
    }
}

/// Parse a channel mode string such as `+o-v+l alice bob 10`.
///
/// The sign starts as `+`. Parameters are consumed left to right; surplus
/// parameters are ignored.
pub fn parse_channel_mode(
    table: &ChannelModeTable<'_>,
    modes: &str,
    params: &[&str],
) -> Result<Vec<Mode>, ModeParseError> {
    let mut res = Vec::new();
    let mut args = params.iter();
    let mut set = true;

    for c in modes.chars() {
        match c {
            '+' => set = true,
            '-' => set = false,
            _ => {
                let class = table.classify(c).ok_or(ModeParseError::UnknownMode(c))?;
                let arg = if class.takes_arg(set) {
                    let arg = args.next().ok_or(ModeParseError::MissingModeParams(c))?;
                    Some((*arg).to_owned())
                } else {
                    None
                };
                res.push(if set {
                    Mode::Plus(c, arg)
                } else {
                    Mode::Minus(c, arg)
                });
            }
        }
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ChannelModeTable<'static> {
        ChannelModeTable::new(["beI", "k", "l", "imnst"], "ov")
    }

    #[test]
    fn test_prefix_modes_forced_to_b() {
        let t = ChannelModeTable::new(["beI", "k", "l", "imnsto"], "ov");
        assert_eq!(t.classify('o'), Some(ModeClass::B));
        assert_eq!(t.classify('l'), Some(ModeClass::C));
        assert_eq!(t.classify('x'), None);
    }

    #[test]
    fn test_mixed_signs_and_params() {
        let modes = parse_channel_mode(&table(), "+o-v+l", &["alice", "bob", "10"]).unwrap();
        assert_eq!(
            modes,
            vec![
                Mode::Plus('o', Some("alice".into())),
                Mode::Minus('v', Some("bob".into())),
                Mode::Plus('l', Some("10".into())),
            ]
        );
    }

    #[test]
    fn test_type_c_unset_takes_no_param() {
        let modes = parse_channel_mode(&table(), "-l+n", &[]).unwrap();
        assert_eq!(modes, vec![Mode::Minus('l', None), Mode::Plus('n', None)]);
    }

    #[test]
    fn test_list_mode_always_takes_param() {
        let modes = parse_channel_mode(&table(), "-b", &["*!*@spam"]).unwrap();
        assert_eq!(modes[0].arg(), Some("*!*@spam"));
        assert!(!modes[0].is_set());
    }

    #[test]
    fn test_unknown_mode() {
        let err = parse_channel_mode(&table(), "+X", &[]).unwrap_err();
        assert_eq!(err, ModeParseError::UnknownMode('X'));
    }

    #[test]
    fn test_missing_params() {
        let err = parse_channel_mode(&table(), "+ov", &["alice"]).unwrap_err();
        assert_eq!(err, ModeParseError::MissingModeParams('v'));
    }

    #[test]
    fn test_surplus_params_ignored() {
        let modes = parse_channel_mode(&table(), "+m", &["extra"]).unwrap();
        assert_eq!(modes, vec![Mode::Plus('m', None)]);
    }
}
