//! ISUPPORT (RPL_ISUPPORT 005) token parsing.
//!
//! [`Isupport`] borrows the tokens of one `005` line. [`Features`] is the
//! owned table of server parameters the session keeps, starting from
//! RFC 1459 defaults and updated by every `005` the server sends.

use tracing::debug;

use crate::casemap::CaseMapping;
use crate::error::SessionError;
use crate::message::Message;

/// A single ISUPPORT token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    /// Token name, without the negation marker.
    pub key: &'a str,
    /// Value after `=`, if any.
    pub value: Option<&'a str>,
    /// Whether the token was sent as `-KEY`.
    pub negated: bool,
}

/// The tokens of one `RPL_ISUPPORT` line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    /// Parse bare tokens (no client nickname, no trailing text).
    pub fn parse_params<I>(params: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = Vec::new();
        for p in params {
            if p.is_empty() {
                continue;
            }
            let (p, negated) = match p.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (p, false),
            };
            let (key, value) = match p.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (p, None),
            };
            if key.is_empty() {
                continue;
            }
            entries.push(IsupportEntry {
                key,
                value,
                negated,
            });
        }
        Isupport { entries }
    }

    /// Extract the tokens of a `005` message.
    ///
    /// The first parameter (our nickname) and the last one (the
    /// human-readable "are supported by this server") are skipped.
    pub fn from_message(msg: &'a Message) -> Option<Self> {
        if msg.command != "005" || msg.params.len() < 2 {
            return None;
        }
        let tokens = &msg.params[1..msg.params.len() - 1];
        Some(Self::parse_params(tokens.iter().map(String::as_str)))
    }

    /// Iterate over the tokens in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// Look up a non-negated token. The last occurrence wins.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| !e.negated && e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    pub fn casemapping(&self) -> Option<&'a str> {
        self.get("CASEMAPPING").flatten()
    }

    pub fn chantypes(&self) -> Option<&'a str> {
        self.get("CHANTYPES").flatten()
    }

    pub fn prefix(&self) -> Option<PrefixSpec<'a>> {
        self.get("PREFIX").flatten().and_then(PrefixSpec::parse)
    }

    pub fn chanmodes(&self) -> Option<ChanModes<'a>> {
        self.get("CHANMODES").flatten().and_then(ChanModes::parse)
    }
}

/// `PREFIX=(modes)symbols`, both halves of equal length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    /// Mode letters, most powerful first (e.g. `ov`).
    pub modes: &'a str,
    /// Matching symbols (e.g. `@+`).
    pub symbols: &'a str,
}

impl<'a> PrefixSpec<'a> {
    /// Parse a PREFIX value.
    ///
    /// An empty value is a valid spec with no prefixes. Returns `None` when
    /// the halves differ in length, the parentheses are misplaced or the
    /// value is not ASCII.
    pub fn parse(s: &'a str) -> Option<Self> {
        if s.is_empty() {
            return Some(PrefixSpec {
                modes: "",
                symbols: "",
            });
        }
        if !s.is_ascii() || s.len() % 2 != 0 {
            return None;
        }
        let n = (s.len() - 2) / 2;
        let bytes = s.as_bytes();
        if bytes[0] != b'(' || bytes[n + 1] != b')' {
            return None;
        }
        Some(PrefixSpec {
            modes: &s[1..n + 1],
            symbols: &s[n + 2..],
        })
    }
}

/// `CHANMODES=A,B,C,D` classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChanModes<'a> {
    /// Type A: list modes, always take a parameter.
    pub a: &'a str,
    /// Type B: always take a parameter.
    pub b: &'a str,
    /// Type C: take a parameter only when set.
    pub c: &'a str,
    /// Type D: never take a parameter.
    pub d: &'a str,
}

impl<'a> ChanModes<'a> {
    /// Parse a CHANMODES value. Classes beyond the fourth are ignored.
    pub fn parse(s: &'a str) -> Option<Self> {
        let mut parts = s.split(',');
        let (a, b, c, d) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        Some(ChanModes { a, b, c, d })
    }
}

/// Server parameters tracked by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Features {
    /// Active case mapping.
    pub casemap: CaseMapping,
    /// CHANMODES classes A, B, C and D.
    pub chanmodes: [String; 4],
    /// Channel name prefixes.
    pub chantypes: String,
    /// Maximum number of messages per CHATHISTORY request.
    pub history_limit: usize,
    /// Maximum line length in bytes, CRLF included.
    pub linelen: usize,
    /// MONITOR is supported.
    pub monitor: bool,
    /// Membership mode letters, most powerful first.
    pub prefix_modes: String,
    /// Membership symbols, in the same order as `prefix_modes`.
    pub prefix_symbols: String,
    /// WHOX is supported.
    pub whox: bool,
    /// LIST accepts masks (ELIST contains `M`).
    pub list_mask: bool,
    /// File upload endpoint advertised by the bouncer.
    pub upload_url: Option<String>,
    /// Bouncer network this connection is bound to.
    pub bouncer_netid: Option<String>,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            casemap: CaseMapping::Rfc1459,
            chanmodes: [
                "beI".to_owned(),
                "k".to_owned(),
                "l".to_owned(),
                "imnst".to_owned(),
            ],
            chantypes: "#&".to_owned(),
            history_limit: 100,
            linelen: 512,
            monitor: false,
            prefix_modes: "ov".to_owned(),
            prefix_symbols: "@+".to_owned(),
            whox: false,
            list_mask: false,
            upload_url: None,
            bouncer_netid: None,
        }
    }
}

impl Features {
    /// Apply the tokens of one `005` line.
    ///
    /// Every token is applied even if an earlier one was malformed; the
    /// first error is returned. Negated tokens are ignored.
    pub fn apply(&mut self, isupport: &Isupport<'_>) -> Result<(), SessionError> {
        let mut first_err = None;
        for entry in isupport.iter() {
            if entry.negated {
                debug!(token = entry.key, "ignoring negated ISUPPORT token");
                continue;
            }
            if let Err(e) = self.apply_token(entry.key, entry.value.unwrap_or("")) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn apply_token(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        match key.to_ascii_uppercase().as_str() {
            "BOUNCER_NETID" => self.bouncer_netid = Some(value.to_owned()),
            "CASEMAPPING" => self.casemap = CaseMapping::from_isupport(Some(value)),
            "CHANMODES" => {
                let modes = ChanModes::parse(value)
                    .ok_or_else(|| SessionError::InvalidIsupport(format!("CHANMODES={value}")))?;
                self.chanmodes = [modes.a, modes.b, modes.c, modes.d].map(str::to_owned);
            }
            "CHANTYPES" => self.chantypes = value.to_owned(),
            "CHATHISTORY" => match value.parse::<usize>() {
                Ok(0) => {}
                Ok(n) => self.history_limit = n,
                Err(_) => {
                    return Err(SessionError::InvalidIsupport(format!("CHATHISTORY={value}")))
                }
            },
            "ELIST" => self.list_mask = value.to_ascii_uppercase().contains('M'),
            "LINELEN" => match value.parse::<usize>() {
                Ok(0) => {}
                Ok(n) => self.linelen = n,
                Err(_) => return Err(SessionError::InvalidIsupport(format!("LINELEN={value}"))),
            },
            "MONITOR" => {
                // A missing value means no limit.
                self.monitor = value.is_empty() || value.parse::<usize>().is_ok_and(|n| n > 0);
            }
            "PREFIX" => {
                let spec = PrefixSpec::parse(value)
                    .ok_or_else(|| SessionError::InvalidIsupport(format!("PREFIX={value}")))?;
                self.prefix_modes = spec.modes.to_owned();
                self.prefix_symbols = spec.symbols.to_owned();
            }
            "WHOX" => self.whox = true,
            "SOJU.IM/FILEHOST" => self.upload_url = Some(value.to_owned()),
            _ => {}
        }
        Ok(())
    }

    /// Whether `name` starts with a channel type prefix.
    pub fn is_channel(&self, name: &str) -> bool {
        name.chars()
            .next()
            .is_some_and(|c| self.chantypes.contains(c))
    }

    /// Rank of a membership symbol, 0 being the most powerful.
    pub fn symbol_rank(&self, symbol: char) -> Option<usize> {
        self.prefix_symbols.chars().position(|c| c == symbol)
    }

    /// Membership symbol granted by a prefix mode letter.
    pub fn symbol_for_mode(&self, mode: char) -> Option<char> {
        let i = self.prefix_modes.chars().position(|c| c == mode)?;
        self.prefix_symbols.chars().nth(i)
    }

    /// Sort membership symbols by rank, dropping duplicates and unknowns.
    pub fn sort_membership(&self, membership: &str) -> String {
        self.prefix_symbols
            .chars()
            .filter(|c| membership.contains(*c))
            .collect()
    }

    /// Split leading membership symbols off a NAMES entry.
    pub fn split_membership<'n>(&self, name: &'n str) -> (&'n str, &'n str) {
        let end = name
            .find(|c: char| !self.prefix_symbols.contains(c))
            .unwrap_or(name.len());
        name.split_at(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(line: &str) -> (Features, Result<(), SessionError>) {
        let msg: Message = line.parse().unwrap();
        let isupport = Isupport::from_message(&msg).unwrap();
        let mut f = Features::default();
        let res = f.apply(&isupport);
        (f, res)
    }

    #[test]
    fn test_parse_params_negation() {
        let is = Isupport::parse_params(["CHANTYPES=#", "-WHOX", "EXCEPTS"]);
        assert_eq!(is.chantypes(), Some("#"));
        assert_eq!(is.get("WHOX"), None);
        assert_eq!(is.get("EXCEPTS"), Some(None));
        assert!(is.iter().any(|e| e.key == "WHOX" && e.negated));
    }

    #[test]
    fn test_prefix_spec() {
        let p = PrefixSpec::parse("(qaohv)~&@%+").unwrap();
        assert_eq!(p.modes, "qaohv");
        assert_eq!(p.symbols, "~&@%+");
        assert_eq!(PrefixSpec::parse("(ov)@"), None);
        assert_eq!(PrefixSpec::parse("ov)@+("), None);
        assert_eq!(PrefixSpec::parse("").unwrap().modes, "");
    }

    #[test]
    fn test_chanmodes() {
        let m = ChanModes::parse("beI,k,l,imnst").unwrap();
        assert_eq!((m.a, m.b, m.c, m.d), ("beI", "k", "l", "imnst"));
        assert!(ChanModes::parse("b,k").is_none());
    }

    #[test]
    fn test_defaults() {
        let f = Features::default();
        assert_eq!(f.casemap, CaseMapping::Rfc1459);
        assert_eq!(f.linelen, 512);
        assert_eq!(f.history_limit, 100);
        assert!(f.is_channel("#rust"));
        assert!(!f.is_channel("alice"));
    }

    #[test]
    fn test_apply_tokens() {
        let (f, res) = features(
            ":irc 005 me CASEMAPPING=ascii CHANTYPES=# LINELEN=1024 CHATHISTORY=50 \
             MONITOR=100 WHOX ELIST=CMNTU PREFIX=(qov)~@+ SOJU.IM/FILEHOST=https://up \
             BOUNCER_NETID=42 :are supported by this server",
        );
        assert_eq!(res, Ok(()));
        assert_eq!(f.casemap, CaseMapping::Ascii);
        assert_eq!(f.chantypes, "#");
        assert_eq!(f.linelen, 1024);
        assert_eq!(f.history_limit, 50);
        assert!(f.monitor && f.whox && f.list_mask);
        assert_eq!(f.prefix_modes, "qov");
        assert_eq!(f.prefix_symbols, "~@+");
        assert_eq!(f.upload_url.as_deref(), Some("https://up"));
        assert_eq!(f.bouncer_netid.as_deref(), Some("42"));
    }

    #[test]
    fn test_apply_keeps_going_after_error() {
        let (f, res) = features(":irc 005 me PREFIX=(ov)@ LINELEN=400 :are supported");
        assert!(matches!(res, Err(SessionError::InvalidIsupport(_))));
        assert_eq!(f.linelen, 400);
        assert_eq!(f.prefix_modes, "ov");
    }

    #[test]
    fn test_membership_helpers() {
        let f = Features::default();
        assert_eq!(f.sort_membership("+@"), "@+");
        assert_eq!(f.symbol_for_mode('v'), Some('+'));
        assert_eq!(f.split_membership("@+alice"), ("@+", "alice"));
        assert_eq!(f.split_membership("bob"), ("", "bob"));
    }
}
