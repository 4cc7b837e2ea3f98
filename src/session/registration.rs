//! Registration: capability negotiation, SASL and the unregistered filter.

use tracing::{debug, warn};

use super::{params, Registration, Session};
use crate::caps;
use crate::error::SessionError;
use crate::event::{ErrorEvent, Event};
use crate::message::Message;
use crate::response::{Response, Severity};
use crate::sasl::{self, SASL_CHUNK_SIZE};

/// Metadata keys the session subscribes to.
pub(super) const PINNED_KEY: &str = "soju.im/pinned";
pub(super) const MUTED_KEY: &str = "soju.im/muted";

impl Session {
    pub(super) fn start_registration(&mut self) {
        self.push(Message::new("CAP", ["LS", "302"]));

        // Bouncer network connections wait for CAP LS before requesting.
        // REQ is all-or-nothing, so one unsupported name must not take the
        // others down with it.
        let early_caps = self.net_id.is_empty();
        if early_caps {
            let wanted: Vec<&str> = caps::immediate_names()
                .filter(|name| *name != "sasl" || self.auth.is_some())
                .collect();
            for name in wanted {
                self.push(Message::new("CAP", ["REQ", name]));
            }
        }

        self.push(Message::new("NICK", [self.nick.clone()]));
        self.push(Message::new(
            "USER",
            [
                self.username.clone(),
                "0".to_owned(),
                "*".to_owned(),
                self.realname.clone(),
            ],
        ));

        match self.auth.as_ref().map(|a| a.mechanism().to_owned()) {
            Some(mechanism) if early_caps => {
                self.sasl_started = true;
                self.push(Message::new("AUTHENTICATE", [mechanism]));
            }
            Some(_) => {}
            None => self.end_registration(),
        }
    }

    /// Send `CAP END` and the bouncer/metadata probes. Runs once.
    pub(super) fn end_registration(&mut self) {
        if self.cap_ended {
            return;
        }
        self.cap_ended = true;

        if self.net_id.is_empty() {
            self.push(Message::new("CAP", ["END"]));
            self.push(Message::new("BOUNCER", ["LISTNETWORKS"]));
        } else {
            self.push(Message::new("BOUNCER", ["BIND".to_owned(), self.net_id.clone()]));
            self.push(Message::new("CAP", ["END"]));
        }

        if !self.ls_complete || self.caps.is_available("draft/metadata-2") {
            self.subscribe_metadata();
        }
    }

    pub(super) fn subscribe_metadata(&mut self) {
        let keys: Vec<&str> = [PINNED_KEY, MUTED_KEY]
            .into_iter()
            .filter(|k| !self.metadata_subs.contains(*k))
            .collect();
        if keys.is_empty() {
            return;
        }
        let mut params = vec!["*", "SUB"];
        params.extend(&keys);
        self.push(Message::new("METADATA", params));
        self.metadata_subs
            .extend(keys.into_iter().map(str::to_owned));
    }

    /// Commands that only matter before `RPL_WELCOME`.
    ///
    /// Returns `None` when the message is not for this layer and must go to
    /// the regular handler.
    pub(super) fn handle_unregistered(
        &mut self,
        msg: &Message,
    ) -> Option<Result<Option<Event>, SessionError>> {
        let code = msg.command.parse::<Response>().ok();
        match code {
            Some(Response::ERR_NICKNAMEINUSE | Response::ERR_UNAVAILRESOURCE) => {
                self.nick.push('_');
                self.nick_cf = self.casemap(&self.nick);
                debug!(nick = %self.nick, "nickname taken, retrying");
                self.push(Message::new("NICK", [self.nick.clone()]));
                Some(Ok(None))
            }
            Some(Response::RPL_SASLSUCCESS) => {
                self.end_registration();
                Some(Ok(None))
            }
            Some(
                Response::ERR_NICKLOCKED
                | Response::ERR_SASLFAIL
                | Response::ERR_SASLTOOLONG
                | Response::ERR_SASLABORTED
                | Response::ERR_SASLALREADY
                | Response::RPL_SASLMECHS,
            ) => {
                warn!(code = %msg.command, "SASL authentication failed");
                self.end_registration();
                Some(Ok(Some(Event::Error(ErrorEvent {
                    severity: Severity::Fail,
                    code: msg.command.clone(),
                    message: trailing_text(msg),
                }))))
            }
            _ if msg.command == "AUTHENTICATE" => Some(self.handle_authenticate(msg).map(|()| None)),
            _ => None,
        }
    }

    fn handle_authenticate(&mut self, msg: &Message) -> Result<(), SessionError> {
        let [payload] = params::<1>(msg)?;
        let Some(auth) = self.auth.as_mut() else {
            debug!("AUTHENTICATE without an authenticator");
            return Ok(());
        };

        // Challenges longer than a chunk arrive in pieces.
        if payload.len() == SASL_CHUNK_SIZE {
            self.sasl_buffer.push_str(payload);
            return Ok(());
        }
        let challenge = if self.sasl_buffer.is_empty() {
            payload.to_owned()
        } else {
            let mut buf = std::mem::take(&mut self.sasl_buffer);
            if payload != "+" {
                buf.push_str(payload);
            }
            buf
        };

        let response = sasl::decode_challenge(&challenge).and_then(|c| auth.respond(&c));
        match response {
            Ok(response) => {
                for chunk in sasl::encode_response(&response) {
                    self.push(Message::new("AUTHENTICATE", [chunk]));
                }
            }
            Err(e) => {
                warn!(error = %e, "aborting SASL authentication");
                self.push(Message::new("AUTHENTICATE", ["*"]));
            }
        }
        Ok(())
    }

    pub(super) fn handle_cap(&mut self, msg: &Message) -> Result<Option<Event>, SessionError> {
        let [_, subcommand] = params::<2>(msg)?;
        let list = |i: usize| msg.param(i).unwrap_or("");

        match subcommand.to_ascii_uppercase().as_str() {
            "LS" => {
                if list(2) == "*" {
                    let names = self.caps.add_available(list(3));
                    self.ls_names.extend(names);
                    return Ok(None);
                }
                let names = self.caps.add_available(list(2));
                self.ls_names.extend(names);
                self.ls_complete = true;
                let names = std::mem::take(&mut self.ls_names);
                self.request_caps(&names);

                if self.auth.is_some() && !self.caps.is_available("sasl") {
                    warn!("server does not support SASL");
                    self.end_registration();
                }
            }
            "NEW" => {
                let names = self.caps.add_available(list(2));
                self.request_caps(&names);
            }
            "ACK" => {
                for (name, enabled) in self.caps.acknowledge(list(2)) {
                    self.on_cap_changed(&name, enabled);
                }
            }
            "NAK" => {
                debug!(caps = list(2), "capabilities rejected");
                // Without sasl nothing would ever end registration.
                if self.auth.is_some()
                    && !self.cap_ended
                    && list(2).split_whitespace().any(|c| c == "sasl")
                {
                    self.end_registration();
                }
            }
            "DEL" => {
                for name in list(2).split_whitespace() {
                    if name == "labeled-response" {
                        self.labeled_response = false;
                    }
                }
                self.caps.remove(list(2));
            }
            other => debug!(subcommand = other, "ignoring CAP subcommand"),
        }
        Ok(None)
    }

    fn request_caps(&mut self, names: &[String]) {
        let skip_immediate = self.net_id.is_empty();
        let wanted: Vec<&str> = self
            .caps
            .wanted(names, skip_immediate)
            .into_iter()
            .filter(|name| *name != "sasl" || self.auth.is_some())
            .collect();
        if !wanted.is_empty() {
            self.push(Message::new("CAP", ["REQ".to_owned(), wanted.join(" ")]));
        }
    }

    fn on_cap_changed(&mut self, name: &str, enabled: bool) {
        match name {
            "sasl" if enabled && !self.sasl_started => {
                if let Some(mechanism) = self.auth.as_ref().map(|a| a.mechanism().to_owned()) {
                    self.sasl_started = true;
                    self.push(Message::new("AUTHENTICATE", [mechanism]));
                }
            }
            "multi-prefix" if enabled => {
                let names: Vec<String> = self.channels.values().map(|c| c.name.clone()).collect();
                for name in names {
                    self.push(Message::new("NAMES", [name]));
                }
            }
            "labeled-response" => self.labeled_response = enabled,
            "draft/metadata-2" if enabled => self.subscribe_metadata(),
            _ => {}
        }
    }
}

/// Text of a numeric reply, without our nickname.
pub(super) fn trailing_text(msg: &Message) -> String {
    msg.params.get(1..).map(|p| p.join(" ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sasl::SaslPlain;
    use crate::session::{SessionConfig, SessionParams};

    fn lines(session: &mut Session) -> Vec<String> {
        session
            .drain_outbound()
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    fn feed(session: &mut Session, line: &str) -> Option<Event> {
        session.handle_message(line.parse().unwrap()).unwrap()
    }

    fn immediate_reqs(out: &[String]) -> Vec<&str> {
        out.iter()
            .filter_map(|l| l.strip_prefix("CAP REQ "))
            .collect()
    }

    #[test]
    fn test_burst_without_auth() {
        let mut s = Session::new(SessionParams::new("alice", "al", "Alice A"));
        let out = lines(&mut s);
        assert_eq!(out[0], "CAP LS 302");

        let reqs = immediate_reqs(&out);
        let expected: Vec<&str> = caps::immediate_names().filter(|n| *n != "sasl").collect();
        assert_eq!(reqs, expected);
        assert!(!reqs.contains(&"draft/chathistory"));

        let rest = &out[1 + reqs.len()..];
        assert_eq!(rest[0], "NICK alice");
        assert_eq!(rest[1], "USER al 0 * :Alice A");
        assert_eq!(rest[2], "CAP END");
        assert_eq!(rest[3], "BOUNCER LISTNETWORKS");
        assert_eq!(rest[4], "METADATA * SUB soju.im/pinned soju.im/muted");
    }

    #[test]
    fn test_rejected_cap_does_not_block_others() {
        let mut s = Session::new(SessionParams::new("alice", "al", "Alice"));
        lines(&mut s);

        feed(&mut s, ":irc CAP * NAK setname");
        feed(&mut s, ":irc CAP * LS :batch server-time message-tags echo-message multi-prefix");
        // Already requested on connect.
        assert!(lines(&mut s).is_empty());

        for name in ["batch", "server-time", "message-tags", "echo-message", "multi-prefix"] {
            feed(&mut s, &format!(":irc CAP * ACK {name}"));
        }
        assert!(s.has_cap("batch"));
        assert!(s.has_cap("echo-message"));
        assert!(!s.has_cap("setname"));
        assert_eq!(s.enabled_caps().len(), 5);
    }

    #[test]
    fn test_rejected_cap_keeps_sasl_going() {
        let params = SessionConfig::default().with_auth(Box::new(SaslPlain::new("alice", "pw")));
        let mut s = Session::new(params);
        let out = lines(&mut s);
        assert!(out.iter().any(|l| l == "CAP REQ sasl"));

        feed(&mut s, ":irc CAP * NAK setname");
        feed(&mut s, ":irc CAP * ACK sasl");
        assert!(!lines(&mut s).iter().any(|l| l == "CAP END"));

        feed(&mut s, "AUTHENTICATE +");
        assert_eq!(
            lines(&mut s),
            vec![format!("AUTHENTICATE {}", sasl::encode_plain("alice", "pw"))]
        );
    }

    #[test]
    fn test_multi_prefix_ack_refreshes_names() {
        let mut s = Session::new(SessionParams::new("alice", "al", "Alice"));
        feed(&mut s, ":irc 001 alice :Welcome");
        feed(&mut s, ":alice!al@h JOIN #a");
        feed(&mut s, ":alice!al@h JOIN #b");
        lines(&mut s);

        feed(&mut s, ":irc CAP alice ACK :multi-prefix");
        let mut out = lines(&mut s);
        out.sort();
        assert_eq!(out, vec!["NAMES #a", "NAMES #b"]);
    }

    /// Reports the length of each challenge it receives.
    struct ChallengeLength;

    impl sasl::SaslClient for ChallengeLength {
        fn mechanism(&self) -> &str {
            "TEST"
        }

        fn respond(&mut self, challenge: &[u8]) -> Result<Vec<u8>, sasl::SaslError> {
            Ok(challenge.len().to_string().into_bytes())
        }
    }

    #[test]
    fn test_sasl_challenge_reassembly() {
        let params = SessionConfig::default().with_auth(Box::new(ChallengeLength));
        let mut s = Session::new(params);
        lines(&mut s);

        // 400 base64 characters decode to 300 bytes.
        let chunk = "A".repeat(SASL_CHUNK_SIZE);
        feed(&mut s, &format!("AUTHENTICATE {chunk}"));
        assert!(lines(&mut s).is_empty());
        feed(&mut s, "AUTHENTICATE +");
        assert_eq!(lines(&mut s), vec!["AUTHENTICATE MzAw"]);

        feed(&mut s, &format!("AUTHENTICATE {chunk}"));
        feed(&mut s, "AUTHENTICATE QUJD");
        assert_eq!(lines(&mut s), vec!["AUTHENTICATE MzAz"]);
    }

    #[test]
    fn test_bouncer_network_defers_caps() {
        let config = SessionConfig {
            nickname: "alice".into(),
            username: "alice/libera".into(),
            realname: "Alice".into(),
            net_id: "42".into(),
        };
        let mut s = Session::new(config.into());
        let out = lines(&mut s);
        assert_eq!(out[0], "CAP LS 302");
        assert_eq!(out[1], "NICK alice");
        assert_eq!(out[3], "BOUNCER BIND 42");
        assert_eq!(out[4], "CAP END");

        feed(&mut s, ":bnc CAP * LS :batch soju.im/bouncer-networks unknown/cap");
        assert_eq!(lines(&mut s), vec!["CAP REQ :batch soju.im/bouncer-networks"]);
    }

    #[test]
    fn test_sasl_plain_flow() {
        let config = SessionConfig {
            nickname: "alice".into(),
            username: "alice".into(),
            realname: "Alice".into(),
            net_id: String::new(),
        };
        let mut s = Session::new(config.with_auth(Box::new(SaslPlain::new("alice", "hunter2"))));
        let out = lines(&mut s);
        assert!(out.iter().any(|l| l == "CAP REQ sasl"));
        assert_eq!(out.last().unwrap(), "AUTHENTICATE PLAIN");
        assert!(!out.iter().any(|l| l == "CAP END"));

        feed(&mut s, ":irc CAP * ACK :sasl batch");
        assert!(lines(&mut s).is_empty());

        feed(&mut s, "AUTHENTICATE +");
        assert_eq!(
            lines(&mut s),
            vec![format!("AUTHENTICATE {}", sasl::encode_plain("alice", "hunter2"))]
        );

        feed(&mut s, ":irc 900 alice alice!a@h alice :You are now logged in as alice");
        assert_eq!(s.account(), Some("alice"));
        feed(&mut s, ":irc 903 alice :SASL authentication successful");
        let out = lines(&mut s);
        assert_eq!(out[0], "CAP END");

        // CAP END is sent once.
        feed(&mut s, ":irc 903 alice :again");
        assert!(!lines(&mut s).iter().any(|l| l == "CAP END"));
    }

    #[test]
    fn test_sasl_failure_ends_registration() {
        let params = SessionConfig {
            nickname: "alice".into(),
            username: "alice".into(),
            realname: "Alice".into(),
            net_id: String::new(),
        }
        .with_auth(Box::new(SaslPlain::new("alice", "wrong")));
        let mut s = Session::new(params);
        lines(&mut s);

        let ev = feed(&mut s, ":irc 904 alice :SASL authentication failed");
        match ev {
            Some(Event::Error(e)) => {
                assert_eq!(e.severity, Severity::Fail);
                assert_eq!(e.code, "904");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(lines(&mut s)[0], "CAP END");
    }

    #[test]
    fn test_sasl_abort_on_unexpected_challenge() {
        let params = SessionConfig::default().with_auth(Box::new(SaslPlain::new("a", "b")));
        let mut s = Session::new(params);
        lines(&mut s);
        feed(&mut s, "AUTHENTICATE aGVsbG8=");
        assert_eq!(lines(&mut s), vec!["AUTHENTICATE *"]);
    }

    #[test]
    fn test_nick_retry_while_unregistered() {
        let mut s = Session::new(SessionParams::new("alice", "alice", "Alice"));
        lines(&mut s);
        feed(&mut s, ":irc 433 * alice :Nickname is already in use");
        assert_eq!(lines(&mut s), vec!["NICK alice_"]);
        assert_eq!(s.nick(), "alice_");

        feed(&mut s, ":irc 001 alice_ :Welcome");
        assert_eq!(s.registration(), Registration::Registered);
        let ev = feed(&mut s, ":irc 433 alice_ bob :Nickname is already in use");
        assert!(matches!(ev, Some(Event::Error(e)) if e.severity == Severity::Fail));
        assert!(lines(&mut s).is_empty());
    }

    #[test]
    fn test_multiline_ls_and_new_del() {
        let mut s = Session::new(SessionParams::new("alice", "alice", "Alice"));
        lines(&mut s);
        feed(&mut s, ":irc CAP * LS * :batch draft/chathistory");
        assert!(lines(&mut s).is_empty());
        feed(&mut s, ":irc CAP * LS :soju.im/read sasl=PLAIN");
        assert_eq!(lines(&mut s), vec!["CAP REQ :draft/chathistory soju.im/read"]);
        assert_eq!(s.available_caps().get("sasl"), Some(&Some("PLAIN".to_owned())));

        feed(&mut s, ":irc CAP * ACK :draft/chathistory labeled-response");
        assert!(s.has_cap("draft/chathistory"));
        assert!(s.labeled_response());

        feed(&mut s, ":irc CAP * NEW :draft/read-marker");
        assert_eq!(lines(&mut s), vec!["CAP REQ draft/read-marker"]);

        feed(&mut s, ":irc CAP * DEL :draft/chathistory labeled-response");
        assert!(!s.has_cap("draft/chathistory"));
        assert!(!s.labeled_response());
        assert!(!s.available_caps().contains_key("draft/chathistory"));
    }
}
