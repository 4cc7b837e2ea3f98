use std::fmt::{self, Display, Formatter};

use super::tags::escape_tag_value;
use super::types::Message;

impl Display for Message {
    /// Serialize without the `\r\n` terminator; the line codec adds it.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(tags) = self.tags.as_ref().filter(|t| !t.is_empty()) {
            write!(f, "@")?;

            for (i, tag) in tags.iter().enumerate() {
                if i > 0 {
                    write!(f, ";")?;
                }

                write!(f, "{}", tag.0)?;

                if let Some(ref value) = tag.1 {
                    write!(f, "=")?;
                    escape_tag_value(f, value)?;
                }
            }

            write!(f, " ")?;
        }

        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        write!(f, "{}", self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", param)?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::message::Message;
    use crate::prefix::Prefix;

    #[test]
    fn test_trailing_colon_rule() {
        assert_eq!(Message::new("NICK", ["alice"]).to_string(), "NICK alice");
        assert_eq!(
            Message::new("PRIVMSG", ["#c", "two words"]).to_string(),
            "PRIVMSG #c :two words"
        );
        assert_eq!(
            Message::new("PRIVMSG", ["#c", ":)"]).to_string(),
            "PRIVMSG #c ::)"
        );
        assert_eq!(Message::new("AWAY", [""]).to_string(), "AWAY :");
        assert_eq!(Message::new("CAP", Vec::<String>::new()).to_string(), "CAP");
    }

    #[test]
    fn test_tags_and_prefix() {
        let msg = Message::new("TAGMSG", ["#c"])
            .with_tag("+typing", Some("active"))
            .with_tag("flag", None::<String>)
            .with_tag("esc", Some("a b;c"))
            .with_prefix(Prefix::new("n", "u", "h"));
        assert_eq!(
            msg.to_string(),
            "@+typing=active;flag;esc=a\\sb\\:c :n!u@h TAGMSG #c"
        );
    }
}
