use std::fmt;

use super::types::Prefix;

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.name[..], &self.user[..], &self.host[..]) {
            (name, "", "") => write!(f, "{}", name),
            (name, user, "") => write!(f, "{}!{}", name, user),
            (name, "", host) => write!(f, "{}@{}", name, host),
            (name, user, host) => write!(f, "{}!{}@{}", name, user, host),
        }
    }
}
