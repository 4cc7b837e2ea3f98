//! IRCv3 batch types the session tracks.

/// Kind of a server-side batch, from the type parameter of `BATCH +id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchKind {
    /// `chathistory <target>`: history playback for one target.
    ChatHistory,
    /// `draft/chathistory-targets`: listing of targets with activity.
    ChatHistoryTargets,
    /// `soju.im/search`: search results.
    Search,
    /// Any other batch type; its messages are dispatched live.
    Other(String),
}

impl BatchKind {
    /// Parse the batch type token.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "chathistory" => Self::ChatHistory,
            "draft/chathistory-targets" => Self::ChatHistoryTargets,
            "soju.im/search" => Self::Search,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(BatchKind::parse("chathistory"), BatchKind::ChatHistory);
        assert_eq!(
            BatchKind::parse("draft/chathistory-targets"),
            BatchKind::ChatHistoryTargets
        );
        assert_eq!(BatchKind::parse("soju.im/search"), BatchKind::Search);
        assert_eq!(
            BatchKind::parse("netsplit"),
            BatchKind::Other("netsplit".into())
        );
    }
}
