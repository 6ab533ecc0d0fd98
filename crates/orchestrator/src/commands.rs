//! Operator commands typed after the prefix.

/// Help text shown for the `help` command.
pub const HELP_TEXT: &str = r#"Hi! Mention me or start a message with the prefix and I'll answer.

Commands:
• forget - Clear this channel's conversation memory
• summary <text> - Set a summary of this channel for me to keep in mind
• summary - Show the current summary
• help - Show this message

Ask me about current events and I'll look things up on the web first. I might answer with a GIF now and then."#;

/// A recognised operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drop the channel's turns and summary.
    Forget,
    /// Set the summary, or show it when `None`.
    Summary(Option<String>),
    /// Show help.
    Help,
}

impl Command {
    /// Parse the text that followed the prefix.
    ///
    /// Only the first word is a command name; anything else is a normal turn.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (name, rest) = match text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (text, ""),
        };

        match name.to_lowercase().as_str() {
            "forget" | "reset" if rest.is_empty() => Some(Self::Forget),
            "help" if rest.is_empty() => Some(Self::Help),
            "summary" if rest.is_empty() => Some(Self::Summary(None)),
            "summary" => Some(Self::Summary(Some(rest.to_string()))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("forget"), Some(Command::Forget));
        assert_eq!(Command::parse(" RESET "), Some(Command::Forget));
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("summary"), Some(Command::Summary(None)));
        assert_eq!(
            Command::parse("summary We are planning a trip to Lisbon."),
            Some(Command::Summary(Some("We are planning a trip to Lisbon.".to_string())))
        );
    }

    #[test]
    fn test_ordinary_text_is_not_a_command() {
        assert_eq!(Command::parse("help me with my homework"), None);
        assert_eq!(Command::parse("forget about it, what's the weather"), None);
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse(""), None);
    }
}
