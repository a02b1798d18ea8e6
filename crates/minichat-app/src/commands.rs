//! Parsing of input lines into submissions and slash commands.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the bot.
    Submit(String),
    /// Clear the history (after confirmation).
    Clear,
    /// Toggle remote mode.
    Remote(bool),
    /// Store a credential.
    SetKey(String),
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  /clear          clear the chat history
  /ai on|off      route replies through the remote model
  /key <api-key>  store the API key
  /help           show this help
  /quit           exit";

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Submit(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name.to_lowercase().as_str(), arg) {
            ("clear", "") => Command::Clear,
            ("ai", "on") => Command::Remote(true),
            ("ai", "off") => Command::Remote(false),
            ("key", key) if !key.is_empty() => Command::SetKey(key.to_string()),
            ("help", _) => Command::Help,
            ("quit", _) | ("exit", _) => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

/// Whether a confirmation answer means yes.
pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_submitted_verbatim() {
        assert_eq!(
            Command::parse("  hello there "),
            Command::Submit("  hello there ".to_string())
        );
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(Command::parse("/clear"), Command::Clear);
        assert_eq!(Command::parse("/ai on"), Command::Remote(true));
        assert_eq!(Command::parse("/AI off"), Command::Remote(false));
        assert_eq!(
            Command::parse("/key  sk-123 "),
            Command::SetKey("sk-123".to_string())
        );
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/help"), Command::Help);
    }

    #[test]
    fn test_malformed_commands() {
        assert!(matches!(Command::parse("/key"), Command::Unknown(_)));
        assert!(matches!(Command::parse("/ai maybe"), Command::Unknown(_)));
        assert!(matches!(Command::parse("/nope"), Command::Unknown(_)));
    }

    #[test]
    fn test_confirmation() {
        assert!(is_confirmed("y"));
        assert!(is_confirmed(" YES "));
        assert!(!is_confirmed(""));
        assert!(!is_confirmed("n"));
    }
}
