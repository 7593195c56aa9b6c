//! Slash commands typed into the composer.

/// A parsed slash command from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Upload a text file, path given as the argument
    Upload(Option<String>),
    /// Exit the application
    Quit,
    /// Show help overlay
    Help,
    /// Discard what is in the composer
    ClearInput,
    /// Unknown command
    Unknown(String),
}

/// Command metadata for the help overlay.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Usage, including the leading /
    pub usage: &'static str,
    /// Brief description
    pub description: &'static str,
}

/// Every recognized command.
pub static COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        usage: "/upload <path>",
        description: "Upload a .txt file",
    },
    CommandInfo {
        usage: "/clear-input",
        description: "Clear the composer",
    },
    CommandInfo {
        usage: "/help",
        description: "Show this help",
    },
    CommandInfo {
        usage: "/quit",
        description: "Exit bubble",
    },
];

/// Parse a slash command from user input.
///
/// Returns `None` when the input is not a command, in which case it is sent
/// as a chat message. Returns `Command::Unknown` for an unrecognized name.
///
/// ```
/// use bubble_tui::commands::{parse_command, Command};
///
/// assert_eq!(parse_command("/quit"), Some(Command::Quit));
/// assert_eq!(
///     parse_command("/upload notes.txt"),
///     Some(Command::Upload(Some("notes.txt".into())))
/// );
/// assert_eq!(parse_command("hello"), None);
/// ```
pub fn parse_command(input: &str) -> Option<Command> {
    let content = input.trim().strip_prefix('/')?;

    // "/" alone, or "/ text", is an ordinary message
    if content.is_empty() || content.starts_with(char::is_whitespace) {
        return None;
    }

    let (name, args) = match content.find(char::is_whitespace) {
        Some(idx) => {
            let (name, rest) = content.split_at(idx);
            let rest = rest.trim();
            (name.to_lowercase(), (!rest.is_empty()).then(|| rest.to_string()))
        }
        None => (content.to_lowercase(), None),
    };

    Some(match name.as_str() {
        "upload" | "u" => Command::Upload(args),
        "quit" | "q" | "exit" => Command::Quit,
        "help" | "?" => Command::Help,
        "clear-input" | "clear" => Command::ClearInput,
        other => Command::Unknown(other.to_string()),
    })
}
