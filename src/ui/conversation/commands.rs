use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Clear the conversation and start over
    Clear,
    /// Re-probe the chat service
    Status,
    /// Show help
    Help,
    /// Exit the application
    Bye,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Clear => "clear the conversation and start over",
            SlashCommand::Status => "re-check the connection to the chat service",
            SlashCommand::Help => "show available commands",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Return all built-in commands paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter().map(|c| (c.command(), c)).collect()
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].split_whitespace();
    let head = parts.next()?;
    let rest: Vec<String> = parts.map(|s| s.to_string()).collect();

    let command = SlashCommand::from_str(head)
        .ok()
        .or_else(|| match head.to_lowercase().as_str() {
            "q" | "quit" | "exit" => Some(SlashCommand::Bye),
            "reset" | "new" => Some(SlashCommand::Clear),
            "health" | "reconnect" => Some(SlashCommand::Status),
            "h" => Some(SlashCommand::Help),
            _ => None,
        })?;

    let argument = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// One-line help summary shown above the composer.
pub fn get_help_text() -> String {
    let entries: Vec<String> = built_in_slash_commands()
        .iter()
        .map(|(keyword, command)| format!("/{} — {}", keyword, command.description()))
        .collect();
    entries.join("  ·  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        let parsed = parse_slash_command("/clear").expect("parses");
        assert_eq!(parsed.command, SlashCommand::Clear);
        assert!(parsed.argument.is_none());
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(
            parse_slash_command("/q").map(|c| c.command),
            Some(SlashCommand::Bye)
        );
        assert_eq!(
            parse_slash_command("/reset").map(|c| c.command),
            Some(SlashCommand::Clear)
        );
        assert_eq!(
            parse_slash_command("/health").map(|c| c.command),
            Some(SlashCommand::Status)
        );
    }

    #[test]
    fn keeps_trailing_text_as_the_argument() {
        let parsed = parse_slash_command("/help me please").expect("parses");
        assert_eq!(parsed.command, SlashCommand::Help);
        assert_eq!(parsed.argument.as_deref(), Some("me please"));
    }

    #[test]
    fn plain_messages_are_not_commands() {
        assert!(parse_slash_command("hello there").is_none());
        assert!(parse_slash_command("").is_none());
        assert!(parse_slash_command("/unknowncmd").is_none());
    }
}
