use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Show key bindings
    Help,
    /// Exit the application
    Quit,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Help => "show key bindings",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input.
///
/// Unknown commands are not commands: `/3pt` is sent as a normal query.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let head = input.strip_prefix('/')?.split_whitespace().next()?;

    SlashCommand::from_str(head).ok().or_else(|| match head.to_lowercase().as_str() {
        "q" | "exit" | "bye" => Some(SlashCommand::Quit),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })
}

/// One-line help shown in the status bar
pub fn get_help_text() -> String {
    let commands: Vec<String> = SlashCommand::iter()
        .map(|c| format!("/{} {}", c.command(), c.description()))
        .collect();

    format!(
        "Enter send · PgUp/PgDn scroll · Esc quit · {}",
        commands.join(" · ")
    )
}
