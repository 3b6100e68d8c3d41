use crate::adapters::settings::SettingsStore;
use crate::domain::model::SortMode;
use crate::utils::error::Result;

pub const HELP: &str = "commands: toggle | popular | top_rated | refresh | help | quit";

/// A line typed at the list screen prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle,
    SetSort(SortMode),
    Refresh,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let input = line.trim().to_ascii_lowercase();
        match input.as_str() {
            "" => Command::Empty,
            "t" | "toggle" | "settings" => Command::Toggle,
            "r" | "refresh" => Command::Refresh,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => match SortMode::from_segment(other) {
                Some(sort) => Command::SetSort(sort),
                None => Command::Unknown(input),
            },
        }
    }
}

/// Writes the sort preference the way the settings screen would. The list
/// screen picks the change up through its subscription.
pub fn apply_sort_command(settings: &SettingsStore, command: &Command) -> Result<Option<SortMode>> {
    let sort = match command {
        Command::Toggle => settings.sort_mode().toggled(),
        Command::SetSort(sort) => *sort,
        _ => return Ok(None),
    };

    settings.set_sort_mode(sort)?;
    Ok(Some(sort))
}
