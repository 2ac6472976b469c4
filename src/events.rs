//! Lifecycle notifications the console emits to observers.

use serde::Serialize;

pub const CONSOLE_TOGGLED: &str = "console:toggled";
pub const COMMAND_EXECUTED: &str = "command:executed";
pub const COMMAND_EXECUTED_WITH_PARAMETERS: &str = "command:executed_with_parameters";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum ConsoleEvent {
    /// `true` when the console opened.
    Toggled { open: bool },
    /// Once per submitted line, whatever matched.
    CommandExecuted { name: String },
    CommandExecutedWithParameters { name: String, args: Vec<String> },
}

impl ConsoleEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            ConsoleEvent::Toggled { .. } => CONSOLE_TOGGLED,
            ConsoleEvent::CommandExecuted { .. } => COMMAND_EXECUTED,
            ConsoleEvent::CommandExecutedWithParameters { .. } => COMMAND_EXECUTED_WITH_PARAMETERS,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_distinct() {
        let names = [CONSOLE_TOGGLED, COMMAND_EXECUTED, COMMAND_EXECUTED_WITH_PARAMETERS];
        for (i, a) in names.iter().enumerate() {
            for b in names.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn serializes_with_event_tag() {
        let event = ConsoleEvent::CommandExecutedWithParameters {
            name: "SetSpeed".into(),
            args: vec!["7.5".into()],
        };
        assert_eq!(event.event_name(), COMMAND_EXECUTED_WITH_PARAMETERS);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "CommandExecutedWithParameters");
        assert_eq!(json["payload"]["args"][0], "7.5");
    }
}
