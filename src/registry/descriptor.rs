use serde::{Deserialize, Serialize};

// ── Command metadata ────────────────────────────────────────────

/// Which kind of member a command is bound to. Each kind has its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Field,
    Property,
    Method,
}

impl CommandKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Property => "property",
            Self::Method => "method",
        }
    }

    /// Dispatch order: fields, then properties, then methods.
    pub fn all() -> &'static [CommandKind] {
        &[Self::Field, Self::Property, Self::Method]
    }
}

/// How many matching owner-scoped bindings run for one submitted line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPolicy {
    /// Only the first owner in registration order responds.
    #[default]
    FirstMatch,
    /// Every owner responds.
    All,
    /// The operator picks an owner from a menu.
    Option,
}

impl ExecutionPolicy {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first_match",
            Self::All => "all",
            Self::Option => "option",
        }
    }
}

/// The immutable shape of one declared command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    /// Canonical name, whitespace-free, original casing.
    pub name: String,
    pub description: String,
    pub listed: bool,
    pub policy: ExecutionPolicy,
    pub kind: CommandKind,
    /// Parameter names, for help output. Empty for fields and properties.
    pub params: Vec<String>,
}

impl CommandDescriptor {
    /// Lower-cased lookup key.
    pub fn key(&self) -> String {
        command_key(&self.name)
    }
}

/// Strip all whitespace from a declared command name, falling back to the
/// member's own name when nothing is left.
pub fn normalize_name(declared: &str, member: &str) -> String {
    let stripped: String = declared.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        member.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        stripped
    }
}

/// Lookup key for a command name.
pub fn command_key(name: &str) -> String {
    name.to_lowercase()
}
