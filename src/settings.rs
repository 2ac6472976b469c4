use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;

// ── Policies ─────────────────────────────────────────────────────

/// When the registry is rebuilt from the live owner set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchPolicy {
    /// After the host reports a world/scene change.
    pub on_world_change: bool,
    /// Each time the console opens.
    pub on_open: bool,
    /// Before every submitted line.
    pub before_each_command: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            on_world_change: true,
            on_open: false,
            before_each_command: false,
        }
    }
}

/// Which segments label a binding in value reports, joined with `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameDisplay {
    pub owner: bool,
    pub class: bool,
    pub member: bool,
}

impl Default for NameDisplay {
    fn default() -> Self {
        Self {
            owner: true,
            class: false,
            member: true,
        }
    }
}

impl NameDisplay {
    /// `owner` is `None` for global bindings. Falls back to `fallback` when
    /// every segment is switched off.
    pub fn label(&self, owner: Option<&str>, class: &str, member: &str, fallback: &str) -> String {
        let mut parts = Vec::new();
        if self.owner {
            parts.extend(owner);
        }
        if self.class {
            parts.push(class);
        }
        if self.member {
            parts.push(member);
        }
        if parts.is_empty() {
            fallback.to_string()
        } else {
            parts.join(".")
        }
    }
}

// ── Console settings ─────────────────────────────────────────────

const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub fetch: FetchPolicy,
    pub name_display: NameDisplay,
    /// Echo each submitted line before it runs.
    pub echo_input: bool,
    /// 0 keeps everything.
    pub history_limit: usize,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            fetch: FetchPolicy::default(),
            name_display: NameDisplay::default(),
            echo_input: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Load settings from the config directory. Returns None if no settings file
/// exists or it cannot be parsed.
pub fn load_settings(config_dir: &Path) -> Option<ConsoleSettings> {
    let path = crate::paths::settings_path(config_dir);
    if !path.exists() {
        return None;
    }
    match read_json(&path) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            None
        }
    }
}

/// Save settings to the config directory, replacing the file atomically.
pub fn save_settings(config_dir: &Path, settings: &ConsoleSettings) -> Result<(), ConsoleError> {
    fs::create_dir_all(config_dir)?;
    let path = crate::paths::settings_path(config_dir);
    let json = serde_json::to_string_pretty(settings)?;

    let tmp_path = crate::paths::temp_path(&path);
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp_path, &path)?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConsoleError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
