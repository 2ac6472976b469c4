use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::Value;

use super::descriptor::{command_key, CommandDescriptor};

/// Listed commands in catalog order: fields, then properties, then methods,
/// global before owner-scoped within each.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    descriptors: Vec<CommandDescriptor>,
}

impl Catalog {
    pub fn descriptors(&self) -> &[CommandDescriptor] {
        &self.descriptors
    }

    /// Distinct names, first spelling wins.
    pub fn names(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.descriptors
            .iter()
            .filter(|d| seen.insert(d.key()))
            .map(|d| d.name.clone())
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&CommandDescriptor> {
        let key = command_key(name);
        self.descriptors.iter().find(|d| d.key() == key)
    }

    /// No topic lists every command, one per line. A topic shows that command.
    pub fn help_text(&self, topic: Option<&str>) -> String {
        match topic {
            None => self
                .descriptors
                .iter()
                .map(help_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Some(topic) => {
                let matches: Vec<String> = self
                    .descriptors
                    .iter()
                    .filter(|d| d.key() == command_key(topic))
                    .map(help_line)
                    .collect();
                if matches.is_empty() {
                    format!("Unknown command: \"{topic}\"")
                } else {
                    matches.join("\n")
                }
            }
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "commands": self.descriptors.iter().map(|d| serde_json::json!({
                "name": d.name,
                "description": d.description,
                "kind": d.kind.slug(),
                "policy": d.policy.slug(),
                "params": d.params,
            })).collect::<Vec<_>>()
        })
    }
}

/// `Name param1 param2: description`
pub fn help_line(descriptor: &CommandDescriptor) -> String {
    let mut line = descriptor.name.clone();
    for param in &descriptor.params {
        line.push(' ');
        line.push_str(param);
    }
    if !descriptor.description.is_empty() {
        line.push_str(": ");
        line.push_str(&descriptor.description);
    }
    line
}

/// Shared handle to the registry's catalog. Cloning shares the same catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Catalog>>,
}

impl CatalogHandle {
    pub fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.inner.read()
    }

    /// The underlying lock, for binding commands against the catalog.
    pub fn shared(&self) -> Arc<RwLock<Catalog>> {
        Arc::clone(&self.inner)
    }

    pub(crate) fn replace(&self, descriptors: Vec<CommandDescriptor>) {
        self.inner.write().descriptors = descriptors;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::registry::descriptor::{CommandKind, ExecutionPolicy};

    fn descriptor(name: &str, params: &[&str], description: &str) -> CommandDescriptor {
        CommandDescriptor {
            name: name.into(),
            description: description.into(),
            listed: true,
            policy: ExecutionPolicy::FirstMatch,
            kind: CommandKind::Method,
            params: params.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    fn sample() -> CatalogHandle {
        let handle = CatalogHandle::default();
        handle.replace(vec![
            descriptor("SetPlayerGold", &["playerName", "gold"], "Give gold"),
            descriptor("KillAllEnemies", &[], ""),
        ]);
        handle
    }

    #[test]
    fn help_lists_every_command() {
        let text = sample().read().help_text(None);
        assert_eq!(text, "SetPlayerGold playerName gold: Give gold\nKillAllEnemies");
    }

    #[test]
    fn help_topic_is_case_insensitive() {
        let catalog = sample();
        assert_eq!(
            catalog.read().help_text(Some("setplayergold")),
            "SetPlayerGold playerName gold: Give gold"
        );
        assert_eq!(catalog.read().help_text(Some("fly")), "Unknown command: \"fly\"");
    }

    #[test]
    fn clones_share_updates() {
        let a = CatalogHandle::default();
        let b = a.clone();
        a.replace(vec![descriptor("Noclip", &[], "")]);
        assert_eq!(b.read().names(), vec!["Noclip"]);
        assert!(b.read().find("NOCLIP").is_some());
    }

    #[test]
    fn json_lists_kind_and_policy() {
        let json = sample().read().to_json();
        assert_eq!(json["commands"][0]["kind"], "method");
        assert_eq!(json["commands"][0]["policy"], "first_match");
        assert_eq!(json["commands"][0]["params"][1], "gold");
    }
}
