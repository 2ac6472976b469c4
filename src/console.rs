//! The console front door: owns the registry, dispatcher, history and
//! suggestions, and decides when the registry is rebuilt.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::dispatcher::{DispatchReport, Dispatcher, OptionsFormatter};
use crate::events::ConsoleEvent;
use crate::history::History;
use crate::model::{Outcome, ValueType};
use crate::options::LogFn;
use crate::registry::{Candidate, Catalog, CatalogHandle, Registry, Signature};
use crate::settings::ConsoleSettings;
use crate::suggestion::Suggestions;

/// Enumerates live owners, in the order that decides first-match ties.
pub trait OwnerSource {
    fn candidates(&self) -> Vec<Candidate>;
}

impl<F> OwnerSource for F
where
    F: Fn() -> Vec<Candidate>,
{
    fn candidates(&self) -> Vec<Candidate> {
        self()
    }
}

pub type Observer = Box<dyn FnMut(&ConsoleEvent)>;

pub struct Console {
    registry: Registry,
    dispatcher: Dispatcher,
    owners: Box<dyn OwnerSource>,
    settings: ConsoleSettings,
    history: Arc<RwLock<History>>,
    suggestions: Suggestions,
    observers: Vec<Observer>,
    open: bool,
}

impl Console {
    /// Registers the built-in commands and performs the first rescan.
    pub fn new<S>(settings: ConsoleSettings, owners: S) -> Self
    where
        S: OwnerSource + 'static,
    {
        let mut registry = Registry::new();
        let history = Arc::new(RwLock::new(History::new(settings.history_limit)));
        register_builtins(&mut registry, &history);

        let mut console = Self {
            registry,
            dispatcher: Dispatcher::new(settings.name_display),
            owners: Box::new(owners),
            settings,
            history,
            suggestions: Suggestions::new(),
            observers: Vec::new(),
            open: false,
        };
        console.rescan();
        console
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// For registering global commands after construction.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn catalog(&self) -> CatalogHandle {
        self.registry.catalog()
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn apply_settings(&mut self, settings: ConsoleSettings) {
        self.dispatcher.set_name_display(settings.name_display);
        self.history.write().set_limit(settings.history_limit);
        self.settings = settings;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn has_session(&self) -> bool {
        self.dispatcher.has_session()
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&ConsoleEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn set_options_formatter(&mut self, formatter: Option<OptionsFormatter>) {
        self.dispatcher.set_options_formatter(formatter);
    }

    fn emit(&mut self, event: &ConsoleEvent) {
        tracing::trace!(event = event.event_name(), "emit");
        for observer in &mut self.observers {
            observer(event);
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Rebuild owner-scoped bindings from the owner source.
    pub fn rescan(&mut self) {
        let owners = self.owners.candidates();
        self.registry.rescan(&owners);
    }

    /// The host's world or scene changed.
    pub fn world_changed(&mut self) {
        if self.settings.fetch.on_world_change {
            self.rescan();
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.set_open(!self.open);
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
        if open && self.settings.fetch.on_open {
            self.rescan();
        }
        self.emit(&ConsoleEvent::Toggled { open });
    }

    // ── Input ────────────────────────────────────────────────────

    /// Run one line. Blank lines are ignored and return `None`.
    pub fn submit(&mut self, line: &str, log: &mut LogFn<'_>) -> Option<DispatchReport> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        if self.settings.echo_input {
            log(line, true);
        }
        self.history.write().add(line);
        self.suggestions.clear();

        if self.settings.fetch.before_each_command {
            self.rescan();
        }
        let report = self.dispatcher.dispatch(&self.registry, line, log);
        if report.rescan_required {
            tracing::debug!(command = %report.name, "rescanning after a stale owner");
            self.rescan();
        }

        self.emit(&ConsoleEvent::CommandExecuted {
            name: report.name.clone(),
        });
        self.emit(&ConsoleEvent::CommandExecutedWithParameters {
            name: report.name.clone(),
            args: report.args.clone(),
        });
        Some(report)
    }

    /// Refresh suggestions for the typed input and return the current one.
    pub fn complete(&mut self, input: &str) -> Option<String> {
        let catalog = self.registry.catalog();
        let names = catalog.read().names();
        self.suggestions.update(input, names.iter().map(String::as_str));
        self.suggestions.completion().map(str::to_string)
    }

    pub fn ghost_suffix(&self) -> Option<&str> {
        self.suggestions.ghost_suffix()
    }

    pub fn next_suggestion(&mut self) -> Option<String> {
        self.suggestions.next().map(str::to_string)
    }

    pub fn previous_suggestion(&mut self) -> Option<String> {
        self.suggestions.previous().map(str::to_string)
    }

    pub fn history_previous(&mut self) -> Option<String> {
        self.history.write().previous().map(str::to_string)
    }

    pub fn history_next(&mut self) -> Option<String> {
        self.history.write().next().map(str::to_string)
    }

    pub fn history(&self) -> Vec<String> {
        self.history.read().entries().map(str::to_string).collect()
    }
}

/// `Help [topic]` and `ClearHistory`.
fn register_builtins(registry: &mut Registry, history: &Arc<RwLock<History>>) {
    let catalog = registry.catalog();
    registry.register_global_state("Console", catalog.shared(), |decl| {
        decl.method(
            "Help",
            Signature::new().param("topic", ValueType::Str),
            |catalog: &mut Catalog, args| Ok(Outcome::Message(catalog.help_text(args.str(0)))),
        )
        .describe("List commands, or describe one")
        .unlisted();
    });
    registry.register_global_state("Console", Arc::clone(history), |decl| {
        decl.method("ClearHistory", Signature::new(), |history: &mut History, _| {
            history.clear();
            Ok(())
        })
        .describe("Forget previously submitted lines");
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::demo::DemoWorld;
    use crate::settings::FetchPolicy;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn demo_console(settings: ConsoleSettings) -> (DemoWorld, Console) {
        let world = DemoWorld::new();
        let console = world.console(settings);
        (world, console)
    }

    fn submit(console: &mut Console, line: &str) -> Vec<(String, bool)> {
        let mut logs = Vec::new();
        console.submit(line, &mut |m: &str, echo: bool| logs.push((m.to_string(), echo)));
        logs
    }

    #[test]
    fn set_speed_echoes_once_then_reads_back() {
        let (world, mut console) = demo_console(ConsoleSettings::default());
        let logs = submit(&mut console, "SetSpeed 7.5");
        assert_eq!(logs, vec![("SetSpeed 7.5".to_string(), true)]);
        assert!((world.player.read().speed - 7.5).abs() < f32::EPSILON);

        let logs = submit(&mut console, "SetSpeed");
        assert_eq!(logs.len(), 2);
        assert!(logs[1].0.contains("7.5"));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let (_world, mut console) = demo_console(ConsoleSettings::default());
        let mut called = false;
        let report = console.submit("  \n", &mut |_, _| called = true);
        assert!(report.is_none());
        assert!(!called);
        assert!(console.history().is_empty());
    }

    #[test]
    fn events_fire_once_per_line() {
        let (_world, mut console) = demo_console(ConsoleSettings::default());
        let seen: Rc<RefCell<Vec<ConsoleEvent>>> = Rc::default();
        let sink = Rc::clone(&seen);
        console.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        submit(&mut console, "Damage 5");
        submit(&mut console, "NoSuchCommand x");
        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(
            seen[3],
            ConsoleEvent::CommandExecutedWithParameters {
                name: "NoSuchCommand".into(),
                args: vec!["x".into()],
            }
        );
    }

    #[test]
    fn toggle_emits_and_optionally_rescans() {
        let settings = ConsoleSettings {
            fetch: FetchPolicy {
                on_open: true,
                ..FetchPolicy::default()
            },
            ..ConsoleSettings::default()
        };
        let (world, mut console) = demo_console(settings);
        let seen: Rc<RefCell<Vec<ConsoleEvent>>> = Rc::default();
        let sink = Rc::clone(&seen);
        console.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        world.spawn_enemy("Troll");
        assert!(console.toggle());
        assert_eq!(seen.borrow()[0], ConsoleEvent::Toggled { open: true });
        submit(&mut console, "Damage 1");
        assert_eq!(world.enemy("Troll").unwrap().read().health, 99);
        assert!(!console.toggle());
    }

    #[test]
    fn world_change_picks_up_new_owners() {
        let (world, mut console) = demo_console(ConsoleSettings::default());
        world.spawn_enemy("Troll");
        submit(&mut console, "Damage 1");
        assert_eq!(world.enemy("Troll").unwrap().read().health, 100);
        console.world_changed();
        submit(&mut console, "Damage 1");
        assert_eq!(world.enemy("Troll").unwrap().read().health, 99);
    }

    #[test]
    fn stale_owner_forces_rescan() {
        let (world, mut console) = demo_console(ConsoleSettings::default());
        submit(&mut console, "KillAllEnemies");
        assert_eq!(console.registry().owner_count(), 3);
        // Bindings to the dead enemies are found stale on the next line.
        submit(&mut console, "Damage 1");
        assert_eq!(console.registry().owner_count(), 1);
        assert!(world.enemies.read().is_empty());
    }

    #[test]
    fn before_each_command_rescans_first() {
        let settings = ConsoleSettings {
            fetch: FetchPolicy {
                before_each_command: true,
                ..FetchPolicy::default()
            },
            ..ConsoleSettings::default()
        };
        let (world, mut console) = demo_console(settings);
        world.spawn_enemy("Troll");
        submit(&mut console, "Damage 1");
        assert_eq!(world.enemy("Troll").unwrap().read().health, 99);
    }

    #[test]
    fn help_lists_and_describes() {
        let (_world, mut console) = demo_console(ConsoleSettings::default());
        let logs = submit(&mut console, "help SetPlayerGold");
        assert_eq!(logs[1].0, "SetPlayerGold playerName gold: Give a player gold");
        let logs = submit(&mut console, "Help");
        assert!(logs.iter().any(|(l, _)| l.starts_with("ClearHistory")));
        assert!(!logs.iter().skip(1).any(|(l, _)| l.starts_with("Help")));
        let logs = submit(&mut console, "Help Teleport");
        assert_eq!(logs[1].0, "Unknown command: \"Teleport\"");
    }

    #[test]
    fn history_records_and_clears() {
        let (_world, mut console) = demo_console(ConsoleSettings::default());
        submit(&mut console, "SetSpeed 2");
        submit(&mut console, "SetDead true");
        assert_eq!(console.history_previous().as_deref(), Some("SetDead true"));
        assert_eq!(console.history_previous().as_deref(), Some("SetSpeed 2"));
        submit(&mut console, "ClearHistory");
        assert!(console.history().is_empty());
    }

    #[test]
    fn completion_cycles_listed_names() {
        let (_world, mut console) = demo_console(ConsoleSettings::default());
        assert_eq!(console.complete("setsp").as_deref(), Some("SetSpeed"));
        assert_eq!(console.ghost_suffix(), Some("eed"));
        assert!(console.complete("Help").is_none());
        let first = console.complete("SetPosition").unwrap();
        let second = console.next_suggestion().unwrap();
        assert_ne!(first, second);
        assert_eq!(console.previous_suggestion().unwrap(), first);
    }

    #[test]
    fn option_policy_menu_selects_one_owner() {
        let (world, mut console) = demo_console(ConsoleSettings {
            echo_input: false,
            ..ConsoleSettings::default()
        });
        let logs = submit(&mut console, "SetPosition 1,2,3");
        assert_eq!(logs, vec![("Options: Player[0] Goblin[1] Orc[2]".to_string(), false)]);
        assert!(console.has_session());

        submit(&mut console, "orc");
        let orc = world.enemy("Orc").unwrap();
        assert_eq!(orc.read().position, crate::model::Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(world.player.read().position, crate::model::Vec3::default());
    }

    #[test]
    fn language_menu_round_trip() {
        let (world, mut console) = demo_console(ConsoleSettings {
            echo_input: false,
            ..ConsoleSettings::default()
        });
        let logs = submit(&mut console, "SetLanguage");
        assert_eq!(logs[0].0, "Options: English[0] French[1] Spanish[2]");
        submit(&mut console, "1");
        assert_eq!(world.game.read().language, "French");
        let logs = submit(&mut console, "1");
        assert!(logs.is_empty());
    }
}
