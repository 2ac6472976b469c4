//! Command registry: three tables (fields, properties, methods), each split
//! into a global scope that survives rescans and an owner-scoped part that
//! is rebuilt from scratch on every rescan.

pub mod catalog;
pub mod declare;
pub mod descriptor;
pub mod member;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

pub use catalog::{Catalog, CatalogHandle};
pub use declare::{short_type_name, CommandOwner, Declaration, Declarations};
pub use descriptor::{command_key, CommandDescriptor, CommandKind, ExecutionPolicy};
pub use member::{MemberHandle, Param, Signature};

// ── Owners ──────────────────────────────────────────────────────

/// Identity of a live owner. Holds no strong reference; equality is identity.
#[derive(Clone)]
pub struct OwnerHandle {
    name: String,
    class: &'static str,
    liveness: Weak<dyn Any + Send + Sync>,
}

impl OwnerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.strong_count() > 0
    }

    pub fn same_owner(&self, other: &OwnerHandle) -> bool {
        Weak::ptr_eq(&self.liveness, &other.liveness)
    }
}

impl PartialEq for OwnerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_owner(other)
    }
}

impl fmt::Debug for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerHandle")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A live object offered to [`Registry::rescan`], type-erased.
pub struct Candidate {
    handle: OwnerHandle,
    declare: Box<dyn Fn() -> Vec<Declaration>>,
}

impl Candidate {
    pub fn of<T: CommandOwner>(owner: &Arc<RwLock<T>>) -> Self {
        let name = owner.read().owner_name();
        let weak = Arc::downgrade(owner);
        let liveness: Weak<dyn Any + Send + Sync> = weak.clone();
        let owner_label = name.clone();
        Self {
            handle: OwnerHandle {
                name,
                class: short_type_name::<T>(),
                liveness,
            },
            declare: Box::new(move || {
                let mut decl = Declarations::owned(weak.clone(), owner_label.clone());
                T::declare(&mut decl);
                decl.finish()
            }),
        }
    }

    pub fn handle(&self) -> &OwnerHandle {
        &self.handle
    }
}

// ── Bindings ────────────────────────────────────────────────────

/// One command bound to one member, owner-scoped or global.
#[derive(Debug, Clone)]
pub struct Binding {
    pub descriptor: CommandDescriptor,
    /// `None` for global bindings.
    pub owner: Option<OwnerHandle>,
    /// Type that declared the member.
    pub class: &'static str,
    pub member_name: String,
    pub member: MemberHandle,
}

impl Binding {
    pub fn policy(&self) -> ExecutionPolicy {
        self.descriptor.policy
    }

    pub fn is_global(&self) -> bool {
        self.owner.is_none()
    }

    /// Same command bound to the same member of the same owner.
    pub fn same_target(&self, other: &Binding) -> bool {
        self.descriptor == other.descriptor
            && self.member_name == other.member_name
            && self.class == other.class
            && match (&self.owner, &other.owner) {
                (Some(a), Some(b)) => a.same_owner(b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Result of looking a name up in one table.
#[derive(Debug, Default)]
pub struct Lookup<'a> {
    pub global: Option<&'a Binding>,
    /// In owner registration order. May include owners that have since died.
    pub owned: Vec<&'a Binding>,
}

impl Lookup<'_> {
    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.owned.is_empty()
    }
}

// ── Tables ──────────────────────────────────────────────────────

#[derive(Debug)]
struct OwnerTable {
    owner: OwnerHandle,
    bindings: IndexMap<String, Binding>,
}

/// Bindings of one member kind.
#[derive(Debug)]
pub struct CommandTable {
    kind: CommandKind,
    global: IndexMap<String, Binding>,
    per_owner: Vec<OwnerTable>,
}

impl CommandTable {
    fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            global: IndexMap::new(),
            per_owner: Vec::new(),
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn lookup(&self, name: &str) -> Lookup<'_> {
        let key = command_key(name);
        Lookup {
            global: self.global.get(&key),
            owned: self
                .per_owner
                .iter()
                .filter_map(|t| t.bindings.get(&key))
                .collect(),
        }
    }

    fn clear_owned(&mut self) {
        self.per_owner.clear();
    }

    /// First registration of a global name wins. Clashing owner bindings are dropped.
    fn add_global(&mut self, binding: Binding) {
        let key = binding.descriptor.key();
        if self.global.contains_key(&key) {
            tracing::debug!(command = %binding.descriptor.name, "global command already registered");
            return;
        }
        for table in &mut self.per_owner {
            table.bindings.shift_remove(&key);
        }
        self.global.insert(key, binding);
    }

    fn add_owned(&mut self, owner: &OwnerHandle, binding: Binding) {
        let key = binding.descriptor.key();
        if self.global.contains_key(&key) {
            tracing::debug!(
                command = %binding.descriptor.name,
                owner = %owner.name(),
                "shadowed by a global command"
            );
            return;
        }
        let index = match self.per_owner.iter().position(|t| t.owner.same_owner(owner)) {
            Some(i) => i,
            None => {
                self.per_owner.push(OwnerTable {
                    owner: owner.clone(),
                    bindings: IndexMap::new(),
                });
                self.per_owner.len() - 1
            }
        };
        if let Some(table) = self.per_owner.get_mut(index) {
            // Within one owner the first declaration of a name wins.
            table.bindings.entry(key).or_insert(binding);
        }
    }

    /// Global first, then owners in order, de-duplicated by key.
    fn listed(&self) -> IndexMap<String, CommandDescriptor> {
        let mut out = IndexMap::new();
        let bindings = self
            .global
            .iter()
            .chain(self.per_owner.iter().flat_map(|t| t.bindings.iter()));
        for (key, binding) in bindings {
            if binding.descriptor.listed && !out.contains_key(key) {
                out.insert(key.clone(), binding.descriptor.clone());
            }
        }
        out
    }

    fn owner_count(&self) -> usize {
        self.per_owner.len()
    }
}

// ── Registry ────────────────────────────────────────────────────

/// Owns the three command tables and the shared listing used by help and
/// suggestions.
#[derive(Debug)]
pub struct Registry {
    fields: CommandTable,
    properties: CommandTable,
    methods: CommandTable,
    catalog: CatalogHandle,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            fields: CommandTable::new(CommandKind::Field),
            properties: CommandTable::new(CommandKind::Property),
            methods: CommandTable::new(CommandKind::Method),
            catalog: CatalogHandle::default(),
        }
    }

    pub fn table(&self, kind: CommandKind) -> &CommandTable {
        match kind {
            CommandKind::Field => &self.fields,
            CommandKind::Property => &self.properties,
            CommandKind::Method => &self.methods,
        }
    }

    fn table_mut(&mut self, kind: CommandKind) -> &mut CommandTable {
        match kind {
            CommandKind::Field => &mut self.fields,
            CommandKind::Property => &mut self.properties,
            CommandKind::Method => &mut self.methods,
        }
    }

    pub fn lookup(&self, kind: CommandKind, name: &str) -> Lookup<'_> {
        self.table(kind).lookup(name)
    }

    /// Shared, always-current view of the listed commands.
    pub fn catalog(&self) -> CatalogHandle {
        self.catalog.clone()
    }

    /// Global commands with no backing state.
    pub fn register_globals<F>(&mut self, class: &'static str, declare: F)
    where
        F: FnOnce(&mut Declarations<()>),
    {
        self.register_global_state(class, Arc::new(RwLock::new(())), declare);
    }

    /// Global commands bound to shared state that lives as long as the registry.
    /// Global bindings are never removed by [`Registry::rescan`].
    pub fn register_global_state<T, F>(&mut self, class: &'static str, state: Arc<RwLock<T>>, declare: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce(&mut Declarations<T>),
    {
        let mut decl = Declarations::shared(state);
        declare(&mut decl);
        for item in decl.finish() {
            let (descriptor, member_name, member) = item.into_parts();
            let kind = descriptor.kind;
            self.table_mut(kind).add_global(Binding {
                descriptor,
                owner: None,
                class,
                member_name,
                member,
            });
        }
        self.refresh_catalog();
    }

    /// Rebuild every owner-scoped table from `owners`. Global bindings stay.
    /// Dead candidates are skipped.
    pub fn rescan(&mut self, owners: &[Candidate]) {
        for kind in CommandKind::all() {
            self.table_mut(*kind).clear_owned();
        }
        for candidate in owners {
            let owner = &candidate.handle;
            if !owner.is_alive() {
                continue;
            }
            for item in (candidate.declare)() {
                let (descriptor, member_name, member) = item.into_parts();
                let kind = descriptor.kind;
                let binding = Binding {
                    descriptor,
                    owner: Some(owner.clone()),
                    class: owner.class(),
                    member_name,
                    member,
                };
                self.table_mut(kind).add_owned(owner, binding);
            }
        }
        tracing::debug!(
            owners = owners.len(),
            commands = self.listed_descriptors().len(),
            "registry rescanned"
        );
        self.refresh_catalog();
    }

    /// Listed descriptors of every table in dispatch order.
    pub fn listed_descriptors(&self) -> Vec<CommandDescriptor> {
        CommandKind::all()
            .iter()
            .flat_map(|kind| self.table(*kind).listed().into_values())
            .collect()
    }

    /// Distinct owners currently holding bindings.
    pub fn owner_count(&self) -> usize {
        CommandKind::all()
            .iter()
            .map(|kind| self.table(*kind).owner_count())
            .max()
            .unwrap_or(0)
    }

    fn refresh_catalog(&self) {
        self.catalog.replace(self.listed_descriptors());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::{Value, ValueType};

    struct Crate {
        label: String,
        coins: i32,
    }

    impl CommandOwner for Crate {
        fn owner_name(&self) -> String {
            self.label.clone()
        }

        fn declare(decl: &mut Declarations<Self>) {
            decl.field("coins", ValueType::Int, |c: &Crate| c.coins, |c, v| {
                if let Some(n) = v.as_int() {
                    c.coins = n;
                }
            })
            .command("Coins")
            .policy(ExecutionPolicy::All);
            decl.method("open", Signature::new(), |_, _| Ok(()))
                .command("Open")
                .describe("Open the crate");
            // Same name again: ignored.
            decl.method("open_again", Signature::new(), |_, _| Ok(()))
                .command("open");
        }
    }

    fn crate_owner(label: &str) -> Arc<RwLock<Crate>> {
        Arc::new(RwLock::new(Crate {
            label: label.into(),
            coins: 0,
        }))
    }

    #[test]
    fn rescan_builds_per_owner_bindings() {
        let a = crate_owner("A");
        let b = crate_owner("B");
        let mut reg = Registry::new();
        reg.rescan(&[Candidate::of(&a), Candidate::of(&b)]);

        let found = reg.lookup(CommandKind::Field, "COINS");
        assert!(found.global.is_none());
        assert_eq!(found.owned.len(), 2);
        assert_eq!(found.owned[0].owner.as_ref().unwrap().name(), "A");

        let open = reg.lookup(CommandKind::Method, "open");
        assert_eq!(open.owned[0].member_name, "open");
        assert_eq!(reg.owner_count(), 2);
    }

    /// Every binding of every kind, in lookup order.
    fn snapshot(reg: &Registry, names: &[&str]) -> Vec<Binding> {
        let mut out = Vec::new();
        for kind in CommandKind::all() {
            for name in names {
                let found = reg.lookup(*kind, name);
                out.extend(found.global.cloned());
                out.extend(found.owned.into_iter().cloned());
            }
        }
        out
    }

    #[test]
    fn rescan_is_idempotent() {
        let a = crate_owner("A");
        let b = crate_owner("B");
        let mut reg = Registry::new();
        reg.register_globals("Cheats", |decl| {
            decl.method("god", Signature::new(), |_, _| Ok(())).command("God");
        });
        let owners = vec![Candidate::of(&a), Candidate::of(&b)];
        let names = ["coins", "open", "god"];

        reg.rescan(&owners);
        let first = snapshot(&reg, &names);
        let listed = reg.listed_descriptors();
        reg.rescan(&owners);
        let second = snapshot(&reg, &names);

        assert_eq!(first.len(), 5);
        assert_eq!(first.len(), second.len());
        for (before, after) in first.iter().zip(&second) {
            assert!(before.same_target(after), "{} rebound", before.descriptor.name);
            assert_eq!(before.policy(), after.policy());
            assert_eq!(before.is_global(), after.is_global());
        }
        assert_eq!(first.iter().filter(|b| b.is_global()).count(), 1);
        assert_eq!(reg.listed_descriptors(), listed);

        // A different owner under the same name is a different target.
        let coins_a = &first[0];
        let coins_b = &first[1];
        assert!(!coins_a.same_target(coins_b));
    }

    #[test]
    fn rescan_drops_dead_owners_and_keeps_globals() {
        let a = crate_owner("A");
        let mut reg = Registry::new();
        reg.register_globals("Cheats", |decl| {
            decl.method("god", Signature::new(), |_, _| Ok(())).command("God");
        });
        let owners = vec![Candidate::of(&a)];
        drop(a);
        reg.rescan(&owners);
        assert!(reg.lookup(CommandKind::Field, "coins").is_empty());
        assert!(reg.lookup(CommandKind::Method, "god").global.is_some());
    }

    #[test]
    fn globals_shadow_owner_bindings() {
        let a = crate_owner("A");
        let mut reg = Registry::new();
        reg.register_globals("Cheats", |decl| {
            decl.method("open", Signature::new(), |_, _| Ok(Value::Bool(true)))
                .command("Open");
        });
        reg.rescan(&[Candidate::of(&a)]);
        let found = reg.lookup(CommandKind::Method, "Open");
        assert!(found.global.is_some());
        assert!(found.owned.is_empty());
    }

    #[test]
    fn listing_excludes_unlisted_and_dedupes() {
        let a = crate_owner("A");
        let b = crate_owner("B");
        let mut reg = Registry::new();
        reg.register_globals("Console", |decl| {
            decl.method("help", Signature::new(), |_, _| Ok(())).command("Help").unlisted();
        });
        reg.rescan(&[Candidate::of(&a), Candidate::of(&b)]);
        let names: Vec<String> = reg.listed_descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Coins", "Open"]);
        assert_eq!(reg.catalog().read().descriptors().len(), 2);
    }

    #[test]
    fn owner_handles_compare_by_identity() {
        let a = crate_owner("Same");
        let b = crate_owner("Same");
        let ha = Candidate::of(&a).handle().clone();
        let hb = Candidate::of(&b).handle().clone();
        assert_ne!(ha, hb);
        assert_eq!(ha, Candidate::of(&a).handle().clone());
        assert_eq!(ha.class(), "Crate");
    }
}
