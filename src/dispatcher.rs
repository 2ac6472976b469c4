//! Executes one submitted line against a [`Registry`].
//!
//! Matching runs over the field, property and method tables in that order.
//! Global bindings always run; owner-scoped bindings are filtered by their
//! execution policy. The dispatcher also owns the single interactive options
//! session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::coerce::{coerce, coerce_args};
use crate::error::ConsoleError;
use crate::model::{Outcome, ValueType};
use crate::options::{callback, LogFn, OptionCallback, OptionsMenu, Selection};
use crate::registry::member::Setter;
use crate::registry::{Binding, CommandKind, ExecutionPolicy, MemberHandle, OwnerHandle, Registry};
use crate::settings::NameDisplay;

/// Replaces the default `Options: name[i] ...` menu rendering.
pub type OptionsFormatter = Box<dyn Fn(&OptionsMenu) -> String + Send + Sync>;

/// What one call to [`Dispatcher::dispatch`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub name: String,
    pub args: Vec<String>,
    /// Bindings run plus options selected.
    pub executed: usize,
    /// The line was consumed as an options selector.
    pub selector: bool,
    /// A session is now waiting for the next line.
    pub session_started: bool,
    /// A bound owner no longer exists; the registry needs a rescan.
    pub rescan_required: bool,
}

/// First space-delimited token is the name, the rest are arguments.
/// Consecutive spaces yield empty argument tokens.
pub fn split_command(line: &str) -> (String, Vec<String>) {
    let mut tokens = line.split(' ');
    let name = tokens.next().unwrap_or_default().to_string();
    (name, tokens.map(str::to_string).collect())
}

pub struct Dispatcher {
    session: Option<OptionsMenu>,
    formatter: Option<OptionsFormatter>,
    display: NameDisplay,
    stale: Arc<AtomicBool>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(NameDisplay::default())
    }
}

impl Dispatcher {
    pub fn new(display: NameDisplay) -> Self {
        Self {
            session: None,
            formatter: None,
            display,
            stale: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_name_display(&mut self, display: NameDisplay) {
        self.display = display;
    }

    pub fn set_options_formatter(&mut self, formatter: Option<OptionsFormatter>) {
        self.formatter = formatter;
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Drop any waiting session without running anything.
    pub fn cancel_session(&mut self) {
        self.session = None;
    }

    pub fn dispatch(&mut self, registry: &Registry, line: &str, log: &mut LogFn<'_>) -> DispatchReport {
        let (name, args) = split_command(line);
        let mut report = DispatchReport::default();

        if let Some(menu) = self.session.take() {
            report.selector = true;
            self.select(menu, line, log, &mut report);
        } else {
            self.resolve(registry, &name, &args, log, &mut report);
        }

        report.name = name;
        report.args = args;
        report.rescan_required = self.stale.swap(false, Ordering::Relaxed);
        report
    }

    fn resolve(
        &mut self,
        registry: &Registry,
        name: &str,
        args: &[String],
        log: &mut LogFn<'_>,
        report: &mut DispatchReport,
    ) {
        let mut fan_out = OptionsMenu::new().first_arg_is_index(false);

        for kind in CommandKind::all() {
            let found = registry.lookup(*kind, name);
            if let Some(binding) = found.global {
                self.run(binding, args, log, report);
            }
            for binding in found.owned {
                let Some(owner) = binding.owner.as_ref().filter(|o| o.is_alive()) else {
                    tracing::debug!(command = %binding.descriptor.name, "skipping binding of a dead owner");
                    self.stale.store(true, Ordering::Relaxed);
                    continue;
                };
                match binding.policy() {
                    ExecutionPolicy::FirstMatch => {
                        self.run(binding, args, log, report);
                        break;
                    }
                    ExecutionPolicy::All => self.run(binding, args, log, report),
                    ExecutionPolicy::Option => {
                        fan_out.insert_unique(owner.name(), self.deferred(binding, args));
                    }
                }
            }
        }

        if !fan_out.is_empty() {
            self.open_session(fan_out, args, log, report);
        }
    }

    fn run(&mut self, binding: &Binding, args: &[String], log: &mut LogFn<'_>, report: &mut DispatchReport) {
        report.executed += 1;
        if let Some(menu) = run_binding(binding, args, self.display, &self.stale, log) {
            self.open_session(menu, args, log, report);
        }
    }

    /// The binding, run later when its option is picked.
    fn deferred(&self, binding: &Binding, args: &[String]) -> OptionCallback {
        let binding = binding.clone();
        let args = args.to_vec();
        let display = self.display;
        let stale = Arc::clone(&self.stale);
        callback(move |log| run_binding(&binding, &args, display, &stale, log))
    }

    fn select(&mut self, menu: OptionsMenu, selector: &str, log: &mut LogFn<'_>, report: &mut DispatchReport) {
        match menu.select(selector, log) {
            Selection::Invalid(message) => log(&message, false),
            Selection::Selected { next, .. } => {
                report.executed += 1;
                if let Some(next) = next {
                    self.open_session(next, &[], log, report);
                }
            }
        }
    }

    /// Resolve the first argument right away when the menu allows it,
    /// otherwise show the menu and wait for the next line.
    fn open_session(&mut self, menu: OptionsMenu, args: &[String], log: &mut LogFn<'_>, report: &mut DispatchReport) {
        if menu.selects_first_arg() {
            if let Some(selector) = args.first() {
                self.select(menu, selector, log, report);
                return;
            }
        }
        let text = match &self.formatter {
            Some(format) => format(&menu),
            None => menu.menu_text(),
        };
        log(&text, false);
        if self.session.replace(menu).is_some() {
            tracing::debug!("discarded an unconsumed options session");
        }
        report.session_started = true;
    }
}

// ── Execution ───────────────────────────────────────────────────

/// Run one binding and report through `log`. Returns a menu the invoked
/// method asked to show.
fn run_binding(
    binding: &Binding,
    args: &[String],
    display: NameDisplay,
    stale: &AtomicBool,
    log: &mut LogFn<'_>,
) -> Option<OptionsMenu> {
    let label = display.label(
        binding.owner.as_ref().map(OwnerHandle::name),
        binding.class,
        &binding.member_name,
        &binding.descriptor.name,
    );
    match execute(binding, args, &label, log) {
        Ok(menu) => menu,
        Err(e) if e.is_stale() => {
            tracing::debug!(error = %e, "owner vanished during dispatch");
            stale.store(true, Ordering::Relaxed);
            None
        }
        Err(e) => {
            match &e {
                ConsoleError::Invocation { .. } => {
                    tracing::error!(command = %binding.descriptor.name, error = %e, "command failed");
                }
                _ => tracing::warn!(command = %binding.descriptor.name, error = %e, "command skipped"),
            }
            log(&e.to_string(), true);
            None
        }
    }
}

fn execute(
    binding: &Binding,
    args: &[String],
    label: &str,
    log: &mut LogFn<'_>,
) -> Result<Option<OptionsMenu>, ConsoleError> {
    let qualified = || format!("{}.{}", binding.class, binding.member_name);
    match &binding.member {
        MemberHandle::Field(field) => match args.first() {
            None => log(&format!("{label} : {}", (field.get)()?), true),
            Some(token) => {
                let set = field.set.as_ref().ok_or_else(|| ConsoleError::ImmutableTarget {
                    member: binding.member_name.clone(),
                })?;
                write(set, token, &field.ty)?;
            }
        },
        MemberHandle::Property(prop) => match args.first() {
            None => {
                let get = prop
                    .get
                    .as_ref()
                    .ok_or_else(|| ConsoleError::MissingGetter { member: qualified() })?;
                log(&format!("{label} : {}", get()?), true);
            }
            Some(token) => {
                let set = prop
                    .set
                    .as_ref()
                    .ok_or_else(|| ConsoleError::MissingSetter { member: qualified() })?;
                write(set, token, &prop.ty)?;
            }
        },
        MemberHandle::Method(method) => {
            let call_args = coerce_args(args, &method.signature);
            match (method.invoke)(&call_args)? {
                Outcome::Unit => {}
                Outcome::Value(value) => log(&format!("{label} : {value}"), true),
                Outcome::Message(text) => {
                    for line in text.lines() {
                        log(line, true);
                    }
                }
                Outcome::Options(menu) => return Ok(Some(menu)),
            }
        }
    }
    Ok(None)
}

/// An uncoercible token skips the write silently.
fn write(set: &Setter, token: &str, ty: &ValueType) -> Result<(), ConsoleError> {
    match coerce(token, ty) {
        Some(value) => set(value),
        None => {
            tracing::debug!(token, ty = %ty.name(), "write skipped, token did not coerce");
            Ok(())
        }
    }
}
