//! In-process developer console: owners declare commands, typed lines are
//! parsed, coerced and dispatched against live objects.

pub mod coerce;
pub mod console;
pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod history;
pub mod model;
pub mod options;
pub mod paths;
pub mod registry;
pub mod settings;
pub mod suggestion;

pub use console::{Console, OwnerSource};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::ConsoleError;
pub use options::{callback, OptionsMenu};
pub use registry::{Candidate, CommandOwner, Declarations, ExecutionPolicy, Registry};
pub use settings::ConsoleSettings;
