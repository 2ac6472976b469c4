//! Interactive options payload.
//!
//! An [`OptionsMenu`] is an ordered set of named, one-shot callbacks. The
//! dispatcher holds at most one as its active session and resolves the next
//! line (or the triggering argument) against it.

use std::fmt;

use indexmap::IndexMap;

/// Logging callback: `(message, is_echo)`.
pub type LogFn<'a> = dyn FnMut(&str, bool) + 'a;

/// A selected option's action. May hand back a follow-up menu.
pub type OptionCallback = Box<dyn FnOnce(&mut LogFn<'_>) -> Option<OptionsMenu> + Send>;

/// Box a closure as an [`OptionCallback`], fixing its signature.
pub fn callback<F>(f: F) -> OptionCallback
where
    F: FnOnce(&mut LogFn<'_>) -> Option<OptionsMenu> + Send + 'static,
{
    Box::new(f)
}

pub const DEFAULT_INVALID_MESSAGE: &str = "Invalid Option, Please try again";

struct MenuOption {
    name: String,
    callback: OptionCallback,
}

/// What happened to a selector.
pub enum Selection {
    /// A callback ran; `next` is the follow-up menu it returned, if any.
    Selected { name: String, next: Option<OptionsMenu> },
    /// Nothing matched. Carries the menu's invalid message.
    Invalid(String),
}

/// Ordered options keyed by upper-cased name.
pub struct OptionsMenu {
    options: IndexMap<String, MenuOption>,
    first_arg_is_index: bool,
    invalid_message: String,
}

impl Default for OptionsMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsMenu {
    /// An empty menu. The triggering command's first argument selects an
    /// option directly unless [`OptionsMenu::first_arg_is_index`] turns that off.
    pub fn new() -> Self {
        Self {
            options: IndexMap::new(),
            first_arg_is_index: true,
            invalid_message: DEFAULT_INVALID_MESSAGE.to_string(),
        }
    }

    pub fn option<F>(mut self, name: &str, action: F) -> Self
    where
        F: FnOnce(&mut LogFn<'_>) + Send + 'static,
    {
        self.add_option(name, action);
        self
    }

    /// Duplicate names (case-insensitive) keep the first option.
    pub fn add_option<F>(&mut self, name: &str, action: F)
    where
        F: FnOnce(&mut LogFn<'_>) + Send + 'static,
    {
        self.insert(
            name,
            callback(move |log| {
                action(log);
                None
            }),
        );
    }

    /// An option whose action opens another menu.
    pub fn submenu<F>(mut self, name: &str, action: F) -> Self
    where
        F: FnOnce(&mut LogFn<'_>) -> OptionsMenu + Send + 'static,
    {
        self.insert(name, callback(move |log| Some(action(log))));
        self
    }

    pub fn first_arg_is_index(mut self, enabled: bool) -> Self {
        self.first_arg_is_index = enabled;
        self
    }

    pub fn invalid_message(mut self, message: &str) -> Self {
        self.invalid_message = message.to_string();
        self
    }

    pub(crate) fn insert(&mut self, name: &str, callback: OptionCallback) {
        let key = name.to_uppercase();
        if self.options.contains_key(&key) {
            tracing::debug!(option = name, "duplicate option ignored");
            return;
        }
        self.options.insert(
            key,
            MenuOption {
                name: name.to_string(),
                callback,
            },
        );
    }

    /// Insert under a label made unique with a `#n` suffix.
    pub(crate) fn insert_unique(&mut self, label: &str, callback: OptionCallback) {
        let mut name = label.to_string();
        let mut n = 2;
        while self.options.contains_key(&name.to_uppercase()) {
            name = format!("{label}#{n}");
            n += 1;
        }
        self.insert(&name, callback);
    }

    pub fn selects_first_arg(&self) -> bool {
        self.first_arg_is_index
    }

    pub fn invalid_text(&self) -> &str {
        &self.invalid_message
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Display names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.values().map(|o| o.name.as_str())
    }

    /// Position of the option a selector refers to: an in-range ordinal
    /// first, then a case-insensitive name.
    pub fn resolve(&self, selector: &str) -> Option<usize> {
        let key = selector.trim().to_uppercase();
        if let Ok(index) = key.parse::<usize>() {
            if index < self.options.len() {
                return Some(index);
            }
        }
        self.options.get_index_of(&key)
    }

    /// Consume the menu and run the chosen option, if any.
    pub fn select(mut self, selector: &str, log: &mut LogFn<'_>) -> Selection {
        let Some(index) = self.resolve(selector) else {
            return Selection::Invalid(self.invalid_message);
        };
        match self.options.shift_remove_index(index) {
            Some((_, option)) => {
                tracing::debug!(option = %option.name, "option selected");
                let next = (option.callback)(log);
                Selection::Selected {
                    name: option.name,
                    next,
                }
            }
            None => Selection::Invalid(self.invalid_message),
        }
    }

    /// `Options: English[0] French[1] Spanish[2]`
    pub fn menu_text(&self) -> String {
        let mut text = String::from("Options:");
        for (i, name) in self.names().enumerate() {
            text.push_str(&format!(" {name}[{i}]"));
        }
        text
    }
}

impl fmt::Debug for OptionsMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsMenu")
            .field("options", &self.names().collect::<Vec<_>>())
            .field("first_arg_is_index", &self.first_arg_is_index)
            .field("invalid_message", &self.invalid_message)
            .finish()
    }
}
