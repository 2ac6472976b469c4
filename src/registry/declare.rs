//! Typed declaration builder.
//!
//! An owner type lists its commands once, in [`CommandOwner::declare`]. The
//! builder turns each typed accessor into a type-erased [`MemberHandle`]
//! closure that reaches the owner through a [`Locator`].

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::descriptor::{normalize_name, CommandDescriptor, CommandKind, ExecutionPolicy};
use super::member::{
    FieldMember, Getter, Invoker, MemberHandle, MethodMember, PropertyMember, Setter, Signature,
};
use crate::error::ConsoleError;
use crate::model::{Args, Outcome, Value, ValueType};

/// A host type whose members can be bound to console commands.
pub trait CommandOwner: Send + Sync + 'static {
    /// Display name used in output labels and option menus.
    fn owner_name(&self) -> String;

    fn declare(decl: &mut Declarations<Self>)
    where
        Self: Sized;
}

/// Last path segment of a type name, e.g. `Player` for `demo::Player`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ── Locator ─────────────────────────────────────────────────────

/// How a bound closure reaches its target state.
pub(crate) enum Locator<T> {
    /// Owner-scoped: dies with the owner.
    Owned { target: Weak<RwLock<T>>, owner: String },
    /// Global scope: state lives as long as the registry.
    Shared(Arc<RwLock<T>>),
}

impl<T> Clone for Locator<T> {
    fn clone(&self) -> Self {
        match self {
            Locator::Owned { target, owner } => Locator::Owned {
                target: target.clone(),
                owner: owner.clone(),
            },
            Locator::Shared(state) => Locator::Shared(Arc::clone(state)),
        }
    }
}

impl<T> Locator<T> {
    fn resolve(&self) -> Result<Arc<RwLock<T>>, ConsoleError> {
        match self {
            Locator::Owned { target, owner } => {
                target.upgrade().ok_or_else(|| ConsoleError::StaleOwner {
                    owner: owner.clone(),
                })
            }
            Locator::Shared(state) => Ok(Arc::clone(state)),
        }
    }
}

// ── Declarations ────────────────────────────────────────────────

/// One declared command: metadata plus its member handle.
#[derive(Debug, Clone)]
pub struct Declaration {
    command: String,
    member_name: String,
    description: String,
    listed: bool,
    policy: ExecutionPolicy,
    member: MemberHandle,
}

impl Declaration {
    fn new(member_name: &str, member: MemberHandle) -> Self {
        Self {
            command: String::new(),
            member_name: member_name.to_string(),
            description: String::new(),
            listed: true,
            policy: ExecutionPolicy::default(),
            member,
        }
    }

    /// Command name. Whitespace is stripped; empty falls back to the member name.
    pub fn command(&mut self, name: &str) -> &mut Self {
        self.command = name.to_string();
        self
    }

    pub fn describe(&mut self, description: &str) -> &mut Self {
        self.description = description.to_string();
        self
    }

    pub fn policy(&mut self, policy: ExecutionPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Callable, but hidden from listing and suggestions.
    pub fn unlisted(&mut self) -> &mut Self {
        self.listed = false;
        self
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn kind(&self) -> CommandKind {
        self.member.kind()
    }

    pub(crate) fn into_parts(self) -> (CommandDescriptor, String, MemberHandle) {
        let params = match &self.member {
            MemberHandle::Method(m) => m.signature.param_names(),
            MemberHandle::Field(_) | MemberHandle::Property(_) => Vec::new(),
        };
        let descriptor = CommandDescriptor {
            name: normalize_name(&self.command, &self.member_name),
            description: self.description,
            listed: self.listed,
            policy: self.policy,
            kind: self.member.kind(),
            params,
        };
        (descriptor, self.member_name, self.member)
    }
}

/// Builder handed to [`CommandOwner::declare`] and to global registration.
pub struct Declarations<T> {
    locator: Locator<T>,
    items: Vec<Declaration>,
}

impl<T: Send + Sync + 'static> Declarations<T> {
    pub(crate) fn owned(target: Weak<RwLock<T>>, owner: String) -> Self {
        Self {
            locator: Locator::Owned { target, owner },
            items: Vec::new(),
        }
    }

    pub(crate) fn shared(state: Arc<RwLock<T>>) -> Self {
        Self {
            locator: Locator::Shared(state),
            items: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> Vec<Declaration> {
        self.items
    }

    #[allow(clippy::indexing_slicing)] // index of the item just pushed
    fn push(&mut self, member_name: &str, member: MemberHandle) -> &mut Declaration {
        self.items.push(Declaration::new(member_name, member));
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    fn getter<V, G>(&self, get: G) -> Getter
    where
        V: Into<Value>,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let locator = self.locator.clone();
        Arc::new(move || {
            let target = locator.resolve()?;
            let guard = target.read();
            Ok(get(&guard).into())
        })
    }

    fn setter<S>(&self, set: S) -> Setter
    where
        S: Fn(&mut T, Value) + Send + Sync + 'static,
    {
        let locator = self.locator.clone();
        Arc::new(move |value| {
            let target = locator.resolve()?;
            let mut guard = target.write();
            set(&mut guard, value);
            Ok(())
        })
    }

    /// A writable field.
    pub fn field<V, G, S>(&mut self, member: &str, ty: ValueType, get: G, set: S) -> &mut Declaration
    where
        V: Into<Value>,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, Value) + Send + Sync + 'static,
    {
        let handle = MemberHandle::Field(FieldMember {
            ty,
            get: self.getter(get),
            set: Some(self.setter(set)),
        });
        self.push(member, handle)
    }

    /// A constant field: readable, rejects writes.
    pub fn constant<V, G>(&mut self, member: &str, ty: ValueType, get: G) -> &mut Declaration
    where
        V: Into<Value>,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let handle = MemberHandle::Field(FieldMember {
            ty,
            get: self.getter(get),
            set: None,
        });
        self.push(member, handle)
    }

    /// A property with both accessors.
    pub fn property<V, G, S>(
        &mut self,
        member: &str,
        ty: ValueType,
        get: G,
        set: S,
    ) -> &mut Declaration
    where
        V: Into<Value>,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, Value) + Send + Sync + 'static,
    {
        let handle = MemberHandle::Property(PropertyMember {
            ty,
            get: Some(self.getter(get)),
            set: Some(self.setter(set)),
        });
        self.push(member, handle)
    }

    pub fn read_only<V, G>(&mut self, member: &str, ty: ValueType, get: G) -> &mut Declaration
    where
        V: Into<Value>,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let handle = MemberHandle::Property(PropertyMember {
            ty,
            get: Some(self.getter(get)),
            set: None,
        });
        self.push(member, handle)
    }

    pub fn write_only<S>(&mut self, member: &str, ty: ValueType, set: S) -> &mut Declaration
    where
        S: Fn(&mut T, Value) + Send + Sync + 'static,
    {
        let handle = MemberHandle::Property(PropertyMember {
            ty,
            get: None,
            set: Some(self.setter(set)),
        });
        self.push(member, handle)
    }

    /// An invocable operation. The owner is write-locked for the call.
    pub fn method<R, F>(&mut self, member: &str, signature: Signature, invoke: F) -> &mut Declaration
    where
        R: Into<Outcome>,
        F: Fn(&mut T, &Args) -> Result<R, ConsoleError> + Send + Sync + 'static,
    {
        let locator = self.locator.clone();
        let invoke: Invoker = Arc::new(move |args| {
            let target = locator.resolve()?;
            let mut guard = target.write();
            invoke(&mut guard, args).map(Into::into)
        });
        let handle = MemberHandle::Method(MethodMember { signature, invoke });
        self.push(member, handle)
    }
}
