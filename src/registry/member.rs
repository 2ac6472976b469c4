//! Capability-typed member handles.
//!
//! A handle carries type-erased accessor/invoker closures built by the
//! declaration builder. Closures bound to an owner hold only a `Weak`
//! reference and fail with [`ConsoleError::StaleOwner`] once it is gone.

use std::fmt;
use std::sync::Arc;

use crate::error::ConsoleError;
use crate::model::{Args, Outcome, Value, ValueType};

pub type Getter = Arc<dyn Fn() -> Result<Value, ConsoleError> + Send + Sync>;
pub type Setter = Arc<dyn Fn(Value) -> Result<(), ConsoleError> + Send + Sync>;
pub type Invoker = Arc<dyn Fn(&Args) -> Result<Outcome, ConsoleError> + Send + Sync>;

// ── Signatures ──────────────────────────────────────────────────

/// One declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// For a rest parameter, the element type.
    pub ty: ValueType,
    /// Collects every remaining token into an array.
    pub rest: bool,
}

/// Ordered parameter list plus return type of an invocable member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub returns: Option<ValueType>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: &str, ty: ValueType) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            ty,
            rest: false,
        });
        self
    }

    /// Trailing variable-length parameter. Anything declared after it is ignored.
    pub fn rest(mut self, name: &str, elem: ValueType) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            ty: elem,
            rest: true,
        });
        self
    }

    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }
}

// ── Handles ─────────────────────────────────────────────────────

/// A readable/writable field. `set == None` marks a constant.
#[derive(Clone)]
pub struct FieldMember {
    pub ty: ValueType,
    pub get: Getter,
    pub set: Option<Setter>,
}

/// A property with an optional getter and optional setter.
#[derive(Clone)]
pub struct PropertyMember {
    pub ty: ValueType,
    pub get: Option<Getter>,
    pub set: Option<Setter>,
}

/// An invocable operation.
#[derive(Clone)]
pub struct MethodMember {
    pub signature: Signature,
    pub invoke: Invoker,
}

/// Closed variant over the three member capabilities.
#[derive(Clone)]
pub enum MemberHandle {
    Field(FieldMember),
    Property(PropertyMember),
    Method(MethodMember),
}

impl MemberHandle {
    pub fn kind(&self) -> super::CommandKind {
        match self {
            MemberHandle::Field(_) => super::CommandKind::Field,
            MemberHandle::Property(_) => super::CommandKind::Property,
            MemberHandle::Method(_) => super::CommandKind::Method,
        }
    }
}

impl fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberHandle::Field(m) => f
                .debug_struct("Field")
                .field("ty", &m.ty)
                .field("writable", &m.set.is_some())
                .finish(),
            MemberHandle::Property(m) => f
                .debug_struct("Property")
                .field("ty", &m.ty)
                .field("readable", &m.get.is_some())
                .field("writable", &m.set.is_some())
                .finish(),
            MemberHandle::Method(m) => f
                .debug_struct("Method")
                .field("signature", &m.signature)
                .finish(),
        }
    }
}
