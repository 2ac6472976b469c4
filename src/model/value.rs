use std::fmt;

use serde::Serialize;

use super::color::Color;
use super::vector::{Vec2, Vec2Int, Vec3, Vec3Int};
use crate::options::OptionsMenu;

// ── Types ───────────────────────────────────────────────────────

/// A closed set of variant names a command argument may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumType {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumType {
    pub const fn new(name: &'static str, variants: &'static [&'static str]) -> Self {
        Self { name, variants }
    }

    /// Case-insensitive variant lookup, returning the canonical spelling.
    pub fn variant(&self, text: &str) -> Option<&'static str> {
        self.variants
            .iter()
            .copied()
            .find(|v| v.eq_ignore_ascii_case(text))
    }
}

/// The declared value type of a field, property, or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
    Enum(EnumType),
    Vec2,
    Vec3,
    Vec2Int,
    Vec3Int,
    Color,
    /// Element type of a trailing "rest" parameter.
    Array(Box<ValueType>),
    /// Readable but not coercible from text (e.g. a composite host struct).
    Opaque(&'static str),
}

impl ValueType {
    pub fn name(&self) -> String {
        match self {
            ValueType::Bool => "bool".into(),
            ValueType::Int => "int".into(),
            ValueType::Float => "float".into(),
            ValueType::Str => "string".into(),
            ValueType::Enum(e) => e.name.into(),
            ValueType::Vec2 => "Vector2".into(),
            ValueType::Vec3 => "Vector3".into(),
            ValueType::Vec2Int => "Vector2Int".into(),
            ValueType::Vec3Int => "Vector3Int".into(),
            ValueType::Color => "Color".into(),
            ValueType::Array(elem) => format!("{}[]", elem.name()),
            ValueType::Opaque(name) => (*name).into(),
        }
    }
}

// ── Values ──────────────────────────────────────────────────────

/// A strongly-typed value produced by coercion or read from a live member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
    /// Canonical variant name of an [`EnumType`].
    Enum(String),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec2Int(Vec2Int),
    Vec3Int(Vec3Int),
    Color(Color),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to float, the way a float field accepts an int literal.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2_int(&self) -> Option<Vec2Int> {
        match self {
            Value::Vec2Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3_int(&self) -> Option<Vec3Int> {
        match self {
            Value::Vec3Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) | Value::Enum(s) => f.write_str(s),
            Value::Vec2(v) => write!(f, "{v}"),
            Value::Vec3(v) => write!(f, "{v}"),
            Value::Vec2Int(v) => write!(f, "{v}"),
            Value::Vec3Int(v) => write!(f, "{v}"),
            Value::Color(c) => write!(f, "{c}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $( impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        } )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    f32 => Float,
    String => Str,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec2Int => Vec2Int,
    Vec3Int => Vec3Int,
    Color => Color,
    Vec<Value> => Array,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

// ── Method arguments ────────────────────────────────────────────

/// Positionally coerced method arguments. A slot is `None` when the token was
/// missing or failed to coerce; the method decides what that means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<Option<Value>>,
}

impl Args {
    pub fn new(values: Vec<Option<Value>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(Value::as_bool)
    }

    pub fn int(&self, index: usize) -> Option<i32> {
        self.get(index).and_then(Value::as_int)
    }

    pub fn float(&self, index: usize) -> Option<f32> {
        self.get(index).and_then(Value::as_float)
    }

    pub fn str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    pub fn vec3(&self, index: usize) -> Option<Vec3> {
        self.get(index).and_then(Value::as_vec3)
    }

    pub fn color(&self, index: usize) -> Option<Color> {
        self.get(index).and_then(Value::as_color)
    }

    /// Items of a trailing rest parameter; empty when absent.
    pub fn rest(&self, index: usize) -> &[Value] {
        self.get(index).and_then(Value::as_array).unwrap_or(&[])
    }
}

// ── Invocation outcome ──────────────────────────────────────────

/// What an invoked operation hands back to the dispatcher.
#[derive(Debug, Default)]
pub enum Outcome {
    /// No return value; nothing is reported.
    #[default]
    Unit,
    Value(Value),
    /// Free text, reported line by line without the member label.
    Message(String),
    /// Start an interactive options session instead of reporting a value.
    Options(OptionsMenu),
}

impl From<()> for Outcome {
    fn from((): ()) -> Self {
        Outcome::Unit
    }
}

impl From<Value> for Outcome {
    fn from(v: Value) -> Self {
        Outcome::Value(v)
    }
}

impl From<OptionsMenu> for Outcome {
    fn from(menu: OptionsMenu) -> Self {
        Outcome::Options(menu)
    }
}

macro_rules! outcome_from {
    ($($ty:ty),* $(,)?) => {
        $( impl From<$ty> for Outcome {
            fn from(v: $ty) -> Self {
                Outcome::Value(Value::from(v))
            }
        } )*
    };
}

outcome_from!(bool, i32, f32, String, &str, Vec2, Vec3, Vec2Int, Vec3Int, Color);

#[cfg(test)]
mod tests {
    use super::*;

    const DIFFICULTY: EnumType = EnumType::new("Difficulty", &["Easy", "Normal", "Hard"]);

    #[test]
    fn enum_variant_lookup_is_case_insensitive() {
        assert_eq!(DIFFICULTY.variant("hard"), Some("Hard"));
        assert_eq!(DIFFICULTY.variant("NORMAL"), Some("Normal"));
        assert_eq!(DIFFICULTY.variant("nightmare"), None);
    }

    #[test]
    fn args_treat_missing_slots_as_absent() {
        let args = Args::new(vec![Some(Value::Int(3)), None]);
        assert_eq!(args.int(0), Some(3));
        assert_eq!(args.float(0), Some(3.0));
        assert_eq!(args.int(1), None);
        assert_eq!(args.int(7), None);
        assert!(args.rest(1).is_empty());
    }

    #[test]
    fn array_display_joins_items() {
        let v = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(v.to_string(), "[1, 2]");
        assert_eq!(ValueType::Array(Box::new(ValueType::Int)).name(), "int[]");
    }
}
