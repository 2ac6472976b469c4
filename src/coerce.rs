//! Text-to-value coercion for command arguments.
//!
//! Every conversion is a pure function of the token and the declared type.
//! Failure is `None`, never an error: the dispatcher treats an uncoercible
//! token as an absent value.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Args, Color, Value, ValueType, Vec2, Vec2Int, Vec3, Vec3Int};
use crate::registry::member::Signature;

/// Optionally-negative, optionally-decimal numbers inside a composite token.
#[allow(clippy::expect_used)] // literal pattern
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d*\.?\d+").expect("number pattern"));

/// `:int` after the last number marks an integer vector, e.g. `3,4,5:int`.
#[allow(clippy::expect_used)] // literal pattern
static INT_VECTOR_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-?\d*\.?\d+:int\s*$").expect("int vector pattern"));

/// Convert one text token into a value of `ty`.
pub fn coerce(token: &str, ty: &ValueType) -> Option<Value> {
    if token.trim().is_empty() {
        return None;
    }
    match ty {
        ValueType::Enum(e) => e.variant(token.trim()).map(|v| Value::Enum(v.to_string())),
        // Only "true" is true. Every other token, "false" included, is false.
        ValueType::Bool => Some(Value::Bool(token.trim().eq_ignore_ascii_case("true"))),
        ValueType::Str => Some(Value::Str(token.to_string())),
        ValueType::Int => token.trim().parse::<i32>().ok().map(Value::Int),
        ValueType::Float => token.trim().parse::<f32>().ok().map(Value::Float),
        ValueType::Vec2 => parse_vector(token).map(|v| Value::Vec2(v.to_float().truncate())),
        ValueType::Vec3 => parse_vector(token).map(|v| Value::Vec3(v.to_float())),
        ValueType::Vec2Int => parse_vector(token).map(|v| Value::Vec2Int(v.to_int().truncate())),
        ValueType::Vec3Int => parse_vector(token).map(|v| Value::Vec3Int(v.to_int())),
        ValueType::Color => parse_color(token).map(Value::Color),
        ValueType::Array(_) | ValueType::Opaque(_) => None,
    }
}

/// Coerce positional tokens against a method signature.
///
/// Missing or uncoercible tokens become absent slots. A trailing rest
/// parameter collects every remaining token into one array; tokens that fail
/// to coerce against the element type are left out of it.
pub fn coerce_args(tokens: &[String], signature: &Signature) -> Args {
    let mut values = Vec::with_capacity(signature.params.len());
    for (i, param) in signature.params.iter().enumerate() {
        if param.rest {
            let items = tokens
                .get(i..)
                .unwrap_or_default()
                .iter()
                .filter_map(|t| coerce(t, &param.ty))
                .collect();
            values.push(Some(Value::Array(items)));
            break;
        }
        let value = tokens.get(i).and_then(|t| coerce(t, &param.ty));
        if value.is_none() {
            tracing::debug!(param = %param.name, token = ?tokens.get(i), "argument left absent");
        }
        values.push(value);
    }
    Args::new(values)
}

// ── Composite parsing ───────────────────────────────────────────

/// Numbers pulled out of a vector token, before the target shape is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ParsedVector {
    Float(Vec3),
    Int(Vec3Int),
}

impl ParsedVector {
    fn to_float(self) -> Vec3 {
        match self {
            ParsedVector::Float(v) => v,
            ParsedVector::Int(v) => v.to_float(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn to_int(self) -> Vec3Int {
        match self {
            // `as` truncates toward zero and saturates.
            ParsedVector::Float(v) => Vec3Int::new(v.x as i32, v.y as i32, v.z as i32),
            ParsedVector::Int(v) => v,
        }
    }
}

fn numbers<T: std::str::FromStr>(token: &str) -> Vec<T> {
    NUMBER
        .find_iter(token)
        .filter_map(|m| m.as_str().parse::<T>().ok())
        .collect()
}

/// Two or three numbers; a missing third component is zero.
fn parse_vector(token: &str) -> Option<ParsedVector> {
    if INT_VECTOR_MARKER.is_match(token) {
        match *numbers::<i32>(token).as_slice() {
            [x, y, z] => Some(ParsedVector::Int(Vec3Int::new(x, y, z))),
            [x, y] => Some(ParsedVector::Int(Vec3Int::new(x, y, 0))),
            _ => None,
        }
    } else {
        match *numbers::<f32>(token).as_slice() {
            [x, y, z] => Some(ParsedVector::Float(Vec3::new(x, y, z))),
            [x, y] => Some(ParsedVector::Float(Vec2::new(x, y).into())),
            _ => None,
        }
    }
}

/// Hex first (its digits would otherwise read as channels), then 1–4 numeric
/// channels, then a color name.
fn parse_color(token: &str) -> Option<Color> {
    let trimmed = token.trim();
    if trimmed.starts_with('#') {
        return Color::parse_html(trimmed);
    }
    let channels = numbers::<f32>(trimmed);
    if channels.is_empty() {
        Color::parse_html(trimmed)
    } else {
        Color::from_channels(&channels)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::EnumType;

    const QUALITY: EnumType = EnumType::new("Quality", &["Low", "Medium", "High"]);

    #[test]
    fn empty_token_is_absent_not_zero() {
        assert_eq!(coerce("", &ValueType::Int), None);
        assert_eq!(coerce("   ", &ValueType::Str), None);
        assert_eq!(coerce("", &ValueType::Bool), None);
    }

    #[test]
    fn only_true_is_true() {
        assert_eq!(coerce("true", &ValueType::Bool), Some(Value::Bool(true)));
        assert_eq!(coerce("TRUE", &ValueType::Bool), Some(Value::Bool(true)));
        assert_eq!(coerce("false", &ValueType::Bool), Some(Value::Bool(false)));
        assert_eq!(coerce("yes", &ValueType::Bool), Some(Value::Bool(false)));
        assert_eq!(coerce("1", &ValueType::Bool), Some(Value::Bool(false)));
    }

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(coerce("Hello", &ValueType::Str), Some(Value::Str("Hello".into())));
    }

    #[test]
    fn numbers_parse_or_fail() {
        assert_eq!(coerce("42", &ValueType::Int), Some(Value::Int(42)));
        assert_eq!(coerce("-7", &ValueType::Int), Some(Value::Int(-7)));
        assert_eq!(coerce("4.2", &ValueType::Int), None);
        assert_eq!(coerce("7.5", &ValueType::Float), Some(Value::Float(7.5)));
        assert_eq!(coerce("fast", &ValueType::Float), None);
    }

    #[test]
    fn enums_match_names_case_insensitively() {
        let ty = ValueType::Enum(QUALITY);
        assert_eq!(coerce("high", &ty), Some(Value::Enum("High".into())));
        assert_eq!(coerce("ultra", &ty), None);
    }

    #[test]
    fn vector3_takes_two_or_three_numbers() {
        assert_eq!(
            coerce("3,4,5", &ValueType::Vec3),
            Some(Value::Vec3(Vec3::new(3.0, 4.0, 5.0)))
        );
        assert_eq!(
            coerce("3,4", &ValueType::Vec3),
            Some(Value::Vec3(Vec3::new(3.0, 4.0, 0.0)))
        );
        assert_eq!(
            coerce("(-1.5,2.25,0)", &ValueType::Vec3),
            Some(Value::Vec3(Vec3::new(-1.5, 2.25, 0.0)))
        );
        assert_eq!(coerce("3", &ValueType::Vec3), None);
        assert_eq!(coerce("1,2,3,4", &ValueType::Vec3), None);
    }

    #[test]
    fn int_marker_builds_integer_vectors() {
        assert_eq!(
            coerce("1,2,3:int", &ValueType::Vec3Int),
            Some(Value::Vec3Int(Vec3Int::new(1, 2, 3)))
        );
        assert_eq!(
            coerce("1,2:int", &ValueType::Vec3Int),
            Some(Value::Vec3Int(Vec3Int::new(1, 2, 0)))
        );
        assert_eq!(
            coerce("5,6:int", &ValueType::Vec2),
            Some(Value::Vec2(Vec2::new(5.0, 6.0)))
        );
        assert_eq!(
            coerce("2.9,-3.9", &ValueType::Vec2Int),
            Some(Value::Vec2Int(Vec2Int::new(2, -3)))
        );
    }

    #[test]
    fn color_channels_names_and_hex() {
        assert_eq!(
            coerce("0.5,0.25", &ValueType::Color),
            Some(Value::Color(Color::rgba(0.5, 0.25, 1.0, 1.0)))
        );
        assert_eq!(
            coerce("1,0,0,0.5", &ValueType::Color),
            Some(Value::Color(Color::rgba(1.0, 0.0, 0.0, 0.5)))
        );
        assert_eq!(coerce("red", &ValueType::Color), Some(Value::Color(Color::RED)));
        assert_eq!(coerce("#FF0000", &ValueType::Color), Some(Value::Color(Color::RED)));
        assert_eq!(coerce("mauve", &ValueType::Color), None);
    }

    #[test]
    fn hex_wins_over_embedded_digits() {
        // Read as channels, "#00FF00" would be (0, 0) and "#FF0000" (0).
        assert_eq!(
            coerce("#00FF00", &ValueType::Color),
            Some(Value::Color(Color::rgb(0.0, 1.0, 0.0)))
        );
        assert_eq!(coerce("#ff0000", &ValueType::Color), Some(Value::Color(Color::RED)));
        assert_eq!(coerce("#12345", &ValueType::Color), None);
    }

    #[test]
    fn unsupported_types_fail() {
        assert_eq!(coerce("x", &ValueType::Opaque("Quaternion")), None);
    }

    #[test]
    fn rest_parameter_collects_remaining_tokens() {
        let sig = Signature::new()
            .param("label", ValueType::Str)
            .rest("numbers", ValueType::Int);
        let tokens: Vec<String> = ["sum", "1", "2", "x", "4"].iter().map(|s| (*s).to_string()).collect();
        let args = coerce_args(&tokens, &sig);
        assert_eq!(args.str(0), Some("sum"));
        assert_eq!(
            args.rest(1),
            &[Value::Int(1), Value::Int(2), Value::Int(4)]
        );
    }

    #[test]
    fn missing_positional_arguments_are_absent() {
        let sig = Signature::new()
            .param("name", ValueType::Str)
            .param("gold", ValueType::Int);
        let args = coerce_args(&["Ada".to_string()], &sig);
        assert_eq!(args.len(), 2);
        assert_eq!(args.str(0), Some("Ada"));
        assert_eq!(args.int(1), None);

        let rest_only = Signature::new().rest("numbers", ValueType::Int);
        assert!(coerce_args(&[], &rest_only).rest(0).is_empty());
    }
}
