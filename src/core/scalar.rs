//! Purpose: Cell and label values for tables, series, and axis indexes.
//! Exports: `Scalar`.
//! Role: Bridge between in-memory data and native JSON values.
//! Invariants: Tuples become arrays; non-finite floats become `{"$float": "NaN" | "Infinity" | "-Infinity"}`.
//! Invariants: `from_json(to_json(x)) == x` for every scalar.
//! Invariants: Equality treats NaN as equal to NaN so missing values compare positionally.
use serde_json::{Map, Number, Value};
use std::fmt;

use crate::core::error::{Error, ErrorKind};

/// Key of the one-field object that carries a non-finite float.
const NON_FINITE_KEY: &str = "$float";

#[derive(Clone, Debug)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Scalar>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(value) => Value::Bool(*value),
            Scalar::Int(value) => Value::Number((*value).into()),
            Scalar::Float(value) => match Number::from_f64(*value) {
                Some(number) => Value::Number(number),
                None => non_finite_json(*value),
            },
            Scalar::Str(value) => Value::String(value.clone()),
            Scalar::Tuple(items) => Value::Array(items.iter().map(Scalar::to_json).collect()),
        }
    }

    /// Converts a JSON value into a scalar; the only object accepted is a non-finite float.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(value) => Ok(Scalar::Bool(*value)),
            Value::Number(number) => Ok(number_to_scalar(number)),
            Value::String(value) => Ok(Scalar::Str(value.clone())),
            Value::Array(items) => items
                .iter()
                .map(Scalar::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Scalar::Tuple),
            Value::Object(map) => non_finite_from_json(map).map(Scalar::Float).ok_or_else(|| {
                Error::new(ErrorKind::Decode)
                    .with_message("JSON objects are not valid table cells or labels")
            }),
        }
    }
}

fn non_finite_json(value: f64) -> Value {
    let token = if value.is_nan() {
        "NaN"
    } else if value > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    };
    let mut map = Map::new();
    map.insert(NON_FINITE_KEY.to_string(), Value::from(token));
    Value::Object(map)
}

fn non_finite_from_json(map: &Map<String, Value>) -> Option<f64> {
    if map.len() != 1 {
        return None;
    }
    match map.get(NON_FINITE_KEY)?.as_str()? {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

fn number_to_scalar(number: &Number) -> Scalar {
    if let Some(value) = number.as_i64() {
        return Scalar::Int(value);
    }
    // u64 beyond i64::MAX and all fractional numbers land here.
    Scalar::Float(number.as_f64().unwrap_or(f64::NAN))
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Tuple(a), Scalar::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Str(value) => f.write_str(value),
            Scalar::Tuple(items) => {
                f.write_str("(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}
