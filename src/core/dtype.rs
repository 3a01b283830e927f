//! Purpose: Named scalar dtypes with inference and coercion.
//! Exports: `DType`.
//! Role: Give every column, series, and index level a dtype name that survives the wire format.
//! Invariants: `DType::from_name(d.name()) == d` for every dtype, including unknown names.
//! Invariants: Unknown names are kept literally (`Other`) and never coerce values.
use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::core::scalar::Scalar;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    Object,
    Other(String),
}

impl DType {
    pub fn name(&self) -> &str {
        match self {
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::Object => "object",
            DType::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "int8" => DType::Int8,
            "int16" => DType::Int16,
            "int32" => DType::Int32,
            "int64" => DType::Int64,
            "uint8" => DType::UInt8,
            "uint16" => DType::UInt16,
            "uint32" => DType::UInt32,
            "uint64" => DType::UInt64,
            "float32" => DType::Float32,
            "float64" => DType::Float64,
            "bool" => DType::Bool,
            "object" => DType::Object,
            other => DType::Other(other.to_string()),
        }
    }

    pub fn is_integer(&self) -> bool {
        self.int_bounds().is_some()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    fn int_bounds(&self) -> Option<(i64, i64)> {
        match self {
            DType::Int8 => Some((i8::MIN.into(), i8::MAX.into())),
            DType::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
            DType::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
            DType::Int64 => Some((i64::MIN, i64::MAX)),
            DType::UInt8 => Some((0, u8::MAX.into())),
            DType::UInt16 => Some((0, u16::MAX.into())),
            DType::UInt32 => Some((0, u32::MAX.into())),
            // Values above i64::MAX are carried as floats and rejected here.
            DType::UInt64 => Some((0, i64::MAX)),
            _ => None,
        }
    }

    /// Smallest common dtype for a run of values.
    ///
    /// Integers alone give `int64`; any float (or a null mixed with numbers)
    /// widens to `float64`; booleans alone give `bool`; everything else,
    /// including an empty run, is `object`.
    pub fn infer(values: &[Scalar]) -> Self {
        let mut ints = 0usize;
        let mut floats = 0usize;
        let mut bools = 0usize;
        let mut nulls = 0usize;
        for value in values {
            match value {
                Scalar::Int(_) => ints += 1,
                Scalar::Float(_) => floats += 1,
                Scalar::Bool(_) => bools += 1,
                Scalar::Null => nulls += 1,
                Scalar::Str(_) | Scalar::Tuple(_) => return DType::Object,
            }
        }
        let numeric = ints + floats;
        if numeric > 0 && bools == 0 {
            if floats == 0 && nulls == 0 {
                DType::Int64
            } else {
                DType::Float64
            }
        } else if bools > 0 && numeric == 0 && nulls == 0 {
            DType::Bool
        } else {
            DType::Object
        }
    }

    pub fn coerce(&self, value: Scalar) -> Result<Scalar, Error> {
        if let Some((min, max)) = self.int_bounds() {
            let coerced = match &value {
                Scalar::Int(v) if (min..=max).contains(v) => Some(*v),
                Scalar::Float(f)
                    if f.is_finite()
                        && f.fract() == 0.0
                        && *f >= min as f64
                        && *f < max as f64 + 1.0 =>
                {
                    Some(*f as i64)
                }
                Scalar::Bool(b) => Some(i64::from(*b)),
                _ => None,
            };
            return coerced
                .map(Scalar::Int)
                .ok_or_else(|| self.coerce_error(&value));
        }
        match self {
            DType::Float32 | DType::Float64 => {
                let widened = match &value {
                    Scalar::Int(v) => *v as f64,
                    Scalar::Float(f) => *f,
                    Scalar::Bool(b) => f64::from(u8::from(*b)),
                    Scalar::Null => f64::NAN,
                    _ => return Err(self.coerce_error(&value)),
                };
                if *self == DType::Float32 {
                    Ok(Scalar::Float(f64::from(widened as f32)))
                } else {
                    Ok(Scalar::Float(widened))
                }
            }
            DType::Bool => match value {
                Scalar::Bool(_) => Ok(value),
                other => Err(self.coerce_error(&other)),
            },
            _ => Ok(value),
        }
    }

    pub fn coerce_all(&self, values: Vec<Scalar>) -> Result<Vec<Scalar>, Error> {
        values.into_iter().map(|value| self.coerce(value)).collect()
    }

    fn coerce_error(&self, value: &Scalar) -> Error {
        Error::new(ErrorKind::Validation)
            .with_message(format!("cannot represent {value} as {}", self.name()))
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for DType {
    fn from(name: &str) -> Self {
        DType::from_name(name)
    }
}
