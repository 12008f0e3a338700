//! Typed values and the tags that select their memory layout

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::os::raw::c_long;
use std::str::FromStr;

/// Width of the boolean representation (a C++ `bool`)
pub const BOOL_SIZE: usize = 1;

/// Three packed 32-bit floats
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3 { x, y, z }
    }
}

/// Four packed 32-bit floats, laid out `w x y z` in memory
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct Vector4 {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector4 {
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Vector4 { w, x, y, z }
    }
}

/// A value read from or written to process memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum MemoryValue {
    Int(i32),
    Dword(u32),
    Long(c_long),
    Float(f32),
    Double(f64),
    Pointer(usize),
    Bool(bool),
    String(String),
    Vector3(Vector3),
    Vector4(Vector4),
}

impl MemoryValue {
    /// Returns the size in bytes of the encoded value
    pub fn size(&self) -> usize {
        match self {
            MemoryValue::String(s) => s.len(),
            other => other.value_type().size().unwrap_or(0),
        }
    }

    /// Encodes the value in the target's little-endian layout.
    ///
    /// Strings are raw bytes with no terminator appended.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MemoryValue::Int(v) => v.to_le_bytes().to_vec(),
            MemoryValue::Dword(v) => v.to_le_bytes().to_vec(),
            MemoryValue::Long(v) => v.to_le_bytes().to_vec(),
            MemoryValue::Float(v) => v.to_le_bytes().to_vec(),
            MemoryValue::Double(v) => v.to_le_bytes().to_vec(),
            MemoryValue::Pointer(v) => v.to_le_bytes().to_vec(),
            MemoryValue::Bool(v) => vec![u8::from(*v)],
            MemoryValue::String(s) => s.as_bytes().to_vec(),
            MemoryValue::Vector3(v) => [v.x, v.y, v.z]
                .iter()
                .flat_map(|f| f.to_le_bytes())
                .collect(),
            MemoryValue::Vector4(v) => [v.w, v.x, v.y, v.z]
                .iter()
                .flat_map(|f| f.to_le_bytes())
                .collect(),
        }
    }

    /// Decodes a value of the given type from exactly its encoded bytes
    pub fn from_bytes(bytes: &[u8], value_type: ValueType) -> MemoryResult<Self> {
        if let Some(expected) = value_type.size() {
            if bytes.len() != expected {
                return Err(MemoryError::InvalidArgument(format!(
                    "{} needs {} bytes, got {}",
                    value_type,
                    expected,
                    bytes.len()
                )));
            }
        }

        let value = match value_type {
            ValueType::Int => MemoryValue::Int(i32::from_le_bytes(fixed(bytes)?)),
            ValueType::Dword => MemoryValue::Dword(u32::from_le_bytes(fixed(bytes)?)),
            ValueType::Long => MemoryValue::Long(c_long::from_le_bytes(fixed(bytes)?)),
            ValueType::Float => MemoryValue::Float(f32::from_le_bytes(fixed(bytes)?)),
            ValueType::Double => MemoryValue::Double(f64::from_le_bytes(fixed(bytes)?)),
            ValueType::Pointer => MemoryValue::Pointer(usize::from_le_bytes(fixed(bytes)?)),
            ValueType::Bool => MemoryValue::Bool(fixed::<BOOL_SIZE>(bytes)?[0] != 0),
            ValueType::String => MemoryValue::String(String::from_utf8(bytes.to_vec())?),
            ValueType::Vector3 => {
                let f = floats::<3>(bytes)?;
                MemoryValue::Vector3(Vector3::new(f[0], f[1], f[2]))
            }
            ValueType::Vector4 => {
                let f = floats::<4>(bytes)?;
                MemoryValue::Vector4(Vector4::new(f[0], f[1], f[2], f[3]))
            }
        };
        Ok(value)
    }

    /// Gets the value type enum for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::Int(_) => ValueType::Int,
            MemoryValue::Dword(_) => ValueType::Dword,
            MemoryValue::Long(_) => ValueType::Long,
            MemoryValue::Float(_) => ValueType::Float,
            MemoryValue::Double(_) => ValueType::Double,
            MemoryValue::Pointer(_) => ValueType::Pointer,
            MemoryValue::Bool(_) => ValueType::Bool,
            MemoryValue::String(_) => ValueType::String,
            MemoryValue::Vector3(_) => ValueType::Vector3,
            MemoryValue::Vector4(_) => ValueType::Vector4,
        }
    }

    /// Converts a caller-supplied value to the layout selected by `target`.
    ///
    /// Numbers convert between numeric tags when the value fits; strings and
    /// vectors only match their own tag.
    pub fn coerce(self, target: ValueType) -> MemoryResult<MemoryValue> {
        let source = self.value_type();
        if source == target {
            return Ok(self);
        }

        let mismatch = || {
            MemoryError::InvalidArgument(format!("cannot encode a {} value as {}", source, target))
        };
        let out_of_range = |raw: i128| {
            MemoryError::InvalidArgument(format!("{} does not fit in {}", raw, target))
        };

        let value = match target {
            ValueType::Int => {
                let raw = self.as_integer().ok_or_else(mismatch)?;
                MemoryValue::Int(i32::try_from(raw).map_err(|_| out_of_range(raw))?)
            }
            ValueType::Dword => {
                let raw = self.as_integer().ok_or_else(mismatch)?;
                MemoryValue::Dword(u32::try_from(raw).map_err(|_| out_of_range(raw))?)
            }
            ValueType::Long => {
                let raw = self.as_integer().ok_or_else(mismatch)?;
                MemoryValue::Long(c_long::try_from(raw).map_err(|_| out_of_range(raw))?)
            }
            ValueType::Pointer => {
                let raw = self.as_integer().ok_or_else(mismatch)?;
                MemoryValue::Pointer(usize::try_from(raw).map_err(|_| out_of_range(raw))?)
            }
            ValueType::Float => MemoryValue::Float(self.as_float().ok_or_else(mismatch)? as f32),
            ValueType::Double => MemoryValue::Double(self.as_float().ok_or_else(mismatch)?),
            ValueType::Bool => MemoryValue::Bool(self.as_integer().ok_or_else(mismatch)? != 0),
            ValueType::String | ValueType::Vector3 | ValueType::Vector4 => return Err(mismatch()),
        };
        Ok(value)
    }

    fn as_integer(&self) -> Option<i128> {
        match self {
            MemoryValue::Int(v) => Some(i128::from(*v)),
            MemoryValue::Dword(v) => Some(i128::from(*v)),
            MemoryValue::Long(v) => Some(i128::from(*v)),
            MemoryValue::Pointer(v) => i128::try_from(*v).ok(),
            MemoryValue::Bool(v) => Some(i128::from(*v)),
            MemoryValue::Float(v) => integral(f64::from(*v)),
            MemoryValue::Double(v) => integral(*v),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            MemoryValue::Int(v) => Some(f64::from(*v)),
            MemoryValue::Dword(v) => Some(f64::from(*v)),
            MemoryValue::Long(v) => Some(*v as f64),
            MemoryValue::Pointer(v) => Some(*v as f64),
            MemoryValue::Float(v) => Some(f64::from(*v)),
            MemoryValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

fn integral(v: f64) -> Option<i128> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1.0e38 {
        Some(v as i128)
    } else {
        None
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> MemoryResult<[u8; N]> {
    bytes.try_into().map_err(|_| {
        MemoryError::InvalidArgument(format!("expected {} bytes, got {}", N, bytes.len()))
    })
}

fn floats<const N: usize>(bytes: &[u8]) -> MemoryResult<[f32; N]> {
    let mut out = [0f32; N];
    for (slot, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        *slot = f32::from_le_bytes(fixed(chunk)?);
    }
    Ok(out)
}

/// Tag selecting the width and encoding of a [`MemoryValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Dword,
    Long,
    Float,
    Double,
    Pointer,
    Bool,
    String,
    Vector3,
    Vector4,
}

impl ValueType {
    /// Every supported tag
    pub const ALL: [ValueType; 10] = [
        ValueType::Int,
        ValueType::Dword,
        ValueType::Long,
        ValueType::Float,
        ValueType::Double,
        ValueType::Pointer,
        ValueType::Bool,
        ValueType::String,
        ValueType::Vector3,
        ValueType::Vector4,
    ];

    /// Returns the size in bytes for this value type, `None` for strings
    pub fn size(&self) -> Option<usize> {
        match self {
            ValueType::Int | ValueType::Dword | ValueType::Float => Some(4),
            ValueType::Double => Some(8),
            ValueType::Long => Some(std::mem::size_of::<c_long>()),
            ValueType::Pointer => Some(std::mem::size_of::<usize>()),
            ValueType::Bool => Some(BOOL_SIZE),
            ValueType::Vector3 => Some(12),
            ValueType::Vector4 => Some(16),
            ValueType::String => None,
        }
    }

    /// Canonical tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Dword => "dword",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Pointer => "pointer",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Vector3 => "vector3",
            ValueType::Vector4 => "vector4",
        }
    }
}

impl FromStr for ValueType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ValueType::Int),
            "dword" => Ok(ValueType::Dword),
            "long" => Ok(ValueType::Long),
            "float" => Ok(ValueType::Float),
            "double" => Ok(ValueType::Double),
            "pointer" | "ptr" => Ok(ValueType::Pointer),
            "bool" | "boolean" => Ok(ValueType::Bool),
            "string" | "str" => Ok(ValueType::String),
            "vector3" | "vec3" => Ok(ValueType::Vector3),
            "vector4" | "vec4" => Ok(ValueType::Vector4),
            other => Err(MemoryError::InvalidArgument(format!(
                "unexpected data type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::Int(v) => write!(f, "{}", v),
            MemoryValue::Dword(v) => write!(f, "{}", v),
            MemoryValue::Long(v) => write!(f, "{}", v),
            MemoryValue::Float(v) => write!(f, "{}", v),
            MemoryValue::Double(v) => write!(f, "{}", v),
            MemoryValue::Pointer(v) => write!(f, "0x{:X}", v),
            MemoryValue::Bool(v) => write!(f, "{}", v),
            MemoryValue::String(s) => write!(f, "\"{}\"", s),
            MemoryValue::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            MemoryValue::Vector4(v) => write!(f, "({}, {}, {}, {})", v.w, v.x, v.y, v.z),
        }
    }
}

/// Fixed-width scalars that can be copied to and from little-endian bytes
pub trait Primitive: Copy {
    const SIZE: usize;

    fn from_le_slice(bytes: &[u8]) -> MemoryResult<Self>;

    fn to_le_vec(self) -> Vec<u8>;
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> MemoryResult<Self> {
                    Ok(<$ty>::from_le_bytes(fixed(bytes)?))
                }

                fn to_le_vec(self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }
            }
        )*
    };
}

impl_primitive!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, usize, isize);
