//! Typed attribute values stored on a record

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::time::Duration;

/// Kind tag of an [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Any = 0,
    Bool = 1,
    Duration = 2,
    Float64 = 3,
    Float32 = 4,
    Int64 = 5,
    String = 6,
    Time = 7,
    Uint64 = 8,
}

impl Kind {
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decode a raw tag. Unknown tags yield `None`.
    pub fn from_tag(tag: u8) -> Option<Kind> {
        Some(match tag {
            0 => Kind::Any,
            1 => Kind::Bool,
            2 => Kind::Duration,
            3 => Kind::Float64,
            4 => Kind::Float32,
            5 => Kind::Int64,
            6 => Kind::String,
            7 => Kind::Time,
            8 => Kind::Uint64,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Any => "any",
            Kind::Bool => "bool",
            Kind::Duration => "duration",
            Kind::Float64 => "float64",
            Kind::Float32 => "float32",
            Kind::Int64 => "int64",
            Kind::String => "string",
            Kind::Time => "time",
            Kind::Uint64 => "uint64",
        }
    }
}

/// One typed field of a log record.
///
/// Floats are held as their IEEE-754 bit patterns so the value handed to the
/// sink is bit-for-bit the one the caller supplied, NaN payloads and signed
/// zeros included.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Any(serde_json::Value),
    Bool(bool),
    /// Nanoseconds
    Duration(u64),
    Float64(u64),
    Float32(u32),
    Int64(i64),
    String(Cow<'static, str>),
    Time(DateTime<Utc>),
    Uint64(u64),
}

impl Attribute {
    pub fn kind(&self) -> Kind {
        match self {
            Attribute::Any(_) => Kind::Any,
            Attribute::Bool(_) => Kind::Bool,
            Attribute::Duration(_) => Kind::Duration,
            Attribute::Float64(_) => Kind::Float64,
            Attribute::Float32(_) => Kind::Float32,
            Attribute::Int64(_) => Kind::Int64,
            Attribute::String(_) => Kind::String,
            Attribute::Time(_) => Kind::Time,
            Attribute::Uint64(_) => Kind::Uint64,
        }
    }

    /// Encode a duration as saturating nanoseconds.
    pub fn duration(value: Duration) -> Self {
        Attribute::Duration(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn float32(value: f32) -> Self {
        Attribute::Float32(value.to_bits())
    }

    pub fn float64(value: f64) -> Self {
        Attribute::Float64(value.to_bits())
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Attribute::Duration(nanos) => Some(Duration::from_nanos(*nanos)),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Attribute::Float32(bits) => Some(f32::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Attribute::Float64(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}
