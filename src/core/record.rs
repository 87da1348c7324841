//! Mutable log record and the field setters that populate it
//!
//! A [`Record`] is the scratch space a log call writes its attributes into
//! before they are handed to the sink. Records come from a
//! [`RecordPool`](super::pool::RecordPool) and are cleared on release.
//!
//! Callers never touch a record directly; they pass an ordered list of
//! [`Field`] values, each of which mutates the record when applied.

use super::attribute::Attribute;
use super::context::RequestContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Error value attached to a record.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Attribute key; literals are borrowed, computed keys owned.
pub type FieldKey = Cow<'static, str>;

#[derive(Debug, Default)]
pub struct Record {
    attrs: HashMap<FieldKey, Attribute>,
    context: Option<Arc<RequestContext>>,
    error: Option<SharedError>,
    message: String,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any earlier value.
    ///
    /// Keys are trimmed; a key that is empty after trimming is ignored.
    pub fn add_attr(&mut self, key: impl Into<FieldKey>, value: Attribute) {
        if let Some(key) = normalize_key(key.into()) {
            self.attrs.insert(key, value);
        }
    }

    pub fn set_context(&mut self, context: Option<Arc<RequestContext>>) {
        self.context = context;
    }

    pub fn set_error(&mut self, error: Option<SharedError>) {
        self.error = error;
    }

    /// Replace the message, reusing the existing buffer.
    pub fn set_message(&mut self, message: &str) {
        self.message.clear();
        self.message.push_str(message);
    }

    pub fn attr(&self, key: &str) -> Option<&Attribute> {
        self.attrs.get(key)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attrs.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn context(&self) -> Option<&Arc<RequestContext>> {
        self.context.as_ref()
    }

    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when no attribute, context, error or message is set.
    pub fn is_clear(&self) -> bool {
        self.attrs.is_empty()
            && self.context.is_none()
            && self.error.is_none()
            && self.message.is_empty()
    }

    /// Reset every field. The attribute map keeps its allocation.
    pub fn clear(&mut self) {
        self.attrs.clear();
        self.context = None;
        self.error = None;
        self.message.clear();
    }
}

fn normalize_key(key: FieldKey) -> Option<FieldKey> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() == key.len() {
        Some(key)
    } else {
        Some(Cow::Owned(trimmed.to_owned()))
    }
}

type CustomSetter = Box<dyn FnOnce(&mut Record) + Send>;

enum FieldOp {
    Attr(FieldKey, Attribute),
    Context(Option<Arc<RequestContext>>),
    Error(Option<SharedError>),
    Custom(CustomSetter),
    Skip,
}

/// A single mutation applied to a [`Record`].
///
/// Fields are applied in the order given; a later field for the same key wins.
///
/// # Example
///
/// ```
/// use rust_log_facade::{int, string, Record};
///
/// let mut record = Record::new();
/// for field in [string("user", "alice"), int("attempt", 3), int("attempt", 4)] {
///     field.apply(&mut record);
/// }
/// assert_eq!(record.len(), 2);
/// ```
pub struct Field(FieldOp);

impl Field {
    /// Wrap an arbitrary setter.
    pub fn with<F>(setter: F) -> Self
    where
        F: FnOnce(&mut Record) + Send + 'static,
    {
        Field(FieldOp::Custom(Box::new(setter)))
    }

    fn attr(key: impl Into<FieldKey>, value: Attribute) -> Self {
        Field(FieldOp::Attr(key.into(), value))
    }

    pub fn apply(self, record: &mut Record) {
        match self.0 {
            FieldOp::Attr(key, value) => record.add_attr(key, value),
            FieldOp::Context(ctx) => record.set_context(ctx),
            FieldOp::Error(err) => record.set_error(err),
            FieldOp::Custom(setter) => setter(record),
            FieldOp::Skip => {}
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            FieldOp::Attr(key, value) => f.debug_tuple("Field").field(key).field(value).finish(),
            FieldOp::Context(ctx) => f.debug_tuple("Field::Context").field(ctx).finish(),
            FieldOp::Error(err) => f.debug_tuple("Field::Error").field(err).finish(),
            FieldOp::Custom(_) => f.write_str("Field::Custom"),
            FieldOp::Skip => f.write_str("Field::Skip"),
        }
    }
}

/// Opaque attribute for values without a narrower kind.
///
/// The value is captured through `serde`. Values that serialise to `null`
/// (such as `None`) or fail to serialise are dropped.
pub fn any<T: Serialize + ?Sized>(key: impl Into<FieldKey>, value: &T) -> Field {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Null) | Err(_) => Field(FieldOp::Skip),
        Ok(json) => Field::attr(key, Attribute::Any(json)),
    }
}

pub fn bool(key: impl Into<FieldKey>, value: bool) -> Field {
    Field::attr(key, Attribute::Bool(value))
}

/// Duration attribute, stored as nanoseconds saturating at `u64::MAX`.
pub fn duration(key: impl Into<FieldKey>, value: Duration) -> Field {
    Field::attr(key, Attribute::duration(value))
}

pub fn float32(key: impl Into<FieldKey>, value: f32) -> Field {
    Field::attr(key, Attribute::float32(value))
}

pub fn float64(key: impl Into<FieldKey>, value: f64) -> Field {
    Field::attr(key, Attribute::float64(value))
}

/// Platform-width integer, widened to 64 bits.
pub fn int(key: impl Into<FieldKey>, value: isize) -> Field {
    Field::attr(key, Attribute::Int64(value as i64))
}

pub fn int64(key: impl Into<FieldKey>, value: i64) -> Field {
    Field::attr(key, Attribute::Int64(value))
}

pub fn string(key: impl Into<FieldKey>, value: impl Into<Cow<'static, str>>) -> Field {
    Field::attr(key, Attribute::String(value.into()))
}

/// Wall-clock timestamp. Accepts `DateTime<Utc>` or `SystemTime`.
pub fn time(key: impl Into<FieldKey>, value: impl Into<DateTime<Utc>>) -> Field {
    Field::attr(key, Attribute::Time(value.into()))
}

pub fn uint64(key: impl Into<FieldKey>, value: u64) -> Field {
    Field::attr(key, Attribute::Uint64(value))
}

/// Attach a request context, replacing any earlier one.
pub fn context(ctx: Arc<RequestContext>) -> Field {
    Field(FieldOp::Context(Some(ctx)))
}

/// Attach an error, replacing any earlier one.
pub fn err<E>(error: E) -> Field
where
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    Field(FieldOp::Error(Some(Arc::from(error.into()))))
}

/// Attach an already shared error; `None` clears it.
pub fn shared_err(error: Option<SharedError>) -> Field {
    Field(FieldOp::Error(error))
}
