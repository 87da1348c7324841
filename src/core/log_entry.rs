//! Log entry structure

use super::context::RequestContext;
use super::field_value::FieldValue;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::panic::Location;
use std::sync::Arc;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Escape newlines, carriage returns and tabs so caller text cannot start a
/// fake log line.
pub(crate) fn escape_control(text: &str) -> String {
    if !text.contains(['\n', '\r', '\t']) {
        return text.to_string();
    }
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// A finished event as handed to output formats.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    pub fields: Vec<(String, FieldValue)>,
    pub error: Option<String>,
    pub context: Option<Arc<RequestContext>>,
}

impl LogEntry {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            message: String::new(),
            timestamp: Utc::now(),
            file: None,
            line: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            fields: Vec::new(),
            error: None,
            context: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.set_message(message);
        self
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = escape_control(message);
    }

    pub fn set_location(&mut self, location: &'static Location<'static>) {
        self.file = Some(location.file());
        self.line = Some(location.line());
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.push_field(key, value.into());
        self
    }

    pub fn push_field(&mut self, key: &str, value: FieldValue) {
        self.fields.push((key.to_string(), value));
    }

    #[cfg(test)]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let entry = LogEntry::new(LogLevel::Info).with_message("a\nb\tc\r");
        assert_eq!(entry.message, "a\\nb\\tc\\r");
    }

    #[test]
    fn test_escape_control_leaves_plain_text() {
        assert_eq!(escape_control("plain value"), "plain value");
        assert_eq!(escape_control("x\r\ny"), "x\\r\\ny");
    }

    #[test]
    fn test_location() {
        let mut entry = LogEntry::new(LogLevel::Warn);
        entry.set_location(Location::caller());
        assert_eq!(entry.file, Some(file!()));
        assert!(entry.line.is_some());
    }

    #[test]
    fn test_thread_info_cached() {
        let a = LogEntry::new(LogLevel::Info);
        let b = LogEntry::new(LogLevel::Info);
        assert_eq!(a.thread_id, b.thread_id);
        assert_eq!(a.thread_name, b.thread_name);
    }

    #[test]
    fn test_fields() {
        let entry = LogEntry::new(LogLevel::Info)
            .with_field("user", "alice")
            .with_field("attempt", 3i64);
        assert_eq!(entry.field("user"), Some(&FieldValue::from("alice")));
        assert_eq!(entry.field("attempt"), Some(&FieldValue::Int(3)));
        assert_eq!(entry.field("missing"), None);
    }
}
