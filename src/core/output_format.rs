//! Output format configuration for log entries
//!
//! Provides different output formats for log entries:
//! - Text: Human-readable format
//! - Console: Human-readable format with level colours (default)
//! - Json: Machine-readable JSON format
//! - Logfmt: Key-value format compatible with log aggregation tools

use super::field_value::FieldValue;
use super::log_entry::{escape_control, LogEntry};
use super::timestamp::TimestampFormat;
use std::borrow::Cow;

/// Keys written by the layouts themselves; caller fields never replace them.
const RESERVED_KEYS: &[&str] = &[
    "timestamp",
    "level",
    "message",
    "caller",
    "file",
    "line",
    "thread_id",
    "thread_name",
    "error",
    "trace_id",
    "span_id",
    "parent_span_id",
];

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format
    ///
    /// Example: `2025-01-08T10:30:45.123Z INF main.rs:12 > Request processed user=alice`
    Text,

    /// Text format with the level tag coloured; plain text without the `console` feature
    #[default]
    Console,

    /// JSON format for machine processing
    ///
    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"info","message":"Request processed"}`
    Json,

    /// Logfmt format (key=value pairs)
    ///
    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=info message="Request processed"`
    Logfmt,
}

impl OutputFormat {
    /// Format a log entry according to this output format, without a trailing newline
    pub fn format(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => self.format_text(entry, timestamp_format, false),
            OutputFormat::Console => self.format_text(entry, timestamp_format, true),
            OutputFormat::Json => self.format_json(entry, timestamp_format),
            OutputFormat::Logfmt => self.format_logfmt(entry, timestamp_format),
        }
    }

    /// Fields in emission order: caller fields, then error and request context.
    ///
    /// Caller fields and context tags that reuse a key the layouts write
    /// themselves are moved under a `fields.` prefix.
    fn extra_fields(entry: &LogEntry) -> Vec<(Cow<'_, str>, FieldValue)> {
        let mut extras: Vec<(Cow<'_, str>, FieldValue)> = entry
            .fields
            .iter()
            .map(|(k, v)| (Self::unreserved(k), v.clone()))
            .collect();

        if let Some(ref error) = entry.error {
            extras.push((Cow::Borrowed("error"), FieldValue::String(error.clone())));
        }
        if let Some(ref ctx) = entry.context {
            extras.push((Cow::Borrowed("trace_id"), FieldValue::from(ctx.trace_id())));
            extras.push((Cow::Borrowed("span_id"), FieldValue::from(ctx.span_id())));
            if let Some(parent) = ctx.parent_span_id() {
                extras.push((Cow::Borrowed("parent_span_id"), FieldValue::from(parent)));
            }
            for (key, value) in ctx.tags() {
                extras.push((Self::unreserved(key), FieldValue::from(value.as_str())));
            }
        }
        extras
    }

    fn unreserved(key: &str) -> Cow<'_, str> {
        if RESERVED_KEYS.contains(&key) {
            Cow::Owned(format!("fields.{}", key))
        } else {
            Cow::Borrowed(key)
        }
    }

    /// Format as human-readable text
    fn format_text(
        &self,
        entry: &LogEntry,
        timestamp_format: &TimestampFormat,
        colored: bool,
    ) -> String {
        let mut out = timestamp_format.format(&entry.timestamp);
        out.push(' ');
        out.push_str(&Self::level_tag(entry, colored));

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            out.push_str(&format!(" {}:{} >", file, line));
        }

        out.push(' ');
        out.push_str(&entry.message);

        for (key, value) in Self::extra_fields(entry) {
            out.push_str(&format!(
                " {}={}",
                escape_control(&key),
                escape_control(&value.to_string())
            ));
        }
        out
    }

    #[cfg(feature = "console")]
    fn level_tag(entry: &LogEntry, colored: bool) -> String {
        use colored::Colorize;
        let tag = entry.level.short_tag();
        if colored {
            tag.color(entry.level.color_code()).bold().to_string()
        } else {
            tag.to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_tag(entry: &LogEntry, _colored: bool) -> String {
        entry.level.short_tag().to_string()
    }

    /// Format as JSON
    fn format_json(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            self.format_timestamp_json(entry, timestamp_format),
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(entry.level.as_str().to_string()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(entry.message.clone()),
        );
        json_obj.insert(
            "thread_id".to_string(),
            serde_json::Value::String(entry.thread_id.clone()),
        );
        if let Some(ref name) = entry.thread_name {
            json_obj.insert(
                "thread_name".to_string(),
                serde_json::Value::String(name.clone()),
            );
        }
        if let Some(file) = entry.file {
            json_obj.insert("file".to_string(), serde_json::Value::String(file.to_string()));
        }
        if let Some(line) = entry.line {
            json_obj.insert("line".to_string(), serde_json::Value::Number(line.into()));
        }

        for (key, value) in Self::extra_fields(entry) {
            // First writer of a key wins
            json_obj
                .entry(key.into_owned())
                .or_insert_with(|| value.to_json_value());
        }

        serde_json::Value::Object(json_obj).to_string()
    }

    /// Format timestamp for JSON output
    fn format_timestamp_json(
        &self,
        entry: &LogEntry,
        timestamp_format: &TimestampFormat,
    ) -> serde_json::Value {
        match timestamp_format.numeric(&entry.timestamp) {
            Some(n) => serde_json::Value::Number(n.into()),
            None => serde_json::Value::String(timestamp_format.format(&entry.timestamp)),
        }
    }

    /// Format as logfmt (key=value pairs)
    fn format_logfmt(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let mut parts = Vec::new();

        parts.push(format!(
            "timestamp={}",
            self.escape_logfmt_value(&timestamp_format.format(&entry.timestamp))
        ));
        parts.push(format!("level={}", entry.level.as_str()));

        // Message is always quoted
        parts.push(format!("message={}", self.quote_logfmt_value(&entry.message)));

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            parts.push(format!(
                "caller={}",
                self.escape_logfmt_value(&format!("{}:{}", file, line))
            ));
        }

        for (key, value) in Self::extra_fields(entry) {
            let rendered = value.to_string();
            let formatted_value = if value.is_textual() {
                self.escape_logfmt_value(&rendered)
            } else {
                rendered
            };
            parts.push(format!("{}={}", self.escape_logfmt_key(&key), formatted_value));
        }

        parts.join(" ")
    }

    /// Escape a logfmt key (remove spaces and special chars)
    fn escape_logfmt_key(&self, key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
            .collect()
    }

    /// Escape a logfmt value (quote if empty or containing spaces, quotes,
    /// `=` or control characters)
    fn escape_logfmt_value(&self, value: &str) -> String {
        if value.is_empty() || value.contains([' ', '"', '=']) || value.contains(char::is_control) {
            self.quote_logfmt_value(value)
        } else {
            value.to_string()
        }
    }

    /// Quote a logfmt value, escaping backslashes, quotes and line breaks
    fn quote_logfmt_value(&self, value: &str) -> String {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escape_control(&escaped))
    }
}
