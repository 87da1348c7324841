//! Level-gated dispatch of log calls into an event sink
//!
//! A call is first checked against the sink's level. Suppressed calls return
//! before a record is acquired, so a disabled level costs one comparison.
//! Admitted calls fill a pooled record from the caller's fields and transfer
//! it into the sink's event.

use super::attribute::Attribute;
use super::log_level::LogLevel;
use super::pool::RecordPool;
use super::record::Field;
use super::sink::{Event, EventSink};
use std::panic::Location;
use std::time::Duration;

/// Emit `msg` with `fields` at `level` through `sink`.
///
/// `Trace` and `Debug` are only materialised when the sink is currently
/// configured at (or below) that level; the sink is not even asked for an
/// event otherwise. Other severities defer to the sink's own gate. `NoLevel`
/// and `Disabled` are never emitted.
///
/// Termination after `Fatal` / `Panic` is performed by the sink's event when
/// it is finalised.
#[track_caller]
pub fn dispatch<S, I>(sink: &S, pool: &RecordPool, level: LogLevel, msg: &str, fields: I)
where
    S: EventSink,
    I: IntoIterator<Item = Field>,
{
    let event = match level {
        LogLevel::Trace => {
            if sink.level() == LogLevel::Trace {
                sink.event(level)
            } else {
                None
            }
        }
        LogLevel::Debug => {
            let min = sink.level();
            if min == LogLevel::Debug || min == LogLevel::Trace {
                sink.event(level)
            } else {
                None
            }
        }
        LogLevel::Info
        | LogLevel::Warn
        | LogLevel::Error
        | LogLevel::Fatal
        | LogLevel::Panic => sink.event(level),
        LogLevel::NoLevel | LogLevel::Disabled => None,
    };

    if let Some(event) = event {
        emit(event, pool, msg, fields, Location::caller());
    }
}

fn emit<E, I>(
    mut event: E,
    pool: &RecordPool,
    msg: &str,
    fields: I,
    caller: &'static Location<'static>,
) where
    E: Event,
    I: IntoIterator<Item = Field>,
{
    let mut record = pool.acquire();
    for field in fields {
        field.apply(&mut record);
    }
    record.set_message(msg);

    event.caller(caller);
    if let Some(ctx) = record.context() {
        event.context(ctx);
    }
    if let Some(err) = record.error() {
        event.error(&**err);
    }

    for (key, attr) in record.attrs() {
        match attr {
            Attribute::Any(value) => event.any(key, value),
            Attribute::Bool(value) => event.bool(key, *value),
            Attribute::Duration(nanos) => event.duration(key, Duration::from_nanos(*nanos)),
            Attribute::Float64(bits) => event.float64(key, f64::from_bits(*bits)),
            Attribute::Float32(bits) => event.float32(key, f32::from_bits(*bits)),
            Attribute::Int64(value) => event.int64(key, *value),
            Attribute::String(value) => event.str(key, value),
            Attribute::Time(value) => event.time(key, value),
            Attribute::Uint64(value) => event.uint64(key, *value),
        }
    }

    // The record goes back to the pool after this, even if finalising unwinds.
    event.msg(record.message());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::RequestContext;
    use crate::core::record::{
        any, bool, context, duration, err, float32, float64, int, string, time, uint64,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::{Cell, RefCell};
    use std::error::Error;
    use std::sync::Arc;

    #[derive(Debug, Default, Clone)]
    struct Emitted {
        level: Option<LogLevel>,
        message: String,
        fields: Vec<(String, String)>,
        error: Option<String>,
        trace_id: Option<String>,
        caller_file: Option<&'static str>,
    }

    impl Emitted {
        fn field(&self, key: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    struct MockSink {
        min: LogLevel,
        requested: Cell<usize>,
        emitted: RefCell<Vec<Emitted>>,
    }

    impl MockSink {
        fn new(min: LogLevel) -> Self {
            Self {
                min,
                requested: Cell::new(0),
                emitted: RefCell::new(Vec::new()),
            }
        }
    }

    struct MockEvent<'a> {
        sink: &'a MockSink,
        current: Emitted,
    }

    impl MockEvent<'_> {
        fn push(&mut self, key: &str, value: String) {
            self.current.fields.push((key.to_string(), value));
        }
    }

    impl Event for MockEvent<'_> {
        fn caller(&mut self, location: &'static Location<'static>) {
            self.current.caller_file = Some(location.file());
        }
        fn context(&mut self, ctx: &Arc<RequestContext>) {
            self.current.trace_id = Some(ctx.trace_id().to_string());
        }
        fn error(&mut self, err: &(dyn Error + Send + Sync + 'static)) {
            self.current.error = Some(err.to_string());
        }
        fn any(&mut self, key: &str, value: &serde_json::Value) {
            self.push(key, format!("any:{}", value));
        }
        fn bool(&mut self, key: &str, value: bool) {
            self.push(key, format!("bool:{}", value));
        }
        fn duration(&mut self, key: &str, value: Duration) {
            self.push(key, format!("duration:{}", value.as_nanos()));
        }
        fn float32(&mut self, key: &str, value: f32) {
            self.push(key, format!("float32:{:#x}", value.to_bits()));
        }
        fn float64(&mut self, key: &str, value: f64) {
            self.push(key, format!("float64:{:#x}", value.to_bits()));
        }
        fn int64(&mut self, key: &str, value: i64) {
            self.push(key, format!("int64:{}", value));
        }
        fn str(&mut self, key: &str, value: &str) {
            self.push(key, format!("string:{}", value));
        }
        fn time(&mut self, key: &str, value: &DateTime<Utc>) {
            self.push(key, format!("time:{}", value.timestamp_millis()));
        }
        fn uint64(&mut self, key: &str, value: u64) {
            self.push(key, format!("uint64:{}", value));
        }
        fn msg(mut self, message: &str) {
            self.current.message = message.to_string();
            self.sink.emitted.borrow_mut().push(self.current);
        }
    }

    impl EventSink for MockSink {
        type Event<'a> = MockEvent<'a>;

        fn level(&self) -> LogLevel {
            self.min
        }

        fn event(&self, level: LogLevel) -> Option<MockEvent<'_>> {
            self.requested.set(self.requested.get() + 1);
            level.is_enabled(self.min).then(|| MockEvent {
                sink: self,
                current: Emitted {
                    level: Some(level),
                    ..Emitted::default()
                },
            })
        }
    }

    #[test]
    fn test_admitted_event_carries_fields() {
        let sink = MockSink::new(LogLevel::Info);
        let pool = RecordPool::new(4);

        dispatch(
            &sink,
            &pool,
            LogLevel::Warn,
            "login failed",
            [string("user", "alice"), int("attempt", 3)],
        );

        let emitted = sink.emitted.borrow();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].level, Some(LogLevel::Warn));
        assert_eq!(emitted[0].message, "login failed");
        assert_eq!(emitted[0].field("user"), Some("string:alice"));
        assert_eq!(emitted[0].field("attempt"), Some("int64:3"));
        assert_eq!(emitted[0].caller_file, Some(file!()));
        assert_eq!(pool.stats().acquired(), 1);
        assert_eq!(pool.stats().outstanding(), 0);
    }

    #[test]
    fn test_suppressed_level_touches_nothing() {
        let sink = MockSink::new(LogLevel::Warn);
        let pool = RecordPool::new(4);

        dispatch(&sink, &pool, LogLevel::Info, "quiet", [string("k", "v")]);

        assert!(sink.emitted.borrow().is_empty());
        assert_eq!(sink.requested.get(), 1);
        assert_eq!(pool.stats().acquired(), 0);
    }

    #[test]
    fn test_trace_and_debug_skip_event_creation() {
        let sink = MockSink::new(LogLevel::Info);
        let pool = RecordPool::new(4);

        dispatch(&sink, &pool, LogLevel::Debug, "d", [int("n", 1)]);
        dispatch(&sink, &pool, LogLevel::Trace, "t", [int("n", 1)]);

        assert_eq!(sink.requested.get(), 0);
        assert_eq!(pool.stats().acquired(), 0);
    }

    #[test]
    fn test_trace_requires_trace_threshold() {
        let sink = MockSink::new(LogLevel::Debug);
        let pool = RecordPool::new(4);

        dispatch(&sink, &pool, LogLevel::Trace, "t", [int("n", 1)]);
        dispatch(&sink, &pool, LogLevel::Debug, "d", [int("n", 2)]);

        let emitted = sink.emitted.borrow();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_sentinel_levels_never_emit() {
        let sink = MockSink::new(LogLevel::Trace);
        let pool = RecordPool::new(4);

        dispatch(&sink, &pool, LogLevel::NoLevel, "n", [int("n", 1)]);
        dispatch(&sink, &pool, LogLevel::Disabled, "d", [int("n", 1)]);

        assert!(sink.emitted.borrow().is_empty());
        assert_eq!(sink.requested.get(), 0);
    }

    #[test]
    fn test_disabled_threshold_admits_nothing() {
        let sink = MockSink::new(LogLevel::Disabled);
        let pool = RecordPool::new(4);

        for level in LogLevel::SEVERITIES {
            dispatch(&sink, &pool, level, "x", [int("n", 1)]);
        }

        assert!(sink.emitted.borrow().is_empty());
        assert_eq!(pool.stats().acquired(), 0);
    }

    #[test]
    fn test_every_kind_reaches_sink() {
        let sink = MockSink::new(LogLevel::Trace);
        let pool = RecordPool::new(4);
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
        let ctx = RequestContext::new("trace-7", "span-1").shared();

        dispatch(
            &sink,
            &pool,
            LogLevel::Error,
            "all kinds",
            [
                any("tags", &["a", "b"]),
                bool("ok", false),
                duration("elapsed", Duration::from_millis(2)),
                float32("ratio", -0.0),
                float64("nan", f64::from_bits(0x7ff8_0000_0000_0001)),
                string("name", "svc"),
                time("at", at),
                uint64("bytes", u64::MAX),
                context(ctx),
                err("disk full"),
            ],
        );

        let emitted = sink.emitted.borrow();
        let event = &emitted[0];
        assert_eq!(event.field("tags"), Some("any:[\"a\",\"b\"]"));
        assert_eq!(event.field("ok"), Some("bool:false"));
        assert_eq!(event.field("elapsed"), Some("duration:2000000"));
        assert_eq!(event.field("ratio"), Some("float32:0x80000000"));
        assert_eq!(event.field("nan"), Some("float64:0x7ff8000000000001"));
        assert_eq!(event.field("name"), Some("string:svc"));
        assert_eq!(event.field("bytes"), Some("uint64:18446744073709551615"));
        assert_eq!(
            event.field("at"),
            Some(format!("time:{}", at.timestamp_millis()).as_str())
        );
        assert_eq!(event.error.as_deref(), Some("disk full"));
        assert_eq!(event.trace_id.as_deref(), Some("trace-7"));
    }

    #[test]
    fn test_record_reused_between_calls() {
        let sink = MockSink::new(LogLevel::Info);
        let pool = RecordPool::new(4);

        dispatch(&sink, &pool, LogLevel::Info, "first", [string("a", "1"), err("e")]);
        dispatch(&sink, &pool, LogLevel::Info, "second", [string("b", "2")]);

        let emitted = sink.emitted.borrow();
        assert_eq!(emitted[1].fields.len(), 1);
        assert!(emitted[1].error.is_none());
        assert_eq!(pool.stats().created(), 1);
        assert_eq!(pool.stats().acquired(), 2);
    }
}
