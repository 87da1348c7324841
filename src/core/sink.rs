//! Capabilities the dispatcher needs from an event sink
//!
//! The dispatcher is written against these traits rather than a concrete
//! logger so alternative back ends (and test doubles) can receive events.

use super::context::RequestContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

/// An event under construction.
///
/// Typed methods mirror the attribute kinds one-to-one. `msg` finalises and
/// emits the event.
pub trait Event {
    /// Record the call site that produced the event.
    fn caller(&mut self, location: &'static Location<'static>);
    fn context(&mut self, ctx: &Arc<RequestContext>);
    fn error(&mut self, err: &(dyn Error + Send + Sync + 'static));

    fn any(&mut self, key: &str, value: &serde_json::Value);
    fn bool(&mut self, key: &str, value: bool);
    fn duration(&mut self, key: &str, value: Duration);
    fn float32(&mut self, key: &str, value: f32);
    fn float64(&mut self, key: &str, value: f64);
    fn int64(&mut self, key: &str, value: i64);
    fn str(&mut self, key: &str, value: &str);
    fn time(&mut self, key: &str, value: &DateTime<Utc>);
    fn uint64(&mut self, key: &str, value: u64);

    fn msg(self, message: &str);
}

/// A destination able to create events at a given level.
pub trait EventSink {
    type Event<'a>: Event
    where
        Self: 'a;

    /// Currently configured minimum level.
    fn level(&self) -> LogLevel;

    /// Start an event at `level`, or `None` if the sink's own gate rejects it.
    ///
    /// A sink may still act on a rejected `Fatal` or `Panic` request (for
    /// example by terminating) before returning `None`.
    fn event(&self, level: LogLevel) -> Option<Self::Event<'_>>;
}
