//! Request-scoped context carried by a record

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request-scoped handle attached to log events.
///
/// Carries distributed-tracing identifiers plus a few string tags. It is shared
/// as `Arc<RequestContext>` so attaching it to a record is a reference-count
/// bump, not a copy.
///
/// # Example
///
/// ```
/// use rust_log_facade::RequestContext;
///
/// let ctx = RequestContext::new("trace-1", "span-9")
///     .with_parent("span-3")
///     .with_tag("tenant", "acme")
///     .shared();
/// assert_eq!(ctx.trace_id(), "trace-1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    trace_id: String,
    span_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            parent_span_id: None,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = Some(parent_span_id.into());
        self
    }

    /// Add a tag; a repeated key replaces the earlier value.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.tags.push((key, value)),
        }
        self
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn parent_span_id(&self) -> Option<&str> {
        self.parent_span_id.as_deref()
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Wrap in an `Arc` for attaching to records.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
