//! Recording layer for asserting spans and events in tests.
//!
//! Install [`RecordingLayer`] on a registry, run the code under test and then
//! inspect the closed spans and emitted events. Field values are stored as
//! strings so assertions do not depend on the recorded type.

use std::{
    collections::HashMap,
    fmt::{self, Write as _},
    sync::{Arc, Mutex, PoisonError},
};

use ::tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};
use tracing_subscriber::{Layer, layer::Context, prelude::*, registry::LookupSpan};

/// Captures closed spans and emitted events for later assertions.
#[derive(Clone, Default)]
pub struct RecordingLayer {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
    events: Arc<Mutex<Vec<EventRecord>>>,
}

impl RecordingLayer {
    /// Runs `operation` with a fresh recording subscriber installed for the
    /// current thread and returns its output with the layer.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_test_support::tracing::RecordingLayer;
    ///
    /// let (value, layer) = RecordingLayer::capture(|| {
    ///     let _span = tracing::info_span!("outer", answer = 42).entered();
    ///     7
    /// });
    /// assert_eq!(value, 7);
    /// let span = layer.span("outer").expect("span is recorded");
    /// assert_eq!(span.field("answer"), Some("42"));
    /// ```
    pub fn capture<R>(operation: impl FnOnce() -> R) -> (R, Self) {
        let layer = Self::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let output = ::tracing::subscriber::with_default(subscriber, operation);
        (output, layer)
    }

    /// Returns the closed spans in completion order.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_test_support::tracing::RecordingLayer;
    ///
    /// let layer = RecordingLayer::default();
    /// assert!(layer.spans().is_empty());
    /// ```
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the first closed span called `name`.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<SpanRecord> {
        self.spans().into_iter().find(|span| span.name == name)
    }

    /// Returns the emitted events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the events emitted at exactly `level`.
    #[must_use]
    pub fn events_at(&self, level: Level) -> Vec<EventRecord> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }
}

/// A closed span with the fields recorded over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    /// Span name from the metadata.
    pub name: String,
    /// Name of the enclosing span, if any.
    pub parent: Option<String>,
    /// Recorded fields, rendered as strings.
    pub fields: HashMap<String, String>,
}

impl SpanRecord {
    /// Returns the recorded value of `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event level.
    pub level: Level,
    /// Event target.
    pub target: String,
    /// Name of the span the event was emitted in, if any.
    pub span: Option<String>,
    /// Recorded fields, rendered as strings. The message is stored under
    /// `message`.
    pub fields: HashMap<String, String>,
}

impl EventRecord {
    /// Returns the recorded value of `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns the event message, if one was recorded.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }
}

struct OpenSpan {
    parent: Option<String>,
    fields: HashMap<String, String>,
}

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldWriter(&mut fields));
        let parent = span.parent().map(|parent| parent.name().to_owned());
        span.extensions_mut().insert(OpenSpan { parent, fields });
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id)
            && let Some(open) = span.extensions_mut().get_mut::<OpenSpan>()
        {
            values.record(&mut FieldWriter(&mut open.fields));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(open) = span.extensions_mut().remove::<OpenSpan>() else {
            return;
        };
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SpanRecord {
                name: span.name().to_owned(),
                parent: open.parent,
                fields: open.fields,
            });
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldWriter(&mut fields));
        let span = ctx.event_span(event).map(|span| span.name().to_owned());
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                span,
                fields,
            });
    }
}

struct FieldWriter<'a>(&'a mut HashMap<String, String>);

impl FieldWriter<'_> {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_owned(), value);
    }
}

impl Visit for FieldWriter<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_bytes(&mut self, field: &Field, value: &[u8]) {
        let mut hex = String::with_capacity(value.len() * 2);
        for byte in value {
            let _ = write!(hex, "{byte:02x}");
        }
        self.put(field, hex);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use ::tracing::{debug, info_span, warn};

    use super::*;

    #[test]
    fn records_parents_and_late_fields() {
        let ((), layer) = RecordingLayer::capture(|| {
            let outer = info_span!("outer", stage = ::tracing::field::Empty).entered();
            {
                let _inner = info_span!("inner", count = 3_u64).entered();
                debug!(step = "first", "inside");
            }
            outer.record("stage", "done");
        });

        let inner = layer.span("inner").expect("inner span recorded");
        assert_eq!(inner.parent.as_deref(), Some("outer"));
        assert_eq!(inner.field("count"), Some("3"));
        let outer = layer.span("outer").expect("outer span recorded");
        assert_eq!(outer.field("stage"), Some("done"));
        assert_eq!(
            layer.spans().iter().map(|span| span.name.as_str()).collect::<Vec<_>>(),
            vec!["inner", "outer"]
        );

        let events = layer.events_at(Level::DEBUG);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].span.as_deref(), Some("inner"));
        assert_eq!(events[0].message(), Some("inside"));
        assert_eq!(events[0].field("step"), Some("first"));
    }

    #[test]
    fn events_outside_spans_have_no_span() {
        let ((), layer) = RecordingLayer::capture(|| warn!(code = 7_i64, "loose"));
        let events = layer.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].span, None);
        assert_eq!(events[0].field("code"), Some("7"));
    }
}
