use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{field::Visit, Event};
use tracing_subscriber::{layer::Context, prelude::*, Layer};

/// One `tracing` event, flattened to strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub target: String,
    pub level: tracing::Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }
}

#[derive(Clone, Default)]
struct CapturingLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CapturingLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            fields: visitor.fields,
        };
        self.events
            .lock()
            .expect("events mutex poisoned")
            .push(captured);
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

/// Runs `f` with a thread-local subscriber that records every event.
///
/// ```
/// let (value, events) = vigil_test_utils::capture_logs(|| {
///     tracing::info!(target: "demo", answer = 42, "hello");
///     7
/// });
/// assert_eq!(value, 7);
/// assert_eq!(events[0].target, "demo");
/// assert_eq!(events[0].field("answer"), Some("42"));
/// ```
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let layer = CapturingLayer::default();
    let events = layer.events.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    let out = tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().expect("events mutex poisoned").clone();
    (out, events)
}

/// Events from `events` whose target is `target`.
pub fn events_for<'e>(events: &'e [CapturedEvent], target: &str) -> Vec<&'e CapturedEvent> {
    events.iter().filter(|e| e.target == target).collect()
}
