#![cfg(test)]

use std::sync::{Arc, Mutex};

use tracing::{Event, Subscriber};
use tracing_core::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry;

/// One recorded event: level plus stringified message and fields.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct EventStore {
    pub events: Mutex<Vec<CapturedEvent>>,
}

impl EventStore {
    pub fn at_level(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

#[derive(Clone)]
pub struct CaptureLayer {
    pub store: Arc<EventStore>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        struct FieldVisitor {
            message: String,
            fields: Vec<(String, String)>,
        }
        impl Visit for FieldVisitor {
            fn record_debug(&mut self, field: &Field, value: &dyn core::fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{value:?}");
                } else {
                    self.fields
                        .push((field.name().to_string(), format!("{value:?}")));
                }
            }
            fn record_str(&mut self, field: &Field, value: &str) {
                if field.name() == "message" {
                    self.message = value.to_string();
                } else {
                    self.fields
                        .push((field.name().to_string(), value.to_string()));
                }
            }
            fn record_i64(&mut self, field: &Field, value: i64) {
                self.fields
                    .push((field.name().to_string(), value.to_string()));
            }
            fn record_u64(&mut self, field: &Field, value: u64) {
                self.fields
                    .push((field.name().to_string(), value.to_string()));
            }
            fn record_bool(&mut self, field: &Field, value: bool) {
                self.fields
                    .push((field.name().to_string(), value.to_string()));
            }
        }

        let mut visitor = FieldVisitor {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut visitor);
        self.store.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

static GUARDS: once_cell::sync::Lazy<Mutex<Vec<tracing::subscriber::DefaultGuard>>> =
    once_cell::sync::Lazy::new(|| Mutex::new(Vec::new()));

/// Routes this thread's events into a fresh store for the rest of the
/// test. The guard is parked globally so the subscriber stays active.
pub fn install_capture() -> Arc<EventStore> {
    use tracing_subscriber::prelude::*;
    let store = Arc::new(EventStore::default());
    let layer = CaptureLayer {
        store: store.clone(),
    };
    let subscriber = registry::Registry::default().with(layer);
    let guard = tracing::subscriber::set_default(subscriber);
    GUARDS.lock().unwrap().push(guard);
    store
}
