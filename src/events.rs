//! Local lifecycle notifications.
//!
//! With the `emitter` feature, every successful catalog write emits
//! `"<entity>.<action>"` (for example `"item.deleted"`) with the entity
//! serialized as JSON. Listeners run on the emitter's own threads, after
//! the write is committed.

#[cfg(feature = "emitter")]
use std::sync::Mutex;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
#[cfg(feature = "emitter")]
use serde::Serialize;

use crate::integrity::EntityKind;

/// What happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        }
    }
}

/// Event name for `kind` + `action`, e.g. `"category.created"`.
pub fn event_name(kind: EntityKind, action: Action) -> String {
    format!("{}.{}", kind.name(), action.as_str())
}

/// Wraps an `EventEmitter` so it can be shared behind `&self`.
#[cfg(feature = "emitter")]
pub struct CatalogEvents {
    emitter: Mutex<EventEmitter>,
}

#[cfg(feature = "emitter")]
impl Default for CatalogEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "emitter")]
impl CatalogEvents {
    pub fn new() -> Self {
        Self {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener for an event name.
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        match self.emitter.lock() {
            Ok(mut emitter) => {
                emitter.on(event, listener);
            }
            Err(_) => tracing::error!(event, "event emitter lock poisoned, listener dropped"),
        }
    }

    /// Emit `payload` as JSON. Serialization or lock failures are logged, not returned:
    /// the write that triggered the event has already been committed.
    pub fn emit<T: Serialize>(&self, kind: EntityKind, action: Action, payload: &T) {
        let name = event_name(kind, action);
        let data = match serde_json::to_string(payload) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(event = %name, error = %err, "could not serialize event payload");
                return;
            }
        };
        match self.emitter.lock() {
            Ok(mut emitter) => {
                emitter.emit(&name, data);
            }
            Err(_) => tracing::error!(event = %name, "event emitter lock poisoned, event dropped"),
        }
    }
}
