use crate::config::BusConfig;
use crate::error::{BusError, BusResult};
use crate::schema::EventSchema;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Type-erased subscriber callback. Receives a borrowed payload value.
pub type Handler = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

struct Subscriber {
    id: u64,
    handler: Handler,
}

struct Shared {
    schema: Arc<EventSchema>,
    config: BusConfig,
    next_id: AtomicU64,
    registry: Mutex<HashMap<String, Vec<Subscriber>>>,
}

fn lock_registry(shared: &Shared) -> MutexGuard<'_, HashMap<String, Vec<Subscriber>>> {
    match shared.registry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// One bus instance owning the subscriber registry for one schema. Cloning
/// yields another handle to the same instance; the registry is freed when the
/// last handle drops.
#[derive(Clone)]
pub struct Bus {
    shared: Arc<Shared>,
}

impl Bus {
    pub fn new(schema: Arc<EventSchema>, config: BusConfig) -> Self {
        tracing::debug!(events = schema.len(), "bus instance created");
        Self {
            shared: Arc::new(Shared {
                schema,
                config,
                next_id: AtomicU64::new(0),
                registry: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn schema(&self) -> &Arc<EventSchema> {
        &self.shared.schema
    }

    pub fn same_instance(&self, other: &Bus) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Stable address token for this instance, valid while any handle lives.
    pub fn instance_token(&self) -> usize {
        Arc::as_ptr(&self.shared) as usize
    }

    pub fn subscribe(&self, event: &str, handler: Handler) -> BusResult<Unsubscribe> {
        if !self.shared.schema.contains(event) {
            return Err(BusError::UnknownEvent(event.to_string()));
        }
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let mut registry = lock_registry(&self.shared);
        registry
            .entry(event.to_string())
            .or_default()
            .push(Subscriber { id, handler });
        tracing::trace!(event, id, "subscribed");
        Ok(Unsubscribe {
            shared: Arc::downgrade(&self.shared),
            event: event.to_string(),
            id,
        })
    }

    pub fn publish(&self, event: &str, payload: serde_json::Value) -> BusResult<()> {
        let shape = self
            .shared
            .schema
            .shape(event)
            .ok_or_else(|| BusError::UnknownEvent(event.to_string()))?;
        if self.shared.config.validate_payloads {
            shape.check(&payload).map_err(|source| BusError::InvalidPayload {
                event: event.to_string(),
                source,
            })?;
        }

        // Snapshot handlers so delivery runs outside the lock; a handler may
        // publish again on the same bus.
        let handlers: Vec<Handler> = {
            let registry = lock_registry(&self.shared);
            registry
                .get(event)
                .map(|subs| subs.iter().map(|s| s.handler.clone()).collect())
                .unwrap_or_default()
        };

        if handlers.is_empty() {
            if self.shared.config.log_unhandled {
                tracing::debug!(event, "publish reached no subscribers");
            }
            return Ok(());
        }

        tracing::trace!(event, subscribers = handlers.len(), "delivering");
        for handler in handlers {
            handler(&payload);
        }
        Ok(())
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        let registry = lock_registry(&self.shared);
        registry.get(event).map(Vec::len).unwrap_or(0)
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("events", &self.shared.schema.len())
            .field("token", &self.instance_token())
            .finish()
    }
}

/// Consuming unsubscribe handle. Fires at most once by construction; calling
/// it after the bus is gone, or after the subscription was already removed,
/// is a no-op.
#[derive(Debug)]
pub struct Unsubscribe {
    shared: Weak<Shared>,
    event: String,
    id: u64,
}

impl Unsubscribe {
    pub fn call(self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut registry = lock_registry(&shared);
        if let Some(subs) = registry.get_mut(&self.event) {
            subs.retain(|s| s.id != self.id);
        }
        tracing::trace!(event = %self.event, id = self.id, "unsubscribed");
    }
}
