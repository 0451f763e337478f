use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tannoy_core::{EventSet, Handler, Member};

/// Partial, typed mapping from events of `S` to handlers. Handlers are erased
/// to the bus's value-level shape; the binder compares maps by `Arc` identity,
/// so build one, wrap it in an `Arc`, and reuse it across render cycles.
pub struct CallbackMap<S: EventSet> {
    handlers: HashMap<&'static str, Handler>,
    _set: PhantomData<fn() -> S>,
}

impl<S: EventSet> CallbackMap<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            _set: PhantomData,
        }
    }

    /// Register a synchronous handler for `E`. The latest registration for an
    /// event wins.
    pub fn on<E: Member<S>>(
        mut self,
        callback: impl Fn(E::Payload) + Send + Sync + 'static,
    ) -> Self {
        let handler: Handler = Arc::new(move |value: &serde_json::Value| {
            match serde_json::from_value::<E::Payload>(value.clone()) {
                Ok(payload) => callback(payload),
                Err(err) => tracing::error!(event = E::NAME, %err, "payload decode failed"),
            }
        });
        self.handlers.insert(E::NAME, handler);
        self
    }

    /// Register an asynchronous handler for `E`. The returned future is
    /// spawned fire-and-forget on the ambient Tokio runtime; completions are
    /// never awaited or sequenced.
    pub fn on_async<E, F, Fut>(self, callback: F) -> Self
    where
        E: Member<S>,
        F: Fn(E::Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on::<E>(move |payload| {
            tokio::spawn(callback(payload));
        })
    }

    pub fn handler(&self, event: &str) -> Option<Handler> {
        self.handlers.get(event).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S: EventSet> Default for CallbackMap<S> {
    fn default() -> Self {
        Self::new()
    }
}
