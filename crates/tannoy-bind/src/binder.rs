use crate::callbacks::CallbackMap;
use crate::lifecycle::{Deps, Effect, Memo, Teardown};
use crate::publisher::Publisher;
use std::marker::PhantomData;
use std::sync::Arc;
use tannoy_core::{Bus, BusConfig, EventSet, SchemaHandle};

/// Binds one bus instance to a host component's lifecycle.
///
/// One `BusBinding` lives per component instance. Call [`render`] on every
/// render cycle with the current schema handle and callback map; call
/// [`unmount`] exactly when the component is torn down.
///
/// The bus is cached by the schema handle's identity, and the subscription
/// set is re-synchronized only when the schema, bus, or callback-map identity
/// changes; an unchanged render is a no-op.
///
/// [`render`]: BusBinding::render
/// [`unmount`]: BusBinding::unmount
pub struct BusBinding<S: EventSet> {
    config: BusConfig,
    bus: Memo<Bus>,
    subscriptions: Effect,
    _set: PhantomData<fn() -> S>,
}

impl<S: EventSet> BusBinding<S> {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            config,
            bus: Memo::new(),
            subscriptions: Effect::new(),
            _set: PhantomData,
        }
    }

    pub fn render(
        &mut self,
        schema: &SchemaHandle<S>,
        callbacks: Option<&Arc<CallbackMap<S>>>,
    ) -> Publisher<S> {
        let config = self.config.clone();
        let descriptor = Arc::clone(schema.descriptor());
        let bus = self
            .bus
            .get_or_compute(Deps::none().track(schema.descriptor()), move || {
                Bus::new(descriptor, config)
            });

        let mut deps = Deps::none()
            .track(schema.descriptor())
            .track_token(bus.instance_token(), bus.clone());
        if let Some(callbacks) = callbacks {
            deps = deps.track(callbacks);
        }

        let setup_bus = bus.clone();
        let descriptor = Arc::clone(schema.descriptor());
        let callbacks = callbacks.map(Arc::clone);
        self.subscriptions.run(deps, move || {
            let callbacks = callbacks?;
            let mut handles = Vec::new();
            for event in descriptor.event_names() {
                let Some(handler) = callbacks.handler(event) else {
                    continue;
                };
                match setup_bus.subscribe(event, handler) {
                    Ok(handle) => handles.push(handle),
                    // Unreachable through the typed callback map.
                    Err(err) => tracing::error!(event, %err, "subscribe failed"),
                }
            }
            tracing::debug!(subscriptions = handles.len(), "subscriptions synchronized");
            Some(Box::new(move || {
                for handle in handles {
                    handle.call();
                }
            }) as Teardown)
        });

        Publisher::new(bus)
    }

    /// Tear down all outstanding subscriptions. Further `render` calls start
    /// a fresh synchronization pass.
    pub fn unmount(&mut self) {
        self.subscriptions.dispose();
        tracing::debug!("binding unmounted");
    }
}

impl<S: EventSet> Default for BusBinding<S> {
    fn default() -> Self {
        Self::new()
    }
}
