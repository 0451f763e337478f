use std::marker::PhantomData;
use tannoy_core::{Bus, BusResult, EventSet, Member};

/// Publishing handle closed over one bound bus instance. Event and payload
/// are checked against the set `S` at compile time; no runtime shape check
/// happens in this layer.
pub struct Publisher<S: EventSet> {
    bus: Bus,
    _set: PhantomData<fn() -> S>,
}

impl<S: EventSet> Publisher<S> {
    pub(crate) fn new(bus: Bus) -> Self {
        Self {
            bus,
            _set: PhantomData,
        }
    }

    /// Forward `E`'s payload to the bound bus.
    ///
    /// Events outside the bound set do not compile:
    ///
    /// ```compile_fail
    /// use serde::{Deserialize, Serialize};
    /// use tannoy_bind::{BusBinding, SchemaHandle};
    /// use tannoy_core::{event_set, Event};
    ///
    /// #[derive(Serialize, Deserialize)]
    /// struct ClickPayload { x: i64, y: i64 }
    /// struct Click;
    /// impl Event for Click {
    ///     const NAME: &'static str = "click";
    ///     type Payload = ClickPayload;
    /// }
    ///
    /// #[derive(Serialize, Deserialize)]
    /// struct ScrollPayload { delta: i64 }
    /// struct Scroll;
    /// impl Event for Scroll {
    ///     const NAME: &'static str = "scroll";
    ///     type Payload = ScrollPayload;
    /// }
    ///
    /// event_set!(UiEvents { Click });
    /// event_set!(OtherEvents { Scroll });
    ///
    /// let schema = SchemaHandle::<UiEvents>::new();
    /// let mut binding = BusBinding::new();
    /// let publisher = binding.render(&schema, None);
    /// // Scroll is not a member of UiEvents.
    /// let _ = publisher.publish::<Scroll>(ScrollPayload { delta: 1 });
    /// ```
    pub fn publish<E: Member<S>>(&self, payload: E::Payload) -> BusResult<()> {
        let value = serde_json::to_value(payload)?;
        self.bus.publish(E::NAME, value)
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

impl<S: EventSet> Clone for Publisher<S> {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
            _set: PhantomData,
        }
    }
}
