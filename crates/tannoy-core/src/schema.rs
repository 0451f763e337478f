use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// One named event and the payload shape it carries.
pub trait Event: 'static {
    const NAME: &'static str;
    type Payload: Serialize + DeserializeOwned + Send + 'static;
}

/// A closed set of events. The set type is the compile-time counterpart of an
/// [`EventSchema`] value; membership is expressed through [`Member`].
pub trait EventSet: 'static {
    fn schema() -> EventSchema;
}

/// Marker tying an [`Event`] to the [`EventSet`]s that declare it.
pub trait Member<S: EventSet>: Event {}

/// Declares an event-set type and marks each listed event as a member.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tannoy_core::{event_set, Event};
///
/// #[derive(Serialize, Deserialize)]
/// struct ClickPayload { x: i64, y: i64 }
///
/// struct Click;
/// impl Event for Click {
///     const NAME: &'static str = "click";
///     type Payload = ClickPayload;
/// }
///
/// event_set!(UiEvents { Click });
/// ```
#[macro_export]
macro_rules! event_set {
    ($vis:vis $set:ident { $($event:ty),+ $(,)? }) => {
        $vis struct $set;

        impl $crate::schema::EventSet for $set {
            fn schema() -> $crate::schema::EventSchema {
                let mut schema = $crate::schema::EventSchema::new();
                $(schema.declare::<$event>();)+
                schema
            }
        }

        $(impl $crate::schema::Member<$set> for $event {})+
    };
}

type PayloadCheck = fn(&serde_json::Value) -> Result<(), serde_json::Error>;

fn check_payload<E: Event>(value: &serde_json::Value) -> Result<(), serde_json::Error> {
    serde_json::from_value::<E::Payload>(value.clone()).map(|_| ())
}

/// Runtime validator descriptor for one event's payload.
#[derive(Debug, Clone, Copy)]
pub struct PayloadShape {
    check: PayloadCheck,
}

impl PayloadShape {
    pub fn check(&self, value: &serde_json::Value) -> Result<(), serde_json::Error> {
        (self.check)(value)
    }
}

/// Runtime mapping from event name to payload shape. Enumeration order is
/// sorted by name and drives the binder's registration order.
#[derive(Debug, Clone, Default)]
pub struct EventSchema {
    events: BTreeMap<String, PayloadShape>,
}

impl EventSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare<E: Event>(&mut self) -> &mut Self {
        let shape = PayloadShape {
            check: check_payload::<E>,
        };
        if self.events.insert(E::NAME.to_string(), shape).is_some() {
            tracing::warn!(event = E::NAME, "event declared twice, keeping latest shape");
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    pub fn shape(&self, name: &str) -> Option<&PayloadShape> {
        self.events.get(name)
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A shared schema descriptor tagged with its set type. Clones share one
/// identity; `new()` mints a fresh one. The binder caches bus instances by
/// this identity, not by structural equality, so a handle constructed anew on
/// every render cycle gets a fresh bus each time.
pub struct SchemaHandle<S: EventSet> {
    descriptor: Arc<EventSchema>,
    _set: PhantomData<fn() -> S>,
}

impl<S: EventSet> SchemaHandle<S> {
    pub fn new() -> Self {
        Self {
            descriptor: Arc::new(S::schema()),
            _set: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &Arc<EventSchema> {
        &self.descriptor
    }
}

impl<S: EventSet> Default for SchemaHandle<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSet> Clone for SchemaHandle<S> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            _set: PhantomData,
        }
    }
}
