pub mod binder;
pub mod callbacks;
pub mod lifecycle;
pub mod publisher;

pub use binder::BusBinding;
pub use callbacks::CallbackMap;
pub use lifecycle::{Deps, Effect, Memo, Teardown};
pub use publisher::Publisher;
pub use tannoy_core::{Bus, BusConfig, BusError, BusResult, SchemaHandle};
