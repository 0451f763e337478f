pub mod bus;
pub mod config;
pub mod error;
pub mod logging;
pub mod schema;

pub use bus::{Bus, Handler, Unsubscribe};
pub use config::BusConfig;
pub use error::{BusError, BusResult};
pub use schema::{Event, EventSchema, EventSet, Member, PayloadShape, SchemaHandle};
