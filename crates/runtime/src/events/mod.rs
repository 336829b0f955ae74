//! Session event broadcast: types and the fan-out bus.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::SessionEvent;
