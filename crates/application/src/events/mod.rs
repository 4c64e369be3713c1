pub mod emitter;
pub mod types;

pub use emitter::{ServerEventEmitter, Subscriber};
pub use types::{ErroredEvent, ListeningEvent, RequestedEvent, RespondedEvent};
