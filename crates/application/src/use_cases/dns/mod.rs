pub mod fallback_resolver;
pub mod handle_datagram;

pub use fallback_resolver::FallbackResolver;
pub use handle_datagram::{DatagramOutcome, HandleDatagramUseCase};
