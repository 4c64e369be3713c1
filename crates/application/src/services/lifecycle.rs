use rivet_dns_domain::ServerState;
use std::sync::atomic::{AtomicU8, Ordering};

/// Forward-only server state machine: Created → Listening → Stopping → Stopped.
#[derive(Debug)]
pub struct ServerLifecycle {
    state: AtomicU8,
}

impl ServerLifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ServerState::Created.as_u8()),
        }
    }

    pub fn state(&self) -> ServerState {
        ServerState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(ServerState::Stopped)
    }

    /// Created → Listening. Returns false when the server was already started
    /// or stopped.
    pub fn try_start(&self) -> bool {
        self.transition(ServerState::Created, ServerState::Listening)
    }

    /// Moves Created or Listening to Stopping and returns the state it left.
    /// Only the first caller gets `Some`; later calls change nothing.
    pub fn begin_stop(&self) -> Option<ServerState> {
        let stopping = ServerState::Stopping.as_u8();
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < stopping).then_some(stopping)
            })
            .ok()
            .and_then(ServerState::from_u8)
    }

    /// Stopping → Stopped.
    pub fn finish_stop(&self) -> bool {
        self.transition(ServerState::Stopping, ServerState::Stopped)
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServerState::Listening
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state() >= ServerState::Stopping
    }

    fn transition(&self, from: ServerState, to: ServerState) -> bool {
        debug_assert!(from < to);
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for ServerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
