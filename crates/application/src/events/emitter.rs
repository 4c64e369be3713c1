use super::{ErroredEvent, ListeningEvent, RequestedEvent, RespondedEvent};
use arc_swap::ArcSwap;
use std::sync::Arc;

pub type Subscriber<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Channel<E> {
    subscribers: ArcSwap<Vec<Subscriber<E>>>,
}

impl<E> Channel<E> {
    fn new() -> Self {
        Self {
            subscribers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    fn subscribe(&self, subscriber: Subscriber<E>) {
        self.subscribers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&subscriber));
            next
        });
    }

    // Delivery works on a snapshot, so a subscriber may register further
    // subscribers without deadlocking; those see the next event only.
    fn emit(&self, event: &E) {
        let snapshot = self.subscribers.load_full();
        for subscriber in snapshot.iter() {
            subscriber(event);
        }
    }

    fn len(&self) -> usize {
        self.subscribers.load().len()
    }
}

/// Four independent notification channels, delivered synchronously in
/// registration order on the task that raised them.
pub struct ServerEventEmitter {
    listening: Channel<ListeningEvent>,
    requested: Channel<RequestedEvent>,
    responded: Channel<RespondedEvent>,
    errored: Channel<ErroredEvent>,
}

impl ServerEventEmitter {
    pub fn new() -> Self {
        Self {
            listening: Channel::new(),
            requested: Channel::new(),
            responded: Channel::new(),
            errored: Channel::new(),
        }
    }

    pub fn on_listening<F>(&self, f: F)
    where
        F: Fn(&ListeningEvent) + Send + Sync + 'static,
    {
        self.listening.subscribe(Arc::new(f));
    }

    pub fn on_requested<F>(&self, f: F)
    where
        F: Fn(&RequestedEvent) + Send + Sync + 'static,
    {
        self.requested.subscribe(Arc::new(f));
    }

    pub fn on_responded<F>(&self, f: F)
    where
        F: Fn(&RespondedEvent) + Send + Sync + 'static,
    {
        self.responded.subscribe(Arc::new(f));
    }

    pub fn on_errored<F>(&self, f: F)
    where
        F: Fn(&ErroredEvent) + Send + Sync + 'static,
    {
        self.errored.subscribe(Arc::new(f));
    }

    pub fn emit_listening(&self, event: &ListeningEvent) {
        self.listening.emit(event);
    }

    pub fn emit_requested(&self, event: &RequestedEvent) {
        self.requested.emit(event);
    }

    pub fn emit_responded(&self, event: &RespondedEvent) {
        self.responded.emit(event);
    }

    pub fn emit_errored(&self, event: &ErroredEvent) {
        self.errored.emit(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.listening.len() + self.requested.len() + self.responded.len() + self.errored.len()
    }
}

impl Default for ServerEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServerEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerEventEmitter")
            .field("listening", &self.listening.len())
            .field("requested", &self.requested.len())
            .field("responded", &self.responded.len())
            .field("errored", &self.errored.len())
            .finish()
    }
}
