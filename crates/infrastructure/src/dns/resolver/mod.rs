pub mod forwarder;
pub mod master;

pub use forwarder::ForwardingResolver;
pub use master::MasterResolver;
