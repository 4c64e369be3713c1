//! Rivet DNS Infrastructure Layer
//!
//! Adapters for the application ports: the hickory-proto wire codec, the
//! UDP listener, and the master and forwarding resolvers.
pub mod dns;
