//! Rivet DNS Application Layer
//!
//! Ports consumed by the request pipeline, the pipeline itself, resolver
//! composition, lifecycle and the notification surface.
pub mod events;
pub mod ports;
pub mod services;
pub mod use_cases;
