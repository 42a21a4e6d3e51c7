//! Core types and coordinator wiring for the ridemap ride-booking map.

/// Bundle of service ports used by a booking session.
pub mod backend;
/// Booking form validation and the submitted booking record.
pub mod booking;
/// Booking coordinator driving selection, geocoding, routing and fares.
pub mod coordinator;
/// Completion events and session cancellation.
pub mod event;
/// Time-of-day fare rules.
pub mod fare;
/// Domain models shared by the core and all providers.
pub mod model;
/// Traits describing the external capabilities the core depends on.
pub mod ports;
/// Route computation with single-flight cancellation.
pub mod route;
/// Pickup/destination selection state machine.
pub mod selection;

pub use backend::*;
pub use booking::*;
pub use coordinator::*;
pub use event::*;
pub use fare::*;
pub use model::*;
pub use ports::*;
pub use route::*;
pub use selection::*;
