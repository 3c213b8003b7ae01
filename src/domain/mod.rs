//! Domain model: events, registrations, the status engine and the ports the
//! application layer talks through.

pub mod event;
pub mod ports;
pub mod registration;
pub mod signature;
pub mod status;
