//! Database query implementations.

pub mod b2b;
pub mod b2c;
pub mod outbox;
