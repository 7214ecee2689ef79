//! Read-side graph queries.

pub mod edges;
