//! # Interlink Worker
//!
//! Outbox-driven sync loop: claims change events, recomputes the affected
//! subject from the relational store and rewrites its edges in the graph.

pub mod outcome;
pub mod pipeline;
pub mod poller;
pub mod router;

#[cfg(test)]
mod testing;

pub use outcome::{BatchReport, Disposition, EventOutcome};
pub use pipeline::{B2bPipeline, B2cPipeline, Pipeline, Plan};
pub use poller::Worker;
pub use router::Router;
