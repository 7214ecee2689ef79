//! Interlink Core Library
//!
//! Domain model for syncing interaction facts into the recommendation graph:
//! outbox events, pure per-domain aggregators, graph mutations and the store
//! traits the worker is wired through.

pub mod b2b;
pub mod b2c;
pub mod config;
pub mod error;
pub mod event;
pub mod fold;
pub mod mutation;
pub mod store;

pub use config::{GraphSettings, Settings};
pub use error::{SyncError, SyncResult};
pub use event::{ClaimRequest, Domain, EventOp, EventStatus, ExhaustedEvent, OutboxEvent};
pub use mutation::{EdgeFamily, EdgeWrite, GraphMutation, NodeUpsert, PropValue, Props};
pub use store::{B2bSource, B2cSource, GraphStore, OutboxStore};
