//! # Interlink Graph
//!
//! Neo4j side of the interaction sync.
//!
//! Plans per-subject edge replacements from aggregate snapshots, renders them
//! to Cypher and applies each one atomically.

pub mod client;
pub mod cypher;
pub mod memory;
pub mod queries;
pub mod schema;
pub mod sync;
pub mod writer;

pub use client::{GraphClient, GraphCounts};
pub use memory::MemoryGraph;
pub use sync::{plan_b2b, plan_b2c, plan_detach, subject_label};
pub use writer::Neo4jStore;
