//! Outbox event models.
//!
//! An outbox row only identifies *which* subject changed. The worker always
//! reloads the subject's full interaction history from the source tables, so
//! events never carry a payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operation that produced an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventOp {
    Insert,
    Update,
    Delete,
}

impl EventOp {
    /// Convert to the canonical outbox spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

impl FromStr for EventOp {
    type Err = String;

    /// Parse case-insensitively, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INSERT" => Ok(Self::Insert),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unknown outbox op '{}'", other)),
        }
    }
}

impl fmt::Display for EventOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction domain an outbox row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    B2c,
    B2b,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::B2c, Domain::B2b];

    /// The `aggregate_type` tag written by the outbox producer.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::B2c => "b2c_interaction",
            Self::B2b => "b2b_interaction",
        }
    }

    /// Resolve an outbox tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.tag() == tag)
    }

    /// Parse a short CLI name (`b2b`, `b2c`) or a full tag.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "b2c" => Some(Self::B2c),
            "b2b" => Some(Self::B2b),
            other => Self::from_tag(other),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Lifecycle state of an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Processing,
    Processed,
    Failed,
}

/// A claimed outbox row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: i64,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub op: EventOp,
    pub attempts: i32,
    pub source_table: String,
}

impl OutboxEvent {
    /// Domain this event routes to, if the tag is known.
    pub fn domain(&self) -> Option<Domain> {
        Domain::from_tag(&self.aggregate_type)
    }
}

/// Parameters for claiming a batch of pending events.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub batch_size: i64,
    pub max_attempts: i32,
    pub source_tables: Vec<String>,
    pub aggregate_types: Vec<String>,
}

/// A row that reached the attempt ceiling and is no longer claimed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhaustedEvent {
    pub event: OutboxEvent,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_parse_is_case_insensitive() {
        assert_eq!("delete".parse::<EventOp>(), Ok(EventOp::Delete));
        assert_eq!("Update".parse::<EventOp>(), Ok(EventOp::Update));
        assert_eq!(" INSERT ".parse::<EventOp>(), Ok(EventOp::Insert));
        assert!("truncate".parse::<EventOp>().is_err());
    }

    #[test]
    fn test_domain_tags() {
        assert_eq!(Domain::from_tag("b2c_interaction"), Some(Domain::B2c));
        assert_eq!(Domain::from_tag("b2b_interaction"), Some(Domain::B2b));
        assert_eq!(Domain::from_tag("catalog_sync"), None);
        assert_eq!(Domain::parse("B2B"), Some(Domain::B2b));
        assert_eq!(Domain::parse("b2c_interaction"), Some(Domain::B2c));
    }
}
