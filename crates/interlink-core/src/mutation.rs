//! Structured graph mutations.
//!
//! A mutation describes the full target state of one subject's managed edges.
//! Graph stores apply it with delete-then-rebuild semantics per edge family,
//! which makes re-applying the same mutation a no-op.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::fold::Timestamp;

/// A scalar node or relationship property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(Timestamp),
    /// Clears the property on write.
    Null,
}

pub type Props = BTreeMap<String, PropValue>;

/// Build a property map, dropping unset values.
pub fn props<I>(pairs: I) -> Props
where
    I: IntoIterator<Item = (&'static str, Option<PropValue>)>,
{
    pairs
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
        .collect()
}

/// Build a node attribute map. Unset values become [`PropValue::Null`] so a
/// re-sync clears attributes removed at the source.
pub fn attrs<I>(pairs: I) -> Props
where
    I: IntoIterator<Item = (&'static str, Option<PropValue>)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.unwrap_or(PropValue::Null)))
        .collect()
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Timestamp> for PropValue {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}

/// Create-if-absent, update-if-present node with scalar attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeUpsert {
    pub label: String,
    pub id: String,
    pub props: Props,
}

impl NodeUpsert {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            props: Props::new(),
        }
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }
}

/// One edge from the subject to a counterparty of the family's label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeWrite {
    pub kind: String,
    pub target_id: String,
    pub props: Props,
}

/// A set of edge kinds whose members are replaced as a unit.
///
/// Every existing edge of a `managed_kinds` kind from the subject to a
/// `counterpart_label` node is deleted before `edges` are written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeFamily {
    pub name: String,
    pub counterpart_label: String,
    pub managed_kinds: Vec<String>,
    pub nodes: Vec<NodeUpsert>,
    pub edges: Vec<EdgeWrite>,
}

/// One atomic unit of work against the graph store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GraphMutation {
    /// Upsert the subject and rebuild each family of edges.
    ReplaceSubject {
        subject: NodeUpsert,
        families: Vec<EdgeFamily>,
    },
    /// Remove the subject node together with all of its edges.
    DetachSubject { label: String, id: String },
}

impl GraphMutation {
    pub fn subject_id(&self) -> &str {
        match self {
            Self::ReplaceSubject { subject, .. } => &subject.id,
            Self::DetachSubject { id, .. } => id,
        }
    }

    pub fn subject_label(&self) -> &str {
        match self {
            Self::ReplaceSubject { subject, .. } => &subject.label,
            Self::DetachSubject { label, .. } => label,
        }
    }

    /// Number of edges this mutation leaves behind.
    pub fn edge_count(&self) -> usize {
        match self {
            Self::ReplaceSubject { families, .. } => families.iter().map(|f| f.edges.len()).sum(),
            Self::DetachSubject { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props_drop_unset_values() {
        let p = props([
            ("count", Some(PropValue::Int(3))),
            ("reason", None),
            ("approved", Some(PropValue::Bool(true))),
        ]);
        assert_eq!(p.len(), 2);
        assert!(!p.contains_key("reason"));
    }

    #[test]
    fn test_attrs_keep_unset_values_as_null() {
        let a = attrs([("email", None), ("role", Some(PropValue::from("admin")))]);
        assert_eq!(a.get("email"), Some(&PropValue::Null));
        assert_eq!(a.get("role"), Some(&PropValue::Text("admin".to_string())));
    }

    #[test]
    fn test_mutation_serializes_with_action_tag() {
        let mutation = GraphMutation::DetachSubject {
            label: "B2CCustomer".to_string(),
            id: "c1".to_string(),
        };
        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json["action"], "detach_subject");
        assert_eq!(json["id"], "c1");
        assert_eq!(mutation.edge_count(), 0);
    }
}
