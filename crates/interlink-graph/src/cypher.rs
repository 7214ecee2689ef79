//! Cypher rendering of graph mutations.
//!
//! Labels, relationship kinds and property names cannot be parameterized in
//! Cypher, so they are interpolated after an identifier check; every value
//! travels as a query parameter.

use interlink_core::{EdgeFamily, GraphMutation, NodeUpsert, PropValue, Props, SyncError, SyncResult};

/// One parameterized Cypher statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub cypher: String,
    pub params: Vec<(String, PropValue)>,
}

impl Statement {
    fn new(cypher: String) -> Self {
        Self { cypher, params: Vec::new() }
    }

    fn param(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    /// Convert into a neo4rs query.
    pub fn into_query(self) -> neo4rs::Query {
        let mut query = neo4rs::Query::new(self.cypher);
        for (name, value) in self.params {
            query = match value {
                PropValue::Int(v) => query.param(&name, v),
                PropValue::Float(v) => query.param(&name, v),
                PropValue::Bool(v) => query.param(&name, v),
                PropValue::Text(v) => query.param(&name, v),
                PropValue::Timestamp(v) => query.param(&name, v.to_rfc3339()),
                // Rendered inline as a literal, never bound.
                PropValue::Null => query,
            };
        }
        query
    }
}

fn identifier(s: &str) -> SyncResult<&str> {
    let mut chars = s.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(s)
    } else {
        Err(SyncError::graph(format!("invalid Cypher identifier '{}'", s)))
    }
}

/// Render `SET` assignments for `var`, binding values as `p_<name>`.
fn render_set(var: &str, props: &Props, mut stmt: Statement) -> SyncResult<Statement> {
    if props.is_empty() {
        return Ok(stmt);
    }

    let mut assignments = Vec::with_capacity(props.len());
    for (name, value) in props {
        let name = identifier(name)?;
        let param = format!("p_{}", name);
        let rhs = match value {
            PropValue::Null => "null".to_string(),
            PropValue::Timestamp(_) => format!("datetime(${})", param),
            _ => format!("${}", param),
        };
        assignments.push(format!("{}.{} = {}", var, name, rhs));
        if !matches!(value, PropValue::Null) {
            stmt = stmt.param(&param, value.clone());
        }
    }

    stmt.cypher.push_str(&format!("\nSET {}", assignments.join(", ")));
    Ok(stmt)
}

fn render_node(node: &NodeUpsert) -> SyncResult<Statement> {
    let stmt = Statement::new(format!("MERGE (n:{} {{id: $id}})", identifier(&node.label)?))
        .param("id", node.id.as_str());
    render_set("n", &node.props, stmt)
}

fn render_family(subject: &NodeUpsert, family: &EdgeFamily) -> SyncResult<Vec<Statement>> {
    let subject_label = identifier(&subject.label)?;
    let counterpart = identifier(&family.counterpart_label)?;
    let mut statements = Vec::with_capacity(1 + family.nodes.len() + family.edges.len());

    if !family.managed_kinds.is_empty() {
        let kinds = family
            .managed_kinds
            .iter()
            .map(|k| identifier(k))
            .collect::<SyncResult<Vec<_>>>()?
            .join("|");
        statements.push(
            Statement::new(format!(
                "MATCH (s:{} {{id: $subject_id}})\n\
                 OPTIONAL MATCH (s)-[r:{}]->(:{})\n\
                 DELETE r",
                subject_label, kinds, counterpart
            ))
            .param("subject_id", subject.id.as_str()),
        );
    }

    for node in &family.nodes {
        statements.push(render_node(node)?);
    }

    for edge in &family.edges {
        let stmt = Statement::new(format!(
            "MATCH (s:{} {{id: $subject_id}})\n\
             MERGE (c:{} {{id: $target_id}})\n\
             MERGE (s)-[e:{}]->(c)",
            subject_label,
            counterpart,
            identifier(&edge.kind)?
        ))
        .param("subject_id", subject.id.as_str())
        .param("target_id", edge.target_id.as_str());
        statements.push(render_set("e", &edge.props, stmt)?);
    }

    Ok(statements)
}

/// Render a mutation as an ordered list of statements.
///
/// For each family the DELETE of managed kinds precedes every edge MERGE, so
/// the statements must run in order inside one transaction.
pub fn render(mutation: &GraphMutation) -> SyncResult<Vec<Statement>> {
    match mutation {
        GraphMutation::ReplaceSubject { subject, families } => {
            let mut statements = vec![render_node(subject)?];
            for family in families {
                statements.extend(render_family(subject, family)?);
            }
            Ok(statements)
        }
        GraphMutation::DetachSubject { label, id } => Ok(vec![Statement::new(format!(
            "MATCH (s:{} {{id: $id}}) DETACH DELETE s",
            identifier(label)?
        ))
        .param("id", id.as_str())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlink_core::mutation::{attrs, props};
    use interlink_core::EdgeWrite;

    fn mutation() -> GraphMutation {
        GraphMutation::ReplaceSubject {
            subject: NodeUpsert::new("VendorUser", "u1").with_props(attrs([
                ("email", Some(PropValue::from("a@b.test"))),
                ("role", None),
            ])),
            families: vec![EdgeFamily {
                name: "product_views".to_string(),
                counterpart_label: "Product".to_string(),
                managed_kinds: vec!["VIEWED_PRODUCT".to_string()],
                nodes: vec![NodeUpsert::new("Product", "p1")],
                edges: vec![EdgeWrite {
                    kind: "VIEWED_PRODUCT".to_string(),
                    target_id: "p1".to_string(),
                    props: props([
                        ("count", Some(PropValue::Int(3))),
                        ("last_at", Some(PropValue::from(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH))),
                    ]),
                }],
            }],
        }
    }

    #[test]
    fn test_subject_upsert_sets_and_clears_attributes() {
        let statements = render(&mutation()).unwrap();
        let subject = &statements[0];
        assert!(subject.cypher.starts_with("MERGE (n:VendorUser {id: $id})"));
        assert!(subject.cypher.contains("n.email = $p_email"));
        assert!(subject.cypher.contains("n.role = null"));
        assert!(!subject.params.iter().any(|(name, _)| name == "p_role"));
    }

    #[test]
    fn test_delete_precedes_edge_merge() {
        let statements = render(&mutation()).unwrap();
        assert_eq!(statements.len(), 4);

        let delete = statements.iter().position(|s| s.cypher.contains("DELETE r")).unwrap();
        let merge = statements.iter().position(|s| s.cypher.contains("MERGE (s)-[e:VIEWED_PRODUCT]->(c)")).unwrap();
        assert!(delete < merge);
        assert!(statements[delete].cypher.contains("[r:VIEWED_PRODUCT]->(:Product)"));
        assert!(statements[merge].cypher.contains("e.last_at = datetime($p_last_at)"));
    }

    #[test]
    fn test_detach_renders_single_statement() {
        let statements = render(&GraphMutation::DetachSubject {
            label: "B2CCustomer".to_string(),
            id: "c1".to_string(),
        })
        .unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].cypher, "MATCH (s:B2CCustomer {id: $id}) DETACH DELETE s");
        assert_eq!(statements[0].params, vec![("id".to_string(), PropValue::from("c1"))]);
    }

    #[test]
    fn test_rejects_injected_identifiers() {
        let bad = GraphMutation::DetachSubject {
            label: "User) DETACH DELETE (x".to_string(),
            id: "c1".to_string(),
        };
        assert!(matches!(render(&bad), Err(SyncError::Graph(_))));
    }
}
