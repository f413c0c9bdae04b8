//! Mind maps: titled concept graphs of labelled nodes and connections.
//!
//! Graphs come from two places, the canvas editor and the reasoning model.
//! Both go through [`MindMapGraph::new`], so a stored graph always satisfies:
//!
//! - node ids are non-empty and unique within the map;
//! - labels are non-empty;
//! - positions, when present, have finite coordinates;
//! - every connection joins two different existing nodes;
//! - no text contains a NUL character.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::conversation::{ConversationValidationError, has_nul, validate_title};
use super::{MaterialId, MindMapId, Owned, UserId};

/// Maximum mind-map title length.
pub const MIND_MAP_TITLE_MAX: usize = 200;
/// Maximum number of nodes in one map.
pub const MAX_NODES: usize = 500;
/// Maximum number of connections in one map.
pub const MAX_CONNECTIONS: usize = 2_000;
const NODE_ID_MAX: usize = 64;
const LABEL_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 2_000;
const COLOR_MAX: usize = 32;

/// Validation failures for mind-map graphs and titles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MindMapValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("mind map must have at most {max} nodes")]
    TooManyNodes { max: usize },
    #[error("mind map must have at most {max} connections")]
    TooManyConnections { max: usize },
    #[error("node {index} has an empty or oversized id")]
    InvalidNodeId { index: usize },
    #[error("node id `{id}` is used more than once")]
    DuplicateNodeId { id: String },
    #[error("node {index} has an empty or oversized label")]
    InvalidLabel { index: usize },
    #[error("node {index} has an oversized description or color")]
    InvalidNodeDecoration { index: usize },
    #[error("node {index} has a non-finite position")]
    InvalidPosition { index: usize },
    #[error("connection {index} references unknown node `{node}`")]
    UnknownNode { index: usize, node: String },
    #[error("connection {index} joins a node to itself")]
    SelfConnection { index: usize },
    #[error("mind map must contain at least one node")]
    Empty,
    #[error("title must not contain NUL characters")]
    NulInTitle,
    #[error("node {index} contains a NUL character")]
    NulInNode { index: usize },
    #[error("connection {index} contains a NUL character")]
    NulInConnection { index: usize },
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl NodePosition {
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A labelled concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MindMapNode {
    #[schema(example = "photosynthesis")]
    pub id: String,
    #[schema(example = "Photosynthesis")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<NodePosition>,
}

/// A directed, optionally labelled relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MindMapConnection {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A graph that satisfies the module invariants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MindMapGraph {
    nodes: Vec<MindMapNode>,
    connections: Vec<MindMapConnection>,
}

impl MindMapGraph {
    /// Validate nodes and connections together.
    ///
    /// # Examples
    /// ```
    /// use study_assistant::domain::{MindMapConnection, MindMapGraph, MindMapNode};
    ///
    /// let node = |id: &str| MindMapNode {
    ///     id: id.into(),
    ///     label: id.to_uppercase(),
    ///     description: None,
    ///     color: None,
    ///     position: None,
    /// };
    /// let link = MindMapConnection { from: "a".into(), to: "b".into(), label: None };
    /// assert!(MindMapGraph::new(vec![node("a"), node("b")], vec![link.clone()]).is_ok());
    /// assert!(MindMapGraph::new(vec![node("a")], vec![link]).is_err());
    /// ```
    pub fn new(
        nodes: Vec<MindMapNode>,
        connections: Vec<MindMapConnection>,
    ) -> Result<Self, MindMapValidationError> {
        if nodes.len() > MAX_NODES {
            return Err(MindMapValidationError::TooManyNodes { max: MAX_NODES });
        }
        if connections.len() > MAX_CONNECTIONS {
            return Err(MindMapValidationError::TooManyConnections {
                max: MAX_CONNECTIONS,
            });
        }

        let nodes = nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| normalise_node(index, node))
            .collect::<Result<Vec<_>, _>>()?;

        let connections = connections
            .into_iter()
            .enumerate()
            .map(|(index, connection)| normalise_connection(index, connection))
            .collect::<Result<Vec<_>, _>>()?;

        let mut ids = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(MindMapValidationError::DuplicateNodeId {
                    id: node.id.clone(),
                });
            }
        }

        for (index, connection) in connections.iter().enumerate() {
            for end in [&connection.from, &connection.to] {
                if !ids.contains(end.as_str()) {
                    return Err(MindMapValidationError::UnknownNode {
                        index,
                        node: end.clone(),
                    });
                }
            }
            if connection.from == connection.to {
                return Err(MindMapValidationError::SelfConnection { index });
            }
        }

        Ok(Self { nodes, connections })
    }

    /// Like [`MindMapGraph::new`] but also rejects graphs without nodes.
    pub fn non_empty(
        nodes: Vec<MindMapNode>,
        connections: Vec<MindMapConnection>,
    ) -> Result<Self, MindMapValidationError> {
        if nodes.is_empty() {
            return Err(MindMapValidationError::Empty);
        }
        Self::new(nodes, connections)
    }

    pub fn nodes(&self) -> &[MindMapNode] {
        &self.nodes
    }

    pub fn connections(&self) -> &[MindMapConnection] {
        &self.connections
    }

    pub fn into_parts(self) -> (Vec<MindMapNode>, Vec<MindMapConnection>) {
        (self.nodes, self.connections)
    }
}

fn normalise_node(index: usize, node: MindMapNode) -> Result<MindMapNode, MindMapValidationError> {
    let MindMapNode {
        id,
        label,
        description,
        color,
        position,
    } = node;

    let texts = [Some(&id), Some(&label), description.as_ref(), color.as_ref()];
    if texts.into_iter().flatten().any(|text| has_nul(text)) {
        return Err(MindMapValidationError::NulInNode { index });
    }
    let id = id.trim().to_owned();
    if id.is_empty() || id.chars().count() > NODE_ID_MAX {
        return Err(MindMapValidationError::InvalidNodeId { index });
    }
    let label = label.trim().to_owned();
    if label.is_empty() || label.chars().count() > LABEL_MAX {
        return Err(MindMapValidationError::InvalidLabel { index });
    }
    let oversized = description
        .as_deref()
        .is_some_and(|text| text.chars().count() > DESCRIPTION_MAX)
        || color
            .as_deref()
            .is_some_and(|text| text.chars().count() > COLOR_MAX);
    if oversized {
        return Err(MindMapValidationError::InvalidNodeDecoration { index });
    }
    if position.is_some_and(|point| !point.is_finite()) {
        return Err(MindMapValidationError::InvalidPosition { index });
    }

    Ok(MindMapNode {
        id,
        label,
        description,
        color,
        position,
    })
}

fn normalise_connection(
    index: usize,
    connection: MindMapConnection,
) -> Result<MindMapConnection, MindMapValidationError> {
    let MindMapConnection { from, to, label } = connection;
    let texts = [Some(&from), Some(&to), label.as_ref()];
    if texts.into_iter().flatten().any(|text| has_nul(text)) {
        return Err(MindMapValidationError::NulInConnection { index });
    }
    Ok(MindMapConnection {
        from: from.trim().to_owned(),
        to: to.trim().to_owned(),
        label,
    })
}

/// Validate a mind-map title.
pub fn mind_map_title(raw: &str) -> Result<String, MindMapValidationError> {
    validate_title(raw, MIND_MAP_TITLE_MAX).map_err(|error| match error {
        ConversationValidationError::EmptyTitle => MindMapValidationError::EmptyTitle,
        ConversationValidationError::NulCharacter => MindMapValidationError::NulInTitle,
        _ => MindMapValidationError::TitleTooLong {
            max: MIND_MAP_TITLE_MAX,
        },
    })
}

/// Values needed to create a mind map.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMindMap {
    pub user_id: UserId,
    pub title: String,
    pub graph: MindMapGraph,
    pub material_ids: Vec<MaterialId>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MindMapChanges {
    pub title: Option<String>,
    pub graph: Option<MindMapGraph>,
}

/// A stored mind map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub id: MindMapId,
    pub user_id: UserId,
    pub title: String,
    pub nodes: Vec<MindMapNode>,
    pub connections: Vec<MindMapConnection>,
    #[serde(default)]
    pub material_ids: Vec<MaterialId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MindMap {
    /// Assemble a stored map; both timestamps start at `created_at`.
    pub fn from_draft(id: MindMapId, draft: NewMindMap, created_at: DateTime<Utc>) -> Self {
        let NewMindMap {
            user_id,
            title,
            graph,
            material_ids,
        } = draft;
        let (nodes, connections) = graph.into_parts();
        Self {
            id,
            user_id,
            title,
            nodes,
            connections,
            material_ids,
            created_at,
            updated_at: created_at,
        }
    }

    /// Apply a change set and stamp `updated_at`.
    pub fn apply(&mut self, changes: MindMapChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(graph) = changes.graph {
            let (nodes, connections) = graph.into_parts();
            self.nodes = nodes;
            self.connections = connections;
        }
        self.updated_at = now;
    }
}

impl Owned for MindMap {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    fn node(id: &str) -> MindMapNode {
        MindMapNode {
            id: id.to_owned(),
            label: format!("Label {id}"),
            description: None,
            color: None,
            position: None,
        }
    }

    fn link(from: &str, to: &str) -> MindMapConnection {
        MindMapConnection {
            from: from.to_owned(),
            to: to.to_owned(),
            label: None,
        }
    }

    #[fixture]
    fn nodes() -> Vec<MindMapNode> {
        vec![node("a"), node("b"), node("c")]
    }

    #[rstest]
    fn accepts_consistent_graphs(nodes: Vec<MindMapNode>) {
        let graph = MindMapGraph::new(nodes, vec![link("a", "b"), link("b", "c")])
            .expect("valid graph");
        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.connections().len(), 2);
    }

    #[rstest]
    fn trims_ids_and_labels() {
        let mut raw = node(" a ");
        raw.label = "  Cell  ".to_owned();
        let graph = MindMapGraph::new(vec![raw], vec![]).expect("valid graph");
        assert_eq!(graph.nodes()[0].id, "a");
        assert_eq!(graph.nodes()[0].label, "Cell");
    }

    #[rstest]
    #[case(vec![link("a", "z")], MindMapValidationError::UnknownNode { index: 0, node: "z".to_owned() })]
    #[case(vec![link("a", "b"), link("c", "c")], MindMapValidationError::SelfConnection { index: 1 })]
    fn rejects_bad_connections(
        nodes: Vec<MindMapNode>,
        #[case] connections: Vec<MindMapConnection>,
        #[case] expected: MindMapValidationError,
    ) {
        assert_eq!(MindMapGraph::new(nodes, connections), Err(expected));
    }

    #[rstest]
    fn connection_endpoints_are_trimmed_like_node_ids() {
        let graph = MindMapGraph::new(vec![node(" a "), node("b")], vec![link(" a ", "b\t")])
            .expect("valid graph");

        assert_eq!(graph.connections()[0], link("a", "b"));
    }

    #[rstest]
    fn rejects_nul_in_stored_text(nodes: Vec<MindMapNode>) {
        let mut noisy = node("d");
        noisy.description = Some("light\0dark".to_owned());
        let mut with_noisy = nodes.clone();
        with_noisy.push(noisy);
        assert_eq!(
            MindMapGraph::new(with_noisy, vec![]),
            Err(MindMapValidationError::NulInNode { index: 3 })
        );

        let mut labelled = link("a", "b");
        labelled.label = Some("causes\0".to_owned());
        assert_eq!(
            MindMapGraph::new(nodes, vec![link("b", "c"), labelled]),
            Err(MindMapValidationError::NulInConnection { index: 1 })
        );

        assert_eq!(mind_map_title("Cells\0"), Err(MindMapValidationError::NulInTitle));
    }

    #[rstest]
    fn rejects_duplicate_ids() {
        let result = MindMapGraph::new(vec![node("a"), node("a")], vec![]);
        assert_eq!(
            result,
            Err(MindMapValidationError::DuplicateNodeId { id: "a".to_owned() })
        );
    }

    #[rstest]
    fn rejects_blank_labels_and_nan_positions() {
        let mut blank = node("a");
        blank.label = " ".to_owned();
        assert_eq!(
            MindMapGraph::new(vec![blank], vec![]),
            Err(MindMapValidationError::InvalidLabel { index: 0 })
        );

        let mut drifting = node("b");
        drifting.position = Some(NodePosition {
            x: f64::NAN,
            y: 0.0,
            z: 0.0,
        });
        assert_eq!(
            MindMapGraph::new(vec![node("a"), drifting], vec![]),
            Err(MindMapValidationError::InvalidPosition { index: 1 })
        );
    }

    #[rstest]
    fn non_empty_rejects_empty_graphs() {
        assert_eq!(
            MindMapGraph::non_empty(vec![], vec![]),
            Err(MindMapValidationError::Empty)
        );
    }

    #[rstest]
    fn apply_refreshes_updated_at(nodes: Vec<MindMapNode>) {
        let created = Utc::now();
        let mut map = MindMap::from_draft(
            MindMapId::random(),
            NewMindMap {
                user_id: UserId::random(),
                title: "Cells".to_owned(),
                graph: MindMapGraph::new(nodes, vec![]).expect("graph"),
                material_ids: vec![],
            },
            created,
        );
        let later = created + Duration::seconds(5);
        map.apply(
            MindMapChanges {
                title: Some("Cell biology".to_owned()),
                graph: None,
            },
            later,
        );
        assert_eq!(map.title, "Cell biology");
        assert_eq!(map.nodes.len(), 3);
        assert_eq!(map.updated_at, later);
        assert_eq!(map.created_at, created);
    }

    #[rstest]
    fn position_z_defaults_to_zero() {
        let parsed: NodePosition =
            serde_json::from_str(r#"{"x": 1.5, "y": -2.0}"#).expect("position");
        assert_eq!(parsed.z, 0.0);
    }
}
