use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::node::{Node, NodeId};

/// Structural inconsistencies inside a graph.
///
/// These indicate a bug in a reader or in the caller, not a problem with the
/// corpus being read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Found a node as the head of an edge that is not present in the list of nodes: {0}")]
    HeadNotListed(String),

    #[error("Found a node as the dependent of an edge that is not present in the list of nodes: {0}")]
    DepNotListed(String),
}

/// A labelled, directed relation from head to dependent.
///
/// Endpoints are handles into the owning graph's node arena.
#[derive(Debug, Clone)]
pub struct Edge {
    label: String,
    head: NodeId,
    dep: NodeId,
}

impl Edge {
    pub fn new(label: impl Into<String>, head: NodeId, dep: NodeId) -> Self {
        Self {
            label: label.into(),
            head,
            dep,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn dep(&self) -> NodeId {
        self.dep
    }
}

/// Dependency graph: an ordered node list, an ordered edge list and optional
/// string metadata.
///
/// Nodes live in an arena; the node list is an ordered sequence of handles
/// into it. A node can be allocated without being listed (readers do this for
/// sentinels and forward references, then list them once relation processing
/// is finished).
#[derive(Debug, Default)]
pub struct Graph {
    arena: Vec<Node>,
    order: Vec<NodeId>,
    edges: Vec<Edge>,
    metadata: Option<HashMap<String, String>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node and append it to the node list.
    pub fn add_node(&mut self, lemma: impl Into<String>, pos: impl Into<String>) -> NodeId {
        self.push_node(Node::new(lemma, pos))
    }

    /// Take ownership of a node and append it to the node list.
    pub fn push_node(&mut self, node: Node) -> NodeId {
        let id = self.alloc_node(node);
        self.order.push(id);
        id
    }

    /// Allocate a node in the arena without listing it.
    pub fn alloc_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.arena.len());
        self.arena.push(node);
        id
    }

    /// Append an already allocated node to the node list.
    ///
    /// # Panics
    /// If `id` was not allocated by this graph.
    pub fn attach_node(&mut self, id: NodeId) -> NodeId {
        assert!(
            id.0 < self.arena.len(),
            "node handle {} does not belong to this graph",
            id.0
        );
        self.order.push(id);
        id
    }

    /// Replace the node list. Every id must come from this graph's arena.
    pub(crate) fn set_node_order(&mut self, order: Vec<NodeId>) {
        debug_assert!(order.iter().all(|id| id.0 < self.arena.len()));
        self.order = order;
    }

    /// List every edge endpoint that is not yet in the node list, in edge
    /// order (head before dependent).
    pub fn attach_edge_endpoints(&mut self) {
        for i in 0..self.edges.len() {
            let (head, dep) = (self.edges[i].head, self.edges[i].dep);
            if !self.contains(head) {
                self.order.push(head);
            }
            if !self.contains(dep) {
                self.order.push(dep);
            }
        }
    }

    pub fn add_edge(&mut self, label: impl Into<String>, head: NodeId, dep: NodeId) -> &Edge {
        self.push_edge(Edge::new(label, head, dep))
    }

    pub fn push_edge(&mut self, edge: Edge) -> &Edge {
        self.edges.push(edge);
        &self.edges[self.edges.len() - 1]
    }

    /// Handles of the listed nodes, in order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// The listed nodes, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().map(move |id| &self.arena[id.0])
    }

    /// # Panics
    /// If `id` was not allocated by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id.0]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    /// # Panics
    /// If `id` was not allocated by this graph.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id.0]
    }

    /// Node at a position of the node list.
    pub fn node_at(&self, position: usize) -> Option<&Node> {
        self.order.get(position).map(|id| &self.arena[id.0])
    }

    /// Position of a node in the node list.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|&listed| listed == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.order.contains(&id)
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut Vec<Edge> {
        &mut self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn head(&self, edge: &Edge) -> &Node {
        self.node(edge.head)
    }

    pub fn dep(&self, edge: &Edge) -> &Node {
        self.node(edge.dep)
    }

    /// Edges as `(label, head position, dep position)` over the node list.
    pub fn edge_positions(&self) -> Result<Vec<(&str, usize, usize)>, GraphError> {
        self.edges
            .iter()
            .map(|edge| {
                let head = self
                    .position(edge.head)
                    .ok_or_else(|| GraphError::HeadNotListed(self.node(edge.head).label()))?;
                let dep = self
                    .position(edge.dep)
                    .ok_or_else(|| GraphError::DepNotListed(self.node(edge.dep).label()))?;
                Ok((edge.label(), head, dep))
            })
            .collect()
    }

    /// Check that every edge endpoint is in the node list.
    pub fn check_endpoints(&self) -> Result<(), GraphError> {
        self.edge_positions().map(|_| ())
    }

    pub fn put_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key).map(|v| v.as_str())
    }

    pub fn metadata_map(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Independent copy with fresh nodes, edges remapped by list position.
    ///
    /// Unlisted arena nodes are not copied. Fails if an edge points at a node
    /// that is not in the node list.
    pub fn try_clone(&self) -> Result<Graph, GraphError> {
        let mut graph = Graph::new();
        for node in self.nodes() {
            graph.push_node(node.clone());
        }
        for (label, head, dep) in self.edge_positions()? {
            let (head, dep) = (graph.order[head], graph.order[dep]);
            graph.add_edge(label, head, dep);
        }
        graph.metadata = self.metadata.clone();
        Ok(graph)
    }
}

impl Clone for Graph {
    /// # Panics
    /// If an edge references a node missing from the node list.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(graph) => graph,
            Err(e) => panic!("cannot clone inconsistent graph: {}", e),
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "::: Nodes: ")?;
        for node in self.nodes() {
            writeln!(f, "{}", node)?;
        }
        writeln!(f, "::: Edges: ")?;
        for edge in &self.edges {
            writeln!(f, "{} {} {}", edge.label, self.head(edge), self.dep(edge))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut graph = Graph::new();
        let be = graph.add_node("be", "VBZ");
        let processing = graph.add_node("processing", "NN1");
        let field = graph.add_node("field", "NN1");
        graph.add_edge("ncsubj", be, processing);
        graph.add_edge("xcomp", be, field);
        graph.put_metadata("text", "processing is a field");
        graph
    }

    #[test]
    fn test_add_nodes_and_edges() {
        let graph = sample();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let edge = &graph.edges()[0];
        assert_eq!(edge.label(), "ncsubj");
        assert_eq!(graph.head(edge).label(), "be_VBZ");
        assert_eq!(graph.dep(edge).label(), "processing_NN1");
        assert_eq!(graph.position(edge.dep()), Some(1));
    }

    #[test]
    fn test_identity_not_value() {
        let mut graph = Graph::new();
        let first = graph.add_node("a", "AT1");
        let second = graph.add_node("a", "AT1");
        assert_ne!(first, second);
        assert_eq!(graph.position(second), Some(1));
    }

    #[test]
    fn test_clone_is_independent() {
        let graph = sample();
        let mut copy = graph.clone();
        assert_eq!(copy.to_string(), graph.to_string());

        let id = copy.node_ids()[0];
        copy.node_mut(id).set_lemma("changed");
        assert_eq!(graph.node_at(0).map(|n| n.lemma()), Some("be"));
        assert_eq!(copy.node_at(0).map(|n| n.lemma()), Some("changed"));
        assert_eq!(copy.metadata("text"), Some("processing is a field"));
    }

    #[test]
    fn test_clone_remaps_by_position() {
        let mut graph = Graph::new();
        let hidden = graph.alloc_node(Node::new("unused", "X"));
        let a = graph.add_node("a", "A");
        let b = graph.add_node("b", "B");
        graph.add_edge("rel", b, a);
        assert!(!graph.contains(hidden));

        let copy = graph.try_clone().unwrap();
        let edge = &copy.edges()[0];
        assert_eq!(copy.position(edge.head()), Some(1));
        assert_eq!(copy.position(edge.dep()), Some(0));
    }

    #[test]
    fn test_try_clone_rejects_unlisted_endpoint() {
        let mut graph = Graph::new();
        let head = graph.add_node("sleep", "VV0");
        let dep = graph.alloc_node(Node::nil());
        graph.add_edge("passive", head, dep);

        let err = graph.try_clone().unwrap_err();
        assert_eq!(err, GraphError::DepNotListed("[[null]]_[[nullpos]]".to_string()));
    }

    #[test]
    #[should_panic(expected = "cannot clone inconsistent graph")]
    fn test_clone_panics_on_unlisted_endpoint() {
        let mut graph = Graph::new();
        let head = graph.alloc_node(Node::ellip());
        let dep = graph.add_node("sleep", "VV0");
        graph.add_edge("conj", head, dep);
        let _ = graph.clone();
    }

    #[test]
    fn test_attach_edge_endpoints() {
        let mut graph = Graph::new();
        let head = graph.add_node("study", "VVN");
        let nil = graph.alloc_node(Node::nil());
        let ellip = graph.alloc_node(Node::ellip());
        graph.add_edge("passive", head, nil);
        graph.add_edge("conj", ellip, head);
        graph.attach_edge_endpoints();

        assert_eq!(graph.node_ids(), &[head, nil, ellip]);
        assert!(graph.check_endpoints().is_ok());
    }

    #[test]
    fn test_metadata() {
        let mut graph = Graph::new();
        assert!(!graph.has_metadata());
        assert!(graph.metadata("missing").is_none());
        graph.put_metadata("sentenceId", "1");
        graph.put_metadata("sentenceId", "2");
        assert!(graph.has_metadata());
        assert_eq!(graph.metadata("sentenceId"), Some("2"));
        assert_eq!(graph.metadata_map().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_display() {
        let graph = sample();
        let text = graph.to_string();
        assert!(text.starts_with("::: Nodes: \nbe_VBZ\n"));
        assert!(text.contains("::: Edges: \nncsubj be_VBZ processing_NN1\n"));
    }
}
