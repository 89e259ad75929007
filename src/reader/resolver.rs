//! Index-addressed node resolution with forward references.

use std::collections::BTreeMap;

use crate::error::{GraphFormatError, Result};
use crate::grammar::{Label, RelationGrammar};
use crate::graph::{Graph, Node, NodeId};

/// Maps 1-based token indices to nodes of the graph under construction.
///
/// Slots are sparse: an index can be referenced before any lower index has
/// been seen. Each index gets one node, created the first time it is
/// resolved; later references share it.
#[derive(Debug, Default)]
pub struct NodeResolver {
    slots: BTreeMap<usize, NodeId>,
}

/// Largest index a corpus token may carry.
const MAX_INDEX: usize = i32::MAX as usize;

impl NodeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every slot, ready for the next graph.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Node for a 1-based index, created from `lemma` and `pos` on first use.
    ///
    /// `token` is the raw text reported when the index is out of range.
    pub fn resolve(
        &mut self,
        graph: &mut Graph,
        index: usize,
        lemma: &str,
        pos: &str,
        token: &str,
    ) -> Result<NodeId> {
        if index == 0 || index > MAX_INDEX {
            return Err(GraphFormatError::format("Node index out of range", token));
        }
        let id = *self
            .slots
            .entry(index)
            .or_insert_with(|| graph.alloc_node(Node::new(lemma, pos)));
        Ok(id)
    }

    /// Resolve a relation argument such as `|be:4_VBZ|`.
    ///
    /// Indexed tokens go through the slots. The ellipsis token becomes a fresh
    /// ellip node and any other unindexed token a fresh node of its own; both
    /// are listed by [`NodeResolver::finish`].
    pub fn resolve_token(
        &mut self,
        graph: &mut Graph,
        token: &str,
        grammar: &RelationGrammar,
    ) -> Result<NodeId> {
        let label = Label::parse(token);
        match label.index {
            Some(index) => self.resolve(graph, index, &label.lemma, label.pos_or_empty(), token),
            None if grammar.is_ellip(&label.lemma) => Ok(graph.alloc_node(Node::ellip())),
            None => Ok(graph.alloc_node(Node::new(label.lemma.as_str(), label.pos_or_empty()))),
        }
    }

    /// List the resolved nodes in index order, then every edge endpoint that
    /// is still unlisted. Indices never resolved leave no trace.
    pub fn finish(&mut self, graph: &mut Graph) {
        let order: Vec<NodeId> = std::mem::take(&mut self.slots).into_values().collect();
        graph.set_node_order(order);
        graph.attach_edge_endpoints();
    }
}
