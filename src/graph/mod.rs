//! Shared graph model.
//!
//! - `node`: lexical items, node handles and the sentinel factories
//! - `graph`: the arena-backed graph, its edges and `GraphError`

pub mod graph;
pub mod node;

pub use graph::{Edge, Graph, GraphError};
pub use node::{Node, NodeId, ELLIP_LEMMA, ELLIP_POS, NIL_LEMMA, NIL_POS};

/// One input sentence: its alternative parses, best first.
pub type Sentence = Vec<Graph>;
