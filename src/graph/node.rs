use std::fmt;

/// Lemma used for nodes that stand in for an elided head.
pub const ELLIP_LEMMA: &str = "[[ellip]]";
/// Part-of-speech of the ellipsis sentinel.
pub const ELLIP_POS: &str = "[[ellippos]]";
/// Lemma used for nodes that stand in for a missing dependent.
pub const NIL_LEMMA: &str = "[[null]]";
/// Part-of-speech of the missing-dependent sentinel.
pub const NIL_POS: &str = "[[nullpos]]";

/// Handle of a node inside the arena of the [`Graph`](super::Graph) that
/// allocated it. Two handles are the same node iff they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena slot of this node.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A lexical item: lemma plus part-of-speech.
///
/// Nodes deliberately do not implement `PartialEq`: two nodes with the same
/// lemma and POS are still different nodes. Compare [`NodeId`]s instead.
#[derive(Debug, Clone)]
pub struct Node {
    lemma: String,
    pos: String,
}

impl Node {
    pub fn new(lemma: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            pos: pos.into(),
        }
    }

    /// Fresh sentinel for an elided head.
    pub fn ellip() -> Self {
        Self::new(ELLIP_LEMMA, ELLIP_POS)
    }

    /// Fresh sentinel for a missing dependent.
    pub fn nil() -> Self {
        Self::new(NIL_LEMMA, NIL_POS)
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn pos(&self) -> &str {
        &self.pos
    }

    pub fn set_lemma(&mut self, lemma: impl Into<String>) {
        self.lemma = lemma.into();
    }

    pub fn set_pos(&mut self, pos: impl Into<String>) {
        self.pos = pos.into();
    }

    /// Lemma and POS joined by an underscore (`lemma_POS`).
    pub fn label(&self) -> String {
        format!("{}_{}", self.lemma, self.pos)
    }

    pub fn is_ellip(&self) -> bool {
        self.lemma == ELLIP_LEMMA && self.pos == ELLIP_POS
    }

    pub fn is_nil(&self) -> bool {
        self.lemma == NIL_LEMMA && self.pos == NIL_POS
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.lemma, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let node = Node::new("processing", "NN1");
        assert_eq!(node.label(), "processing_NN1");
        assert_eq!(node.to_string(), "processing_NN1");
    }

    #[test]
    fn test_sentinels_are_fresh() {
        let mut first = Node::ellip();
        let second = Node::ellip();
        first.set_lemma("edited");
        assert_eq!(second.lemma(), ELLIP_LEMMA);
        assert!(second.is_ellip());
        assert!(!first.is_ellip());
        assert!(Node::nil().is_nil());
        assert!(!Node::nil().is_ellip());
    }
}
