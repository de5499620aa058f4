//! Type-safe node identifiers.
//!
//! A [`Node`] names one entry of a logic network: the constant, a primary
//! input, or a gate. Ids are dense, start at 0 (the constant), and stay valid
//! until the network is compacted by [`cleanup_dangling`][crate::cleanup::cleanup_dangling].
use std::fmt;

/// A node identifier within one network.
///
/// # Invariants
///
/// - Node 0 is the constant node of every network in this crate.
/// - Ids are never reused: a dead node keeps its id until compaction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Node(u32);

impl Node {
    /// The constant node.
    pub const CONSTANT: Node = Node(0);

    /// Creates a node with the given id.
    pub const fn new(id: u32) -> Self {
        Node(id)
    }

    /// Returns the raw node id.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the node id as an index into per-node arrays.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<Node> for u32 {
    fn from(node: Node) -> Self {
        node.0
    }
}

impl From<u32> for Node {
    fn from(id: u32) -> Self {
        Node(id)
    }
}

impl From<usize> for Node {
    fn from(index: usize) -> Self {
        assert!(index <= u32::MAX as usize >> 1, "Node index {} is out of range", index);
        Node(index as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let n1 = Node::new(1);
        let n2 = Node::from(2usize);
        assert_eq!(n1.id(), 1);
        assert_eq!(n2.index(), 2);
        assert!(n1 < n2);
        assert_eq!(Node::CONSTANT, Node::new(0));
    }

    #[test]
    fn test_node_display() {
        assert_eq!(Node::new(7).to_string(), "n7");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_node_index_out_of_range() {
        let _ = Node::from(usize::MAX);
    }
}
