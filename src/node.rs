use crate::signal::Signal;
use crate::types::Node;
use crate::utils::{pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NodeKind {
    Constant,
    Input,
    Majority,
}

/// Storage record of one MIG node.
///
/// Equality is structural: two records are equal when they have the same kind
/// and fan-ins. Fan-out bookkeeping does not take part in hash-consing.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub fanins: [Signal; 3],
    pub fanout: u32,
    pub parents: Vec<Node>,
    pub dead: bool,
}

impl NodeData {
    pub fn constant() -> Self {
        Self::with_kind(NodeKind::Constant, [Signal::zero(); 3])
    }

    pub fn input() -> Self {
        Self::with_kind(NodeKind::Input, [Signal::zero(); 3])
    }

    pub fn majority(fanins: [Signal; 3]) -> Self {
        Self::with_kind(NodeKind::Majority, fanins)
    }

    fn with_kind(kind: NodeKind, fanins: [Signal; 3]) -> Self {
        Self {
            kind,
            fanins,
            fanout: 0,
            parents: Vec::new(),
            dead: false,
        }
    }

    pub fn is_gate(&self) -> bool {
        self.kind == NodeKind::Majority
    }
}

impl Default for NodeData {
    fn default() -> Self {
        Self::constant()
    }
}

impl PartialEq for NodeData {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.fanins == other.fanins
    }
}

impl Eq for NodeData {}

impl MyHash for NodeData {
    fn hash(&self) -> u64 {
        pairing3(
            self.fanins[0].raw() as u64,
            self.fanins[1].raw() as u64,
            self.fanins[2].raw() as u64,
        )
    }
}
