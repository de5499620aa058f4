//! The logic network contract.
//!
//! Algorithms in this crate are written against two traits rather than a
//! concrete graph type:
//!
//! - [`Network`] is the read capability set: constants, primary inputs and
//!   outputs, liveness, ordered fan-ins, fan-out counts, dense node indexing,
//!   and the gate semantics ([`compute`][Network::compute]).
//! - [`NetworkMut`] adds gate/output creation, substitution and dead-marking.
//!
//! Structural hashing is the concrete network's job. Fan-in order and
//! polarity must stay stable while an algorithm is running.

use crate::signal::Signal;
use crate::truth_table::TruthTable;
use crate::types::Node;

pub trait Network {
    /// Number of node ids, including constants, inputs and dead nodes.
    fn size(&self) -> usize;
    fn num_pis(&self) -> usize;
    fn num_pos(&self) -> usize;
    /// Number of live gates.
    fn num_gates(&self) -> usize;

    fn get_constant(&self, value: bool) -> Signal;
    fn is_constant(&self, node: Node) -> bool;
    fn is_pi(&self, node: Node) -> bool;
    fn is_dead(&self, node: Node) -> bool;

    /// Ordered fan-ins of a node; empty for constants and inputs.
    fn fanins(&self, node: Node) -> &[Signal];
    fn fanout_size(&self, node: Node) -> u32;

    fn pis(&self) -> &[Node];
    fn pos(&self) -> &[Signal];

    /// Dense index of a node, in `0..size()`.
    fn node_to_index(&self, node: Node) -> usize;
    fn index_to_node(&self, index: usize) -> Node;

    /// Live gates, in index order.
    fn gates(&self) -> impl Iterator<Item = Node> + '_;

    /// Function of `node` given the functions of its fan-ins (in fan-in order,
    /// complemented edges not yet applied).
    fn compute(&self, node: Node, fanins: &[&TruthTable]) -> TruthTable;

    fn make_signal(&self, node: Node) -> Signal {
        Signal::new(node, false)
    }

    fn is_gate(&self, node: Node) -> bool {
        !self.is_constant(node) && !self.is_pi(node)
    }

    /// All node ids, in index order.
    fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        (0..self.size()).map(|i| self.index_to_node(i))
    }
}

pub trait NetworkMut: Network {
    fn create_pi(&mut self) -> Signal;
    /// Registers an output and returns its position.
    fn create_po(&mut self, f: Signal) -> usize;
    fn create_maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal;

    fn create_and(&mut self, a: Signal, b: Signal) -> Signal {
        let zero = self.get_constant(false);
        self.create_maj(zero, a, b)
    }

    fn create_or(&mut self, a: Signal, b: Signal) -> Signal {
        let one = self.get_constant(true);
        self.create_maj(one, a, b)
    }

    fn create_xor(&mut self, a: Signal, b: Signal) -> Signal {
        let x = self.create_and(a, !b);
        let y = self.create_and(!a, b);
        self.create_or(x, y)
    }

    /// Redirects every fan-out edge and output of `old` to `new`, then takes
    /// `old` out of the network.
    fn substitute_node(&mut self, old: Node, new: Signal);

    /// Marks a fan-out-free gate dead and dereferences its fan-ins, recursively
    /// taking out those that become fan-out-free. No-op for constants, inputs,
    /// dead nodes and nodes that still have fan-out.
    fn take_out_node(&mut self, node: Node);
}

/// Networks that can list the gates using a node.
pub trait FanoutNetwork: Network {
    /// Live gates with `node` among their fan-ins, once per fan-in slot.
    fn fanouts(&self, node: Node) -> &[Node];
}
