//! Majority-Inverter Graphs.
//!
//! A [`Mig`] is a hash-consed DAG of 3-input majority gates with complemented
//! edges. Node 0 is the constant 0 (constant 1 is its complemented signal),
//! primary inputs and gates follow in creation order.
//!
//! Gate creation normalizes its arguments before looking them up in the
//! unique table, so structurally identical gates are created only once:
//!
//! - fan-ins are sorted by their raw signal value;
//! - `<a a b> = a` and `<a !a b> = b`;
//! - if two or more fan-ins are complemented, all three are complemented and
//!   the resulting signal is complemented instead (`<!a !b c> = !<a b !c>`).
//!
//! Nodes are never removed: rewriting marks them dead and the
//! [`cleanup`][crate::cleanup] pass compacts the graph afterwards.
//!
//! # Examples
//!
//! ```
//! use mig_rs::mig::Mig;
//! use mig_rs::network::{Network, NetworkMut};
//!
//! let mut mig = Mig::new();
//! let a = mig.create_pi();
//! let b = mig.create_pi();
//! let f = mig.create_and(a, b);
//! let g = mig.create_and(b, a);
//! assert_eq!(f, g); // hash-consed
//! mig.create_po(f);
//! assert_eq!(mig.num_gates(), 1);
//! ```

use std::collections::HashMap;
use std::fmt::Debug;

use log::{debug, trace};

use crate::network::{FanoutNetwork, Network, NetworkMut};
use crate::node::{NodeData, NodeKind};
use crate::signal::Signal;
use crate::table::Table;
use crate::truth_table::TruthTable;
use crate::types::Node;

type Storage = Table<NodeData>;

/// Outcome of normalizing three majority fan-ins.
enum Normalized {
    /// The majority collapses to one of its arguments.
    Trivial(Signal),
    /// Sorted fan-ins, plus whether the gate output must be complemented.
    Gate([Signal; 3], bool),
}

fn sort_fanins(mut fanins: [Signal; 3]) -> Result<[Signal; 3], Signal> {
    fanins.sort();
    let [a, b, c] = fanins;
    if a.node() == b.node() {
        return Err(if a == b { a } else { c });
    }
    if b.node() == c.node() {
        return Err(if b == c { b } else { a });
    }
    Ok(fanins)
}

fn normalize(fanins: [Signal; 3]) -> Normalized {
    match sort_fanins(fanins) {
        Err(s) => Normalized::Trivial(s),
        Ok(fanins) => {
            let complemented = fanins.iter().filter(|s| s.is_complemented()).count();
            if complemented >= 2 {
                Normalized::Gate(fanins.map(|s| !s), true)
            } else {
                Normalized::Gate(fanins, false)
            }
        }
    }
}

pub struct Mig {
    storage: Storage,
    inputs: Vec<Node>,
    outputs: Vec<Signal>,
    num_gates: usize,
}

impl Mig {
    pub fn new() -> Self {
        Self::with_bucket_bits(12)
    }

    /// Create an empty network whose unique table starts with `2^bits` buckets.
    pub fn with_bucket_bits(bits: usize) -> Self {
        let mut storage = Storage::new(bits);

        // Allocate the constant node:
        let constant = storage.add(NodeData::constant());
        assert_eq!(constant, 0); // Make sure the constant node is (0).

        Self {
            storage,
            inputs: Vec::new(),
            outputs: Vec::new(),
            num_gates: 0,
        }
    }
}

impl Default for Mig {
    fn default() -> Self {
        Mig::new()
    }
}

impl Debug for Mig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mig")
            .field("size", &self.storage.size())
            .field("pis", &self.inputs.len())
            .field("pos", &self.outputs.len())
            .field("gates", &self.num_gates)
            .finish()
    }
}

impl Mig {
    fn data(&self, node: Node) -> &NodeData {
        assert!(node.index() < self.storage.size(), "Node {} does not exist", node);
        &self.storage[node.index()]
    }

    fn data_mut(&mut self, node: Node) -> &mut NodeData {
        assert!(node.index() < self.storage.size(), "Node {} does not exist", node);
        &mut self.storage[node.index()]
    }

    /// Gates (and outputs are not included) that use `node` as a fan-in, one
    /// entry per fan-in slot.
    pub fn parents(&self, node: Node) -> &[Node] {
        &self.data(node).parents
    }

    /// Number of gates marked dead and not yet compacted away.
    pub fn num_dead(&self) -> usize {
        self.storage.size() - 1 - self.inputs.len() - self.num_gates
    }

    fn add_reference(&mut self, child: Node, parent: Node) {
        let data = self.data_mut(child);
        data.fanout += 1;
        data.parents.push(parent);
    }

    fn remove_reference(&mut self, child: Node, parent: Node) {
        let data = self.data_mut(child);
        assert!(data.fanout > 0, "Fan-out of {} underflows", child);
        data.fanout -= 1;
        if let Some(pos) = data.parents.iter().position(|&p| p == parent) {
            data.parents.swap_remove(pos);
        }
    }

    /// Rewrite the fan-ins of `parent` that point to `old`. Returns the signal
    /// `parent` must itself be replaced by, if the rewritten gate collapses or
    /// duplicates an existing one.
    fn replace_in_node(&mut self, parent: Node, old: Node, new: Signal) -> Option<Signal> {
        self.storage.unlink(parent.index());

        let mut fanins = self.data(parent).fanins;
        let mut replaced = 0;
        for f in fanins.iter_mut() {
            if f.node() == old {
                *f = new ^ f.is_complemented();
                replaced += 1;
            }
        }
        for _ in 0..replaced {
            self.remove_reference(old, parent);
            self.add_reference(new.node(), parent);
        }

        match normalize(fanins) {
            Normalized::Trivial(s) => {
                trace!("replace_in_node: {} collapses to {}", parent, s);
                self.data_mut(parent).fanins = fanins;
                Some(s)
            }
            Normalized::Gate(_, true) => {
                // Stored gates never carry two complemented fan-ins, so the
                // parent is re-created in normal form and replaced by it.
                self.data_mut(parent).fanins = fanins;
                let [a, b, c] = fanins;
                let s = self.create_maj(a, b, c);
                trace!("replace_in_node: {} renormalizes to {}", parent, s);
                Some(s)
            }
            Normalized::Gate(sorted, false) => {
                self.data_mut(parent).fanins = sorted;
                match self.storage.find(&NodeData::majority(sorted)) {
                    Some(existing) if existing != parent.index() => {
                        trace!("replace_in_node: {} duplicates n{}", parent, existing);
                        Some(Signal::new(Node::from(existing), false))
                    }
                    _ => {
                        self.storage.link(parent.index());
                        None
                    }
                }
            }
        }
    }
}

impl Network for Mig {
    fn size(&self) -> usize {
        self.storage.size()
    }

    fn num_pis(&self) -> usize {
        self.inputs.len()
    }

    fn num_pos(&self) -> usize {
        self.outputs.len()
    }

    fn num_gates(&self) -> usize {
        self.num_gates
    }

    fn get_constant(&self, value: bool) -> Signal {
        Signal::from(value)
    }

    fn is_constant(&self, node: Node) -> bool {
        node == Node::CONSTANT
    }

    fn is_pi(&self, node: Node) -> bool {
        self.data(node).kind == NodeKind::Input
    }

    fn is_dead(&self, node: Node) -> bool {
        self.data(node).dead
    }

    fn fanins(&self, node: Node) -> &[Signal] {
        let data = self.data(node);
        if data.is_gate() {
            &data.fanins
        } else {
            &[]
        }
    }

    fn fanout_size(&self, node: Node) -> u32 {
        self.data(node).fanout
    }

    fn pis(&self) -> &[Node] {
        &self.inputs
    }

    fn pos(&self) -> &[Signal] {
        &self.outputs
    }

    fn node_to_index(&self, node: Node) -> usize {
        node.index()
    }

    fn index_to_node(&self, index: usize) -> Node {
        Node::from(index)
    }

    fn gates(&self) -> impl Iterator<Item = Node> + '_ {
        (1..self.storage.size())
            .filter(|&i| {
                let data = &self.storage[i];
                data.is_gate() && !data.dead
            })
            .map(Node::from)
    }

    fn compute(&self, node: Node, fanins: &[&TruthTable]) -> TruthTable {
        let signals = self.fanins(node);
        assert_eq!(signals.len(), 3, "Node {} is not a majority gate", node);
        assert_eq!(fanins.len(), 3, "Majority gates have three fan-ins");
        let [a, b, c]: [TruthTable; 3] = std::array::from_fn(|i| {
            if signals[i].is_complemented() {
                !fanins[i]
            } else {
                fanins[i].clone()
            }
        });
        TruthTable::maj(&a, &b, &c)
    }
}

impl FanoutNetwork for Mig {
    fn fanouts(&self, node: Node) -> &[Node] {
        self.parents(node)
    }
}

impl NetworkMut for Mig {
    fn create_pi(&mut self) -> Signal {
        let index = self.storage.add(NodeData::input());
        let node = Node::from(index);
        self.inputs.push(node);
        Signal::new(node, false)
    }

    fn create_po(&mut self, f: Signal) -> usize {
        self.data_mut(f.node()).fanout += 1;
        self.outputs.push(f);
        self.outputs.len() - 1
    }

    fn create_maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        let (fanins, complement) = match normalize([a, b, c]) {
            Normalized::Trivial(s) => {
                trace!("create_maj({}, {}, {}) => {}", a, b, c, s);
                return s;
            }
            Normalized::Gate(fanins, complement) => (fanins, complement),
        };

        let (index, created) = self.storage.put(NodeData::majority(fanins));
        let node = Node::from(index);
        if created {
            for f in fanins {
                self.add_reference(f.node(), node);
            }
            self.num_gates += 1;
            debug!("create_maj: {} = <{} {} {}>", node, fanins[0], fanins[1], fanins[2]);
        }
        Signal::new(node, complement)
    }

    fn substitute_node(&mut self, old: Node, new: Signal) {
        let mut worklist = vec![(old, new)];
        let mut old_to_new: HashMap<Node, Signal> = HashMap::new();

        while let Some((old, mut new)) = worklist.pop() {
            if self.is_dead(old) {
                continue;
            }
            // The replacement may itself have been substituted or taken out
            // meanwhile. Without a recorded substitute, `old` is re-created
            // from its rewritten fan-ins.
            while self.is_dead(new.node()) {
                new = match old_to_new.get(&new.node()) {
                    Some(&s) => s ^ new.is_complemented(),
                    None => {
                        assert!(self.data(old).is_gate(), "Replacement {} of {} is dead", new, old);
                        let [a, b, c] = self.data(old).fanins;
                        self.create_maj(a, b, c)
                    }
                };
            }
            if new.node() == old {
                continue;
            }
            debug!("substitute_node: {} -> {}", old, new);

            for i in 0..self.outputs.len() {
                let po = self.outputs[i];
                if po.node() == old {
                    self.outputs[i] = new ^ po.is_complemented();
                    self.data_mut(old).fanout -= 1;
                    self.data_mut(new.node()).fanout += 1;
                }
            }

            let mut parents = self.data(old).parents.clone();
            parents.sort();
            parents.dedup();
            for parent in parents {
                if self.is_dead(parent) {
                    continue;
                }
                if let Some(replacement) = self.replace_in_node(parent, old, new) {
                    worklist.push((parent, replacement));
                }
            }

            old_to_new.insert(old, new);
            self.take_out_node(old);
        }
    }

    fn take_out_node(&mut self, node: Node) {
        let mut stack = vec![node];

        while let Some(n) = stack.pop() {
            let data = self.data(n);
            if !data.is_gate() || data.dead || data.fanout != 0 {
                continue;
            }
            debug!("take_out_node: {}", n);

            self.storage.unlink(n.index());
            let data = self.data_mut(n);
            data.dead = true;
            let fanins = data.fanins;
            self.num_gates -= 1;

            for f in fanins {
                self.remove_reference(f.node(), n);
                if self.fanout_size(f.node()) == 0 {
                    stack.push(f.node());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::simulation::simulate;

    #[test]
    fn test_constant_and_inputs() {
        let mut mig = Mig::new();
        assert_eq!(mig.size(), 1);
        assert!(mig.is_constant(Node::CONSTANT));
        assert_eq!(mig.get_constant(false), Signal::zero());
        assert_eq!(mig.get_constant(true), Signal::one());

        let a = mig.create_pi();
        let b = mig.create_pi();
        assert_eq!(a.node(), Node::new(1));
        assert_eq!(b.node(), Node::new(2));
        assert!(mig.is_pi(a.node()));
        assert!(!mig.is_gate(a.node()));
        assert_eq!(mig.num_pis(), 2);
        assert!(mig.fanins(a.node()).is_empty());
    }

    #[test]
    fn test_trivial_majorities() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();

        assert_eq!(mig.create_maj(a, a, b), a);
        assert_eq!(mig.create_maj(a, !a, b), b);
        assert_eq!(mig.create_maj(b, a, !a), b);
        assert_eq!(mig.create_maj(Signal::zero(), Signal::one(), a), a);
        assert_eq!(mig.create_and(a, Signal::one()), a);
        assert_eq!(mig.create_or(a, Signal::zero()), a);
        assert_eq!(mig.create_and(a, Signal::zero()), Signal::zero());
        assert_eq!(mig.num_gates(), 0);
    }

    #[test]
    fn test_hash_consing() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();

        let f = mig.create_maj(a, b, c);
        let g = mig.create_maj(c, a, b);
        assert_eq!(f, g);
        assert_eq!(mig.num_gates(), 1);

        // Self-duality: <!a !b !c> = !<a b c>
        let h = mig.create_maj(!a, !b, !c);
        assert_eq!(h, !f);
        assert_eq!(mig.num_gates(), 1);

        // Two complemented inputs are normalized the same way.
        let x = mig.create_maj(!a, !b, c);
        let y = mig.create_maj(a, b, !c);
        assert_eq!(x, !y);
        assert_eq!(mig.num_gates(), 2);
    }

    #[test]
    fn test_fanout_counting() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let f = mig.create_and(a, b);
        let g = mig.create_or(f, a);
        mig.create_po(g);
        mig.create_po(f);

        assert_eq!(mig.fanout_size(a.node()), 2);
        assert_eq!(mig.fanout_size(b.node()), 1);
        assert_eq!(mig.fanout_size(f.node()), 2);
        assert_eq!(mig.fanout_size(g.node()), 1);
        assert_eq!(mig.parents(f.node()), &[g.node()]);
    }

    #[test]
    fn test_take_out_node_is_recursive() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_and(a, b);
        let g = mig.create_and(f, c);
        assert_eq!(mig.num_gates(), 2);

        mig.take_out_node(g.node());
        assert!(mig.is_dead(g.node()));
        assert!(mig.is_dead(f.node()));
        assert_eq!(mig.num_gates(), 0);
        assert_eq!(mig.num_dead(), 2);
        assert_eq!(mig.fanout_size(a.node()), 0);

        // Dead nodes are not found by hash-consing anymore.
        let f2 = mig.create_and(a, b);
        assert_ne!(f2.node(), f.node());
    }

    #[test]
    fn test_take_out_node_keeps_referenced() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let f = mig.create_and(a, b);
        mig.create_po(f);
        mig.take_out_node(f.node());
        assert!(!mig.is_dead(f.node()));
        mig.take_out_node(a.node());
        assert!(!mig.is_dead(a.node()));
    }

    #[test]
    fn test_substitute_node() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f1 = mig.create_and(a, b);
        let f2 = mig.create_and(f1, a); // == a & b
        let f3 = mig.create_or(f2, c);
        mig.create_po(f3);
        mig.create_po(!f2);
        let before = simulate(&mig);

        mig.substitute_node(f2.node(), f1);

        assert!(mig.is_dead(f2.node()));
        assert!(!mig.is_dead(f1.node()));
        assert_eq!(mig.num_gates(), 2);
        assert_eq!(mig.pos()[1], !f1);
        assert_eq!(mig.fanout_size(f1.node()), 2);
        assert_eq!(simulate(&mig), before);
    }

    #[test]
    fn test_substitute_collapses_parents() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_and(b, c);
        let g = mig.create_maj(a, f, c);
        mig.create_po(g);

        // Replacing f by !a makes <a !a c> collapse to c.
        mig.substitute_node(f.node(), !a);
        assert_eq!(mig.pos()[0], c);
        assert!(mig.is_dead(f.node()));
        assert!(mig.is_dead(g.node()));
        assert_eq!(mig.num_gates(), 0);
        assert_eq!(mig.fanout_size(c.node()), 1);
        assert_eq!(mig.fanout_size(a.node()), 0);
    }

    #[test]
    fn test_substitute_merges_duplicates() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let x = mig.create_and(a, b);
        let y = mig.create_or(a, b);
        let g1 = mig.create_and(x, c);
        let g2 = mig.create_and(y, c);
        mig.create_po(g1);
        mig.create_po(g2);
        assert_eq!(mig.num_gates(), 4);

        // After y -> x, g2 becomes structurally identical to g1.
        mig.substitute_node(y.node(), x);
        assert_eq!(mig.pos()[0], g1);
        assert_eq!(mig.pos()[1], g1);
        assert!(mig.is_dead(g2.node()));
        assert_eq!(mig.num_gates(), 2);
        assert_eq!(mig.fanout_size(g1.node()), 2);
    }

    #[test]
    fn test_substitute_renormalizes_complements() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let h = mig.create_and(a, b);
        let y = mig.create_or(b, c);
        let g = mig.create_maj(!a, h, c);
        mig.create_po(g);
        mig.create_po(y);
        assert_eq!(mig.num_gates(), 3);

        // <!a !y c> has two complemented fan-ins and must be stored as !<a y !c>.
        mig.substitute_node(h.node(), !y);
        assert!(mig.is_dead(h.node()));
        assert!(mig.is_dead(g.node()));
        assert_eq!(mig.num_gates(), 2);
        assert!(mig.pos()[0].is_complemented());

        let again = mig.create_maj(!a, !y, c);
        assert_eq!(again, mig.pos()[0]);
        assert_eq!(mig.num_gates(), 2);
        for gate in mig.gates().collect::<Vec<_>>() {
            let complemented = mig.fanins(gate).iter().filter(|s| s.is_complemented()).count();
            assert!(complemented <= 1, "{} is stored with {} complemented fan-ins", gate, complemented);
        }
    }

    #[test]
    fn test_compute() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let f = mig.create_and(a, !b);
        let ta = TruthTable::nth_var(2, 0);
        let tb = TruthTable::nth_var(2, 1);
        let zero = TruthTable::constant(2, false);
        let tts: Vec<&TruthTable> = mig
            .fanins(f.node())
            .iter()
            .map(|s| match s.node().id() {
                0 => &zero,
                1 => &ta,
                _ => &tb,
            })
            .collect();
        assert_eq!(mig.compute(f.node(), &tts), &ta & &!&tb);
    }
}
