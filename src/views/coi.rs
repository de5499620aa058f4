//! Cone-of-influence view.
//!
//! A [`CoiView`] restricts a network to the transitive fan-in of a set of
//! *pivot* nodes. Primary inputs reached from the pivots become the view's
//! inputs (leaves), the other reached gates its inner nodes, and the pivots
//! themselves double as the view's outputs. Nodes are re-indexed densely:
//! constants first, then leaves in first-seen order, then inner nodes in
//! topological order.
//!
//! The view borrows the network and never mutates it. It implements
//! [`Network`], so read-only algorithms such as
//! [`simulate`][crate::simulation::simulate] run on it unchanged.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::network::Network;
use crate::signal::Signal;
use crate::truth_table::TruthTable;
use crate::types::Node;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

pub struct CoiView<'a, N: Network> {
    ntk: &'a N,
    pivots: Vec<Node>,
    sequential_wrap_around: bool,

    num_constants: usize,
    leaves: Vec<Node>,
    inner: Vec<Node>,
    outputs: Vec<Signal>,
    nodes: Vec<Node>,
    indices: HashMap<Node, usize>,
}

impl<'a, N: Network> CoiView<'a, N> {
    pub fn new(ntk: &'a N, pivots: &[Node]) -> Self {
        Self::with_wrap_around(ntk, pivots, false)
    }

    /// Create a view that tolerates cycles in the traversed region. Back edges
    /// are skipped when ordering the inner nodes.
    pub fn with_wrap_around(ntk: &'a N, pivots: &[Node], sequential_wrap_around: bool) -> Self {
        let mut view = Self {
            ntk,
            pivots: pivots.to_vec(),
            sequential_wrap_around,
            num_constants: 0,
            leaves: Vec::new(),
            inner: Vec::new(),
            outputs: Vec::new(),
            nodes: Vec::new(),
            indices: HashMap::new(),
        };
        view.update();
        view
    }

    pub fn network(&self) -> &'a N {
        self.ntk
    }

    pub fn pivots(&self) -> &[Node] {
        &self.pivots
    }

    /// Leaves, in first-seen order.
    pub fn leaves(&self) -> &[Node] {
        &self.leaves
    }

    /// Inner nodes (pivots included), in topological order.
    pub fn inner(&self) -> &[Node] {
        &self.inner
    }

    pub fn num_cis(&self) -> usize {
        self.leaves.len()
    }

    pub fn num_cos(&self) -> usize {
        self.outputs.len()
    }

    pub fn contains(&self, node: Node) -> bool {
        self.indices.contains_key(&node)
    }

    /// Recompute the view from the current state of the network.
    pub fn update(&mut self) {
        let ntk = self.ntk;

        // Constants always belong to the view.
        let mut constants = vec![ntk.get_constant(false).node()];
        let one = ntk.get_constant(true).node();
        if one != constants[0] {
            constants.push(one);
        }

        let collected = self.collect();

        let pivot_set: HashSet<Node> = self.pivots.iter().copied().collect();
        let mut leaves = Vec::new();
        let mut inner = Vec::new();
        for &n in &collected {
            if ntk.is_pi(n) {
                leaves.push(n);
            } else if !pivot_set.contains(&n) {
                inner.push(n);
            }
        }
        let mut seen = HashSet::new();
        for &p in &self.pivots {
            if !ntk.is_constant(p) && !ntk.is_pi(p) && seen.insert(p) {
                inner.push(p);
            }
        }

        let inner = self.topological_sort(&constants, &leaves, &inner);

        self.indices.clear();
        self.nodes.clear();
        self.num_constants = constants.len();
        for n in constants.into_iter().chain(leaves.iter().copied()).chain(inner.iter().copied()) {
            self.indices.insert(n, self.nodes.len());
            self.nodes.push(n);
        }
        self.outputs = self.pivots.iter().map(|&p| ntk.make_signal(p)).collect();
        self.leaves = leaves;
        self.inner = inner;

        debug!(
            "CoiView: {} pivots, {} leaves, {} inner nodes",
            self.pivots.len(),
            self.leaves.len(),
            self.inner.len()
        );
    }

    /// Nodes reachable from the pivots, pre-order, constants excluded.
    fn collect(&self) -> Vec<Node> {
        let ntk = self.ntk;
        let mut visited = HashSet::new();
        let mut collected = Vec::new();
        let mut stack = Vec::new();

        for &pivot in &self.pivots {
            stack.push(pivot);
            while let Some(n) = stack.pop() {
                if !visited.insert(n) || ntk.is_constant(n) {
                    continue;
                }
                collected.push(n);
                if ntk.is_pi(n) {
                    continue;
                }
                // Reversed, so that fan-ins are visited in order.
                for f in ntk.fanins(n).iter().rev() {
                    if !visited.contains(&f.node()) {
                        stack.push(f.node());
                    }
                }
            }
        }

        collected
    }

    fn topological_sort(&self, constants: &[Node], leaves: &[Node], inner: &[Node]) -> Vec<Node> {
        let ntk = self.ntk;
        let mut color: HashMap<Node, Color> = HashMap::new();
        for &n in constants.iter().chain(leaves) {
            color.insert(n, Color::Black);
        }
        for &n in inner {
            color.insert(n, Color::White);
        }

        let mut order = Vec::with_capacity(inner.len());
        let mut stack: Vec<(Node, usize)> = Vec::new();

        for &start in inner {
            if color[&start] != Color::White {
                continue;
            }
            color.insert(start, Color::Gray);
            stack.push((start, 0));

            while let Some((n, i)) = stack.last_mut() {
                let n = *n;
                let fanins = ntk.fanins(n);
                if *i < fanins.len() {
                    let child = fanins[*i].node();
                    *i += 1;
                    match color.get(&child) {
                        Some(Color::White) => {
                            color.insert(child, Color::Gray);
                            stack.push((child, 0));
                        }
                        Some(Color::Gray) => {
                            debug_assert!(
                                self.sequential_wrap_around,
                                "Cycle through {} in the cone of influence",
                                child
                            );
                        }
                        _ => {}
                    }
                } else {
                    color.insert(n, Color::Black);
                    order.push(n);
                    stack.pop();
                }
            }
        }

        order
    }
}

impl<N: Network> Network for CoiView<'_, N> {
    fn size(&self) -> usize {
        self.nodes.len()
    }

    fn num_pis(&self) -> usize {
        self.leaves.len()
    }

    fn num_pos(&self) -> usize {
        self.outputs.len()
    }

    fn num_gates(&self) -> usize {
        self.inner.len()
    }

    fn get_constant(&self, value: bool) -> Signal {
        self.ntk.get_constant(value)
    }

    fn is_constant(&self, node: Node) -> bool {
        self.ntk.is_constant(node)
    }

    fn is_pi(&self, node: Node) -> bool {
        match self.indices.get(&node) {
            Some(&i) => i >= self.num_constants && i < self.num_constants + self.leaves.len(),
            None => false,
        }
    }

    fn is_dead(&self, node: Node) -> bool {
        self.ntk.is_dead(node)
    }

    fn fanins(&self, node: Node) -> &[Signal] {
        if self.is_pi(node) {
            &[]
        } else {
            self.ntk.fanins(node)
        }
    }

    fn fanout_size(&self, node: Node) -> u32 {
        self.ntk.fanout_size(node)
    }

    fn pis(&self) -> &[Node] {
        &self.leaves
    }

    fn pos(&self) -> &[Signal] {
        &self.outputs
    }

    fn node_to_index(&self, node: Node) -> usize {
        match self.indices.get(&node) {
            Some(&i) => i,
            None => panic!("Node {} is not in the view", node),
        }
    }

    fn index_to_node(&self, index: usize) -> Node {
        self.nodes[index]
    }

    fn gates(&self) -> impl Iterator<Item = Node> + '_ {
        self.inner.iter().copied()
    }

    fn compute(&self, node: Node, fanins: &[&TruthTable]) -> TruthTable {
        self.ntk.compute(node, fanins)
    }
}
