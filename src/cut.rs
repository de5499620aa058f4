//! Reconvergence-driven cuts.
//!
//! Starting from the fan-ins of a root, the cut grows by repeatedly replacing
//! one leaf with its fan-ins. The leaf chosen is the one whose expansion adds
//! the fewest new leaves, which favors absorbing reconvergent paths into the
//! cone. Primary inputs and constants are never expanded.

use std::collections::HashSet;

use log::trace;

use crate::network::Network;
use crate::types::Node;

pub struct CutManager {
    max_leaves: usize,
    visited: HashSet<Node>,
}

impl CutManager {
    pub fn new(max_leaves: usize) -> Self {
        assert!(max_leaves > 0, "Cuts need at least one leaf");
        Self {
            max_leaves,
            visited: HashSet::new(),
        }
    }

    pub fn max_leaves(&self) -> usize {
        self.max_leaves
    }

    /// Compute a cut of `root` with at most `max_leaves` leaves (unless the
    /// root alone has more fan-ins), sorted by node id.
    pub fn compute<N: Network>(&mut self, ntk: &N, root: Node) -> Vec<Node> {
        self.visited.clear();
        self.visited.insert(root);

        let mut leaves = Vec::new();
        for f in ntk.fanins(root) {
            let n = f.node();
            if !ntk.is_constant(n) && self.visited.insert(n) {
                leaves.push(n);
            }
        }

        loop {
            let mut best: Option<(usize, usize)> = None;
            for (i, &leaf) in leaves.iter().enumerate() {
                if ntk.is_pi(leaf) {
                    continue;
                }
                let cost = self.leaf_cost(ntk, leaf);
                if best.map_or(true, |(_, c)| cost < c) {
                    best = Some((i, cost));
                }
            }

            let Some((pos, cost)) = best else {
                break;
            };
            if leaves.len() - 1 + cost > self.max_leaves {
                break;
            }

            let leaf = leaves.remove(pos);
            trace!("cut({}): expand {} (cost {})", root, leaf, cost);
            for f in ntk.fanins(leaf) {
                let n = f.node();
                if !ntk.is_constant(n) && self.visited.insert(n) {
                    leaves.push(n);
                }
            }
        }

        leaves.sort();
        leaves
    }

    /// Number of new leaves the expansion of `leaf` would add.
    fn leaf_cost<N: Network>(&self, ntk: &N, leaf: Node) -> usize {
        ntk.fanins(leaf)
            .iter()
            .filter(|f| !ntk.is_constant(f.node()) && !self.visited.contains(&f.node()))
            .count()
    }
}

impl Default for CutManager {
    fn default() -> Self {
        Self::new(8)
    }
}
