//! Truth-table simulation of networks.
//!
//! Primary input `i` (by position in [`pis`][Network::pis]) is simulated as
//! the projection function of variable `i`. Gates are evaluated through
//! [`Network::compute`], so any network (or view) can be simulated.

use std::collections::{HashMap, HashSet};

use crate::network::Network;
use crate::signal::Signal;
use crate::truth_table::TruthTable;
use crate::types::Node;

/// Live gates reachable from the outputs, each after all of its fan-ins.
pub fn topological_order<N: Network>(ntk: &N) -> Vec<Node> {
    let mut done = HashSet::new();
    let mut in_progress = HashSet::new();
    let mut order = Vec::new();
    let mut stack = Vec::new();

    for po in ntk.pos() {
        stack.push((po.node(), false));
        while let Some((n, expanded)) = stack.pop() {
            if expanded {
                in_progress.remove(&n);
                if done.insert(n) {
                    order.push(n);
                }
                continue;
            }
            if done.contains(&n) || !ntk.is_gate(n) {
                continue;
            }
            if !in_progress.insert(n) {
                debug_assert!(false, "Cycle through {}", n);
                continue;
            }
            stack.push((n, true));
            for f in ntk.fanins(n).iter().rev() {
                if !done.contains(&f.node()) {
                    stack.push((f.node(), false));
                }
            }
        }
    }

    order
}

fn constant_tables<N: Network>(ntk: &N, num_vars: u32, values: &mut HashMap<Node, TruthTable>) {
    let zero = ntk.get_constant(false);
    let one = ntk.get_constant(true);
    values.insert(zero.node(), TruthTable::constant(num_vars, zero.is_complemented()));
    if one.node() != zero.node() {
        values.insert(one.node(), TruthTable::constant(num_vars, !one.is_complemented()));
    }
}

fn signal_value(values: &HashMap<Node, TruthTable>, f: Signal) -> TruthTable {
    let tt = &values[&f.node()];
    if f.is_complemented() {
        !tt
    } else {
        tt.clone()
    }
}

fn evaluate<N: Network>(ntk: &N, node: Node, values: &HashMap<Node, TruthTable>) -> TruthTable {
    let fanins: Vec<&TruthTable> = ntk.fanins(node).iter().map(|f| &values[&f.node()]).collect();
    ntk.compute(node, &fanins)
}

/// Truth table of every constant, input, and gate reachable from the outputs.
pub fn simulate_nodes<N: Network>(ntk: &N) -> HashMap<Node, TruthTable> {
    let num_vars = ntk.num_pis() as u32;
    let mut values = HashMap::new();
    constant_tables(ntk, num_vars, &mut values);
    for (i, &pi) in ntk.pis().iter().enumerate() {
        values.insert(pi, TruthTable::nth_var(num_vars, i as u32));
    }
    for n in topological_order(ntk) {
        let tt = evaluate(ntk, n, &values);
        values.insert(n, tt);
    }
    values
}

/// Truth table of every output, over `num_pis` variables.
pub fn simulate<N: Network>(ntk: &N) -> Vec<TruthTable> {
    let values = simulate_nodes(ntk);
    ntk.pos().iter().map(|&f| signal_value(&values, f)).collect()
}

/// Function of `root` over the cut `leaves`, leaf `i` being variable `i`.
///
/// `scratch` is cleared on entry and holds the function of every node between
/// the leaves and the root on return. Panics if the leaves do not separate
/// the root from the primary inputs.
pub fn simulate_cut<N: Network>(
    ntk: &N,
    leaves: &[Node],
    root: Node,
    scratch: &mut HashMap<Node, TruthTable>,
) -> TruthTable {
    let num_vars = leaves.len() as u32;
    scratch.clear();
    constant_tables(ntk, num_vars, scratch);
    for (i, &leaf) in leaves.iter().enumerate() {
        scratch.insert(leaf, TruthTable::nth_var(num_vars, i as u32));
    }

    let mut stack = vec![(root, false)];
    while let Some((n, expanded)) = stack.pop() {
        if scratch.contains_key(&n) {
            continue;
        }
        if expanded {
            let tt = evaluate(ntk, n, scratch);
            scratch.insert(n, tt);
            continue;
        }
        assert!(!ntk.is_pi(n), "Input {} is outside the cut", n);
        stack.push((n, true));
        for f in ntk.fanins(n) {
            if !scratch.contains_key(&f.node()) {
                stack.push((f.node(), false));
            }
        }
    }

    scratch[&root].clone()
}

/// Function of every node in `nodes` over the cut `leaves`, leaf `i` being
/// variable `i`. The nodes must be listed after their fan-ins and have all
/// fan-ins among the constants, the leaves and the earlier nodes.
///
/// `scratch` is cleared on entry and holds the results on return.
pub fn simulate_window<N: Network>(
    ntk: &N,
    leaves: &[Node],
    nodes: &[Node],
    scratch: &mut HashMap<Node, TruthTable>,
) {
    let num_vars = leaves.len() as u32;
    scratch.clear();
    constant_tables(ntk, num_vars, scratch);
    for (i, &leaf) in leaves.iter().enumerate() {
        scratch.insert(leaf, TruthTable::nth_var(num_vars, i as u32));
    }
    for &n in nodes {
        let tt = evaluate(ntk, n, scratch);
        scratch.insert(n, tt);
    }
}
