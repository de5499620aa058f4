//! Compaction of networks after rewriting.

use std::collections::HashMap;

use log::debug;

use crate::mig::Mig;
use crate::network::{Network, NetworkMut};
use crate::signal::Signal;
use crate::simulation::topological_order;
use crate::types::Node;

/// Rebuild `mig` keeping only the gates reachable from its outputs.
///
/// Inputs and outputs keep their order; dead and dangling gates are dropped
/// and node ids are reassigned densely.
pub fn cleanup_dangling(mig: &Mig) -> Mig {
    let mut result = Mig::new();
    let mut map: HashMap<Node, Signal> = HashMap::new();
    map.insert(Node::CONSTANT, result.get_constant(false));

    for &pi in mig.pis() {
        map.insert(pi, result.create_pi());
    }

    for n in topological_order(mig) {
        let [a, b, c]: [Signal; 3] = std::array::from_fn(|i| {
            let f = mig.fanins(n)[i];
            map[&f.node()] ^ f.is_complemented()
        });
        let s = result.create_maj(a, b, c);
        map.insert(n, s);
    }

    for &po in mig.pos() {
        result.create_po(map[&po.node()] ^ po.is_complemented());
    }

    debug!(
        "cleanup_dangling: {} -> {} nodes, {} -> {} gates",
        mig.size(),
        result.size(),
        mig.num_gates(),
        result.num_gates()
    );
    result
}
