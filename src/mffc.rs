//! Maximum fanout-free cones.
//!
//! The MFFC of a root is the set of gates that are used only, transitively,
//! by the root: removing the root removes all of them. Here the cone is
//! additionally bounded by a set of leaves, so the result is the part of the
//! network a replacement built on those leaves would make redundant.

use std::collections::HashMap;

use crate::network::Network;
use crate::types::Node;

/// Gates of the MFFC of `root` bounded by `leaves`, root first.
///
/// Reference counts are simulated in `scratch`, which is cleared on entry.
pub fn mffc_nodes<N: Network>(
    ntk: &N,
    root: Node,
    leaves: &[Node],
    scratch: &mut HashMap<Node, u32>,
) -> Vec<Node> {
    scratch.clear();
    let mut cone = vec![root];
    let mut stack = vec![root];

    while let Some(n) = stack.pop() {
        for f in ntk.fanins(n) {
            let child = f.node();
            if !ntk.is_gate(child) || leaves.contains(&child) {
                continue;
            }
            let refs = scratch.entry(child).or_insert_with(|| ntk.fanout_size(child));
            *refs -= 1;
            if *refs == 0 {
                cone.push(child);
                stack.push(child);
            }
        }
    }

    cone
}

/// Number of gates in the MFFC of `root` bounded by `leaves` (root included).
pub fn mffc_size<N: Network>(
    ntk: &N,
    root: Node,
    leaves: &[Node],
    scratch: &mut HashMap<Node, u32>,
) -> usize {
    mffc_nodes(ntk, root, leaves, scratch).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mig::Mig;
    use crate::network::NetworkMut;

    #[test]
    fn test_mffc_sizes() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let x = mig.create_and(a, b);
        let y = mig.create_and(x, c);
        let z = mig.create_or(y, a);
        mig.create_po(z);

        let leaves = [a.node(), b.node(), c.node()];
        let mut scratch = HashMap::new();
        assert_eq!(mffc_size(&mig, z.node(), &leaves, &mut scratch), 3);
        assert_eq!(mffc_size(&mig, y.node(), &leaves, &mut scratch), 2);
        assert_eq!(mffc_size(&mig, z.node(), &[y.node(), a.node()], &mut scratch), 1);
        assert_eq!(
            mffc_nodes(&mig, z.node(), &leaves, &mut scratch),
            vec![z.node(), y.node(), x.node()]
        );
    }

    #[test]
    fn test_shared_nodes_are_excluded() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let x = mig.create_and(a, b);
        let y = mig.create_and(x, c);
        mig.create_po(y);
        mig.create_po(x);

        let mut scratch = HashMap::new();
        let leaves = [a.node(), b.node(), c.node()];
        assert_eq!(mffc_size(&mig, y.node(), &leaves, &mut scratch), 1);
    }
}
