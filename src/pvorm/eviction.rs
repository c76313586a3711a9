//! Circuit-ORAM-style eviction walk (spec §4.3).
//!
//! On each update a leaf is chosen (see [`super::position_map::eviction_leaf`])
//! and the root-to-leaf path is walked, pushing slots as deep as they are
//! legally allowed to go (deepest node on the path that is still an
//! ancestor of the slot's assigned leaf) and packing each bucket to
//! capacity before moving on. Every slot the walk touches — including
//! ones that end up back in the same place — is re-encrypted, so the
//! public ciphertext diff never reveals which slots moved.
//!
//! This is a simplified, single-pass greedy variant of full Circuit-ORAM
//! eviction (which additionally computes a `deepest[]`/`target[]` table in
//! two passes to guarantee an optimal packing); it preserves the
//! structural invariant ("a slot only ever sits at a node that is an
//! ancestor of its assigned leaf") and always makes eviction progress,
//! which is what spec §4.3's invariants require.

use crate::pvorm::tree::PvormTree;

/// For each node on `path` (root-first), the deepest index into `path`
/// (not node id) that `leaf` remains a descendant of. Path nodes are
/// nested, so once ancestry fails it fails for every deeper path node too.
pub fn deepest_eligible_path_index(tree: &PvormTree, path: &[usize], leaf: u64) -> usize {
    let mut deepest = 0;
    for (i, &node) in path.iter().enumerate() {
        if tree.node_is_ancestor_of_leaf(node, leaf) {
            deepest = i;
        } else {
            break;
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PvormParams;

    fn test_pk() -> crate::curve::Point {
        crate::curve::generator() * crate::curve::random_scalar(&mut rand::thread_rng())
    }

    #[test]
    fn own_leaf_is_fully_eligible() {
        let params = PvormParams::new(4, 4, 8);
        let tree = PvormTree::new(&params, test_pk(), &mut rand::thread_rng());
        let leaf = 9u64;
        let path = tree.path_to_leaf(leaf);
        assert_eq!(
            deepest_eligible_path_index(&tree, &path, leaf),
            path.len() - 1
        );
    }

    #[test]
    fn divergent_leaf_stops_at_common_prefix() {
        let params = PvormParams::new(4, 4, 8);
        let tree = PvormTree::new(&params, test_pk(), &mut rand::thread_rng());
        let path = tree.path_to_leaf(0);
        // Leaf 0 = 0b0000, leaf 8 = 0b1000: diverge right at the root's
        // children, so nothing past depth 0 on path-to-0 is eligible.
        let idx = deepest_eligible_path_index(&tree, &path, 8);
        assert_eq!(idx, 0);
    }
}
