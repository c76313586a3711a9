//! `PVORMTree`: a complete binary tree of height `h`, arena-indexed rather
//! than pointer-linked (spec §9 redesign note: "prefer an arena-indexed
//! representation ... so that eviction walks are cache-friendly").

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::PvormParams;
use crate::curve::Point;
use crate::pvorm::bucket::PvormBucket;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PvormTree {
    buckets: Vec<PvormBucket>,
    height: u32,
}

impl PvormTree {
    /// Builds a tree with every bucket packed to capacity with fresh
    /// identity-placeholder slots (spec §3: the tree holds no empty cells).
    pub fn new(params: &PvormParams, bank_pk: Point, rng: &mut impl RngCore) -> Self {
        let buckets = (0..params.bucket_count())
            .map(|_| PvormBucket::filled_with_identity(params.bucket_size, bank_pk, rng))
            .collect();
        Self {
            buckets,
            height: params.height,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn leaf_count(&self) -> u64 {
        1u64 << self.height
    }

    pub fn bucket(&self, node: usize) -> &PvormBucket {
        &self.buckets[node]
    }

    pub fn bucket_mut(&mut self, node: usize) -> &mut PvormBucket {
        &mut self.buckets[node]
    }

    pub fn buckets(&self) -> &[PvormBucket] {
        &self.buckets
    }

    /// Node index of leaf `leaf` (0-indexed among the `2^h` leaves).
    pub fn leaf_node(&self, leaf: u64) -> usize {
        ((1u64 << self.height) - 1 + leaf) as usize
    }

    /// Node indices on the root-to-leaf path for `leaf`, ordered root first.
    pub fn path_to_leaf(&self, leaf: u64) -> Vec<usize> {
        let mut node = self.leaf_node(leaf);
        let mut path = vec![node];
        while node > 0 {
            node = (node - 1) / 2;
            path.push(node);
        }
        path.reverse();
        path
    }

    /// Depth of `node` (root is depth 0).
    pub fn depth(&self, node: usize) -> u32 {
        (usize::BITS - (node + 1).leading_zeros()) - 1
    }

    /// The sibling of `node` (the other child of its parent), or `None`
    /// for the root, which has no sibling.
    pub fn sibling(&self, node: usize) -> Option<usize> {
        if node == 0 {
            None
        } else if node % 2 == 1 {
            Some(node + 1)
        } else {
            Some(node - 1)
        }
    }

    /// Whether `leaf` lies in the subtree rooted at `node` — i.e. whether
    /// `node` appears on `leaf`'s root-to-leaf path.
    pub fn node_is_ancestor_of_leaf(&self, node: usize, leaf: u64) -> bool {
        let leaf_node = self.leaf_node(leaf);
        let mut cur = leaf_node;
        loop {
            if cur == node {
                return true;
            }
            if cur == 0 {
                return false;
            }
            cur = (cur - 1) / 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pk() -> crate::curve::Point {
        crate::curve::generator() * crate::curve::random_scalar(&mut rand::thread_rng())
    }

    #[test]
    fn path_has_height_plus_one_nodes() {
        let params = PvormParams::new(4, 4, 8);
        let tree = PvormTree::new(&params, test_pk(), &mut rand::thread_rng());
        let path = tree.path_to_leaf(5);
        assert_eq!(path.len(), 5);
        assert_eq!(*path.first().unwrap(), 0);
        assert_eq!(*path.last().unwrap(), tree.leaf_node(5));
    }

    #[test]
    fn ancestor_check_matches_path() {
        let params = PvormParams::new(3, 2, 4);
        let tree = PvormTree::new(&params, test_pk(), &mut rand::thread_rng());
        for leaf in 0..tree.leaf_count() {
            let path = tree.path_to_leaf(leaf);
            for node in 0..tree.buckets().len() {
                assert_eq!(
                    path.contains(&node),
                    tree.node_is_ancestor_of_leaf(node, leaf)
                );
            }
        }
    }
}
