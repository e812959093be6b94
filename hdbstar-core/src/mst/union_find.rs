//! Disjoint-set forest over point ids used by the Boruvka rounds.
//!
//! `find` takes `&self` and is safe to call from many search threads at
//! once: it performs path halving with atomic stores, and every store only
//! moves a node closer to a root that is already an ancestor. `union` needs
//! `&mut self`, so the merge step cannot overlap a search.

use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) struct ComponentUnionFind {
    parents: Vec<AtomicUsize>,
    ranks: Vec<usize>,
    components: usize,
}

impl ComponentUnionFind {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            parents: (0..node_count).map(AtomicUsize::new).collect(),
            ranks: vec![0; node_count],
            components: node_count,
        }
    }

    pub(crate) fn components(&self) -> usize {
        self.components
    }

    pub(crate) fn find(&self, node: usize) -> usize {
        let mut current = node;
        loop {
            let parent = self.parents[current].load(Ordering::Acquire);
            if parent == current {
                return current;
            }

            let grandparent = self.parents[parent].load(Ordering::Acquire);
            if grandparent != parent {
                self.parents[current].store(grandparent, Ordering::Release);
            }

            current = parent;
        }
    }

    /// Merges the sets holding `left` and `right`.
    ///
    /// Returns the surviving root, or `None` when both already share a set.
    pub(crate) fn union(&mut self, left: usize, right: usize) -> Option<usize> {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return None;
        }

        let (parent, child) = choose_parent_child(
            left_root,
            right_root,
            self.ranks[left_root],
            self.ranks[right_root],
        );
        *self.parents[child].get_mut() = parent;
        if self.ranks[left_root] == self.ranks[right_root] {
            self.ranks[parent] += 1;
        }
        self.components -= 1;
        Some(parent)
    }
}

fn choose_parent_child(
    left_root: usize,
    right_root: usize,
    left_rank: usize,
    right_rank: usize,
) -> (usize, usize) {
    if left_rank > right_rank {
        return (left_root, right_root);
    }
    if right_rank > left_rank {
        return (right_root, left_root);
    }

    if left_root <= right_root {
        (left_root, right_root)
    } else {
        (right_root, left_root)
    }
}
