//! Union-find that allocates a fresh node for every merge.
//!
//! Slots `0..n` are the points and slots `n..2n-1` the merges, allocated in
//! order. `find` therefore returns the id of the dendrogram node currently
//! representing a point's component.

#[derive(Clone, Debug)]
pub(super) struct LabelUnionFind {
    parent: Vec<usize>,
    next: usize,
}

impl LabelUnionFind {
    pub(super) fn new(point_count: usize) -> Self {
        let slots = (2 * point_count).saturating_sub(1);
        Self {
            parent: (0..slots).collect(),
            next: point_count,
        }
    }

    pub(super) fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Joins two component roots under the next free id and returns it.
    pub(super) fn union(&mut self, left_root: usize, right_root: usize) -> usize {
        let merged = self.next;
        self.parent[left_root] = merged;
        self.parent[right_root] = merged;
        self.next += 1;
        merged
    }
}
