//! Dual-tree search: query subtrees are walked against reference subtrees.
//!
//! Every node keeps a cached bound, an upper limit on the best edge weight
//! of any component with a point under it. A node pair is skipped when the
//! pair cannot hold an edge lighter than that bound. Bounds are reset to
//! infinity at the start of each round and only shrink during it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    Coordinate,
    execution::{Execution, ExecutionError, Phase},
    kdtree::{KdNode, KdTree},
};

use super::boruvka::Round;

/// Query subtrees scheduled per worker thread.
const SUBTREES_PER_THREAD: usize = 4;

const UNBOUNDED: u64 = f64::INFINITY.to_bits();

pub(super) struct DualTreeSearch {
    bounds: Vec<AtomicU64>,
    frontier: Vec<usize>,
}

impl DualTreeSearch {
    pub(super) fn new(tree: &KdTree, concurrency: usize) -> Self {
        Self {
            bounds: (0..tree.node_count())
                .map(|_| AtomicU64::new(UNBOUNDED))
                .collect(),
            frontier: frontier(tree, concurrency.saturating_mul(SUBTREES_PER_THREAD)),
        }
    }

    /// Runs one round: each frontier subtree is traversed against the whole
    /// tree on the worker pool. Tasks only write bounds inside their own
    /// subtree.
    pub(super) fn search<T: Coordinate>(
        &mut self,
        round: &Round<'_, '_, T>,
        execution: &Execution,
    ) -> Result<(), ExecutionError> {
        for bound in &mut self.bounds {
            *bound.get_mut() = UNBOUNDED;
        }
        let this = &*self;
        execution.run_partitioned(Phase::Boruvka, this.frontier.len(), |subtrees| {
            for index in subtrees {
                let query = round.tree.node(this.frontier[index]);
                this.traverse(round, query, round.tree.root());
            }
            Ok::<_, ExecutionError>(())
        })?;
        Ok(())
    }

    fn bound(&self, node: usize) -> f64 {
        f64::from_bits(self.bounds[node].load(Ordering::Acquire))
    }

    fn set_bound(&self, node: usize, value: f64) {
        self.bounds[node].store(value.to_bits(), Ordering::Release);
    }

    fn traverse<T: Coordinate>(&self, round: &Round<'_, '_, T>, query: &KdNode, reference: &KdNode) {
        if let Some(component) = round.node_components[query.id()]
            && round.node_in(reference.id(), component)
        {
            return;
        }
        let floor = round
            .distances
            .box_lower_bound_squared(query.aabb(), reference.aabb())
            .max(round.min_core[query.id()])
            .max(round.min_core[reference.id()]);
        if self.bound(query.id()) < floor {
            return;
        }

        match (round.tree.children(query), round.tree.children(reference)) {
            (None, None) => {
                let references = round.tree.leaf_points(reference);
                for &point in round.tree.leaf_points(query) {
                    if !round.is_probe(point) {
                        continue;
                    }
                    for &other in references {
                        round.base_case(point, other);
                    }
                }
                self.set_bound(query.id(), leaf_bound(round, query));
            }
            (None, Some((left, right))) => {
                self.traverse_closer_first(round, query, left, right);
            }
            (Some((query_left, query_right)), None) => {
                self.traverse(round, query_left, reference);
                self.traverse(round, query_right, reference);
                self.set_bound(query.id(), self.children_bound(query_left, query_right));
            }
            (Some((query_left, query_right)), Some((left, right))) => {
                self.traverse_closer_first(round, query_left, left, right);
                self.traverse_closer_first(round, query_right, left, right);
                self.set_bound(query.id(), self.children_bound(query_left, query_right));
            }
        }
    }

    fn traverse_closer_first<T: Coordinate>(
        &self,
        round: &Round<'_, '_, T>,
        query: &KdNode,
        left: &KdNode,
        right: &KdNode,
    ) {
        let left_bound = query.aabb().lower_bound_squared_to_box(left.aabb());
        let right_bound = query.aabb().lower_bound_squared_to_box(right.aabb());
        if right_bound < left_bound {
            self.traverse(round, query, right);
            self.traverse(round, query, left);
        } else {
            self.traverse(round, query, left);
            self.traverse(round, query, right);
        }
    }

    fn children_bound(&self, left: &KdNode, right: &KdNode) -> f64 {
        self.bound(left.id()).max(self.bound(right.id()))
    }
}

/// Largest best-edge weight over the components present in a leaf.
fn leaf_bound<T: Coordinate>(round: &Round<'_, '_, T>, leaf: &KdNode) -> f64 {
    round
        .tree
        .leaf_points(leaf)
        .iter()
        .map(|&point| round.tracker.best(round.components[point]))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Splits the tree into roughly `target` disjoint subtrees covering every
/// point, always expanding the largest internal one.
fn frontier(tree: &KdTree, target: usize) -> Vec<usize> {
    let mut frontier = vec![tree.root_id()];
    while frontier.len() < target {
        let widest = frontier
            .iter()
            .enumerate()
            .filter(|(_, id)| !tree.node(**id).is_leaf())
            .max_by_key(|(_, id)| tree.node(**id).len())
            .map(|(index, _)| index);
        let Some(index) = widest else {
            break;
        };
        let Some((left, right)) = tree.node(frontier.swap_remove(index)).children() else {
            break;
        };
        frontier.push(left);
        frontier.push(right);
    }
    frontier
}
