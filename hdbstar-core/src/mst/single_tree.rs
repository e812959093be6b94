//! Single-tree search: every eligible point probes the KD-tree from the root.

use crate::{
    Coordinate,
    execution::{Execution, ExecutionError, Phase},
    kdtree::KdNode,
};

use super::boruvka::Round;

/// Runs one round of per-point probes, partitioned across the worker pool.
pub(super) fn search<T: Coordinate>(
    round: &Round<'_, '_, T>,
    execution: &Execution,
) -> Result<(), ExecutionError> {
    execution.run_partitioned(Phase::Boruvka, round.components.len(), |points| {
        for query in points {
            probe(round, query);
        }
        Ok::<_, ExecutionError>(())
    })?;
    Ok(())
}

fn probe<T: Coordinate>(round: &Round<'_, '_, T>, query: usize) {
    if !round.is_probe(query) {
        return;
    }
    let root = round.tree.root();
    let bound = round.distances.lower_bound_squared(root.aabb(), query);
    visit(round, query, root, bound);
}

fn visit<T: Coordinate>(round: &Round<'_, '_, T>, query: usize, node: &KdNode, bound: f64) {
    let component = round.components[query];
    if round.node_in(node.id(), component) || prunes(round, query, node, bound) {
        return;
    }
    match round.tree.children(node) {
        None => {
            for &reference in round.tree.leaf_points(node) {
                round.base_case(query, reference);
            }
        }
        Some((left, right)) => {
            let left_bound = round.distances.lower_bound_squared(left.aabb(), query);
            let right_bound = round.distances.lower_bound_squared(right.aabb(), query);
            if right_bound < left_bound {
                visit(round, query, right, right_bound);
                visit(round, query, left, left_bound);
            } else {
                visit(round, query, left, left_bound);
                visit(round, query, right, right_bound);
            }
        }
    }
}

/// A subtree is skipped once no edge into it can beat the component's best
/// edge: every such edge weighs at least the box bound, the query's core
/// distance and the smallest core distance in the subtree.
fn prunes<T: Coordinate>(round: &Round<'_, '_, T>, query: usize, node: &KdNode, bound: f64) -> bool {
    let floor = bound
        .max(round.core[query])
        .max(round.min_core[node.id()]);
    round.tracker.best(round.components[query]) < floor
}
