//! Round loop shared by both search strategies: component snapshot,
//! subtree bookkeeping, search, and merge.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    Coordinate, CoreDistances, Distances,
    execution::{Execution, Phase},
    kdtree::KdTree,
};

use super::{
    BoruvkaTraversal, MinimumSpanningTree, MstEdge, MstError,
    dual_tree::DualTreeSearch,
    single_tree,
    tracker::{Candidate, ClosestDistanceTracker},
    union_find::ComponentUnionFind,
};

/// Read-only view of one round, shared by every search task.
pub(super) struct Round<'r, 'a, T> {
    pub(super) tree: &'r KdTree,
    pub(super) distances: &'r Distances<'a, T>,
    /// Squared core distance per point.
    pub(super) core: &'r [f64],
    /// Component root of every point at the start of the round.
    pub(super) components: &'r [usize],
    /// Component shared by every point of a node, if there is one.
    pub(super) node_components: &'r [Option<usize>],
    /// Smallest squared core distance under each node.
    pub(super) min_core: &'r [f64],
    pub(super) tracker: &'r ClosestDistanceTracker,
}

impl<T: Coordinate> Round<'_, '_, T> {
    /// Returns `true` when `point` could still improve its component's best
    /// edge. Every edge leaving `point` weighs at least its core distance.
    pub(super) fn is_probe(&self, point: usize) -> bool {
        self.core[point] <= self.tracker.best(self.components[point])
    }

    /// Returns `true` when every point under `node` lies in `component`.
    pub(super) fn node_in(&self, node: usize, component: usize) -> bool {
        self.node_components[node] == Some(component)
    }

    /// Evaluates the pair `(query, reference)` and offers the edge to both
    /// endpoint components.
    pub(super) fn base_case(&self, query: usize, reference: usize) {
        let query_component = self.components[query];
        let reference_component = self.components[reference];
        if query_component == reference_component {
            return;
        }
        let query_core = self.core[query];
        let reference_core = self.core[reference];
        let ceiling = self
            .tracker
            .best(query_component)
            .max(self.tracker.best(reference_component));
        if reference_core > ceiling {
            return;
        }
        let squared = self
            .distances
            .squared(query, reference)
            .max(query_core)
            .max(reference_core);
        let candidate = Candidate::new(squared, query, reference);
        self.tracker.offer(query_component, candidate);
        self.tracker.offer(reference_component, candidate);
    }
}

/// Builds the mutual-reachability minimum spanning tree.
///
/// Rounds repeat until the root of the KD-tree covers a single component,
/// at which point exactly `n - 1` edges have been merged. Edges carry their
/// merge position as sequence number. Both traversals return identical
/// trees because every component keeps the smallest edge under a total
/// order on `(weight, smaller endpoint, larger endpoint)`.
///
/// # Errors
/// Returns [`MstError::PointCountMismatch`] or
/// [`MstError::InvalidCoreDistances`] when the inputs disagree on the point
/// count, [`MstError::Execution`] when the run is cancelled, and
/// [`MstError::NoProgress`] if a round fails to merge anything.
#[instrument(
    name = "core.boruvka",
    err,
    skip(tree, distances, core_distances, traversal, execution),
    fields(points = distances.len(), traversal = %traversal),
)]
pub fn boruvka_mst<T: Coordinate>(
    tree: &KdTree,
    distances: &Distances<'_, T>,
    core_distances: &CoreDistances,
    traversal: BoruvkaTraversal,
    execution: &Execution,
) -> Result<MinimumSpanningTree, MstError> {
    let point_count = distances.len();
    if tree.point_count() != point_count {
        return Err(MstError::PointCountMismatch {
            expected: point_count,
            actual: tree.point_count(),
        });
    }
    if core_distances.len() != point_count {
        return Err(MstError::InvalidCoreDistances {
            expected: point_count,
            actual: core_distances.len(),
        });
    }
    if point_count <= 1 {
        return Ok(MinimumSpanningTree::new(point_count, Vec::new()));
    }

    let core = core_distances.squared_values();
    let min_core = node_min_core(tree, core);
    let mut union_find = ComponentUnionFind::new(point_count);
    let mut tracker = ClosestDistanceTracker::new(point_count);
    let mut node_components = vec![None; tree.node_count()];
    let mut dual = match traversal {
        BoruvkaTraversal::SingleTree => None,
        BoruvkaTraversal::DualTree => Some(DualTreeSearch::new(tree, execution.concurrency())),
    };
    let mut edges = Vec::with_capacity(point_count - 1);
    let mut round_index = 0_usize;

    loop {
        execution.check(Phase::Boruvka)?;
        let components = snapshot_components(&union_find, point_count, execution);
        refresh_node_components(tree, &components, &mut node_components);
        if node_components[tree.root_id()].is_some() {
            break;
        }

        let round = Round {
            tree,
            distances,
            core,
            components: &components,
            node_components: &node_components,
            min_core: &min_core,
            tracker: &tracker,
        };
        match dual.as_mut() {
            None => single_tree::search(&round, execution)?,
            Some(search) => search.search(&round, execution)?,
        }

        let merged = merge(&mut union_find, &mut tracker, &components, &mut edges);
        round_index += 1;
        record_round(traversal, merged);
        debug!(
            round = round_index,
            merged,
            components = union_find.components(),
            "boruvka round complete"
        );
        if merged == 0 {
            return Err(MstError::NoProgress {
                components: union_find.components(),
            });
        }
    }

    let spanning_tree = MinimumSpanningTree::new(point_count, edges);
    debug!(
        edges = spanning_tree.len(),
        total_weight = spanning_tree.total_weight(),
        rounds = round_index,
        "spanning tree complete"
    );
    Ok(spanning_tree)
}

fn node_min_core(tree: &KdTree, core: &[f64]) -> Vec<f64> {
    let mut min_core = vec![f64::INFINITY; tree.node_count()];
    for node in tree.nodes() {
        min_core[node.id()] = match tree.children(node) {
            None => tree
                .leaf_points(node)
                .iter()
                .map(|&point| core[point])
                .fold(f64::INFINITY, f64::min),
            Some((left, right)) => min_core[left.id()].min(min_core[right.id()]),
        };
    }
    min_core
}

fn snapshot_components(
    union_find: &ComponentUnionFind,
    point_count: usize,
    execution: &Execution,
) -> Vec<usize> {
    execution.install(|| {
        (0..point_count)
            .into_par_iter()
            .map(|point| union_find.find(point))
            .collect()
    })
}

/// Recomputes, bottom-up, which nodes hold a single component. A node that
/// was single stays single; only its component id may have changed.
fn refresh_node_components(
    tree: &KdTree,
    components: &[usize],
    node_components: &mut [Option<usize>],
) {
    for node in tree.nodes() {
        let points = tree.leaf_points(node);
        let first = components[points[0]];
        node_components[node.id()] = if node_components[node.id()].is_some() {
            Some(first)
        } else {
            match tree.children(node) {
                None => points
                    .iter()
                    .all(|&point| components[point] == first)
                    .then_some(first),
                Some((left, right)) => {
                    match (node_components[left.id()], node_components[right.id()]) {
                        (Some(a), Some(b)) if a == b => Some(a),
                        _ => None,
                    }
                }
            }
        };
    }
}

/// Merges the recorded edge of every component root, in ascending root
/// order, and returns the number of edges added.
fn merge(
    union_find: &mut ComponentUnionFind,
    tracker: &mut ClosestDistanceTracker,
    components: &[usize],
    edges: &mut Vec<MstEdge>,
) -> usize {
    let before = edges.len();
    for (point, &component) in components.iter().enumerate() {
        if point != component {
            continue;
        }
        let Some(candidate) = tracker.take(component) else {
            continue;
        };
        if union_find
            .union(candidate.source(), candidate.target())
            .is_some()
        {
            let sequence = u64::try_from(edges.len()).unwrap_or(u64::MAX);
            edges.push(MstEdge::new(
                candidate.source(),
                candidate.target(),
                candidate.squared().sqrt(),
                sequence,
            ));
        }
    }
    edges.len() - before
}

#[cfg(feature = "metrics")]
fn record_round(traversal: BoruvkaTraversal, merged: usize) {
    metrics::counter!("hdbstar_boruvka_rounds_total", "traversal" => traversal.as_str())
        .increment(1);
    metrics::counter!("hdbstar_boruvka_merges_total", "traversal" => traversal.as_str())
        .increment(u64::try_from(merged).unwrap_or(u64::MAX));
}

#[cfg(not(feature = "metrics"))]
fn record_round(_traversal: BoruvkaTraversal, _merged: usize) {}
