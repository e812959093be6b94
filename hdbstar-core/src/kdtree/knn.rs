//! Exact k-nearest-neighbour search by branch and bound.

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::{Coordinate, Distances};

use super::{KdNode, KdTree, KdTreeError};

/// A neighbour returned by a k-NN query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    id: usize,
    distance: f64,
}

impl Neighbour {
    /// Returns the neighbour's point id.
    #[must_use]
    #[rustfmt::skip]
    pub fn id(&self) -> usize { self.id }

    /// Returns the Euclidean distance to the query.
    #[must_use]
    #[rustfmt::skip]
    pub fn distance(&self) -> f64 { self.distance }
}

/// The `k` nearest neighbours of a query, sorted by ascending distance.
///
/// Among equidistant candidates the one encountered first during the search
/// is kept and ordered first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighbours {
    entries: Vec<Neighbour>,
    squared: Vec<f64>,
}

impl Neighbours {
    /// Returns the neighbours in ascending order of distance.
    #[must_use]
    #[rustfmt::skip]
    pub fn as_slice(&self) -> &[Neighbour] { &self.entries }

    /// Returns the number of neighbours found.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` when no neighbour was found.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Returns an iterator over the neighbours in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Neighbour> {
        self.entries.iter()
    }

    /// Returns the farthest neighbour found.
    #[must_use]
    pub fn farthest(&self) -> Option<Neighbour> {
        self.entries.last().copied()
    }

    /// Returns the squared distance of the farthest neighbour found.
    pub(crate) fn farthest_squared(&self) -> Option<f64> {
        self.squared.last().copied()
    }
}

impl<'n> IntoIterator for &'n Neighbours {
    type Item = &'n Neighbour;
    type IntoIter = std::slice::Iter<'n, Neighbour>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Candidate ranked by squared distance, then by discovery order.
#[derive(Clone, Copy, Debug)]
struct Ranked {
    squared: f64,
    sequence: u64,
    id: usize,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.squared
            .total_cmp(&other.squared)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bounded max-heap keeping the `k` smallest candidates seen so far.
struct BestSet {
    k: usize,
    heap: BinaryHeap<Ranked>,
    next_sequence: u64,
}

impl BestSet {
    fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1)),
            next_sequence: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    fn worst(&self) -> f64 {
        self.heap.peek().map_or(f64::INFINITY, |top| top.squared)
    }

    /// Returns `true` when nothing at squared distance `bound` or beyond can
    /// enter the set.
    fn prunes(&self, bound: f64) -> bool {
        self.is_full() && bound >= self.worst()
    }

    fn offer(&mut self, id: usize, squared: f64) {
        if self.k == 0 || (self.is_full() && squared >= self.worst()) {
            return;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Ranked {
            squared,
            sequence,
            id,
        });
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    fn into_neighbours(self) -> Neighbours {
        let ranked = self.heap.into_sorted_vec();
        Neighbours {
            entries: ranked
                .iter()
                .map(|candidate| Neighbour {
                    id: candidate.id,
                    distance: candidate.squared.sqrt(),
                })
                .collect(),
            squared: ranked.iter().map(|candidate| candidate.squared).collect(),
        }
    }
}

/// Distance oracle for one query: squared distance to an indexed point and a
/// squared lower bound to a node's box.
trait Query {
    fn squared_to(&self, id: usize) -> f64;
    fn bound_to(&self, node: &KdNode) -> f64;
    fn excludes(&self, id: usize) -> bool;
}

struct PointQuery<'q, 'a, T> {
    distances: &'q Distances<'a, T>,
    id: usize,
}

impl<T: Coordinate> Query for PointQuery<'_, '_, T> {
    fn squared_to(&self, id: usize) -> f64 {
        self.distances.squared(self.id, id)
    }

    fn bound_to(&self, node: &KdNode) -> f64 {
        self.distances.lower_bound_squared(node.aabb(), self.id)
    }

    fn excludes(&self, id: usize) -> bool {
        id == self.id
    }
}

struct VectorQuery<'q, 'a, T> {
    distances: &'q Distances<'a, T>,
    vector: &'q [T],
}

impl<T: Coordinate> Query for VectorQuery<'_, '_, T> {
    fn squared_to(&self, id: usize) -> f64 {
        self.distances.squared_to_vector(id, self.vector)
    }

    fn bound_to(&self, node: &KdNode) -> f64 {
        node.aabb().lower_bound_squared(self.vector)
    }

    fn excludes(&self, _id: usize) -> bool {
        false
    }
}

impl KdTree {
    /// Finds the `k` nearest neighbours of indexed point `query`, excluding
    /// the point itself.
    ///
    /// The search visits the child with the smaller box bound first and
    /// skips a subtree once `k` candidates are held and the subtree's bound
    /// is not smaller than the current `k`-th best distance. The result is
    /// exact.
    ///
    /// # Errors
    /// Returns [`KdTreeError::PointOutOfBounds`] when `query` is not indexed.
    pub fn k_nearest<T: Coordinate>(
        &self,
        distances: &Distances<'_, T>,
        query: usize,
        k: usize,
    ) -> Result<Neighbours, KdTreeError> {
        if query >= self.point_count() {
            return Err(KdTreeError::PointOutOfBounds {
                index: query,
                point_count: self.point_count(),
            });
        }
        Ok(self.k_nearest_unchecked(distances, query, k))
    }

    /// Finds the `k` indexed points nearest to a free query vector.
    ///
    /// # Errors
    /// Returns [`KdTreeError::DimensionMismatch`] when `vector` does not have
    /// the index dimensionality.
    pub fn k_nearest_to_vector<T: Coordinate>(
        &self,
        distances: &Distances<'_, T>,
        vector: &[T],
        k: usize,
    ) -> Result<Neighbours, KdTreeError> {
        if vector.len() != self.dimension() {
            return Err(KdTreeError::DimensionMismatch {
                expected: self.dimension(),
                actual: vector.len(),
            });
        }
        Ok(self.search(&VectorQuery { distances, vector }, k))
    }

    /// Infallible k-NN for a point already known to be indexed.
    pub(crate) fn k_nearest_unchecked<T: Coordinate>(
        &self,
        distances: &Distances<'_, T>,
        query: usize,
        k: usize,
    ) -> Neighbours {
        let query = PointQuery {
            distances,
            id: query,
        };
        self.search(&query, k)
    }

    fn search<Q: Query>(&self, query: &Q, k: usize) -> Neighbours {
        let mut best = BestSet::new(k);
        if k > 0 {
            self.visit(self.root(), query, &mut best);
        }
        best.into_neighbours()
    }

    fn visit<Q: Query>(&self, node: &KdNode, query: &Q, best: &mut BestSet) {
        match self.children(node) {
            None => {
                for &id in self.leaf_points(node) {
                    if !query.excludes(id) {
                        best.offer(id, query.squared_to(id));
                    }
                }
            }
            Some((left, right)) => {
                let left_bound = query.bound_to(left);
                let right_bound = query.bound_to(right);
                let ordered = if right_bound < left_bound {
                    [(right, right_bound), (left, left_bound)]
                } else {
                    [(left, left_bound), (right, right_bound)]
                };
                for (child, bound) in ordered {
                    if !best.prunes(bound) {
                        self.visit(child, query, best);
                    }
                }
            }
        }
    }
}
