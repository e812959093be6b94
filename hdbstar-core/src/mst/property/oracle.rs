//! Brute-force Prim oracle over the complete mutual-reachability graph.

use crate::test_utils::{VecSource, brute_distance};

/// Result of the sequential oracle.
#[derive(Clone, Debug)]
pub(super) struct OracleTree {
    /// Sum of the spanning-tree weights.
    pub total_weight: f64,
    /// Number of edges in the tree.
    pub edge_count: usize,
}

/// Core distance of every point by sorting all distances to the others.
pub(super) fn brute_core_distances(points: &VecSource<f64>, samples: usize) -> Vec<f64> {
    let rows = points.rows();
    (0..rows.len())
        .map(|query| {
            let mut distances: Vec<f64> = (0..rows.len())
                .filter(|&other| other != query)
                .map(|other| brute_distance(&rows[query], &rows[other]))
                .collect();
            distances.sort_by(f64::total_cmp);
            distances
                .get(samples - 1)
                .or(distances.last())
                .copied()
                .unwrap_or(0.0)
        })
        .collect()
}

/// Mutual-reachability distance between two points.
pub(super) fn mutual_reachability(points: &VecSource<f64>, core: &[f64], left: usize, right: usize) -> f64 {
    let rows = points.rows();
    brute_distance(&rows[left], &rows[right])
        .max(core[left])
        .max(core[right])
}

/// O(n²) Prim's algorithm on the complete mutual-reachability graph.
pub(super) fn prim(points: &VecSource<f64>, samples: usize) -> OracleTree {
    let count = points.rows().len();
    let core = brute_core_distances(points, samples);
    if count <= 1 {
        return OracleTree {
            total_weight: 0.0,
            edge_count: 0,
        };
    }

    let mut in_tree = vec![false; count];
    let mut best = vec![f64::INFINITY; count];
    best[0] = 0.0;
    let mut total_weight = 0.0;
    let mut edge_count = 0;

    for step in 0..count {
        let next = (0..count)
            .filter(|&node| !in_tree[node])
            .min_by(|&a, &b| best[a].total_cmp(&best[b]))
            .expect("an unvisited node remains");
        in_tree[next] = true;
        if step > 0 {
            total_weight += best[next];
            edge_count += 1;
        }
        for other in 0..count {
            if !in_tree[other] {
                let weight = mutual_reachability(points, &core, next, other);
                if weight < best[other] {
                    best[other] = weight;
                }
            }
        }
    }

    OracleTree {
        total_weight,
        edge_count,
    }
}
