//! Repeated builds across pool sizes must produce identical trees.

use proptest::{prop_assert_eq, test_runner::TestCaseResult};

use crate::mst::BoruvkaTraversal;

use super::{equivalence::build_spanning_tree, types::MstFixture};

/// Worker counts exercised for each traversal.
const THREAD_COUNTS: [usize; 3] = [1, 3, 8];

pub(super) fn run_concurrency_safety_property(fixture: &MstFixture) -> TestCaseResult {
    for traversal in [BoruvkaTraversal::SingleTree, BoruvkaTraversal::DualTree] {
        let reference = build_spanning_tree(fixture, traversal, 1);
        for threads in THREAD_COUNTS {
            let candidate = build_spanning_tree(fixture, traversal, threads);
            prop_assert_eq!(
                reference.edges(),
                candidate.edges(),
                "{} with {} threads diverged",
                traversal,
                threads
            );
        }
    }
    Ok(())
}
