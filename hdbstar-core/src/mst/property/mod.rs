//! Property-based tests for the Boruvka mutual-reachability MST.
//!
//! Compares both traversals against a brute-force Prim oracle, checks the
//! structural invariants of the produced tree, and reruns the build on
//! pools of different sizes to catch interleaving-dependent output.

mod concurrency;
mod equivalence;
mod oracle;
mod strategies;
mod types;
