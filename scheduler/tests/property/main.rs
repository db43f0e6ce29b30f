//! Property-based tests over randomly generated process sets.
//!
//! Run with: `cargo test --test property`

mod engine_invariants;
mod run_equivalence;
mod strategies;
