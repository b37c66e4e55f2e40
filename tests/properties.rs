//! Property tests for gangway.
//!
//! Properties use randomized input generation to protect invariants like
//! "never panics" and "base detection round-trips".
//!
//! Run with: `cargo test --test properties`

#[path = "properties/normalizer.rs"]
mod normalizer;

#[path = "properties/paths.rs"]
mod paths;
