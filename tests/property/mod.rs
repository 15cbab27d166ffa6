//! Property-based tests for rendering and validation guarantees

mod determinism;
