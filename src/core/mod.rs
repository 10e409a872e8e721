//! Core types for zk-bench.
//!
//! This module contains the `ResultRecord` schema emitted once per run, the host
//! descriptor that accompanies it, and the process memory sampler.

pub mod env;
pub mod memory;
pub mod schema;

// Re-export key types for convenience
pub use env::HostInfo;
pub use memory::sample_memory_mib;
pub use schema::{BackendKind, Curve, NO_PROOF, Phase, ResultRecord};
