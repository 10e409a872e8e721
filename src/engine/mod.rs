//! Engine module: times and profiles pipeline phases for any `ProofSystem`.
//!
//! - `timer` averages a repeated operation.
//! - `profiler` optionally samples the CPU around the timed region.
//! - `driver` owns the compile/setup/prove/verify state machine.
//! - `workflow` selects a backend from the run settings and builds the
//!   `ResultRecord`.

pub mod driver;
pub mod profiler;
pub mod timer;
pub mod workflow;

// Re-export key types for convenience
pub use driver::{Driver, DriverState, Measurement};
pub use profiler::{ProfileMode, ProfilerAttachment};
pub use workflow::{execute, measure, run};
