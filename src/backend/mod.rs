//! Proving backends behind a single capability set.
//!
//! `ProofSystem` is what the engine's driver calls; each backend wraps one
//! proving library and one arithmetization.

pub mod groth16;
pub mod mock;
pub mod plonk;
pub mod traits;

// Re-export key types
pub use groth16::{CompiledR1cs, Groth16System};
pub use mock::{MockCalls, MockConfig, MockKey, MockSystem};
pub use plonk::{CompiledPlonkish, PlonkSystem};
pub use traits::{ConstraintSystemStats, ProofSystem};
