//! Proof system capability set driven by the benchmark engine.

use serde::{Deserialize, Serialize};

use crate::BenchResult;
use crate::core::Curve;

/// Structural size of a compiled constraint system.
///
/// Pass-through of whatever the compiler reports; no relationship between the
/// fields is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSystemStats {
    pub constraints: u64,
    pub internal_variables: u64,
    pub secret_variables: u64,
    pub public_variables: u64,
    pub coefficients: u64,
}

/// Capability set of one proving backend.
///
/// The engine's `Driver` owns the phase ordering and timing; implementations
/// only wrap the proving library. Every fallible call maps library errors into
/// `BenchError::Backend` tagged with its phase.
pub trait ProofSystem {
    /// Compiled constraint system plus whatever the later phases need from it.
    type Compiled;
    /// Auxiliary setup material (e.g. a reference string); `()` if none.
    type Artifacts;
    type ProvingKey;
    type VerifyingKey;
    /// Full assignment for the circuit.
    type Witness;
    /// Public portion of the witness, as consumed by the verifier.
    type PublicWitness;
    type Proof;

    /// Backend name reported in the record (e.g. "groth16").
    fn name(&self) -> &str;

    fn curve(&self) -> Curve;

    /// Compile the circuit scaled to `size`.
    fn compile(&self, size: usize) -> BenchResult<Self::Compiled>;

    fn stats(&self, compiled: &Self::Compiled) -> ConstraintSystemStats;

    /// Derive backend-specific setup artifacts from the compiled system.
    fn derive_artifacts(&self, compiled: &Self::Compiled) -> BenchResult<Self::Artifacts>;

    /// Produce proving and verification keys.
    fn setup(
        &self,
        compiled: &Self::Compiled,
        artifacts: &Self::Artifacts,
    ) -> BenchResult<(Self::ProvingKey, Self::VerifyingKey)>;

    /// Fast, insecure stand-in for `setup` that only yields a proving key.
    ///
    /// Returns `Ok(None)` when the backend has no such shortcut.
    fn dummy_setup(
        &self,
        _compiled: &Self::Compiled,
        _artifacts: &Self::Artifacts,
    ) -> BenchResult<Option<Self::ProvingKey>> {
        Ok(None)
    }

    /// Build a satisfying witness for the circuit scaled to `size`.
    fn witness(&self, size: usize) -> BenchResult<Self::Witness>;

    fn public_witness(&self, witness: &Self::Witness) -> BenchResult<Self::PublicWitness>;

    fn prove(
        &self,
        compiled: &Self::Compiled,
        artifacts: &Self::Artifacts,
        pk: &Self::ProvingKey,
        witness: &Self::Witness,
    ) -> BenchResult<Self::Proof>;

    /// Verify `proof`; a rejected proof is an error.
    fn verify(
        &self,
        artifacts: &Self::Artifacts,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public: &Self::PublicWitness,
    ) -> BenchResult<()>;

    /// Size of the serialized proof in bytes.
    fn proof_size(&self, proof: &Self::Proof) -> BenchResult<usize>;
}

