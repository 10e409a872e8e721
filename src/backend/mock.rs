//! Mock backend for testing.

use std::cell::Cell;
use std::thread;
use std::time::Duration;

use crate::core::{Curve, Phase};
use crate::{BenchError, BenchResult};

use super::traits::{ConstraintSystemStats, ProofSystem};

/// Configuration for mock backend responses.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Name to report
    pub name: String,
    /// Curve to report
    pub curve: Curve,
    /// Stats reported for every compiled system
    pub stats: ConstraintSystemStats,
    /// Sleep injected into each compile
    pub compile_delay: Duration,
    /// Sleep injected into each setup
    pub setup_delay: Duration,
    /// Sleep injected into each prove
    pub prove_delay: Duration,
    /// Sleep injected into each verify
    pub verify_delay: Duration,
    /// Serialized size of every proof
    pub proof_size: usize,
    /// Whether dummy_setup is available
    pub supports_dummy_setup: bool,
    pub compile_fails: bool,
    pub setup_fails: bool,
    pub prove_fails: bool,
    pub verify_fails: bool,
    pub proof_size_fails: bool,
}

impl MockConfig {
    /// Create a new mock config with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        MockConfig {
            name: name.into(),
            curve: Curve::Bn254,
            stats: ConstraintSystemStats {
                constraints: 1000,
                internal_variables: 999,
                secret_variables: 1,
                public_variables: 2,
                coefficients: 3000,
            },
            compile_delay: Duration::ZERO,
            setup_delay: Duration::ZERO,
            prove_delay: Duration::ZERO,
            verify_delay: Duration::ZERO,
            proof_size: 128,
            supports_dummy_setup: false,
            compile_fails: false,
            setup_fails: false,
            prove_fails: false,
            verify_fails: false,
            proof_size_fails: false,
        }
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// Set the reported constraint system stats.
    pub fn with_stats(mut self, stats: ConstraintSystemStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_compile_delay(mut self, delay: Duration) -> Self {
        self.compile_delay = delay;
        self
    }

    pub fn with_setup_delay(mut self, delay: Duration) -> Self {
        self.setup_delay = delay;
        self
    }

    pub fn with_prove_delay(mut self, delay: Duration) -> Self {
        self.prove_delay = delay;
        self
    }

    pub fn with_verify_delay(mut self, delay: Duration) -> Self {
        self.verify_delay = delay;
        self
    }

    pub fn with_proof_size(mut self, bytes: usize) -> Self {
        self.proof_size = bytes;
        self
    }

    /// Offer a dummy setup, like Groth16.
    pub fn with_dummy_setup(mut self) -> Self {
        self.supports_dummy_setup = true;
        self
    }

    pub fn compile_fails(mut self) -> Self {
        self.compile_fails = true;
        self
    }

    pub fn setup_fails(mut self) -> Self {
        self.setup_fails = true;
        self
    }

    /// Make prove fail.
    pub fn prove_fails(mut self) -> Self {
        self.prove_fails = true;
        self
    }

    /// Make verify fail.
    pub fn verify_fails(mut self) -> Self {
        self.verify_fails = true;
        self
    }

    pub fn proof_size_fails(mut self) -> Self {
        self.proof_size_fails = true;
        self
    }
}

/// Number of times each capability was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub compile: usize,
    pub derive_artifacts: usize,
    pub setup: usize,
    pub dummy_setup: usize,
    pub witness: usize,
    pub prove: usize,
    pub verify: usize,
}

/// Mock proof system for unit testing.
///
/// Returns fake keys and proofs without any cryptography, sleeping for the
/// configured delays and counting every call.
pub struct MockSystem {
    config: MockConfig,
    calls: Cell<MockCalls>,
}

/// Key handed out by the mock; `real` is false for dummy-setup keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockKey {
    pub generation: usize,
    pub real: bool,
}

impl MockSystem {
    pub fn new(config: MockConfig) -> Self {
        MockSystem { config, calls: Cell::new(MockCalls::default()) }
    }

    /// Create a mock system with default configuration.
    pub fn default_mock() -> Self {
        Self::new(MockConfig::new("mock"))
    }

    pub fn calls(&self) -> MockCalls {
        self.calls.get()
    }

    fn record(&self, bump: impl FnOnce(&mut MockCalls)) -> MockCalls {
        let mut calls = self.calls.get();
        bump(&mut calls);
        self.calls.set(calls);
        calls
    }

    fn pause(delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

impl ProofSystem for MockSystem {
    type Compiled = usize;
    type Artifacts = ();
    type ProvingKey = MockKey;
    type VerifyingKey = MockKey;
    type Witness = usize;
    type PublicWitness = usize;
    type Proof = MockKey;

    fn name(&self) -> &str {
        &self.config.name
    }

    fn curve(&self) -> Curve {
        self.config.curve
    }

    fn compile(&self, size: usize) -> BenchResult<usize> {
        self.record(|c| c.compile += 1);
        Self::pause(self.config.compile_delay);
        if self.config.compile_fails {
            return Err(BenchError::backend(Phase::Compile, "mock compile failed"));
        }
        Ok(size)
    }

    fn stats(&self, _compiled: &usize) -> ConstraintSystemStats {
        self.config.stats
    }

    fn derive_artifacts(&self, _compiled: &usize) -> BenchResult<()> {
        self.record(|c| c.derive_artifacts += 1);
        Ok(())
    }

    fn setup(&self, _compiled: &usize, _artifacts: &()) -> BenchResult<(MockKey, MockKey)> {
        let calls = self.record(|c| c.setup += 1);
        Self::pause(self.config.setup_delay);
        if self.config.setup_fails {
            return Err(BenchError::backend(Phase::Setup, "mock setup failed"));
        }
        let key = MockKey { generation: calls.setup, real: true };
        Ok((key, key))
    }

    fn dummy_setup(&self, _compiled: &usize, _artifacts: &()) -> BenchResult<Option<MockKey>> {
        if !self.config.supports_dummy_setup {
            return Ok(None);
        }
        let calls = self.record(|c| c.dummy_setup += 1);
        Ok(Some(MockKey { generation: calls.dummy_setup, real: false }))
    }

    fn witness(&self, size: usize) -> BenchResult<usize> {
        self.record(|c| c.witness += 1);
        Ok(size)
    }

    fn public_witness(&self, witness: &usize) -> BenchResult<usize> {
        Ok(*witness)
    }

    fn prove(
        &self,
        _compiled: &usize,
        _artifacts: &(),
        pk: &MockKey,
        _witness: &usize,
    ) -> BenchResult<MockKey> {
        let calls = self.record(|c| c.prove += 1);
        Self::pause(self.config.prove_delay);
        if self.config.prove_fails {
            return Err(BenchError::backend(Phase::Prove, "mock prove failed"));
        }
        Ok(MockKey { generation: calls.prove, real: pk.real })
    }

    fn verify(&self, _artifacts: &(), vk: &MockKey, proof: &MockKey, _public: &usize) -> BenchResult<()> {
        self.record(|c| c.verify += 1);
        Self::pause(self.config.verify_delay);
        if self.config.verify_fails || !vk.real || !proof.real {
            return Err(BenchError::backend(Phase::Verify, "mock verify failed"));
        }
        Ok(())
    }

    fn proof_size(&self, _proof: &MockKey) -> BenchResult<usize> {
        if self.config.proof_size_fails {
            return Err(BenchError::Message("mock proof serialization failed".into()));
        }
        Ok(self.config.proof_size)
    }
}
