//! Backend Driver: the phase state machine shared by every proof system.
//!
//! ```text
//! Idle --compile--> Compiled --setup/dummy_setup--> SetupComplete --prove--> Proved
//! ```
//!
//! Recompiling discards everything downstream. A new setup discards the proof.
//! `verify` needs a proof *and* a verifying key from a real setup.

use std::num::NonZeroU32;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::profiler::ProfilerAttachment;
use super::timer;
use crate::backend::{ConstraintSystemStats, ProofSystem};
use crate::core::{NO_PROOF, Phase};
use crate::{BenchError, BenchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Compiled,
    SetupComplete,
    Proved,
}

/// Outcome of one timed sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub phase: Phase,
    /// Mean time of one iteration
    pub elapsed: Duration,
    pub count: u32,
    pub stats: ConstraintSystemStats,
    /// `NO_PROOF` for phases that do not hold a proof
    pub proof_size_bytes: i64,
}

struct Keys<S: ProofSystem> {
    proving: S::ProvingKey,
    /// Absent after a dummy setup
    verifying: Option<S::VerifyingKey>,
}

pub struct Driver<S: ProofSystem> {
    system: S,
    size: usize,
    compiled: Option<S::Compiled>,
    artifacts: Option<S::Artifacts>,
    keys: Option<Keys<S>>,
    witness: Option<S::Witness>,
    public: Option<S::PublicWitness>,
    proof: Option<S::Proof>,
}

impl<S: ProofSystem> Driver<S> {
    pub fn new(system: S, size: usize) -> Self {
        Driver {
            system,
            size,
            compiled: None,
            artifacts: None,
            keys: None,
            witness: None,
            public: None,
            proof: None,
        }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn state(&self) -> DriverState {
        if self.proof.is_some() {
            DriverState::Proved
        } else if self.keys.is_some() {
            DriverState::SetupComplete
        } else if self.compiled.is_some() {
            DriverState::Compiled
        } else {
            DriverState::Idle
        }
    }

    /// Whether a verifying key from a real setup is held.
    pub fn has_verifying_key(&self) -> bool {
        self.keys.as_ref().is_some_and(|k| k.verifying.is_some())
    }

    pub fn compile(&mut self) -> BenchResult<()> {
        let compiled = self.system.compile(self.size)?;
        self.compiled = Some(compiled);
        self.artifacts = None;
        self.keys = None;
        self.witness = None;
        self.public = None;
        self.proof = None;
        Ok(())
    }

    pub fn stats(&self) -> BenchResult<ConstraintSystemStats> {
        let compiled = self.require_compiled("stats")?;
        Ok(self.system.stats(compiled))
    }

    pub fn setup(&mut self) -> BenchResult<()> {
        self.ensure_artifacts()?;
        let (compiled, artifacts) = self.compiled_with_artifacts("setup")?;
        let (proving, verifying) = self.system.setup(compiled, artifacts)?;
        self.keys = Some(Keys { proving, verifying: Some(verifying) });
        self.proof = None;
        Ok(())
    }

    /// Cheap setup for prove benchmarks; falls back to `setup` when the
    /// backend has none. Leaves no verifying key behind.
    pub fn dummy_setup(&mut self) -> BenchResult<()> {
        self.ensure_artifacts()?;
        let (compiled, artifacts) = self.compiled_with_artifacts("dummy setup")?;
        match self.system.dummy_setup(compiled, artifacts)? {
            Some(proving) => {
                self.keys = Some(Keys { proving, verifying: None });
                self.proof = None;
                Ok(())
            }
            None => {
                debug!(backend = self.system.name(), "no dummy setup available, running real setup");
                self.setup()
            }
        }
    }

    pub fn prove(&mut self) -> BenchResult<()> {
        if self.keys.is_none() {
            return Err(self.invalid("prove"));
        }
        self.ensure_witness()?;
        let (compiled, artifacts) = self.compiled_with_artifacts("prove")?;
        let (Some(keys), Some(witness)) = (self.keys.as_ref(), self.witness.as_ref()) else {
            return Err(self.invalid("prove"));
        };
        let proof = self.system.prove(compiled, artifacts, &keys.proving, witness)?;
        self.proof = Some(proof);
        Ok(())
    }

    pub fn verify(&mut self) -> BenchResult<()> {
        if self.proof.is_none() || !self.has_verifying_key() {
            return Err(self.invalid("verify"));
        }
        self.ensure_public_witness()?;
        let (_, artifacts) = self.compiled_with_artifacts("verify")?;
        let vk = self.keys.as_ref().and_then(|k| k.verifying.as_ref());
        let (Some(vk), Some(proof), Some(public)) = (vk, self.proof.as_ref(), self.public.as_ref())
        else {
            return Err(self.invalid("verify"));
        };
        self.system.verify(artifacts, vk, proof, public)
    }

    /// Serialized size of the held proof; 0 if it cannot be measured.
    pub fn proof_size_bytes(&self) -> i64 {
        let Some(proof) = self.proof.as_ref() else {
            return 0;
        };
        match self.system.proof_size(proof) {
            Ok(bytes) => bytes as i64,
            Err(e) => {
                warn!(error = %e, "could not serialize proof; reporting size 0");
                0
            }
        }
    }

    /// Prepare the prerequisites of `phase` untimed, then time `count`
    /// iterations of it inside the profiler.
    pub fn run(
        &mut self,
        phase: Phase,
        count: NonZeroU32,
        profiler: &ProfilerAttachment,
    ) -> BenchResult<Measurement> {
        info!(backend = self.system.name(), %phase, count = count.get(), size = self.size, "benchmarking");

        let elapsed = match phase {
            Phase::Compile => profiler.around(|| timer::average(count, || self.compile()))?,
            Phase::Setup => {
                self.compile()?;
                self.ensure_artifacts()?;
                profiler.around(|| timer::average(count, || self.setup()))?
            }
            Phase::Prove => {
                self.compile()?;
                self.dummy_setup()?;
                self.ensure_witness()?;
                profiler.around(|| timer::average(count, || self.prove()))?
            }
            Phase::Verify => {
                self.compile()?;
                self.setup()?;
                self.prove()?;
                self.ensure_public_witness()?;
                profiler.around(|| timer::average(count, || self.verify()))?
            }
        };

        let proof_size_bytes = if phase.produces_proof() {
            self.proof_size_bytes()
        } else {
            NO_PROOF
        };
        let measurement = Measurement {
            phase,
            elapsed,
            count: count.get(),
            stats: self.stats()?,
            proof_size_bytes,
        };
        debug!(?measurement, "phase complete");
        Ok(measurement)
    }

    fn ensure_artifacts(&mut self) -> BenchResult<()> {
        if self.artifacts.is_none() {
            let compiled = self.require_compiled("derive artifacts")?;
            let artifacts = self.system.derive_artifacts(compiled)?;
            self.artifacts = Some(artifacts);
        }
        Ok(())
    }

    fn ensure_witness(&mut self) -> BenchResult<()> {
        if self.witness.is_none() {
            self.witness = Some(self.system.witness(self.size)?);
            self.public = None;
        }
        Ok(())
    }

    fn ensure_public_witness(&mut self) -> BenchResult<()> {
        if self.public.is_none() {
            self.ensure_witness()?;
            let Some(witness) = self.witness.as_ref() else {
                return Err(self.invalid("extract public witness"));
            };
            self.public = Some(self.system.public_witness(witness)?);
        }
        Ok(())
    }

    fn require_compiled(&self, op: &str) -> BenchResult<&S::Compiled> {
        self.compiled.as_ref().ok_or_else(|| self.invalid(op))
    }

    fn compiled_with_artifacts(&self, op: &str) -> BenchResult<(&S::Compiled, &S::Artifacts)> {
        match (self.compiled.as_ref(), self.artifacts.as_ref()) {
            (Some(compiled), Some(artifacts)) => Ok((compiled, artifacts)),
            _ => Err(self.invalid(op)),
        }
    }

    fn invalid(&self, op: &str) -> BenchError {
        let detail = match (op, self.state()) {
            ("verify", DriverState::Proved) => "no verifying key; dummy setup keys cannot verify",
            ("verify", DriverState::SetupComplete) => "no proof to verify",
            ("prove", _) => "setup has not run",
            _ => "circuit not compiled",
        };
        BenchError::InvalidState(format!("cannot {op} in state {:?}: {detail}", self.state()))
    }
}
