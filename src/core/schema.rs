//! ResultRecord schema - the single flat record produced by each benchmark run.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::env::HostInfo;
use crate::BenchError;
use crate::backend::ConstraintSystemStats;

/// Proof size sentinel for phases that produce no proof.
pub const NO_PROOF: i64 = -1;

/// Pipeline phase under measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Compile,
    Setup,
    Prove,
    Verify,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Compile, Phase::Setup, Phase::Prove, Phase::Verify];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Compile => "compile",
            Phase::Setup => "setup",
            Phase::Prove => "prove",
            Phase::Verify => "verify",
        }
    }

    /// Whether a run measuring this phase holds a proof afterwards.
    pub fn produces_proof(&self) -> bool {
        matches!(self, Phase::Prove | Phase::Verify)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| {
                BenchError::Config(format!(
                    "unknown algorithm '{s}' (expected compile, setup, prove or verify)"
                ))
            })
    }
}

/// Algebraic curve (and therefore scalar field) a backend runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    Bn254,
    Bls12_381,
    Pasta,
}

impl Curve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::Bn254 => "bn254",
            Curve::Bls12_381 => "bls12_381",
            Curve::Pasta => "pasta",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Curve {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bn254" => Ok(Curve::Bn254),
            "bls12_381" | "bls12-381" => Ok(Curve::Bls12_381),
            "pasta" => Ok(Curve::Pasta),
            other => Err(BenchError::Config(format!(
                "unknown curve '{other}' (expected bn254, bls12_381 or pasta)"
            ))),
        }
    }
}

/// Proof system family selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Groth16,
    Plonk,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Groth16 => "groth16",
            BackendKind::Plonk => "plonk",
        }
    }

    pub fn default_curve(&self) -> Curve {
        match self {
            BackendKind::Groth16 => Curve::Bn254,
            BackendKind::Plonk => Curve::Pasta,
        }
    }

    pub fn supports(&self, curve: Curve) -> bool {
        match self {
            BackendKind::Groth16 => matches!(curve, Curve::Bn254 | Curve::Bls12_381),
            BackendKind::Plonk => curve == Curve::Pasta,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One benchmark outcome. Built once after the timed region and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub backend: String,
    pub curve: Curve,
    pub algorithm: Phase,
    pub constraints: u64,
    pub internal_variables: u64,
    pub secret_variables: u64,
    pub public_variables: u64,
    pub coefficients: u64,
    pub ram_mib: u64,
    /// Average wall-clock time of one iteration
    pub elapsed: Duration,
    pub throughput: u64,
    pub throughput_per_core: u64,
    pub count: u32,
    /// Serialized proof size, or `NO_PROOF` for compile and setup
    pub proof_size_bytes: i64,
    pub host: HostInfo,
    pub amd64_adx: bool,
}

impl ResultRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: impl Into<String>,
        curve: Curve,
        algorithm: Phase,
        stats: ConstraintSystemStats,
        elapsed: Duration,
        count: u32,
        proof_size_bytes: i64,
        ram_mib: u64,
        host: HostInfo,
        amd64_adx: bool,
    ) -> Self {
        let throughput = throughput(stats.constraints, elapsed);
        let throughput_per_core = if host.logical_cores > 0 {
            throughput / host.logical_cores as u64
        } else {
            0
        };
        ResultRecord {
            backend: backend.into(),
            curve,
            algorithm,
            constraints: stats.constraints,
            internal_variables: stats.internal_variables,
            secret_variables: stats.secret_variables,
            public_variables: stats.public_variables,
            coefficients: stats.coefficients,
            ram_mib,
            elapsed,
            throughput,
            throughput_per_core,
            count,
            proof_size_bytes,
            host,
            amd64_adx,
        }
    }

    /// Average iteration time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

/// Constraints per second; zero when the average rounds down to 0 ms.
pub fn throughput(constraints: u64, elapsed: Duration) -> u64 {
    if elapsed.as_millis() == 0 {
        return 0;
    }
    (constraints as f64 / elapsed.as_secs_f64()) as u64
}
