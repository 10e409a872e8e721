//! Circuits under test.
//!
//! The harness is circuit-agnostic: a backend accepts any type implementing the
//! circuit contract for its arithmetization. `R1csCircuit` feeds the Groth16
//! backend, `PlonkishCircuit` feeds the PlonK backend.

pub mod expo;

use std::fmt;
use std::str::FromStr;

use ark_ff::PrimeField;
use ark_relations::r1cs::ConstraintSynthesizer;
use halo2_proofs::pasta::Fp;
use halo2_proofs::plonk::Circuit;
use serde::{Deserialize, Serialize};

use crate::BenchError;

pub use expo::{ExpoCircuit, ExpoPlonkish, ExpoR1cs};

/// Witness-carrying circuit instance together with its public inputs.
#[derive(Debug, Clone)]
pub struct Assignment<C, F> {
    pub circuit: C,
    pub public_inputs: Vec<F>,
}

/// Circuit contract for R1CS backends.
pub trait R1csCircuit<F: PrimeField> {
    type Synthesizer: ConstraintSynthesizer<F> + Clone;

    /// Circuit definition without witness values, scaled to `size`.
    fn circuit(&self, size: usize) -> Self::Synthesizer;

    /// Satisfying assignment for the circuit scaled to `size`.
    fn witness(&self, size: usize) -> Assignment<Self::Synthesizer, F>;

    /// Number of witness variables that are circuit inputs rather than
    /// intermediate values.
    fn secret_inputs(&self) -> usize;
}

/// Circuit contract for PLONKish backends over the Pasta curves.
pub trait PlonkishCircuit {
    type Circuit: Circuit<Fp> + Clone;

    fn circuit(&self, size: usize) -> Self::Circuit;

    fn witness(&self, size: usize) -> Assignment<Self::Circuit, Fp>;

    /// Advice cells that are circuit inputs rather than intermediate values.
    fn secret_inputs(&self) -> usize;
}

/// Registry of built-in circuits selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitKind {
    Expo,
}

impl CircuitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitKind::Expo => "expo",
        }
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "expo" => Ok(CircuitKind::Expo),
            other => Err(BenchError::Config(format!(
                "unknown circuit '{other}' (available: expo)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_kind_parse() {
        assert_eq!("expo".parse::<CircuitKind>().unwrap(), CircuitKind::Expo);
        assert!("sha256".parse::<CircuitKind>().unwrap_err().is_config());
    }
}
