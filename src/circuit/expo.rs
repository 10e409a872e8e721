//! Exponentiation circuit: proves knowledge of `x` such that `x^(2^size) == y`.
//!
//! The circuit performs `size` successive squarings, so its constraint count
//! grows linearly with the size parameter.

use ark_ff::PrimeField;
use ark_relations::lc;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError, Variable};
use halo2_proofs::circuit::{Layouter, SimpleFloorPlanner, Value};
use halo2_proofs::pasta::Fp;
use halo2_proofs::plonk::{Advice, Circuit, Column, ConstraintSystem, Error, Instance, Selector};
use halo2_proofs::poly::Rotation;

use super::{Assignment, PlonkishCircuit, R1csCircuit};

/// Base used by the witness generator.
const WITNESS_BASE: u64 = 3;

/// The `expo` circuit family.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpoCircuit;

/// R1CS form of the exponentiation circuit.
#[derive(Debug, Clone)]
pub struct ExpoR1cs<F: PrimeField> {
    pub size: usize,
    pub x: Option<F>,
    pub y: Option<F>,
}

impl<F: PrimeField> ConstraintSynthesizer<F> for ExpoR1cs<F> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        let y = cs.new_input_variable(|| self.y.ok_or(SynthesisError::AssignmentMissing))?;

        let mut value = self.x;
        let mut current =
            cs.new_witness_variable(|| value.ok_or(SynthesisError::AssignmentMissing))?;
        for _ in 0..self.size {
            let squared = value.map(|v| v.square());
            let next =
                cs.new_witness_variable(|| squared.ok_or(SynthesisError::AssignmentMissing))?;
            cs.enforce_constraint(lc!() + current, lc!() + current, lc!() + next)?;
            value = squared;
            current = next;
        }

        cs.enforce_constraint(lc!() + current, lc!() + Variable::One, lc!() + y)
    }
}

impl<F: PrimeField> R1csCircuit<F> for ExpoCircuit {
    type Synthesizer = ExpoR1cs<F>;

    fn circuit(&self, size: usize) -> ExpoR1cs<F> {
        ExpoR1cs { size, x: None, y: None }
    }

    fn witness(&self, size: usize) -> Assignment<ExpoR1cs<F>, F> {
        let x = F::from(WITNESS_BASE);
        let y = (0..size).fold(x, |acc, _| acc.square());
        Assignment {
            circuit: ExpoR1cs { size, x: Some(x), y: Some(y) },
            public_inputs: vec![y],
        }
    }

    fn secret_inputs(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone)]
pub struct ExpoConfig {
    advice: Column<Advice>,
    instance: Column<Instance>,
    square: Selector,
}

/// PLONKish form of the exponentiation circuit: one advice column where each
/// enabled row constrains `next = cur * cur`.
#[derive(Debug, Clone)]
pub struct ExpoPlonkish {
    pub size: usize,
    pub x: Value<Fp>,
}

impl Circuit<Fp> for ExpoPlonkish {
    type Config = ExpoConfig;
    type FloorPlanner = SimpleFloorPlanner;

    fn without_witnesses(&self) -> Self {
        ExpoPlonkish { size: self.size, x: Value::unknown() }
    }

    fn configure(meta: &mut ConstraintSystem<Fp>) -> ExpoConfig {
        let advice = meta.advice_column();
        let instance = meta.instance_column();
        let square = meta.selector();
        meta.enable_equality(advice);
        meta.enable_equality(instance);

        meta.create_gate("square", |meta| {
            let s = meta.query_selector(square);
            let cur = meta.query_advice(advice, Rotation::cur());
            let next = meta.query_advice(advice, Rotation::next());
            vec![s * (next - cur.clone() * cur)]
        });

        ExpoConfig { advice, instance, square }
    }

    fn synthesize(&self, config: ExpoConfig, mut layouter: impl Layouter<Fp>) -> Result<(), Error> {
        let out = layouter.assign_region(
            || "square chain",
            |mut region| {
                let mut value = self.x;
                let mut cell = region.assign_advice(|| "x", config.advice, 0, || value)?;
                for row in 0..self.size {
                    config.square.enable(&mut region, row)?;
                    value = value.map(|v| v * v);
                    cell = region.assign_advice(|| "square", config.advice, row + 1, || value)?;
                }
                Ok(cell)
            },
        )?;

        layouter.constrain_instance(out.cell(), config.instance, 0)
    }
}

impl PlonkishCircuit for ExpoCircuit {
    type Circuit = ExpoPlonkish;

    fn circuit(&self, size: usize) -> ExpoPlonkish {
        ExpoPlonkish { size, x: Value::unknown() }
    }

    fn witness(&self, size: usize) -> Assignment<ExpoPlonkish, Fp> {
        let x = Fp::from(WITNESS_BASE);
        let y = (0..size).fold(x, |acc, _| acc * acc);
        Assignment {
            circuit: ExpoPlonkish { size, x: Value::known(x) },
            public_inputs: vec![y],
        }
    }

    fn secret_inputs(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem as R1cs;
    use halo2_proofs::dev::MockProver;

    #[test]
    fn test_r1cs_witness_satisfies() {
        let assignment = <ExpoCircuit as R1csCircuit<Fr>>::witness(&ExpoCircuit, 8);
        let cs = R1cs::<Fr>::new_ref();
        assignment.circuit.generate_constraints(cs.clone()).unwrap();
        assert!(cs.is_satisfied().unwrap());
        assert_eq!(cs.num_constraints(), 9);
        // constant one + y
        assert_eq!(cs.num_instance_variables(), 2);
        assert_eq!(cs.num_witness_variables(), 9);
    }

    #[test]
    fn test_r1cs_wrong_output_unsatisfied() {
        let cs = R1cs::<Fr>::new_ref();
        let circuit = ExpoR1cs { size: 4, x: Some(Fr::from(3u64)), y: Some(Fr::from(7u64)) };
        circuit.generate_constraints(cs.clone()).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_plonkish_witness_satisfies() {
        let assignment = <ExpoCircuit as PlonkishCircuit>::witness(&ExpoCircuit, 6);
        let prover =
            MockProver::run(5, &assignment.circuit, vec![assignment.public_inputs.clone()])
                .unwrap();
        assert_eq!(prover.verify(), Ok(()));
    }

    #[test]
    fn test_plonkish_wrong_instance_fails() {
        let assignment = <ExpoCircuit as PlonkishCircuit>::witness(&ExpoCircuit, 6);
        let prover = MockProver::run(5, &assignment.circuit, vec![vec![Fp::from(7u64)]]).unwrap();
        assert!(prover.verify().is_err());
    }
}
