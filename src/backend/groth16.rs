//! Groth16 backend built on arkworks.

use std::marker::PhantomData;

use ark_ec::AffineRepr;
use ark_ec::pairing::Pairing;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_poly::{EvaluationDomain, GeneralEvaluationDomain};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystem, OptimizationGoal, SynthesisMode,
};
use ark_serialize::CanonicalSerialize;
use ark_snark::SNARK;
use tracing::debug;

use super::traits::{ConstraintSystemStats, ProofSystem};
use crate::circuit::{Assignment, R1csCircuit};
use crate::core::{Curve, Phase};
use crate::{BenchError, BenchResult};

/// Circuit definition together with the shape of its compiled R1CS.
#[derive(Debug, Clone)]
pub struct CompiledR1cs<S> {
    pub definition: S,
    pub stats: ConstraintSystemStats,
    /// Includes the constant-one variable
    pub num_instance_variables: usize,
    pub num_witness_variables: usize,
    pub num_constraints: usize,
}

/// Groth16 over pairing engine `E`, benchmarking circuit `C`.
pub struct Groth16System<E: Pairing, C> {
    circuit: C,
    curve: Curve,
    _engine: PhantomData<E>,
}

impl<E: Pairing, C> Groth16System<E, C> {
    /// `curve` names the engine in reports; it must match `E`.
    pub fn new(circuit: C, curve: Curve) -> Self {
        Groth16System { circuit, curve, _engine: PhantomData }
    }
}

impl<E, C> ProofSystem for Groth16System<E, C>
where
    E: Pairing,
    C: R1csCircuit<E::ScalarField>,
{
    type Compiled = CompiledR1cs<C::Synthesizer>;
    type Artifacts = ();
    type ProvingKey = ProvingKey<E>;
    type VerifyingKey = PreparedVerifyingKey<E>;
    type Witness = Assignment<C::Synthesizer, E::ScalarField>;
    type PublicWitness = Vec<E::ScalarField>;
    type Proof = Proof<E>;

    fn name(&self) -> &str {
        "groth16"
    }

    fn curve(&self) -> Curve {
        self.curve
    }

    fn compile(&self, size: usize) -> BenchResult<Self::Compiled> {
        let definition = self.circuit.circuit(size);

        let cs = ConstraintSystem::<E::ScalarField>::new_ref();
        cs.set_optimization_goal(OptimizationGoal::Constraints);
        cs.set_mode(SynthesisMode::Setup);
        definition
            .clone()
            .generate_constraints(cs.clone())
            .map_err(|e| BenchError::backend(Phase::Compile, e))?;
        cs.finalize();

        let matrices = cs
            .to_matrices()
            .ok_or_else(|| BenchError::backend(Phase::Compile, "constraint matrices unavailable"))?;
        let num_instance_variables = cs.num_instance_variables();
        let num_witness_variables = cs.num_witness_variables();
        let num_constraints = cs.num_constraints();
        let secret = self.circuit.secret_inputs().min(num_witness_variables);

        let stats = ConstraintSystemStats {
            constraints: num_constraints as u64,
            internal_variables: (num_witness_variables - secret) as u64,
            secret_variables: secret as u64,
            public_variables: num_instance_variables as u64,
            coefficients: (matrices.a_num_non_zero
                + matrices.b_num_non_zero
                + matrices.c_num_non_zero) as u64,
        };

        Ok(CompiledR1cs {
            definition,
            stats,
            num_instance_variables,
            num_witness_variables,
            num_constraints,
        })
    }

    fn stats(&self, compiled: &Self::Compiled) -> ConstraintSystemStats {
        compiled.stats
    }

    fn derive_artifacts(&self, _compiled: &Self::Compiled) -> BenchResult<()> {
        Ok(())
    }

    fn setup(
        &self,
        compiled: &Self::Compiled,
        _artifacts: &(),
    ) -> BenchResult<(ProvingKey<E>, PreparedVerifyingKey<E>)> {
        let mut rng = rand::thread_rng();
        let (pk, vk) = Groth16::<E>::circuit_specific_setup(compiled.definition.clone(), &mut rng)
            .map_err(|e| BenchError::backend(Phase::Setup, e))?;
        let pvk = Groth16::<E>::process_vk(&vk).map_err(|e| BenchError::backend(Phase::Setup, e))?;
        Ok((pk, pvk))
    }

    /// Proving key with the right dimensions, filled with group generators.
    ///
    /// Proving cost depends only on the key's dimensions, so this measures
    /// prove time without paying for the trusted setup. Proofs made with it
    /// never verify.
    fn dummy_setup(
        &self,
        compiled: &Self::Compiled,
        _artifacts: &(),
    ) -> BenchResult<Option<ProvingKey<E>>> {
        let g1 = E::G1Affine::generator();
        let g2 = E::G2Affine::generator();
        let domain = GeneralEvaluationDomain::<E::ScalarField>::new(
            compiled.num_constraints + compiled.num_instance_variables,
        )
        .ok_or_else(|| BenchError::backend(Phase::Setup, "circuit too large for field's FFT domain"))?;
        let num_variables = compiled.num_instance_variables + compiled.num_witness_variables;
        debug!(domain = domain.size(), num_variables, "building dummy groth16 proving key");

        let vk = VerifyingKey::<E> {
            alpha_g1: g1,
            beta_g2: g2,
            gamma_g2: g2,
            delta_g2: g2,
            gamma_abc_g1: vec![g1; compiled.num_instance_variables],
        };
        Ok(Some(ProvingKey {
            vk,
            beta_g1: g1,
            delta_g1: g1,
            a_query: vec![g1; num_variables],
            b_g1_query: vec![g1; num_variables],
            b_g2_query: vec![g2; num_variables],
            h_query: vec![g1; domain.size() - 1],
            l_query: vec![g1; compiled.num_witness_variables],
        }))
    }

    fn witness(&self, size: usize) -> BenchResult<Self::Witness> {
        Ok(self.circuit.witness(size))
    }

    fn public_witness(&self, witness: &Self::Witness) -> BenchResult<Vec<E::ScalarField>> {
        Ok(witness.public_inputs.clone())
    }

    fn prove(
        &self,
        _compiled: &Self::Compiled,
        _artifacts: &(),
        pk: &ProvingKey<E>,
        witness: &Self::Witness,
    ) -> BenchResult<Proof<E>> {
        let mut rng = rand::thread_rng();
        Groth16::<E>::prove(pk, witness.circuit.clone(), &mut rng)
            .map_err(|e| BenchError::backend(Phase::Prove, e))
    }

    fn verify(
        &self,
        _artifacts: &(),
        vk: &PreparedVerifyingKey<E>,
        proof: &Proof<E>,
        public: &Vec<E::ScalarField>,
    ) -> BenchResult<()> {
        let valid = Groth16::<E>::verify_with_processed_vk(vk, public, proof)
            .map_err(|e| BenchError::backend(Phase::Verify, e))?;
        if valid {
            Ok(())
        } else {
            Err(BenchError::backend(Phase::Verify, "proof rejected"))
        }
    }

    fn proof_size(&self, proof: &Proof<E>) -> BenchResult<usize> {
        let mut buf = Vec::new();
        proof
            .serialize_compressed(&mut buf)
            .map_err(|e| BenchError::Message(format!("failed to serialize proof: {e}")))?;
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ExpoCircuit;
    use ark_bn254::Bn254;

    fn system() -> Groth16System<Bn254, ExpoCircuit> {
        Groth16System::new(ExpoCircuit, Curve::Bn254)
    }

    #[test]
    fn test_compile_reports_r1cs_shape() {
        let compiled = system().compile(16).unwrap();
        assert_eq!(compiled.stats.constraints, 17);
        assert_eq!(compiled.stats.public_variables, 2);
        assert_eq!(compiled.stats.secret_variables, 1);
        assert_eq!(compiled.stats.internal_variables, 16);
        // a, b and c each hold one term per constraint
        assert_eq!(compiled.stats.coefficients, 3 * 17);
    }

    #[test]
    fn test_setup_prove_verify_roundtrip() {
        let system = system();
        let compiled = system.compile(4).unwrap();
        let (pk, vk) = system.setup(&compiled, &()).unwrap();
        let witness = system.witness(4).unwrap();
        let proof = system.prove(&compiled, &(), &pk, &witness).unwrap();
        let public = system.public_witness(&witness).unwrap();
        system.verify(&(), &vk, &proof, &public).unwrap();
    }

    #[test]
    fn test_verify_rejects_wrong_public_input() {
        let system = system();
        let compiled = system.compile(4).unwrap();
        let (pk, vk) = system.setup(&compiled, &()).unwrap();
        let witness = system.witness(4).unwrap();
        let proof = system.prove(&compiled, &(), &pk, &witness).unwrap();
        let wrong = vec![ark_bn254::Fr::from(7u64)];
        let err = system.verify(&(), &vk, &proof, &wrong).unwrap_err();
        assert!(matches!(err, BenchError::Backend { phase: Phase::Verify, .. }));
    }

    #[test]
    fn test_dummy_setup_key_dimensions() {
        let system = system();
        let compiled = system.compile(8).unwrap();
        let pk = system.dummy_setup(&compiled, &()).unwrap().unwrap();
        let vars = compiled.num_instance_variables + compiled.num_witness_variables;
        assert_eq!(pk.a_query.len(), vars);
        assert_eq!(pk.b_g2_query.len(), vars);
        assert_eq!(pk.l_query.len(), compiled.num_witness_variables);
        assert_eq!(pk.vk.gamma_abc_g1.len(), compiled.num_instance_variables);

        // proving with the dummy key succeeds even though the proof is meaningless
        let witness = system.witness(8).unwrap();
        let proof = system.prove(&compiled, &(), &pk, &witness).unwrap();
        assert!(system.proof_size(&proof).unwrap() > 0);
    }

    #[test]
    fn test_compressed_proof_size_bn254() {
        let system = system();
        let compiled = system.compile(2).unwrap();
        let (pk, _) = system.setup(&compiled, &()).unwrap();
        let witness = system.witness(2).unwrap();
        let proof = system.prove(&compiled, &(), &pk, &witness).unwrap();
        // two compressed G1 points and one compressed G2 point
        assert_eq!(system.proof_size(&proof).unwrap(), 32 + 64 + 32);
    }
}
