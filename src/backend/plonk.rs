//! PlonK backend built on halo2 with an IPA commitment over the Pasta curves.

use std::collections::HashSet;

use halo2_proofs::circuit::Value;
use halo2_proofs::pasta::{EqAffine, Fp};
use halo2_proofs::plonk::{
    Advice, Any, Assigned, Assignment as CellAssignment, Circuit, Column, ConstraintSystem, Error,
    Fixed, FloorPlanner, Instance, ProvingKey, Selector, SingleVerifier, VerifyingKey,
    create_proof, keygen_pk, keygen_vk, verify_proof,
};
use halo2_proofs::poly::commitment::Params;
use halo2_proofs::transcript::{Blake2bRead, Blake2bWrite, Challenge255};
use rand::rngs::OsRng;
use tracing::debug;

use super::traits::{ConstraintSystemStats, ProofSystem};
use crate::circuit::{Assignment, PlonkishCircuit};
use crate::core::{Curve, Phase};
use crate::{BenchError, BenchResult};

/// Smallest domain we ever build.
const MIN_K: u32 = 4;
/// `Params::new` only accepts `k < 32`.
pub const MAX_K: u32 = 31;

#[derive(Debug, Clone)]
pub struct CompiledPlonkish<T> {
    pub definition: T,
    /// log2 of the evaluation domain size
    pub k: u32,
    /// Rows the synthesized layout occupies, before blinding.
    pub rows: usize,
    pub stats: ConstraintSystemStats,
}

pub struct PlonkSystem<C> {
    circuit: C,
}

impl<C> PlonkSystem<C> {
    pub fn new(circuit: C) -> Self {
        PlonkSystem { circuit }
    }
}

/// Smallest `k` whose `2^k` rows hold `rows` layout rows plus the `reserved`
/// rows the constraint system keeps for blinding.
pub fn domain_k(rows: usize, reserved: usize) -> BenchResult<u32> {
    let needed = (rows as u64).saturating_add(reserved as u64);
    let mut k = MIN_K;
    while (1u64 << k) < needed {
        k += 1;
        if k > MAX_K {
            return Err(BenchError::backend(
                Phase::Compile,
                format!("{rows} rows need a domain larger than 2^{MAX_K}"),
            ));
        }
    }
    Ok(k)
}

/// Records the shape of one synthesis pass without evaluating any witness.
///
/// Rows are absolute, as handed out by the circuit's floor planner.
#[derive(Debug, Default)]
struct LayoutCounter {
    rows: usize,
    gates: u64,
    copies: u64,
    advice_cells: u64,
    fixed_cells: u64,
    instance_cells: HashSet<(Column<Any>, usize)>,
}

impl LayoutCounter {
    fn touch(&mut self, row: usize) {
        self.rows = self.rows.max(row + 1);
    }

    fn bind(&mut self, column: Column<Any>, row: usize) {
        if *column.column_type() == Any::Instance {
            self.instance_cells.insert((column, row));
        }
        self.touch(row);
    }

    fn stats(&self, secret_inputs: u64) -> ConstraintSystemStats {
        let public = self.instance_cells.len() as u64;
        ConstraintSystemStats {
            // gate activations plus equality constraints
            constraints: self.gates + self.copies,
            internal_variables: self.advice_cells.saturating_sub(secret_inputs),
            secret_variables: secret_inputs,
            public_variables: public,
            // non-zero cells: assigned values, enabled selectors, bound instances
            coefficients: self.advice_cells + self.fixed_cells + self.gates + public,
        }
    }
}

impl CellAssignment<Fp> for LayoutCounter {
    fn enter_region<NR, N>(&mut self, _: N)
    where
        NR: Into<String>,
        N: FnOnce() -> NR,
    {
    }

    fn exit_region(&mut self) {}

    fn enable_selector<A, AR>(&mut self, _: A, _: &Selector, row: usize) -> Result<(), Error>
    where
        A: FnOnce() -> AR,
        AR: Into<String>,
    {
        self.gates += 1;
        self.touch(row);
        Ok(())
    }

    fn query_instance(&self, _: Column<Instance>, _: usize) -> Result<Value<Fp>, Error> {
        Ok(Value::unknown())
    }

    fn assign_advice<V, VR, A, AR>(
        &mut self,
        _: A,
        _: Column<Advice>,
        row: usize,
        _: V,
    ) -> Result<(), Error>
    where
        V: FnOnce() -> Value<VR>,
        VR: Into<Assigned<Fp>>,
        A: FnOnce() -> AR,
        AR: Into<String>,
    {
        self.advice_cells += 1;
        self.touch(row);
        Ok(())
    }

    fn assign_fixed<V, VR, A, AR>(
        &mut self,
        _: A,
        _: Column<Fixed>,
        row: usize,
        _: V,
    ) -> Result<(), Error>
    where
        V: FnOnce() -> Value<VR>,
        VR: Into<Assigned<Fp>>,
        A: FnOnce() -> AR,
        AR: Into<String>,
    {
        self.fixed_cells += 1;
        self.touch(row);
        Ok(())
    }

    fn copy(
        &mut self,
        left_column: Column<Any>,
        left_row: usize,
        right_column: Column<Any>,
        right_row: usize,
    ) -> Result<(), Error> {
        self.copies += 1;
        self.bind(left_column, left_row);
        self.bind(right_column, right_row);
        Ok(())
    }

    fn fill_from_row(
        &mut self,
        _: Column<Fixed>,
        _: usize,
        _: Value<Assigned<Fp>>,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn push_namespace<NR, N>(&mut self, _: N)
    where
        NR: Into<String>,
        N: FnOnce() -> NR,
    {
    }

    fn pop_namespace(&mut self, _: Option<String>) {}
}

impl<C: PlonkishCircuit> ProofSystem for PlonkSystem<C> {
    type Compiled = CompiledPlonkish<C::Circuit>;
    type Artifacts = Params<EqAffine>;
    type ProvingKey = ProvingKey<EqAffine>;
    type VerifyingKey = VerifyingKey<EqAffine>;
    type Witness = Assignment<C::Circuit, Fp>;
    type PublicWitness = Vec<Fp>;
    type Proof = Vec<u8>;

    fn name(&self) -> &str {
        "plonk"
    }

    fn curve(&self) -> Curve {
        Curve::Pasta
    }

    /// Configures the constraint system and synthesizes the circuit through
    /// its floor planner, counting the layout it produces.
    ///
    /// Circuits that need fixed columns for global constants are rejected:
    /// the layout pass hands the planner no constant columns.
    fn compile(&self, size: usize) -> BenchResult<Self::Compiled> {
        let definition = self.circuit.circuit(size);

        let mut cs = ConstraintSystem::<Fp>::default();
        let config = <C::Circuit as Circuit<Fp>>::configure(&mut cs);

        let mut layout = LayoutCounter::default();
        <<C::Circuit as Circuit<Fp>>::FloorPlanner as FloorPlanner>::synthesize(
            &mut layout,
            &definition,
            config,
            Vec::new(),
        )
        .map_err(|e| BenchError::backend(Phase::Compile, format!("{e:?}")))?;

        let k = domain_k(layout.rows, cs.minimum_rows())?;
        let stats = layout.stats(self.circuit.secret_inputs() as u64);
        debug!(
            k,
            size,
            rows = layout.rows,
            constraints = stats.constraints,
            "synthesized plonkish layout"
        );

        Ok(CompiledPlonkish { definition, k, rows: layout.rows, stats })
    }

    fn stats(&self, compiled: &Self::Compiled) -> ConstraintSystemStats {
        compiled.stats
    }

    /// Public parameters (the IPA reference string) for a `2^k` domain.
    fn derive_artifacts(&self, compiled: &Self::Compiled) -> BenchResult<Params<EqAffine>> {
        Ok(Params::new(compiled.k))
    }

    fn setup(
        &self,
        compiled: &Self::Compiled,
        params: &Params<EqAffine>,
    ) -> BenchResult<(ProvingKey<EqAffine>, VerifyingKey<EqAffine>)> {
        let vk = keygen_vk(params, &compiled.definition)
            .map_err(|e| BenchError::backend(Phase::Setup, format!("{e:?}")))?;
        let pk = keygen_pk(params, vk.clone(), &compiled.definition)
            .map_err(|e| BenchError::backend(Phase::Setup, format!("{e:?}")))?;
        Ok((pk, vk))
    }

    fn witness(&self, size: usize) -> BenchResult<Self::Witness> {
        Ok(self.circuit.witness(size))
    }

    fn public_witness(&self, witness: &Self::Witness) -> BenchResult<Vec<Fp>> {
        Ok(witness.public_inputs.clone())
    }

    fn prove(
        &self,
        _compiled: &Self::Compiled,
        params: &Params<EqAffine>,
        pk: &ProvingKey<EqAffine>,
        witness: &Self::Witness,
    ) -> BenchResult<Vec<u8>> {
        let instances: &[&[Fp]] = &[witness.public_inputs.as_slice()];
        let mut transcript = Blake2bWrite::<_, EqAffine, Challenge255<_>>::init(vec![]);
        create_proof(
            params,
            pk,
            &[witness.circuit.clone()],
            &[instances],
            OsRng,
            &mut transcript,
        )
        .map_err(|e| BenchError::backend(Phase::Prove, format!("{e:?}")))?;
        Ok(transcript.finalize())
    }

    fn verify(
        &self,
        params: &Params<EqAffine>,
        vk: &VerifyingKey<EqAffine>,
        proof: &Vec<u8>,
        public: &Vec<Fp>,
    ) -> BenchResult<()> {
        let instances: &[&[Fp]] = &[public.as_slice()];
        let strategy = SingleVerifier::new(params);
        let mut transcript = Blake2bRead::<_, EqAffine, Challenge255<_>>::init(&proof[..]);
        verify_proof(params, vk, strategy, &[instances], &mut transcript)
            .map_err(|e| BenchError::backend(Phase::Verify, format!("{e:?}")))
    }

    fn proof_size(&self, proof: &Vec<u8>) -> BenchResult<usize> {
        Ok(proof.len())
    }
}
