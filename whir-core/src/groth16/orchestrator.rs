//! End-to-end driver: config, proof material and R1CS in, a checked Groth16
//! proof of the WHIR verifier out.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    sync::Arc,
};

use ark_ec::pairing::Pairing;
use ark_ff::PrimeField;
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystem, OptimizationGoal, SynthesisError, SynthesisMode,
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use common::{config::Config, proof::ProofMaterial, r1cs::InternedR1cs};
use serde::Serialize;

use super::WhirVerifierCircuit;
use crate::{
    protocol::{schedule::parse_statement, verify_native, ProtocolSchedule},
    r1cs::R1cs,
    utils::errors::WhirCircuitError,
};

/// Groth16 key pair for one circuit shape.
pub struct KeyPair<E: Pairing> {
    pub pk: ProvingKey<E>,
    pub vk: VerifyingKey<E>,
}

impl<E: Pairing> KeyPair<E> {
    /// Circuit-specific setup with local randomness. Whoever ran it can forge
    /// proofs, so it is only fit for testing.
    #[tracing::instrument(skip_all, name = "KeyPair::setup_insecure")]
    pub fn setup_insecure<C, R>(circuit: C, rng: &mut R) -> Result<Self, WhirCircuitError>
    where
        C: ConstraintSynthesizer<E::ScalarField>,
        R: RngCore + CryptoRng,
    {
        tracing::warn!("generating Groth16 keys locally; they are insecure for production use");
        let (pk, vk) = Groth16::<E>::circuit_specific_setup(circuit, rng)?;
        Ok(Self { pk, vk })
    }

    pub fn read(pk_path: &Path, vk_path: &Path) -> Result<Self, WhirCircuitError> {
        let pk = ProvingKey::<E>::deserialize_compressed(BufReader::new(File::open(pk_path)?))?;
        let vk = VerifyingKey::<E>::deserialize_compressed(BufReader::new(File::open(vk_path)?))?;
        Ok(Self { pk, vk })
    }

    pub fn write(&self, pk_path: &Path, vk_path: &Path) -> Result<(), WhirCircuitError> {
        let mut pk_writer = BufWriter::new(File::create(pk_path)?);
        self.pk.serialize_compressed(&mut pk_writer)?;
        pk_writer.flush()?;
        let mut vk_writer = BufWriter::new(File::create(vk_path)?);
        self.vk.serialize_compressed(&mut vk_writer)?;
        vk_writer.flush()?;
        Ok(())
    }

    #[tracing::instrument(skip_all, name = "KeyPair::prove")]
    pub fn prove<C, R>(&self, circuit: C, rng: &mut R) -> Result<Proof<E>, WhirCircuitError>
    where
        C: ConstraintSynthesizer<E::ScalarField>,
        R: RngCore + CryptoRng,
    {
        Ok(Groth16::<E>::prove(&self.pk, circuit, rng)?)
    }

    pub fn verify(&self, public_inputs: &[E::ScalarField], proof: &Proof<E>) -> Result<bool, WhirCircuitError> {
        Ok(Groth16::<E>::verify(&self.vk, public_inputs, proof)?)
    }
}

/// The A, B, C matrices of a synthesized circuit, each row a list of
/// `(coefficient, variable)` pairs.
#[derive(CanonicalSerialize)]
pub struct CompiledCircuit<F: PrimeField> {
    pub num_instance_variables: usize,
    pub num_witness_variables: usize,
    pub num_constraints: usize,
    pub a: Vec<Vec<(F, usize)>>,
    pub b: Vec<Vec<(F, usize)>>,
    pub c: Vec<Vec<(F, usize)>>,
}

impl<F: PrimeField> CompiledCircuit<F> {
    /// Synthesizes `circuit` in setup mode and extracts its matrices.
    #[tracing::instrument(skip_all, name = "CompiledCircuit::compile")]
    pub fn compile<C: ConstraintSynthesizer<F>>(circuit: C) -> Result<Self, WhirCircuitError> {
        let cs = ConstraintSystem::<F>::new_ref();
        cs.set_optimization_goal(OptimizationGoal::Constraints);
        cs.set_mode(SynthesisMode::Setup);
        circuit.generate_constraints(cs.clone())?;
        cs.finalize();
        let matrices = cs.to_matrices().ok_or(SynthesisError::MissingCS)?;
        Ok(Self {
            num_instance_variables: matrices.num_instance_variables,
            num_witness_variables: matrices.num_witness_variables,
            num_constraints: matrices.num_constraints,
            a: matrices.a,
            b: matrices.b,
            c: matrices.c,
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), WhirCircuitError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.serialize_compressed(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

pub struct VerifyOptions<'a, E: Pairing> {
    /// Keys from a previous setup; generated insecurely when absent.
    pub keys: Option<&'a KeyPair<E>>,
    /// Where to write the compiled constraint matrices.
    pub ccs_path: Option<&'a Path>,
    /// Stop after the native check.
    pub native_only: bool,
}

impl<E: Pairing> Default for VerifyOptions<'_, E> {
    fn default() -> Self {
        Self {
            keys: None,
            ccs_path: None,
            native_only: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Rejection reason of the native verifier, if any.
    pub native_error: Option<String>,
    /// `None` when no Groth16 proof was attempted.
    pub groth16_verified: Option<bool>,
    pub num_constraints: Option<usize>,
    pub num_public_inputs: usize,
    pub keys_generated: bool,
}

impl VerificationReport {
    pub fn accepted(&self) -> bool {
        self.native_error.is_none() && self.groth16_verified != Some(false)
    }
}

/// Typed schedule and R1CS for a config, shared by every circuit built from it.
pub fn load_instance<F: PrimeField>(
    config: &Config,
    r1cs: &InternedR1cs,
) -> Result<(Arc<ProtocolSchedule<F>>, Arc<R1cs<F>>), WhirCircuitError> {
    let schedule = ProtocolSchedule::<F>::from_config(config)?;
    let r1cs = R1cs::<F>::from_interned(r1cs)?;
    schedule.check_r1cs(&r1cs)?;
    Ok((Arc::new(schedule), Arc::new(r1cs)))
}

/// Generates keys for the circuit shape of `config`.
pub fn setup_keys<E: Pairing, R: RngCore + CryptoRng>(
    config: &Config,
    r1cs: &InternedR1cs,
    rng: &mut R,
) -> Result<KeyPair<E>, WhirCircuitError> {
    let (schedule, r1cs) = load_instance::<E::ScalarField>(config, r1cs)?;
    KeyPair::setup_insecure(WhirVerifierCircuit::placeholder(schedule, r1cs), rng)
}

/// Verifies a WHIR proof natively, then proves and verifies the verifier
/// circuit with Groth16.
#[tracing::instrument(skip_all, name = "verify_circuit")]
pub fn verify_circuit<E: Pairing, R: RngCore + CryptoRng>(
    config: &Config,
    material: &ProofMaterial,
    r1cs: &InternedR1cs,
    options: VerifyOptions<'_, E>,
    rng: &mut R,
) -> Result<VerificationReport, WhirCircuitError> {
    let (schedule, r1cs) = load_instance::<E::ScalarField>(config, r1cs)?;
    let circuit = WhirVerifierCircuit::from_material(schedule.clone(), r1cs.clone(), config, material)?;
    let mut report = VerificationReport {
        num_public_inputs: circuit.public_inputs().len(),
        ..Default::default()
    };

    let statement = parse_statement::<E::ScalarField>(config)?;
    if let Err(err) = verify_native(&schedule, &r1cs, &config.transcript, &statement, &circuit.openings) {
        tracing::info!(%err, "native verifier rejected the proof");
        report.native_error = Some(err.to_string());
        return Ok(report);
    }
    tracing::info!("native verifier accepted the proof");
    if options.native_only {
        return Ok(report);
    }

    // `from_material` already rejected any shape the keys would not fit
    let placeholder = WhirVerifierCircuit::placeholder(schedule, r1cs);
    debug_assert_eq!(placeholder.shape(), circuit.shape());
    if let Some(path) = options.ccs_path {
        let compiled = CompiledCircuit::compile(placeholder.clone())?;
        tracing::info!(num_constraints = compiled.num_constraints, "compiled verifier circuit");
        report.num_constraints = Some(compiled.num_constraints);
        if let Err(err) = compiled.write(path) {
            tracing::warn!(%err, path = %path.display(), "failed to write constraint matrices");
        }
    }

    let generated;
    let keys = match options.keys {
        Some(keys) => keys,
        None => {
            report.keys_generated = true;
            generated = KeyPair::<E>::setup_insecure(placeholder, rng)?;
            &generated
        }
    };
    let public_inputs = circuit.public_inputs();
    let proof = keys.prove(circuit, rng)?;
    let verified = keys.verify(&public_inputs, &proof)?;
    tracing::info!(verified, "Groth16 verification finished");
    report.groth16_verified = Some(verified);
    Ok(report)
}
