use super::{
    quorum::QuorumSignatureVerifier,
    validators::{ValidatorSetVerifier, ValidatorVar},
};
use crate::{CircuitConfig, ConfigError, ValidatorSet};
use ark_bls12_377::{
    constraints::{Fq2Var, FqVar, G2Var, PairingVar},
    Bls12_377, Fq2,
};
use ark_bw6_761::Fr;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use tmlc_crypto::Signature;
use tmlc_gadgets::{BlsVerifyGadget, LimbDecomposer, MapToG2Gadget};
use tracing::{debug, info, span, Level};

/// BLS verification over BLS12-377 inside the BW6-761 scalar field
pub type BlsGadget = BlsVerifyGadget<Bls12_377, Fr, PairingVar>;

/// The private part of a commit proof
#[derive(Clone, Debug)]
pub struct LightClientWitness {
    pub validators: ValidatorSet,
    /// One entry per validator, set for the validators which signed
    pub signed_bitmap: Vec<bool>,
    /// The aggregate of the participating validators' signatures
    pub aggregated_signature: Signature,
}

impl LightClientWitness {
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    pub fn bitmap(&self) -> &[bool] {
        &self.signed_bitmap
    }

    pub fn signature(&self) -> &Signature {
        &self.aggregated_signature
    }
}

/// Proves that a commit over `message` was signed by a quorum of the validator set committed to
/// by `root`.
///
/// The public inputs are `[root, m0, m1]`, see [`LightClientCircuit::public_inputs`].
#[derive(Clone, Debug)]
pub struct LightClientCircuit {
    config: CircuitConfig,
    root: Option<Fr>,
    message: Option<Fq2>,
    witness: Option<LightClientWitness>,
}

impl LightClientCircuit {
    /// Builds a circuit with every value assigned
    pub fn new(
        config: CircuitConfig,
        root: Fr,
        message: Fq2,
        witness: LightClientWitness,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if witness.validators.len() != config.num_validators {
            return Err(ConfigError::ValidatorCount {
                expected: config.num_validators,
                actual: witness.validators.len(),
            });
        }
        if witness.signed_bitmap.len() != config.num_validators {
            return Err(ConfigError::BitmapLength {
                expected: config.num_validators,
                actual: witness.signed_bitmap.len(),
            });
        }
        Ok(Self {
            config,
            root: Some(root),
            message: Some(message),
            witness: Some(witness),
        })
    }

    /// Initializes an empty circuit. This is used when running the trusted setup or counting
    /// constraints.
    pub fn empty(config: CircuitConfig) -> Self {
        Self {
            config,
            root: None,
            message: None,
            witness: None,
        }
    }

    /// Public inputs in allocation order
    pub fn public_inputs(root: Fr, message: &Fq2) -> Vec<Fr> {
        vec![root, message.c0, message.c1]
    }

    /// Decomposes a message coordinate into limbs and returns their recomposition
    fn constrain_coordinate(&self, coordinate: &FqVar) -> Result<FqVar, SynthesisError> {
        let limbs = LimbDecomposer::decompose(
            coordinate,
            self.config.message_bits,
            self.config.limb_bits,
        )?;
        Ok(LimbDecomposer::recompose(&limbs))
    }
}

impl ConstraintSynthesizer<Fr> for LightClientCircuit {
    #[tracing::instrument(target = "r1cs", skip(self, cs))]
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let span = span!(Level::TRACE, "LightClientCircuit");
        let _enter = span.enter();
        info!(
            validators = self.config.num_validators,
            "generating constraints"
        );
        if self.config.validate().is_err() {
            return Err(SynthesisError::Unsatisfiable);
        }

        let root = FqVar::new_input(cs.clone(), || self.root.ok_or(SynthesisError::AssignmentMissing))?;
        let m0 = FqVar::new_input(cs.clone(), || {
            self.message
                .map(|m| m.c0)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let m1 = FqVar::new_input(cs.clone(), || {
            self.message
                .map(|m| m.c1)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        debug!("decomposing message");
        let u = Fq2Var::new(
            self.constrain_coordinate(&m0)?,
            self.constrain_coordinate(&m1)?,
        );

        debug!("mapping message to G2");
        let message_point = MapToG2Gadget::map_to_g2(&u)?;

        let witness = self.witness.as_ref();
        let validators = ValidatorVar::new_witness_vec(
            cs.clone(),
            witness.map(|w| w.validators.validators()),
            self.config.num_validators,
        )?;
        let signed_bitmap = (0..self.config.num_validators)
            .map(|i| {
                Boolean::new_witness(cs.clone(), || {
                    witness
                        .and_then(|w| w.signed_bitmap.get(i).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        // allocating as a witness enforces the prime order subgroup
        let signature = G2Var::new_witness(cs.clone(), || {
            witness
                .map(|w| *w.aggregated_signature.as_ref())
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        debug!("verifying validator set root");
        ValidatorSetVerifier::verify_root(&root, &validators)?;

        debug!("verifying quorum signature");
        QuorumSignatureVerifier::<BlsGadget>::verify_quorum(
            &message_point,
            &validators,
            &signed_bitmap,
            &signature,
            self.config.quorum,
        )?;

        info!("constraints generated");
        Ok(())
    }
}
