//! Native replay of every check the circuit enforces.
//!
//! An unsatisfiable circuit cannot tell which condition failed, so a driver should run
//! [`check_commit`] before proving to get a readable reason.
use crate::{CircuitConfig, ConfigError, LightClientWitness};
use ark_bls12_377::{Fq, Fq2};
use ark_ff::{BigInteger, PrimeField};
use log::{debug, warn};
use thiserror::Error;
use tmlc_crypto::{hash_to_curve::svdw::SVDW_G2, BLSError, PublicKey};

#[derive(Debug, Error)]
/// The first condition which would make the circuit unsatisfiable
pub enum CommitError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("the validator set is empty")]
    EmptyValidatorSet,
    #[error("bitmap has {actual} entries for {expected} validators")]
    BitmapLength { expected: usize, actual: usize },
    #[error("message coordinate {index} does not fit in {bits} bits")]
    MalformedMessage { index: usize, bits: usize },
    #[error("validator {0} has the identity as its public key")]
    IdentityKey(usize),
    #[error("validator set does not match the expected root")]
    RootMismatch,
    #[error("participating power {participating} is below the required {required}")]
    QuorumNotMet { participating: u128, required: u128 },
    #[error("aggregate signature is invalid")]
    InvalidSignature,
    #[error("crypto error: {0}")]
    Crypto(#[from] BLSError),
}

/// Checks natively that a proof for `(root, message)` can be built from `witness`
pub fn check_commit(
    config: &CircuitConfig,
    root: &Fq,
    message: &Fq2,
    witness: &LightClientWitness,
) -> Result<(), CommitError> {
    config.validate()?;
    let validators = witness.validators();
    if validators.is_empty() {
        return Err(CommitError::EmptyValidatorSet);
    }
    if validators.len() != config.num_validators {
        return Err(ConfigError::ValidatorCount {
            expected: config.num_validators,
            actual: validators.len(),
        }
        .into());
    }
    if witness.bitmap().len() != validators.len() {
        return Err(CommitError::BitmapLength {
            expected: validators.len(),
            actual: witness.bitmap().len(),
        });
    }

    for (index, coordinate) in [message.c0, message.c1].iter().enumerate() {
        if coordinate.into_repr().num_bits() as usize > config.message_bits {
            return Err(CommitError::MalformedMessage {
                index,
                bits: config.message_bits,
            });
        }
    }

    if let Some(index) = validators
        .validators()
        .iter()
        .position(|v| v.public_key.is_identity())
    {
        return Err(CommitError::IdentityKey(index));
    }

    if validators.root()? != *root {
        return Err(CommitError::RootMismatch);
    }

    let participating = validators.participating_power(witness.bitmap());
    let total = validators.total_power();
    debug!("participating power {} of {}", participating, total);
    if !config.quorum.is_met(participating, total) {
        return Err(CommitError::QuorumNotMet {
            participating,
            required: config.quorum.threshold(total).max(1),
        });
    }

    let signature = witness.signature();
    if !signature
        .to_affine()
        .is_in_correct_subgroup_assuming_on_curve()
    {
        return Err(CommitError::InvalidSignature);
    }
    let message_point = SVDW_G2.map_to_g2(message)?;
    let aggregated = PublicKey::aggregate(validators.signers(witness.bitmap()));
    match aggregated.verify_hashed(&message_point, signature) {
        Ok(()) => Ok(()),
        Err(BLSError::VerificationFailed) => {
            warn!("aggregate signature does not verify");
            Err(CommitError::InvalidSignature)
        }
        Err(e) => Err(e.into()),
    }
}
