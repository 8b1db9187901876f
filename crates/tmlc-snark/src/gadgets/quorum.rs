use super::validators::{ValidatorVar, POWER_BITS};
use crate::QuorumFraction;
use ark_bls12_377::{
    constraints::{G1Var, G2Var},
    Fq,
};
use ark_r1cs_std::{boolean::Boolean, fields::fp::FpVar};
use ark_relations::r1cs::SynthesisError;
use std::marker::PhantomData;
use tmlc_gadgets::{AggregateSignatureGadget, VotingPower};
use tracing::{debug, span, Level};

/// Checks the aggregate signature of the participating validators and their share of the
/// voting power. Written against [`AggregateSignatureGadget`] so that the signature scheme can
/// be replaced without touching the quorum logic.
pub struct QuorumSignatureVerifier<S> {
    scheme: PhantomData<S>,
}

impl<S> QuorumSignatureVerifier<S>
where
    S: AggregateSignatureGadget<Fq, PublicKeyVar = G1Var, MessageVar = G2Var, SignatureVar = G2Var>,
{
    /// Enforces that the validators marked in `signed_bitmap` produced `signature` over
    /// `message_point` and hold at least `quorum` of the total power
    ///
    /// # Panics
    /// If the bitmap is not aligned with the validators
    #[tracing::instrument(target = "r1cs", skip(message_point, validators, signed_bitmap, signature))]
    pub fn verify_quorum(
        message_point: &G2Var,
        validators: &[ValidatorVar],
        signed_bitmap: &[Boolean<Fq>],
        signature: &G2Var,
        quorum: QuorumFraction,
    ) -> Result<(), SynthesisError> {
        let span = span!(Level::TRACE, "verify_quorum");
        let _enter = span.enter();
        assert_eq!(
            validators.len(),
            signed_bitmap.len(),
            "bitmap is not aligned with the validator set"
        );

        debug!("verifying aggregate signature");
        let keys = validators
            .iter()
            .map(|v| v.public_key.clone())
            .collect::<Vec<_>>();
        S::verify(&keys, signed_bitmap, message_point, signature)?;

        debug!(
            numerator = quorum.numerator(),
            denominator = quorum.denominator(),
            "enforcing quorum"
        );
        let powers = validators
            .iter()
            .map(|v| v.voting_power.clone())
            .collect::<Vec<FpVar<Fq>>>();
        signed_bitmap.enforce_quorum(
            &powers,
            quorum.numerator(),
            quorum.denominator(),
            POWER_BITS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gadgets::BlsGadget, Validator};
    use ark_bls12_377::G2Projective;
    use ark_ec::ProjectiveCurve;
    use ark_r1cs_std::prelude::*;
    use ark_relations::r1cs::ConstraintSystem;
    use tmlc_crypto::test_helpers::{keygen_mul, sign_with_bitmap};

    type Verifier = QuorumSignatureVerifier<BlsGadget>;

    fn cs_verify_quorum(powers: &[u64], bitmap: &[bool], signers: &[bool]) -> bool {
        let (secret_keys, public_keys) = keygen_mul(powers.len());
        let message = G2Projective::prime_subgroup_generator().double();
        let signature = sign_with_bitmap(&message, &secret_keys, signers);

        let cs = ConstraintSystem::<Fq>::new_ref();
        let validators = public_keys
            .into_iter()
            .zip(powers)
            .map(|(pk, power)| {
                ValidatorVar::new_witness(cs.clone(), || Ok(Validator::new(pk, *power))).unwrap()
            })
            .collect::<Vec<_>>();
        let bitmap = bitmap
            .iter()
            .map(|b| Boolean::new_witness(cs.clone(), || Ok(*b)).unwrap())
            .collect::<Vec<_>>();
        let message = G2Var::new_witness(cs.clone(), || Ok(message)).unwrap();
        let signature = G2Var::new_witness(cs.clone(), || Ok(*signature.as_ref())).unwrap();

        Verifier::verify_quorum(
            &message,
            &validators,
            &bitmap,
            &signature,
            QuorumFraction::TWO_THIRDS,
        )
        .unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn signature_and_power_are_both_required() {
        // valid signature, enough power
        assert!(cs_verify_quorum(&[1, 1, 1], &[true, true, false], &[true, true, false]));
        // valid signature, not enough power
        assert!(!cs_verify_quorum(&[1, 1, 1], &[true, false, false], &[true, false, false]));
        // enough power, signature from a different subset
        assert!(!cs_verify_quorum(&[1, 1, 1], &[true, true, false], &[true, false, true]));
    }

    #[test]
    fn weighted_boundary() {
        assert!(cs_verify_quorum(&[5, 7, 11, 13], &[false, false, true, true], &[false, false, true, true]));
        assert!(!cs_verify_quorum(&[5, 7, 11, 13], &[true, true, true, false], &[true, true, true, false]));
    }

    #[test]
    #[should_panic]
    fn misaligned_bitmap_panics() {
        cs_verify_quorum(&[1, 1], &[true, true, true], &[true, true]);
    }
}
