use crate::{validator_set::POWER_BYTES, Validator};
use ark_bls12_377::{
    constraints::{FqVar, G1Var},
    g1::Parameters as G1Parameters,
    Fq,
};
use ark_ec::SWModelParameters;
use ark_r1cs_std::{prelude::*, uint8::UInt8};
use ark_relations::r1cs::{ConstraintSystemRef, Namespace, SynthesisError};
use std::borrow::Borrow;
use tmlc_gadgets::{utils::bits_le_to_bytes_le, LimbDecomposer, MerkleRootGadget};
use tracing::{debug, span, Level};

/// Bit width of a voting power
pub const POWER_BITS: usize = POWER_BYTES * 8;

/// An allocated validator. The same variables feed the root recomputation and the
/// quorum check, which ties every bitmap entry to a committed key.
#[derive(Clone, Debug)]
pub struct ValidatorVar {
    /// Affine `x` of the public key
    pub x: FqVar,
    /// Affine `y` of the public key
    pub y: FqVar,
    /// The key as a projective point with `z = 1`
    pub public_key: G1Var,
    pub voting_power: FqVar,
    /// Little-endian bits of the voting power
    pub power_bits: Vec<Boolean<Fq>>,
}

impl AllocVar<Validator, Fq> for ValidatorVar {
    /// Allocates the affine coordinates of the key, enforces that they lie on the curve, and
    /// range checks the voting power. The identity cannot be allocated.
    fn new_variable<T: Borrow<Validator>>(
        cs: impl Into<Namespace<Fq>>,
        f: impl FnOnce() -> Result<T, SynthesisError>,
        mode: AllocationMode,
    ) -> Result<Self, SynthesisError> {
        let ns = cs.into();
        let cs = ns.cs();
        let value = f().map(|v| *v.borrow());
        let affine = value.map(|v| v.public_key.to_affine());

        let x = FqVar::new_variable(cs.clone(), || affine.map(|p| p.x), mode)?;
        let y = FqVar::new_variable(cs.clone(), || affine.map(|p| p.y), mode)?;
        // y^2 = x^3 + b
        let rhs = x.square()? * &x + G1Parameters::COEFF_B;
        y.square()?.enforce_equal(&rhs)?;
        let public_key = G1Var::new(x.clone(), y.clone(), FqVar::one());

        let voting_power = FqVar::new_variable(
            cs,
            || value.map(|v| Fq::from(v.voting_power)),
            mode,
        )?;
        let limbs = LimbDecomposer::decompose(&voting_power, POWER_BITS, POWER_BITS)?;
        let power_bits = limbs.into_iter().flat_map(|limb| limb.bits).collect();

        Ok(Self {
            x,
            y,
            public_key,
            voting_power,
            power_bits,
        })
    }
}

impl ValidatorVar {
    /// Allocates one witness per slot, all unassigned when no validators are given
    pub fn new_witness_vec(
        cs: ConstraintSystemRef<Fq>,
        validators: Option<&[Validator]>,
        num_validators: usize,
    ) -> Result<Vec<Self>, SynthesisError> {
        (0..num_validators)
            .map(|i| {
                Self::new_witness(cs.clone(), || {
                    validators
                        .and_then(|v| v.get(i).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect()
    }

    /// The leaf preimage, matching `Validator::encode_leaf`
    pub fn to_leaf_bytes(&self) -> Result<Vec<UInt8<Fq>>, SynthesisError> {
        let mut bytes = self.x.to_bytes()?;
        bytes.extend(self.y.to_bytes()?);
        bytes.extend(bits_le_to_bytes_le(&self.power_bits));
        Ok(bytes)
    }
}

/// Recomputes the validator set commitment
pub struct ValidatorSetVerifier;

impl ValidatorSetVerifier {
    /// Enforces that the ordered validators commit to `root`
    ///
    /// # Panics
    /// If no validators are given
    #[tracing::instrument(target = "r1cs", skip(root, validators))]
    pub fn verify_root(root: &FqVar, validators: &[ValidatorVar]) -> Result<(), SynthesisError> {
        let span = span!(Level::TRACE, "verify_root");
        let _enter = span.enter();
        debug!(validators = validators.len(), "recomputing validator set root");

        let cs = validators.iter().fold(root.cs(), |cs, v| cs.or(v.x.cs()));
        let gadget = MerkleRootGadget::new(cs)?;
        let leaves = validators
            .iter()
            .map(ValidatorVar::to_leaf_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        gadget.root(&leaves)?.enforce_equal(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidatorSet;
    use ark_relations::r1cs::ConstraintSystem;
    use tmlc_crypto::test_helpers::keygen_mul;

    fn validators(powers: &[u64]) -> Vec<Validator> {
        let (_, pubkeys) = keygen_mul(powers.len());
        pubkeys
            .into_iter()
            .zip(powers)
            .map(|(pk, power)| Validator::new(pk, *power))
            .collect()
    }

    #[test]
    fn leaf_bytes_match_native_encoding() {
        let validator = validators(&[u64::MAX - 5])[0];
        let cs = ConstraintSystem::<Fq>::new_ref();
        let var = ValidatorVar::new_witness(cs.clone(), || Ok(validator)).unwrap();
        assert_eq!(
            var.to_leaf_bytes().unwrap().value().unwrap(),
            validator.encode_leaf().unwrap()
        );
        assert_eq!(var.power_bits.len(), POWER_BITS);
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn root_must_match() {
        let validators = validators(&[1, 2, 3]);
        let root = ValidatorSet::new(validators.clone()).root().unwrap();

        let check = |validators: &[Validator], root: Fq| {
            let cs = ConstraintSystem::<Fq>::new_ref();
            let root = FqVar::new_input(cs.clone(), || Ok(root)).unwrap();
            let vars =
                ValidatorVar::new_witness_vec(cs.clone(), Some(validators), validators.len())
                    .unwrap();
            ValidatorSetVerifier::verify_root(&root, &vars).unwrap();
            cs.is_satisfied().unwrap()
        };

        assert!(check(&validators, root));
        assert!(!check(&validators, root + Fq::from(1u64)));

        let mut reordered = validators.clone();
        reordered.swap(1, 2);
        assert!(!check(&reordered, root));

        let mut repowered = validators;
        repowered[0].voting_power += 1;
        assert!(!check(&repowered, root));
    }

    #[test]
    fn missing_validators_are_unassigned() {
        let cs = ConstraintSystem::<Fq>::new_ref();
        let present = validators(&[1]);
        assert!(ValidatorVar::new_witness_vec(cs, Some(&present), 2).is_err());
    }
}
