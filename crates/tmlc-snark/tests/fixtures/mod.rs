use ark_bls12_377::Fq2;
use tmlc_crypto::{
    hash_to_curve::DIRECT_HASH_TO_G2, test_helpers::keygen_mul, PrivateKey, Signature, SIG_DOMAIN,
};
use tmlc_snark::{CPField, CircuitConfig, LightClientWitness, Validator, ValidatorSet};

/// A signed commit as a light client driver would assemble it
pub struct Commit {
    pub config: CircuitConfig,
    pub root: CPField,
    pub message: Fq2,
    pub witness: LightClientWitness,
    pub secret_keys: Vec<PrivateKey>,
}

/// Generates a validator set with the given powers and signs `block` with the validators
/// whose bitmap entry is set
pub fn generate_commit(powers: &[u64], bitmap: &[bool], block: &[u8]) -> Commit {
    let (secret_keys, public_keys) = keygen_mul(powers.len());
    let validators = ValidatorSet::new(
        public_keys
            .into_iter()
            .zip(powers)
            .map(|(pk, power)| Validator::new(pk, *power))
            .collect(),
    );

    let message = DIRECT_HASH_TO_G2
        .hash_to_field(SIG_DOMAIN, block, &[])
        .unwrap();
    let signatures = secret_keys
        .iter()
        .zip(bitmap)
        .filter(|(_, signed)| **signed)
        .map(|(sk, _)| sk.sign(block, &[], &*DIRECT_HASH_TO_G2).unwrap())
        .collect::<Vec<_>>();

    Commit {
        config: CircuitConfig::new(powers.len()),
        root: validators.root().unwrap(),
        message,
        witness: LightClientWitness {
            validators,
            signed_bitmap: bitmap.to_vec(),
            aggregated_signature: Signature::aggregate(&signatures),
        },
        secret_keys,
    }
}
