use crate::{PrivateKey, PublicKey, Signature};

use ark_bls12_377::G2Projective;

// Same RNG for all tests
pub fn rng() -> rand::rngs::ThreadRng {
    rand::thread_rng()
}

/// generate a keypair
pub fn keygen() -> (PrivateKey, PublicKey) {
    let secret_key = PrivateKey::generate(&mut rng());
    let public_key = secret_key.to_public();
    (secret_key, public_key)
}

/// generate N keypairs
pub fn keygen_mul(num: usize) -> (Vec<PrivateKey>, Vec<PublicKey>) {
    (0..num).map(|_| keygen()).unzip()
}

/// signs a message with a vector of secret keys and returns the list of sigs + the agg sig
pub fn sign(message_point: &G2Projective, secret_keys: &[PrivateKey]) -> (Vec<Signature>, Signature) {
    let sigs = secret_keys
        .iter()
        .map(|key| key.sign_hashed(message_point))
        .collect::<Vec<_>>();
    let asig = Signature::aggregate(&sigs);
    (sigs, asig)
}

/// Signs with the keys whose bitmap entry is set
pub fn sign_with_bitmap(
    message_point: &G2Projective,
    secret_keys: &[PrivateKey],
    bitmap: &[bool],
) -> Signature {
    let signers = secret_keys
        .iter()
        .zip(bitmap)
        .filter(|(_, signed)| **signed)
        .map(|(sk, _)| sk.clone())
        .collect::<Vec<_>>();
    sign(message_point, &signers).1
}
