use crate::{BLSError, BlsResult, HashToCurve, PrivateKey, Signature, SIG_DOMAIN};

use ark_bls12_377::{Bls12_377, Fq12, G1Affine, G1Projective, G2Projective};
use ark_ec::{AffineCurve, PairingEngine, ProjectiveCurve};
use ark_ff::{One, Zero};
use log::trace;
use std::{borrow::Borrow, ops::Neg};

/// A BLS public key on G1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(G1Projective);

impl From<G1Projective> for PublicKey {
    fn from(pk: G1Projective) -> PublicKey {
        PublicKey(pk)
    }
}

impl From<&PrivateKey> for PublicKey {
    fn from(sk: &PrivateKey) -> PublicKey {
        sk.to_public()
    }
}

impl AsRef<G1Projective> for PublicKey {
    fn as_ref(&self) -> &G1Projective {
        &self.0
    }
}

impl PublicKey {
    /// Sums the provided keys. An empty iterator gives the identity.
    pub fn aggregate<P: Borrow<PublicKey>>(public_keys: impl IntoIterator<Item = P>) -> PublicKey {
        public_keys
            .into_iter()
            .fold(G1Projective::zero(), |acc, pk| acc + pk.borrow().as_ref())
            .into()
    }

    /// Affine form of the key, which is what gets committed to
    pub fn to_affine(&self) -> G1Affine {
        self.0.into_affine()
    }

    /// Returns true if this is the point at infinity
    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    /// Hashes the message to G2 under the signing domain and verifies the signature against it
    pub fn verify<H: HashToCurve<Output = G2Projective>>(
        &self,
        message: &[u8],
        extra_data: &[u8],
        signature: &Signature,
        hash_to_g2: &H,
    ) -> BlsResult<()> {
        let message_point = hash_to_g2.hash(SIG_DOMAIN, message, extra_data)?;
        self.verify_hashed(&message_point, signature)
    }

    /// Verifies the signature against a message already mapped to G2:
    /// e(-g1, σ) * e(pk, H(m)) == 1
    pub fn verify_hashed(&self, message_point: &G2Projective, signature: &Signature) -> BlsResult<()> {
        trace!("verifying BLS signature");
        let pairing = Bls12_377::product_of_pairings(&[
            (
                G1Affine::prime_subgroup_generator().neg().into(),
                signature.as_ref().into_affine().into(),
            ),
            (self.0.into_affine().into(), message_point.into_affine().into()),
        ]);
        if pairing == Fq12::one() {
            Ok(())
        } else {
            Err(BLSError::VerificationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_to_curve::DIRECT_HASH_TO_G2;
    use rand::thread_rng;

    #[test]
    fn aggregate_matches_sum_of_keys() {
        let rng = &mut thread_rng();
        let keys = (0..4)
            .map(|_| PrivateKey::generate(rng).to_public())
            .collect::<Vec<_>>();
        let expected = keys.iter().fold(G1Projective::zero(), |acc, pk| acc + pk.as_ref());
        assert_eq!(PublicKey::aggregate(&keys).as_ref(), &expected);

        let mut reversed = keys.clone();
        reversed.reverse();
        assert_eq!(PublicKey::aggregate(&reversed), PublicKey::aggregate(&keys));
        assert!(PublicKey::aggregate(Vec::<PublicKey>::new()).is_identity());
    }

    #[test]
    fn signature_verifies_against_its_message_only() {
        let rng = &mut thread_rng();
        let hasher = &*DIRECT_HASH_TO_G2;
        let sk = PrivateKey::generate(rng);
        let pk = sk.to_public();
        let sig = sk.sign(b"block 42", &[], hasher).unwrap();

        pk.verify(b"block 42", &[], &sig, hasher).unwrap();
        assert!(matches!(
            pk.verify(b"block 43", &[], &sig, hasher),
            Err(BLSError::VerificationFailed)
        ));
        let other = PrivateKey::generate(rng).to_public();
        assert!(other.verify(b"block 42", &[], &sig, hasher).is_err());
    }
}
