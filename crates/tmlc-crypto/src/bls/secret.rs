use crate::{BlsResult, HashToCurve, PublicKey, Signature, SIG_DOMAIN};

use ark_bls12_377::{Fr, G1Projective, G2Projective};
use ark_ec::ProjectiveCurve;
use ark_ff::{PrimeField, UniformRand};
use ark_std::rand::Rng;

/// A BLS private key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKey(Fr);

impl From<Fr> for PrivateKey {
    fn from(sk: Fr) -> PrivateKey {
        PrivateKey(sk)
    }
}

impl AsRef<Fr> for PrivateKey {
    fn as_ref(&self) -> &Fr {
        &self.0
    }
}

impl PrivateKey {
    /// Generates a private key from the provided RNG
    pub fn generate<R: Rng>(rng: &mut R) -> PrivateKey {
        PrivateKey(Fr::rand(rng))
    }

    /// Hashes the message and extra data to G2 under the signing domain and
    /// multiplies the result by the secret scalar
    pub fn sign<H: HashToCurve<Output = G2Projective>>(
        &self,
        message: &[u8],
        extra_data: &[u8],
        hash_to_g2: &H,
    ) -> BlsResult<Signature> {
        let message_point = hash_to_g2.hash(SIG_DOMAIN, message, extra_data)?;
        Ok(self.sign_hashed(&message_point))
    }

    /// Signs a message that has already been mapped to G2
    pub fn sign_hashed(&self, message_point: &G2Projective) -> Signature {
        message_point.mul(self.0.into_repr()).into()
    }

    /// Returns the public key on G1 matching this private key
    pub fn to_public(&self) -> PublicKey {
        PublicKey::from(G1Projective::prime_subgroup_generator().mul(self.0.into_repr()))
    }
}
