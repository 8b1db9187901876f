use ark_bls12_377::Fq;
use ark_ff::ToBytes;
use tmlc_crypto::{merkle::merkle_root, BLSError, PublicKey};

/// Bytes of the little-endian voting power inside a leaf
pub const POWER_BYTES: usize = 8;

/// A validator as committed to by the validator set root
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validator {
    pub public_key: PublicKey,
    pub voting_power: u64,
}

impl Validator {
    pub fn new(public_key: PublicKey, voting_power: u64) -> Self {
        Self {
            public_key,
            voting_power,
        }
    }

    /// Leaf preimage: `x (48 LE bytes) || y (48 LE bytes) || power (8 LE bytes)` of the
    /// affine public key
    pub fn encode_leaf(&self) -> Result<Vec<u8>, BLSError> {
        let affine = self.public_key.to_affine();
        let mut bytes = vec![];
        affine.x.write(&mut bytes)?;
        affine.y.write(&mut bytes)?;
        self.voting_power.write(&mut bytes)?;
        Ok(bytes)
    }
}

/// The ordered validator list of one height
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorSet(Vec<Validator>);

impl From<Vec<Validator>> for ValidatorSet {
    fn from(validators: Vec<Validator>) -> Self {
        Self(validators)
    }
}

impl ValidatorSet {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self(validators)
    }

    pub fn validators(&self) -> &[Validator] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_power(&self) -> u128 {
        self.0.iter().map(|v| v.voting_power as u128).sum()
    }

    /// Power of the validators whose bitmap entry is set
    pub fn participating_power(&self, bitmap: &[bool]) -> u128 {
        self.0
            .iter()
            .zip(bitmap)
            .filter(|(_, signed)| **signed)
            .map(|(v, _)| v.voting_power as u128)
            .sum()
    }

    /// The public keys whose bitmap entry is set
    pub fn signers<'a>(&'a self, bitmap: &'a [bool]) -> impl Iterator<Item = &'a PublicKey> {
        self.0
            .iter()
            .zip(bitmap)
            .filter(|(_, signed)| **signed)
            .map(|(v, _)| &v.public_key)
    }

    /// Merkle root over the encoded validators, in order
    pub fn root(&self) -> Result<Fq, BLSError> {
        let leaves = self
            .0
            .iter()
            .map(Validator::encode_leaf)
            .collect::<Result<Vec<_>, _>>()?;
        merkle_root(&leaves)
    }
}
