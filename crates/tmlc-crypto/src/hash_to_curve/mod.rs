//! Deterministic hashing of messages onto G2.
//!
//! Hashing happens in two steps. `hash_to_field` compresses the message with a
//! `Hasher` and reads two 256-bit little-endian integers from the output. These
//! form one `Fq2` element, which is also the public message the circuit takes
//! as input. `svdw::SvdwMap` then maps that element onto the curve and clears
//! the cofactor.
//!
//! # Examples
//!
//! ```rust
//! use tmlc_crypto::{SIG_DOMAIN, hash_to_curve::{HashToCurve, DIRECT_HASH_TO_G2}};
//!
//! // Instantiate the lazily evaluated hasher to BLS12-377 G2.
//! let hasher = &*DIRECT_HASH_TO_G2;
//!
//! // The domain must be at most 8 bytes.
//! let point = hasher.hash(SIG_DOMAIN, &b"some_data"[..], &b"extra"[..]).expect("should not fail");
//! ```
pub mod svdw;
use svdw::SVDW_G2;

use crate::{
    hashers::{DirectHasher, Hasher},
    BLSError, MESSAGE_BITS,
};
use ark_bls12_377::{Fq, Fq2, G2Projective};
use ark_ff::PrimeField;
use once_cell::sync::Lazy;

/// Trait for hashing arbitrary data to a group element on an elliptic curve
pub trait HashToCurve {
    /// The type of the curve being used.
    type Output;

    /// Given a domain separator, a message and potentially some extra data, produces
    /// a hash of them which is a curve point.
    fn hash(
        &self,
        domain: &[u8],
        message: &[u8],
        extra_data: &[u8],
    ) -> Result<Self::Output, BLSError>;
}

const COORDINATE_BYTES: usize = MESSAGE_BITS / 8;

/// Hashes `extra_data || message` to an `Fq2` element whose coordinates are both below 2^256
pub fn hash_to_field<H: Hasher<Error = BLSError>>(
    hasher: &H,
    domain: &[u8],
    message: &[u8],
    extra_data: &[u8],
) -> Result<Fq2, BLSError> {
    let input = [extra_data, message].concat();
    let bytes = hasher.hash(domain, &input, 2 * COORDINATE_BYTES)?;
    let (c0, c1) = bytes.split_at(COORDINATE_BYTES);
    Ok(Fq2::new(
        Fq::from_le_bytes_mod_order(c0),
        Fq::from_le_bytes_mod_order(c1),
    ))
}

/// Hash to G2 through `hash_to_field` and the SvdW map
#[derive(Clone, Debug)]
pub struct HashToG2<'a, H: Hasher> {
    hasher: &'a H,
}

impl<'a, H> HashToG2<'a, H>
where
    H: Hasher<Error = BLSError>,
{
    pub fn new(hasher: &'a H) -> Self {
        HashToG2 { hasher }
    }

    /// Returns the field element which the circuit receives as its public message
    pub fn hash_to_field(
        &self,
        domain: &[u8],
        message: &[u8],
        extra_data: &[u8],
    ) -> Result<Fq2, BLSError> {
        hash_to_field(self.hasher, domain, message, extra_data)
    }
}

impl<'a, H> HashToCurve for HashToG2<'a, H>
where
    H: Hasher<Error = BLSError>,
{
    type Output = G2Projective;

    fn hash(
        &self,
        domain: &[u8],
        message: &[u8],
        extra_data: &[u8],
    ) -> Result<Self::Output, BLSError> {
        let u = self.hash_to_field(domain, message, extra_data)?;
        SVDW_G2.map_to_g2(&u)
    }
}

/// Blake2s based hasher to G2
pub static DIRECT_HASH_TO_G2: Lazy<HashToG2<'static, DirectHasher>> =
    Lazy::new(|| HashToG2::new(&DirectHasher));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SIG_DOMAIN;
    use ark_ec::{AffineCurve, ProjectiveCurve};
    use ark_ff::{BigInteger, Zero};

    #[test]
    fn field_coordinates_fit_in_message_width() {
        for i in 0..32u8 {
            let u = DIRECT_HASH_TO_G2
                .hash_to_field(SIG_DOMAIN, &[i], b"extra")
                .unwrap();
            for c in &[u.c0, u.c1] {
                assert!(c.into_repr().num_bits() as usize <= MESSAGE_BITS);
            }
        }
    }

    #[test]
    fn hash_is_deterministic_and_in_subgroup() {
        let hasher = &*DIRECT_HASH_TO_G2;
        let a = hasher.hash(SIG_DOMAIN, b"commit", &[]).unwrap();
        assert_eq!(a, hasher.hash(SIG_DOMAIN, b"commit", &[]).unwrap());
        assert_ne!(a, hasher.hash(SIG_DOMAIN, b"commit", &[1]).unwrap());
        assert!(!a.is_zero());

        let affine = a.into_affine();
        assert!(affine.is_on_curve());
        assert!(affine.is_in_correct_subgroup_assuming_on_curve());
        // clearing the cofactor of a subgroup point must not land in the identity
        assert!(!affine.mul_by_cofactor_to_projective().is_zero());
    }
}
