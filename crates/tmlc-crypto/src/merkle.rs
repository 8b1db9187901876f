//! Binary Merkle tree in the shape used by Tendermint (RFC 6962).
//!
//! A list of `n > 1` items is split at the largest power of two strictly below
//! `n`. Leaves and inner nodes are hashed under distinct one-byte prefixes:
//!
//! ```text
//! leaf  = H(0x00 || data)
//! inner = H(0x01 || left || right)
//! ```
//!
//! `H` is the Pedersen CRH from [`crate::hashers::pedersen`]. Its digest is
//! a base field element, serialized as 48 little-endian bytes when it feeds an
//! inner node.
use crate::{hashers::pedersen::crh_digest, BLSError};

use ark_bls12_377::Fq;
use ark_ff::ToBytes;

pub const LEAF_PREFIX: u8 = 0;
pub const INNER_PREFIX: u8 = 1;

/// Canonical little-endian encoding of a digest
pub fn digest_to_bytes(digest: &Fq) -> Result<Vec<u8>, BLSError> {
    let mut bytes = vec![];
    digest.write(&mut bytes)?;
    Ok(bytes)
}

pub fn leaf_hash(data: &[u8]) -> Result<Fq, BLSError> {
    let mut input = Vec::with_capacity(data.len() + 1);
    input.push(LEAF_PREFIX);
    input.extend_from_slice(data);
    crh_digest(&input)
}

pub fn inner_hash(left: &Fq, right: &Fq) -> Result<Fq, BLSError> {
    let mut input = vec![INNER_PREFIX];
    input.extend(digest_to_bytes(left)?);
    input.extend(digest_to_bytes(right)?);
    crh_digest(&input)
}

/// Largest power of two strictly less than `n`
///
/// # Panics
/// If `n < 2`
pub fn split_point(n: usize) -> usize {
    assert!(n >= 2, "split point is only defined for two or more items");
    let mut k = 1;
    while k * 2 < n {
        k *= 2;
    }
    k
}

/// Computes the root over the ordered leaves
pub fn merkle_root<T: AsRef<[u8]>>(leaves: &[T]) -> Result<Fq, BLSError> {
    match leaves.len() {
        0 => Err(BLSError::EmptyTree),
        1 => leaf_hash(leaves[0].as_ref()),
        n => {
            let k = split_point(n);
            let left = merkle_root(&leaves[..k])?;
            let right = merkle_root(&leaves[k..])?;
            inner_hash(&left, &right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_points() {
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(3), 2);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 4);
        assert_eq!(split_point(8), 4);
        assert_eq!(split_point(9), 8);
    }

    #[test]
    fn empty_tree_has_no_root() {
        assert!(matches!(
            merkle_root::<Vec<u8>>(&[]),
            Err(BLSError::EmptyTree)
        ));
    }

    #[test]
    fn tree_shape_follows_split_point() {
        let leaves = vec![vec![1u8], vec![2u8], vec![3u8]];
        let l = leaves
            .iter()
            .map(|d| leaf_hash(d).unwrap())
            .collect::<Vec<_>>();
        let expected = inner_hash(&inner_hash(&l[0], &l[1]).unwrap(), &l[2]).unwrap();
        assert_eq!(merkle_root(&leaves).unwrap(), expected);
        assert_eq!(merkle_root(&leaves[..1]).unwrap(), l[0]);
    }

    #[test]
    fn order_matters() {
        let leaves = vec![vec![1u8], vec![2u8], vec![3u8]];
        let swapped = vec![vec![2u8], vec![1u8], vec![3u8]];
        assert_ne!(merkle_root(&leaves).unwrap(), merkle_root(&swapped).unwrap());
    }

    #[test]
    fn leaf_and_inner_domains_are_separated() {
        let a = leaf_hash(&[7]).unwrap();
        let b = leaf_hash(&[8]).unwrap();
        let mut concatenated = digest_to_bytes(&a).unwrap();
        concatenated.extend(digest_to_bytes(&b).unwrap());
        assert_ne!(inner_hash(&a, &b).unwrap(), leaf_hash(&concatenated).unwrap());
        assert_eq!(digest_to_bytes(&a).unwrap().len(), 48);
    }
}
