//! # Light client cryptography
//!
//! Native counterparts of everything the light client circuit enforces:
//! BLS signatures with public keys on G1 and signatures on G2 of BLS12-377,
//! the Shallue-van de Woestijne map onto G2, and the Merkle commitment over
//! the validator set.

/// BLS signing
mod bls;
pub use bls::{PrivateKey, PublicKey, Signature};

/// Hashing to curve utilities
pub mod hash_to_curve;
pub use hash_to_curve::HashToCurve;

/// Useful hash functions
pub mod hashers;
pub use hashers::Hasher;

/// Validator set commitments
pub mod merkle;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use thiserror::Error;

/// Convenience result alias
pub type BlsResult<T> = std::result::Result<T, BLSError>;

/// Domain separator for signing commit messages
pub const SIG_DOMAIN: &[u8] = b"TMforsig";

/// Domain separator used to derive the Pedersen CRH generators
pub const CRH_DOMAIN: &[u8] = b"TMforcrh";

/// Bit width of each coordinate produced by `hash_to_field`
pub const MESSAGE_BITS: usize = 256;

#[derive(Debug, Error)]
/// Error type
pub enum BLSError {
    /// Error
    #[error("signature verification failed")]
    VerificationFailed,
    /// An IO error
    #[error("io error {0}")]
    IoError(#[from] std::io::Error),
    /// Error while hashing
    #[error("error in hasher {0}")]
    HashingError(String),
    /// Personalization string cannot be larger than 8 bytes
    #[error("domain length is too large: {0}")]
    DomainTooLarge(usize),
    #[error("could not hash to curve")]
    HashToCurveError,
    /// A Merkle tree needs at least one leaf
    #[error("cannot commit to an empty list")]
    EmptyTree,
}
