//! # Light Client Gadgets
//!
//! R1CS gadgets over the BLS12-377 base field (the BW6-761 scalar field) used to verify
//! a Tendermint-style commit inside a circuit:
//!
//! - [`LimbDecomposer`]: range checks and comparisons through limb decomposition
//! - [`MapToG2Gadget`]: the SvdW encoding of an `Fq2` element to a G2 point
//! - [`BlsVerifyGadget`]: BLS aggregate signature verification with a participation bitmap
//! - [`VotingPower`]: quorum accounting over the same bitmap
//! - [`MerkleRootGadget`]: the prefixed binary Merkle root of the validator set

mod limbs;
pub use limbs::{LimbDecomposer, LimbVar, DEFAULT_LIMB_BITS};

mod map_to_g2;
pub use map_to_g2::{MapToG2Gadget, Sgn0Gadget};

mod bls;
pub use bls::{AggregateSignatureGadget, BlsVerifyGadget};

mod bitmap;
pub use bitmap::VotingPower;

mod merkle;
pub use merkle::MerkleRootGadget;

/// Utility functions which do not involve generating constraints
pub mod utils;
