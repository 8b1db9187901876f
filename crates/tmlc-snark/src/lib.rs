//! # Light Client SNARK
//!
//! This crate implements the constraint system of a Tendermint-style light client.
//!
//! Given a validator set root and a commit message, the circuit proves that:
//!
//! - Each message coordinate fits in the configured width, enforced by limb decomposition.
//! - The message maps onto G2 of BLS12-377 through the SvdW encoding followed by cofactor
//!   clearing.
//! - The ordered `(public key, voting power)` list recomputes to the root.
//! - The validators marked in the participation bitmap produced the aggregate BLS signature
//!   over the mapped message.
//! - The marked validators hold at least the quorum fraction (2/3 by default) of the total
//!   voting power.
//!
//! The circuit is expressed over the BW6-761 scalar field, so the BLS12-377 arithmetic is
//! native. The public inputs are `[root, m0, m1]`, where the message is `m0 + m1 * v` in `Fq2`.
//!
//! Each validator is allocated once, and the same variables feed the root recomputation and the
//! signature and quorum checks. A bitmap entry therefore always refers to a committed key.
//!
//! An unsatisfiable circuit does not say which check failed. Use [`check_commit`] to replay the
//! checks natively before proving.

mod config;
pub use config::{CircuitConfig, ConfigError, QuorumFraction, DEFAULT_MESSAGE_BITS};

mod validator_set;
pub use validator_set::{Validator, ValidatorSet, POWER_BYTES};

/// Constraint gadgets composing the light client circuit
pub mod gadgets;
pub use gadgets::{LightClientCircuit, LightClientWitness};

mod precheck;
pub use precheck::{check_commit, CommitError};

/// The curve of the validator keys and signatures
pub type BLSCurve = ark_bls12_377::Bls12_377;
/// The curve the circuit is proven over
pub type CPCurve = ark_bw6_761::BW6_761;
/// The field of the circuit
pub type CPField = ark_bw6_761::Fr;
