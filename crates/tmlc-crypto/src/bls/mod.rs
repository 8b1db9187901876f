//! BLS signatures over BLS12-377 with public keys in G1 and signatures in G2.
//!
//! Signatures are verified with the "min-pk" equation
//! `e(-g1, σ) · e(apk, H(m)) == 1`, where `H` maps into G2.

mod secret;
pub use secret::PrivateKey;

mod public;
pub use public::PublicKey;

mod signature;
pub use signature::Signature;
