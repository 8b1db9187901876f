use super::{DirectHasher, Hasher};
use crate::{BLSError, CRH_DOMAIN};

use ark_bls12_377::Fq;
use ark_crypto_primitives::crh::{pedersen, CRH as CRHScheme};
use ark_ed_on_bw6_761::EdwardsProjective;
use once_cell::sync::Lazy;
use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

/// Window shape for the commitment CRH. The widest preimage is a validator leaf
/// (1 + 48 + 48 + 8 bytes), which fits in `WINDOW_SIZE * NUM_WINDOWS` bits.
#[derive(Clone, Debug)]
pub struct Window;

impl pedersen::Window for Window {
    const WINDOW_SIZE: usize = 128;
    const NUM_WINDOWS: usize = 8;
}

/// Pedersen hash over the Edwards curve whose base field is the BLS12-377 base field
pub type CRH = pedersen::CRH<EdwardsProjective, Window>;

pub type CRHParameters = <CRH as CRHScheme>::Parameters;

/// Largest preimage accepted by `crh_digest`, in bytes. Shorter inputs are zero padded.
pub const MAX_INPUT_BYTES: usize =
    <Window as pedersen::Window>::WINDOW_SIZE * <Window as pedersen::Window>::NUM_WINDOWS / 8;

/// Derives the CRH generators from a ChaCha stream seeded by the Blake2s hash of `CRH_DOMAIN`,
/// so every party recomputes the same parameters.
pub fn setup_crh() -> Result<CRHParameters, BLSError> {
    let hash = DirectHasher.crh(CRH_DOMAIN, &[], 32)?;
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&hash);
    let mut rng = ChaChaRng::from_seed(seed);
    <CRH as CRHScheme>::setup(&mut rng).map_err(|e| BLSError::HashingError(e.to_string()))
}

/// Lazily evaluated commitment parameters
pub static CRH_PARAMETERS: Lazy<CRHParameters> =
    Lazy::new(|| setup_crh().expect("pedersen setup is infallible"));

/// Hashes the input and returns the x coordinate of the resulting Edwards point
pub fn crh_digest(input: &[u8]) -> Result<Fq, BLSError> {
    if input.len() > MAX_INPUT_BYTES {
        return Err(BLSError::HashingError(format!(
            "CRH input of {} bytes exceeds {} bytes",
            input.len(),
            MAX_INPUT_BYTES
        )));
    }
    let point = <CRH as CRHScheme>::evaluate(&CRH_PARAMETERS, input)
        .map_err(|e| BLSError::HashingError(e.to_string()))?;
    Ok(point.x)
}
