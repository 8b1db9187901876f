use ark_bls12_377::{G2Affine, G2Projective};
use ark_ec::ProjectiveCurve;
use std::borrow::Borrow;

/// A BLS signature on G2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature(G2Projective);

impl From<G2Projective> for Signature {
    fn from(sig: G2Projective) -> Signature {
        Signature(sig)
    }
}

impl AsRef<G2Projective> for Signature {
    fn as_ref(&self) -> &G2Projective {
        &self.0
    }
}

impl Signature {
    /// Sums the provided signatures to produce the aggregate signature.
    pub fn aggregate<S: Borrow<Signature>>(signatures: impl IntoIterator<Item = S>) -> Signature {
        signatures
            .into_iter()
            .map(|s| s.borrow().0)
            .sum::<G2Projective>()
            .into()
    }

    pub fn to_affine(&self) -> G2Affine {
        self.0.into_affine()
    }
}
