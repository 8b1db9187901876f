use ark_bls12_377::Fq;
use ark_crypto_primitives::crh::{pedersen::constraints::CRHGadget, CRHGadget as CRHGadgetTrait};
use ark_ed_on_bw6_761::{
    constraints::{EdwardsVar, FqVar},
    EdwardsProjective,
};
use ark_r1cs_std::{alloc::AllocVar, uint8::UInt8, ToBytesGadget};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use tmlc_crypto::{
    hashers::pedersen::{Window, CRH, CRH_PARAMETERS},
    merkle::{split_point, INNER_PREFIX, LEAF_PREFIX},
};
use tracing::{span, trace, Level};

type HashGadget = CRHGadget<EdwardsProjective, EdwardsVar, Window>;
type HashParametersVar = <HashGadget as CRHGadgetTrait<CRH, Fq>>::ParametersVar;

/// Recomputes the prefixed binary Merkle root of an ordered list of leaves
/// with the in-circuit Pedersen hash. The parameters are circuit constants.
pub struct MerkleRootGadget {
    parameters: HashParametersVar,
}

impl MerkleRootGadget {
    pub fn new(cs: ConstraintSystemRef<Fq>) -> Result<Self, SynthesisError> {
        let parameters = HashParametersVar::new_constant(cs, &*CRH_PARAMETERS)?;
        Ok(Self { parameters })
    }

    fn digest(&self, input: &[UInt8<Fq>]) -> Result<FqVar, SynthesisError> {
        let point = <HashGadget as CRHGadgetTrait<CRH, Fq>>::evaluate(
            &self.parameters,
            input,
        )?;
        Ok(point.x)
    }

    /// `H(0x00 || data)`
    pub fn leaf_hash(&self, data: &[UInt8<Fq>]) -> Result<FqVar, SynthesisError> {
        let mut input = Vec::with_capacity(data.len() + 1);
        input.push(UInt8::constant(LEAF_PREFIX));
        input.extend_from_slice(data);
        self.digest(&input)
    }

    /// `H(0x01 || left || right)`, with both digests as 48 little-endian bytes
    pub fn inner_hash(&self, left: &FqVar, right: &FqVar) -> Result<FqVar, SynthesisError> {
        let mut input = vec![UInt8::constant(INNER_PREFIX)];
        input.extend(left.to_bytes()?);
        input.extend(right.to_bytes()?);
        self.digest(&input)
    }

    /// Root over the leaves, in order.
    ///
    /// # Panics
    /// If there are no leaves
    #[tracing::instrument(target = "r1cs", skip(self, leaves))]
    pub fn root(&self, leaves: &[Vec<UInt8<Fq>>]) -> Result<FqVar, SynthesisError> {
        let span = span!(Level::TRACE, "merkle_root", leaves = leaves.len());
        let _enter = span.enter();
        assert!(!leaves.is_empty(), "cannot compute the root of an empty tree");
        self.subtree(leaves)
    }

    fn subtree(&self, leaves: &[Vec<UInt8<Fq>>]) -> Result<FqVar, SynthesisError> {
        if leaves.len() == 1 {
            return self.leaf_hash(&leaves[0]);
        }
        let k = split_point(leaves.len());
        trace!(size = leaves.len(), split = k, "inner node");
        let left = self.subtree(&leaves[..k])?;
        let right = self.subtree(&leaves[k..])?;
        self.inner_hash(&left, &right)
    }
}
