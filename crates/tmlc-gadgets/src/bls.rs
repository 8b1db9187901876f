use ark_ec::{PairingEngine, ProjectiveCurve};
use ark_ff::PrimeField;
use ark_r1cs_std::{
    alloc::AllocationMode, boolean::Boolean, eq::EqGadget, fields::FieldVar, groups::CurveVar,
    pairing::PairingVar, R1CSVar,
};
use ark_relations::r1cs::SynthesisError;
use std::marker::PhantomData;
use std::ops::AddAssign;
use tracing::{debug, span, trace, Level};

/// An aggregatable signature scheme expressed in constraints.
///
/// Keys are combined according to a participation bitmap and the combination is checked against
/// a single aggregate signature over one message. Quorum and commitment logic is written
/// against this trait only.
pub trait AggregateSignatureGadget<F: PrimeField> {
    type PublicKeyVar: Clone;
    type MessageVar;
    type SignatureVar;

    /// Returns the aggregate of the keys whose bit is set
    fn aggregate_public_keys(
        pub_keys: &[Self::PublicKeyVar],
        signed_bitmap: &[Boolean<F>],
    ) -> Result<Self::PublicKeyVar, SynthesisError>;

    /// Enforces that `signature` is valid for `message` under the aggregate key
    fn enforce_valid(
        aggregated_pub_key: &Self::PublicKeyVar,
        message: &Self::MessageVar,
        signature: &Self::SignatureVar,
    ) -> Result<(), SynthesisError>;

    /// Aggregates the participating keys and checks the signature against them
    fn verify(
        pub_keys: &[Self::PublicKeyVar],
        signed_bitmap: &[Boolean<F>],
        message: &Self::MessageVar,
        signature: &Self::SignatureVar,
    ) -> Result<(), SynthesisError> {
        let aggregated_pub_key = Self::aggregate_public_keys(pub_keys, signed_bitmap)?;
        Self::enforce_valid(&aggregated_pub_key, message, signature)
    }
}

/// BLS Signature Verification Gadget.
///
/// Implements BLS multi-signature verification as written in
/// [BDN18](https://eprint.iacr.org/2018/483.pdf) in a Pairing-based SNARK, with public keys
/// on G1 and messages and signatures on G2.
pub struct BlsVerifyGadget<E, F, P> {
    /// The curve being used
    pairing_engine_type: PhantomData<E>,
    /// The field we're operating on
    constraint_field_type: PhantomData<F>,
    /// The pairing gadget we use, which MUST match our pairing engine
    pairing_gadget_type: PhantomData<P>,
}

impl<E, F, P> BlsVerifyGadget<E, F, P>
where
    E: PairingEngine,
    F: PrimeField,
    P: PairingVar<E, F>,
    P::G1Var: for<'a> AddAssign<&'a P::G1Var>,
{
    /// Returns a gadget which checks that an aggregate pubkey is correctly calculated
    /// by the sum of the pub keys which had a 1 in the bitmap. A participating key may not be
    /// the identity.
    ///
    /// # Panics
    /// If signed_bitmap length != pub_keys length
    #[tracing::instrument(target = "r1cs")]
    pub fn enforce_aggregated_pubkeys(
        pub_keys: &[P::G1Var],
        signed_bitmap: &[Boolean<F>],
    ) -> Result<P::G1Var, SynthesisError> {
        // Bitmap and Pubkeys must be of the same length
        assert_eq!(signed_bitmap.len(), pub_keys.len());

        let mut aggregated_pk = P::G1Var::zero();
        for (pk, bit) in pub_keys.iter().zip(signed_bitmap) {
            // Disallow the identity for signers
            pk.is_zero()?.and(bit)?.enforce_equal(&Boolean::FALSE)?;
            // If bit = 1, add pk
            let adder = bit.select(pk, &P::G1Var::zero())?;
            aggregated_pk += &adder;
        }

        Ok(aggregated_pk)
    }

    /// Verifying BLS signatures requires preparing a G2 Signature and
    /// preparing a negated G1 generator
    #[tracing::instrument(target = "r1cs")]
    fn prepare_signature_neg_generator(
        signature: &P::G2Var,
    ) -> Result<(P::G2PreparedVar, P::G1PreparedVar), SynthesisError> {
        // Ensure the signature is prepared
        let prepared_signature = P::prepare_g2(signature)?;

        // Allocate the generator on G1
        let g1_generator = P::G1Var::new_variable_omit_prime_order_check(
            signature.cs(),
            || Ok(E::G1Projective::prime_subgroup_generator()),
            AllocationMode::Constant,
        )?;
        // and negate it for the purpose of verification
        let g1_neg_generator = g1_generator.negate()?;
        let prepared_g1_neg_generator = P::prepare_g1(&g1_neg_generator)?;

        Ok((prepared_signature, prepared_g1_neg_generator))
    }

    /// Multiply the pairings together and check that their product == 1 in G_T, which indicates
    /// that the verification has passed.
    ///
    /// Each G1 element is paired with the corresponding G2 element.
    #[tracing::instrument(target = "r1cs")]
    fn enforce_bls_equation(
        g1: &[P::G1PreparedVar],
        g2: &[P::G2PreparedVar],
    ) -> Result<(), SynthesisError> {
        trace!("enforcing BLS equation");
        let bls_equation = P::product_of_pairings(g1, g2)?;
        let gt_one = &P::GTVar::one();
        bls_equation.enforce_equal(gt_one)?;
        Ok(())
    }
}

impl<E, F, P> AggregateSignatureGadget<F> for BlsVerifyGadget<E, F, P>
where
    E: PairingEngine,
    F: PrimeField,
    P: PairingVar<E, F>,
    P::G1Var: for<'a> AddAssign<&'a P::G1Var>,
{
    type PublicKeyVar = P::G1Var;
    type MessageVar = P::G2Var;
    type SignatureVar = P::G2Var;

    fn aggregate_public_keys(
        pub_keys: &[P::G1Var],
        signed_bitmap: &[Boolean<F>],
    ) -> Result<P::G1Var, SynthesisError> {
        Self::enforce_aggregated_pubkeys(pub_keys, signed_bitmap)
    }

    #[tracing::instrument(target = "r1cs")]
    fn enforce_valid(
        aggregated_pub_key: &P::G1Var,
        message: &P::G2Var,
        signature: &P::G2Var,
    ) -> Result<(), SynthesisError> {
        let span = span!(Level::TRACE, "BlsVerifyGadget_verify");
        let _enter = span.enter();
        debug!("verifying aggregate BLS signature");

        let prepared_aggregated_pk = P::prepare_g1(aggregated_pub_key)?;
        let prepared_message = P::prepare_g2(message)?;

        // Prepare the signature and get the generator
        let (prepared_signature, prepared_g1_neg_generator) =
            Self::prepare_signature_neg_generator(signature)?;

        // e(g_1^-1, σ) * e(apk, H(m)) == 1_{G_T}
        Self::enforce_bls_equation(
            &[prepared_g1_neg_generator, prepared_aggregated_pk],
            &[prepared_signature, prepared_message],
        )
    }
}
