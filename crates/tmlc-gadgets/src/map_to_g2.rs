use ark_bls12_377::{
    constraints::{Fq2Var, FqVar, G2Var},
    g2::Parameters as G2Parameters,
    Fq, Fq2,
};
use ark_ec::SWModelParameters;
use ark_ff::{BitIteratorLE, Field, One, SquareRootField, Zero};
use ark_r1cs_std::{prelude::*, Assignment};
use ark_relations::r1cs::SynthesisError;
use tmlc_crypto::hash_to_curve::svdw::{self, SVDW_G2};
use tracing::{debug, span, trace, Level};

/// `sgn0` of an `Fq2` element: the parity of its first non-zero coordinate
pub struct Sgn0Gadget;

impl Sgn0Gadget {
    pub fn sgn0(x: &Fq2Var) -> Result<Boolean<Fq>, SynthesisError> {
        let sign_0 = Self::parity(&x.c0)?;
        let zero_0 = x.c0.is_eq(&FqVar::zero())?;
        let sign_1 = Self::parity(&x.c1)?;
        sign_0.or(&zero_0.and(&sign_1)?)
    }

    fn parity(x: &FqVar) -> Result<Boolean<Fq>, SynthesisError> {
        // canonical decomposition, so bit 0 is the parity of the reduced value
        let bits = x.to_bits_le()?;
        Ok(bits[0].clone())
    }
}

/// Shallue-van de Woestijne map from `Fq2` onto the G2 twist of BLS12-377.
///
/// Square roots and inverses are supplied as witnesses and bound by their defining
/// equations. Branches of the native map become boolean selectors, including the exceptional
/// input for which the inverted denominator is zero. The native reference is
/// [`tmlc_crypto::hash_to_curve::svdw::SvdwMap`], which also computes the witnesses.
pub struct MapToG2Gadget;

impl MapToG2Gadget {
    /// Maps `u` to a point in the prime order subgroup of G2
    #[tracing::instrument(target = "r1cs", skip(u))]
    pub fn map_to_g2(u: &Fq2Var) -> Result<G2Var, SynthesisError> {
        if u.is_constant() {
            let point = SVDW_G2
                .map_to_g2(&u.value()?)
                .map_err(|_| SynthesisError::Unsatisfiable)?;
            return Ok(G2Var::constant(point));
        }
        let point = Self::map_to_curve(u)?;
        Self::clear_cofactor(&point)
    }

    /// Maps `u` onto the twist without clearing the cofactor
    #[tracing::instrument(target = "r1cs", skip(u))]
    pub fn map_to_curve(u: &Fq2Var) -> Result<G2Var, SynthesisError> {
        let span = span!(Level::TRACE, "MapToG2Gadget_map_to_curve");
        let _enter = span.enter();
        let map = &*SVDW_G2;

        let tv1 = u.square()? * map.c1;
        let tv2 = &tv1 + Fq2::one();
        let tv1 = tv1.negate()? + Fq2::one();
        let tv3 = Self::inv0(&(&tv1 * &tv2))?;
        let tv4 = (u * &tv1) * &tv3 * map.c3;
        let x1 = tv4.negate()? + map.c2;
        let x2 = &tv4 + map.c2;
        let x3 = (tv2.square()? * &tv3).square()? * map.c4 + map.z;

        let e1 = Self::is_square(&Self::curve_rhs(&x1)?)?;
        let e2 = Self::is_square(&Self::curve_rhs(&x2)?)?.and(&e1.not())?;
        let x = e1.select(&x1, &x3)?;
        let x = e2.select(&x2, &x)?;
        trace!("selected x coordinate");

        let gx = Self::curve_rhs(&x)?;
        let y = Fq2Var::new_witness(u.cs(), || {
            let point = SVDW_G2
                .map_to_curve(&u.value()?)
                .map_err(|_| SynthesisError::Unsatisfiable)?;
            Ok(point.y)
        })?;
        y.square()?.enforce_equal(&gx)?;

        // the root is chosen by the sign of u; zero has only one root
        let same_sign = Sgn0Gadget::sgn0(u)?.is_eq(&Sgn0Gadget::sgn0(&y)?)?;
        same_sign
            .or(&y.is_eq(&Fq2Var::zero())?)?
            .enforce_equal(&Boolean::TRUE)?;

        Ok(G2Var::new(x, y, Fq2Var::one()))
    }

    /// Multiplies the point by the G2 cofactor
    #[tracing::instrument(target = "r1cs", skip(p))]
    pub fn clear_cofactor(p: &G2Var) -> Result<G2Var, SynthesisError> {
        debug!("scaling by G2 cofactor");
        let cofactor_bits = BitIteratorLE::new(<G2Parameters as SWModelParameters>::COFACTOR)
            .map(Boolean::constant)
            .collect::<Vec<_>>();
        p.scalar_mul_le(cofactor_bits.iter())
    }

    /// x^3 + B
    fn curve_rhs(x: &Fq2Var) -> Result<Fq2Var, SynthesisError> {
        Ok(x.square()? * x + <G2Parameters as SWModelParameters>::COEFF_B)
    }

    /// `inv0(x)`: the inverse of `x`, or zero when `x` is zero.
    ///
    /// The witnessed flag `is_zero` satisfies `x * inv == 1 - is_zero` and forces `x == 0`
    /// when set, so it is exactly `x == 0`. The result is blended with the flag, since `inv`
    /// is unconstrained when `x` is zero.
    fn inv0(x: &Fq2Var) -> Result<Fq2Var, SynthesisError> {
        let cs = x.cs();
        let is_zero = Boolean::new_witness(cs.clone(), || Ok(x.value()?.is_zero()))?;
        let inv = Fq2Var::new_witness(cs, || {
            Ok(x.value()?.inverse().unwrap_or_else(Fq2::zero))
        })?;

        let expected = is_zero.select(&Fq2Var::zero(), &Fq2Var::one())?;
        (x * &inv).enforce_equal(&expected)?;
        x.conditional_enforce_equal(&Fq2Var::zero(), &is_zero)?;

        is_zero.select(&Fq2Var::zero(), &inv)
    }

    /// Returns a boolean which is true iff `x` is a square.
    ///
    /// A root is witnessed either for `x` or for `non_residue * x`. Exactly one of the two is a
    /// square when `x` is non-zero. Zero is a square.
    fn is_square(x: &Fq2Var) -> Result<Boolean<Fq>, SynthesisError> {
        let non_residue = SVDW_G2.non_residue;
        let cs = x.cs();
        let flag = Boolean::new_witness(cs.clone(), || Ok(svdw::is_square(&x.value()?)))?;
        let root = Fq2Var::new_witness(cs, || {
            let x = x.value()?;
            let target = if svdw::is_square(&x) {
                x
            } else {
                x * non_residue
            };
            target.sqrt().get()
        })?;

        let target = flag.select(x, &(x * non_residue))?;
        root.square()?.enforce_equal(&target)?;

        let x_is_zero = x.is_eq(&Fq2Var::zero())?;
        flag.conditional_enforce_equal(&Boolean::TRUE, &x_is_zero)?;

        Ok(flag)
    }
}
