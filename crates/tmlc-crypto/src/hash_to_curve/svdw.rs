//! Shallue-van de Woestijne map to the G2 twist of BLS12-377, following
//! [RFC 9380, section 6.6.1](https://www.rfc-editor.org/rfc/rfc9380#section-6.6.1).
//!
//! The twist is `y^2 = x^3 + B` with `A = 0`, which rules out the simplified
//! SWU map without an isogeny, so the generic SvdW construction is used.
//! `map_to_curve` returns the raw point on the twist. `map_to_g2` additionally
//! multiplies by the cofactor, which places the result in the prime order
//! subgroup.
use crate::BLSError;

use ark_bls12_377::{g2::Parameters as G2Parameters, Fq, Fq2, G2Affine, G2Projective};
use ark_ec::{models::SWModelParameters, AffineCurve};
use ark_ff::{BigInteger, Field, One, PrimeField, SquareRootField, Zero};
use log::debug;
use once_cell::sync::Lazy;

/// Largest integer tried for each coordinate while searching for `Z` and the non-residue
const MAX_CANDIDATE: u64 = 1 << 10;

/// Right hand side of the twist equation, `g(x) = x^3 + B`
pub fn curve_rhs(x: &Fq2) -> Fq2 {
    x.square() * x + <G2Parameters as SWModelParameters>::COEFF_B
}

/// `sgn0` for a degree 2 extension: the parity of the first non-zero coordinate
pub fn sgn0(x: &Fq2) -> bool {
    let sign_0 = x.c0.into_repr().is_odd();
    let zero_0 = x.c0.is_zero();
    let sign_1 = x.c1.into_repr().is_odd();
    sign_0 || (zero_0 && sign_1)
}

/// Zero counts as a square
pub fn is_square(x: &Fq2) -> bool {
    !x.legendre().is_qnr()
}

/// Precomputed constants of the map
#[derive(Clone, Debug, PartialEq)]
pub struct SvdwMap {
    pub z: Fq2,
    /// g(Z)
    pub c1: Fq2,
    /// -Z / 2
    pub c2: Fq2,
    /// sqrt(-g(Z) * 3Z^2), with sgn0(c3) = 0
    pub c3: Fq2,
    /// -4 g(Z) / 3Z^2
    pub c4: Fq2,
    /// A fixed quadratic non-residue, used to witness that an element is not a square
    pub non_residue: Fq2,
}

/// The map for BLS12-377 G2
pub static SVDW_G2: Lazy<SvdwMap> =
    Lazy::new(|| SvdwMap::new().expect("BLS12-377 G2 admits SvdW constants"));

fn candidates() -> impl Iterator<Item = Fq2> {
    (1..=MAX_CANDIDATE).flat_map(|i| {
        let c = Fq::from(i);
        vec![
            Fq2::new(c, Fq::zero()),
            Fq2::new(-c, Fq::zero()),
            Fq2::new(c, Fq::one()),
            Fq2::new(-c, Fq::one()),
        ]
    })
}

/// The RFC's `find_z_svdw` over the candidate ordering above
fn find_z() -> Option<Fq2> {
    let four = Fq2::from(4u64);
    let three = Fq2::from(3u64);
    let half = Fq2::from(2u64).inverse()?;
    candidates().find(|z| {
        let gz = curve_rhs(z);
        if gz.is_zero() || z.is_zero() {
            return false;
        }
        let h = match (four * gz).inverse() {
            Some(inv) => -(three * z.square()) * inv,
            None => return false,
        };
        is_square(&h) && (is_square(&gz) || is_square(&curve_rhs(&(-*z * half))))
    })
}

fn find_non_residue() -> Option<Fq2> {
    (0..MAX_CANDIDATE)
        .map(|i| Fq2::new(Fq::from(i), Fq::one()))
        .find(|x| !is_square(x))
}

impl SvdwMap {
    /// Derives the map's constants
    pub fn new() -> Result<Self, BLSError> {
        let z = find_z().ok_or(BLSError::HashToCurveError)?;
        let gz = curve_rhs(&z);
        let three_z2 = Fq2::from(3u64) * z.square();

        let c2 = -z * Fq2::from(2u64).inverse().ok_or(BLSError::HashToCurveError)?;
        let mut c3 = (-gz * three_z2).sqrt().ok_or(BLSError::HashToCurveError)?;
        if sgn0(&c3) {
            c3 = -c3;
        }
        let c4 = -(Fq2::from(4u64) * gz) * three_z2.inverse().ok_or(BLSError::HashToCurveError)?;
        let non_residue = find_non_residue().ok_or(BLSError::HashToCurveError)?;
        debug!("derived SvdW constants, Z = {}", z);

        Ok(SvdwMap {
            z,
            c1: gz,
            c2,
            c3,
            c4,
            non_residue,
        })
    }

    /// Maps `u` onto the twist. The output is on the curve but not necessarily in G2.
    pub fn map_to_curve(&self, u: &Fq2) -> Result<G2Affine, BLSError> {
        let one = Fq2::one();
        let tv1 = u.square() * self.c1;
        let tv2 = one + tv1;
        let tv1 = one - tv1;
        // inv0: the exceptional inputs map through a zero inverse
        let tv3 = (tv1 * tv2).inverse().unwrap_or_else(Fq2::zero);
        let tv4 = *u * tv1 * tv3 * self.c3;
        let x1 = self.c2 - tv4;
        let x2 = self.c2 + tv4;
        let x3 = (tv2.square() * tv3).square() * self.c4 + self.z;

        let x = if is_square(&curve_rhs(&x1)) {
            x1
        } else if is_square(&curve_rhs(&x2)) {
            x2
        } else {
            x3
        };
        let mut y = curve_rhs(&x).sqrt().ok_or(BLSError::HashToCurveError)?;
        if sgn0(u) != sgn0(&y) {
            y = -y;
        }

        Ok(G2Affine::new(x, y, false))
    }

    /// Maps `u` onto the twist and clears the cofactor
    pub fn map_to_g2(&self, u: &Fq2) -> Result<G2Projective, BLSError> {
        Ok(self.map_to_curve(u)?.mul_by_cofactor_to_projective())
    }

    /// Returns an input hitting the exceptional case `u^2 * g(Z) = ±1`, if one exists
    pub fn exceptional_input(&self) -> Option<Fq2> {
        let inv = self.c1.inverse()?;
        inv.sqrt().or_else(|| (-inv).sqrt())
    }
}
