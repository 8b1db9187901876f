use ark_ff::{BigInteger, FpParameters, PrimeField};
use ark_r1cs_std::{fields::fp::FpVar, prelude::*, Assignment};
use ark_relations::r1cs::SynthesisError;
use tracing::{span, trace, Level};

/// Limb width used by the range checks when the caller does not care about the split
pub const DEFAULT_LIMB_BITS: usize = 64;

/// One limb of a decomposed integer, together with the little-endian bits which bound it
#[derive(Clone, Debug)]
pub struct LimbVar<F: PrimeField> {
    pub value: FpVar<F>,
    pub bits: Vec<Boolean<F>>,
}

impl<F: PrimeField> LimbVar<F> {
    /// Number of bits this limb is constrained to
    pub fn width(&self) -> usize {
        self.bits.len()
    }
}

/// Splits packed integers into bounded limbs.
///
/// A field element `x` is read as an unsigned integer of `total_bits` bits and split into
/// limbs of `limb_bits` bits each, least significant first. The last limb is narrower when
/// `limb_bits` does not divide `total_bits`. Each limb is bound to its own bit decomposition,
/// and the weighted sum of the limbs is bound to `x`. If `x >= 2^total_bits` no assignment
/// satisfies the constraints.
pub struct LimbDecomposer;

impl LimbDecomposer {
    /// Enforces the decomposition of `x` and returns its limbs.
    ///
    /// A constant `x` produces constant limbs, or `SynthesisError::Unsatisfiable` if it does
    /// not fit.
    ///
    /// # Panics
    /// If `limb_bits` is zero or `total_bits` exceeds the capacity of the field
    #[tracing::instrument(target = "r1cs", skip(x))]
    pub fn decompose<F: PrimeField>(
        x: &FpVar<F>,
        total_bits: usize,
        limb_bits: usize,
    ) -> Result<Vec<LimbVar<F>>, SynthesisError> {
        assert!(limb_bits > 0, "limbs must be at least one bit wide");
        assert!(
            total_bits <= F::Params::CAPACITY as usize,
            "a {}-bit integer does not fit below the field modulus",
            total_bits
        );

        if x.is_constant() {
            return Self::decompose_constant(&x.value()?, total_bits, limb_bits);
        }

        let cs = x.cs();
        // None during setup; the witness closures below are never called then
        let x_bits = x.value().ok().map(|v| v.into_repr().to_bits_le());

        let mut limbs = Vec::with_capacity((total_bits + limb_bits - 1) / limb_bits);
        for start in (0..total_bits).step_by(limb_bits) {
            let end = total_bits.min(start + limb_bits);
            let bits = (start..end)
                .map(|i| Boolean::new_witness(cs.clone(), || x_bits.as_ref().map(|b| b[i]).get()))
                .collect::<Result<Vec<_>, _>>()?;
            let value = FpVar::new_witness(cs.clone(), || {
                let x_bits = x_bits.as_ref().get()?;
                F::from_repr(F::BigInt::from_bits_le(&x_bits[start..end])).get()
            })?;
            // limb < 2^width
            Boolean::le_bits_to_fp_var(&bits)?.enforce_equal(&value)?;
            limbs.push(LimbVar { value, bits });
        }

        // sum(limb_i * 2^(offset_i)) == x
        Self::recompose(&limbs).enforce_equal(x)?;
        trace!(num_limbs = limbs.len(), "decomposed packed integer");

        Ok(limbs)
    }

    fn decompose_constant<F: PrimeField>(
        x: &F,
        total_bits: usize,
        limb_bits: usize,
    ) -> Result<Vec<LimbVar<F>>, SynthesisError> {
        let x_bits = x.into_repr().to_bits_le();
        if x_bits.iter().skip(total_bits).any(|b| *b) {
            return Err(SynthesisError::Unsatisfiable);
        }
        Ok(x_bits[..total_bits]
            .chunks(limb_bits)
            .map(|chunk| {
                let bits = chunk.iter().map(|b| Boolean::constant(*b)).collect::<Vec<_>>();
                let value = F::from_repr(F::BigInt::from_bits_le(chunk)).unwrap_or_else(F::zero);
                LimbVar {
                    value: FpVar::constant(value),
                    bits,
                }
            })
            .collect())
    }

    /// Returns `sum(limb_i * 2^(offset_i))`, where each offset is the total width of the
    /// preceding limbs. This is a linear combination and costs no constraints.
    pub fn recompose<F: PrimeField>(limbs: &[LimbVar<F>]) -> FpVar<F> {
        let mut result = FpVar::zero();
        let mut shift = F::one();
        for limb in limbs {
            result += &limb.value * shift;
            shift *= F::from(2u64).pow([limb.width() as u64]);
        }
        result
    }

    /// Enforces `x < 2^num_bits`
    pub fn enforce_in_range<F: PrimeField>(
        x: &FpVar<F>,
        num_bits: usize,
    ) -> Result<(), SynthesisError> {
        Self::decompose(x, num_bits, DEFAULT_LIMB_BITS.min(num_bits)).map(|_| ())
    }

    /// Enforces `a >= b` through a range-checked subtraction: `a - b` must fit in `num_bits`.
    ///
    /// Sound when both operands are known to be below `2^num_bits` and `num_bits` is below the
    /// field capacity, since a negative difference then wraps to a value of at least
    /// `p - 2^num_bits`.
    #[tracing::instrument(target = "r1cs", skip(a, b))]
    pub fn enforce_geq<F: PrimeField>(
        a: &FpVar<F>,
        b: &FpVar<F>,
        num_bits: usize,
    ) -> Result<(), SynthesisError> {
        let span = span!(Level::TRACE, "enforce_geq");
        let _enter = span.enter();
        Self::enforce_in_range(&(a - b), num_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::{print_unsatisfied_constraints, run_profile_constraints};

    use ark_bls12_377::{Bls12_377, Fq, Fr};
    use ark_ff::{Field, One, Zero};
    use ark_groth16::{
        create_random_proof, generate_random_parameters, prepare_verifying_key, verify_proof,
    };
    use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, ConstraintSystemRef};
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn two_to(bits: u64) -> Fq {
        Fq::from(2u64).pow([bits])
    }

    fn fq_from_u64s(limbs: &[u64]) -> Fq {
        limbs
            .iter()
            .rev()
            .fold(Fq::zero(), |acc, limb| acc * two_to(64) + Fq::from(*limb))
    }

    fn cs_decompose(
        x: Fq,
        total_bits: usize,
        limb_bits: usize,
    ) -> (ConstraintSystemRef<Fq>, Vec<LimbVar<Fq>>) {
        let cs = ConstraintSystem::<Fq>::new_ref();
        let x = FpVar::new_input(cs.clone(), || Ok(x)).unwrap();
        let limbs = LimbDecomposer::decompose(&x, total_bits, limb_bits).unwrap();
        (cs, limbs)
    }

    #[test]
    fn round_trips_below_bound() {
        run_profile_constraints(|| {
            let rng = &mut XorShiftRng::seed_from_u64(12);
            for _ in 0..10 {
                let words = [rng.gen::<u64>(), rng.gen(), rng.gen(), rng.gen()];
                let x = fq_from_u64s(&words);
                let (cs, limbs) = cs_decompose(x, 256, 64);
                print_unsatisfied_constraints(cs.clone());
                assert!(cs.is_satisfied().unwrap());

                assert_eq!(limbs.len(), 4);
                for (limb, word) in limbs.iter().zip(&words) {
                    assert_eq!(limb.value.value().unwrap(), Fq::from(*word));
                    assert_eq!(limb.width(), 64);
                }
                assert_eq!(LimbDecomposer::recompose(&limbs).value().unwrap(), x);
            }
        });
    }

    #[test]
    fn edges_of_the_range() {
        let (cs, _) = cs_decompose(Fq::zero(), 256, 64);
        assert!(cs.is_satisfied().unwrap());

        let max = two_to(256) - Fq::one();
        let (cs, limbs) = cs_decompose(max, 256, 64);
        assert!(cs.is_satisfied().unwrap());
        for limb in &limbs {
            assert_eq!(limb.value.value().unwrap(), Fq::from(u64::MAX));
        }
    }

    #[test]
    fn rejects_values_at_or_above_bound() {
        run_profile_constraints(|| {
            let (cs, _) = cs_decompose(two_to(256), 256, 64);
            assert!(!cs.is_satisfied().unwrap());

            let (cs, _) = cs_decompose(two_to(300) + Fq::from(5u64), 256, 64);
            assert!(!cs.is_satisfied().unwrap());

            let (cs, _) = cs_decompose(-Fq::one(), 256, 64);
            assert!(!cs.is_satisfied().unwrap());
        });
    }

    #[test]
    fn narrow_last_limb() {
        let x = two_to(99) + Fq::from(7u64);
        let (cs, limbs) = cs_decompose(x, 100, 64);
        assert!(cs.is_satisfied().unwrap());
        assert_eq!(limbs.len(), 2);
        assert_eq!(limbs[0].width(), 64);
        assert_eq!(limbs[1].width(), 36);
        assert_eq!(limbs[0].value.value().unwrap(), Fq::from(7u64));
        assert_eq!(limbs[1].value.value().unwrap(), two_to(35));

        let (cs, _) = cs_decompose(two_to(100), 100, 64);
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn constants_are_checked_natively() {
        let x = FpVar::constant(Fq::from(300u64));
        let limbs = LimbDecomposer::decompose(&x, 16, 8).unwrap();
        assert!(limbs.iter().all(|l| l.value.is_constant()));
        assert_eq!(limbs[0].value.value().unwrap(), Fq::from(44u64));
        assert_eq!(limbs[1].value.value().unwrap(), Fq::one());

        let result = LimbDecomposer::decompose(&x, 8, 8);
        assert!(matches!(result, Err(SynthesisError::Unsatisfiable)));
    }

    #[test]
    #[should_panic]
    fn total_width_above_capacity_panics() {
        let (_cs, _) = cs_decompose(Fq::one(), 377, 64);
    }

    #[test]
    fn geq_accepts_and_rejects() {
        let check = |a: u64, b: u64| {
            let cs = ConstraintSystem::<Fq>::new_ref();
            let a = FpVar::new_witness(cs.clone(), || Ok(Fq::from(a))).unwrap();
            let b = FpVar::new_witness(cs.clone(), || Ok(Fq::from(b))).unwrap();
            LimbDecomposer::enforce_geq(&a, &b, 65).unwrap();
            cs.is_satisfied().unwrap()
        };
        assert!(check(5, 5));
        assert!(check(6, 5));
        assert!(check(u64::MAX, 0));
        assert!(!check(4, 5));
        assert!(!check(0, u64::MAX));
    }

    #[test]
    fn setup_mode_needs_no_values() {
        use ark_relations::r1cs::SynthesisMode;
        let cs = ConstraintSystem::<Fq>::new_ref();
        cs.set_mode(SynthesisMode::Setup);
        let x = FpVar::new_input(cs.clone(), || Err::<Fq, _>(SynthesisError::AssignmentMissing))
            .unwrap();
        let limbs = LimbDecomposer::decompose(&x, 256, 64).unwrap();
        assert_eq!(limbs.len(), 4);
        assert!(cs.num_constraints() > 256);
    }

    #[test]
    // "I know the 64-bit limbs of a public 256-bit integer"
    fn groth16_ok() {
        let rng = &mut rand::thread_rng();

        #[derive(Clone)]
        struct Decomposition {
            x: Option<Fr>,
        }

        impl ConstraintSynthesizer<Fr> for Decomposition {
            fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
                let x = FpVar::new_input(cs, || self.x.get())?;
                LimbDecomposer::decompose(&x, 128, 64).map(|_| ())
            }
        }

        let params =
            generate_random_parameters::<Bls12_377, _, _>(Decomposition { x: None }, rng).unwrap();

        let x = Fr::from(rng.gen::<u128>());
        let circuit = Decomposition { x: Some(x) };

        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.clone().generate_constraints(cs.clone()).unwrap();
        print_unsatisfied_constraints(cs.clone());
        assert!(cs.is_satisfied().unwrap());

        let proof = create_random_proof(circuit, &params, rng).unwrap();
        let pvk = prepare_verifying_key(&params.vk);
        assert!(verify_proof(&pvk, &proof, &[x]).unwrap());
        assert!(!verify_proof(&pvk, &proof, &[x + Fr::one()]).unwrap());
    }
}
