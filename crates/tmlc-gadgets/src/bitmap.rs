use crate::LimbDecomposer;
use ark_ff::{FpParameters, PrimeField};
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::SynthesisError;
use tracing::{debug, trace};

/// Voting power accounting over a participation bitmap
pub trait VotingPower<F: PrimeField> {
    /// Returns the sum of the powers whose bit is set
    fn participating_power(&self, powers: &[FpVar<F>]) -> Result<FpVar<F>, SynthesisError>;

    /// Enforces `participating * denominator >= total * numerator` and `total != 0`.
    ///
    /// Every power must already be constrained below `2^power_bits`.
    fn enforce_quorum(
        &self,
        powers: &[FpVar<F>],
        numerator: u64,
        denominator: u64,
        power_bits: usize,
    ) -> Result<(), SynthesisError>;
}

impl<F: PrimeField> VotingPower<F> for [Boolean<F>] {
    /// # Panics
    /// If the bitmap and the powers have different lengths
    #[tracing::instrument(target = "r1cs")]
    fn participating_power(&self, powers: &[FpVar<F>]) -> Result<FpVar<F>, SynthesisError> {
        assert_eq!(self.len(), powers.len());
        let mut participating = FpVar::zero();
        for (bit, power) in self.iter().zip(powers) {
            participating += bit.select(power, &FpVar::zero())?;
        }
        Ok(participating)
    }

    /// # Panics
    /// If the bitmap and the powers have different lengths, if the fraction is not in `(0, 1]`,
    /// or if the products could reach the field capacity
    #[tracing::instrument(target = "r1cs")]
    fn enforce_quorum(
        &self,
        powers: &[FpVar<F>],
        numerator: u64,
        denominator: u64,
        power_bits: usize,
    ) -> Result<(), SynthesisError> {
        assert!(
            numerator > 0 && numerator <= denominator,
            "quorum fraction must be in (0, 1]"
        );
        // both sides are below n * 2^power_bits * 2^64
        let count_bits = 64 - (self.len() as u64).leading_zeros() as usize;
        let range_bits = power_bits + count_bits + 64;
        assert!(
            range_bits < F::Params::CAPACITY as usize,
            "quorum products do not fit in the field"
        );

        let total = powers.iter().fold(FpVar::zero(), |acc, power| acc + power);
        if total.is_constant() {
            total.enforce_not_equal(&FpVar::zero())?;
        } else {
            // a zero total leaves no inverse, so the product cannot be one
            let inverse = FpVar::new_witness(total.cs(), || {
                Ok(total.value()?.inverse().unwrap_or_else(F::zero))
            })?;
            total.mul_equals(&inverse, &FpVar::one())?;
        }

        let participating = self.participating_power(powers)?;
        trace!(range_bits, "enforcing quorum");
        if let (Ok(p), Ok(t)) = (participating.value(), total.value()) {
            debug!(participating = %p, total = %t, numerator, denominator, "quorum check");
        }

        let lhs = participating * F::from(denominator);
        let rhs = total * F::from(numerator);
        LimbDecomposer::enforce_geq(&lhs, &rhs, range_bits)
    }
}
