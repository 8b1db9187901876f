use ark_bw6_761::Fr;
use ark_ff::{FpParameters, PrimeField};
use thiserror::Error;
use tmlc_gadgets::DEFAULT_LIMB_BITS;

/// Width of the public message coordinates produced by `hash_to_field`
pub const DEFAULT_MESSAGE_BITS: usize = tmlc_crypto::MESSAGE_BITS;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Rejected circuit parameters
pub enum ConfigError {
    #[error("quorum fraction {numerator}/{denominator} is not in (0, 1]")]
    InvalidQuorum { numerator: u64, denominator: u64 },
    #[error("the validator set must not be empty")]
    NoValidators,
    #[error("limb width {limb_bits} must be between 1 and the message width {message_bits}")]
    InvalidLimbWidth { limb_bits: usize, message_bits: usize },
    #[error("message width {message_bits} exceeds the field capacity {capacity}")]
    MessageTooWide { message_bits: usize, capacity: usize },
    #[error("expected {expected} validators, got {actual}")]
    ValidatorCount { expected: usize, actual: usize },
    #[error("bitmap has {actual} entries for {expected} validators")]
    BitmapLength { expected: usize, actual: usize },
}

/// The share of the total voting power which must sign a commit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuorumFraction {
    numerator: u64,
    denominator: u64,
}

impl Default for QuorumFraction {
    fn default() -> Self {
        Self::TWO_THIRDS
    }
}

impl QuorumFraction {
    pub const TWO_THIRDS: Self = QuorumFraction {
        numerator: 2,
        denominator: 3,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ConfigError> {
        if numerator == 0 || numerator > denominator {
            return Err(ConfigError::InvalidQuorum {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Smallest participating power which meets the quorum, `ceil(total * num / den)`
    pub fn threshold(&self, total: u128) -> u128 {
        let (num, den) = (self.numerator as u128, self.denominator as u128);
        // split so that neither product overflows
        let (q, r) = (total / den, total % den);
        q * num + (r * num + den - 1) / den
    }

    /// `participating * den >= total * num`, for a non-zero total
    pub fn is_met(&self, participating: u128, total: u128) -> bool {
        total != 0 && participating >= self.threshold(total)
    }
}

/// Shape of a light client circuit. Every instance with the same config produces the same
/// constraint system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitConfig {
    pub num_validators: usize,
    pub quorum: QuorumFraction,
    /// Width of each message limb
    pub limb_bits: usize,
    /// Each public message coordinate must be below `2^message_bits`
    pub message_bits: usize,
}

impl CircuitConfig {
    /// A config with a 2/3 quorum, 64-bit limbs and 256-bit message coordinates
    pub fn new(num_validators: usize) -> Self {
        Self {
            num_validators,
            quorum: QuorumFraction::default(),
            limb_bits: DEFAULT_LIMB_BITS,
            message_bits: DEFAULT_MESSAGE_BITS,
        }
    }

    pub fn with_quorum(mut self, quorum: QuorumFraction) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn with_limb_bits(mut self, limb_bits: usize) -> Self {
        self.limb_bits = limb_bits;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        QuorumFraction::new(self.quorum.numerator, self.quorum.denominator)?;
        if self.num_validators == 0 {
            return Err(ConfigError::NoValidators);
        }
        let capacity = <Fr as PrimeField>::Params::CAPACITY as usize;
        if self.message_bits > capacity {
            return Err(ConfigError::MessageTooWide {
                message_bits: self.message_bits,
                capacity,
            });
        }
        if self.limb_bits == 0 || self.limb_bits > self.message_bits {
            return Err(ConfigError::InvalidLimbWidth {
                limb_bits: self.limb_bits,
                message_bits: self.message_bits,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_thirds_threshold_is_the_ceiling() {
        let q = QuorumFraction::TWO_THIRDS;
        assert_eq!(q.threshold(3), 2);
        assert_eq!(q.threshold(10), 7);
        assert_eq!(q.threshold(36), 24);
        assert!(q.is_met(7, 10));
        assert!(!q.is_met(6, 10));
        assert!(!q.is_met(0, 0));
    }

    #[test]
    fn threshold_does_not_overflow() {
        let q = QuorumFraction::new(u64::MAX - 1, u64::MAX).unwrap();
        let total = u64::MAX as u128 * 1000;
        assert_eq!(q.threshold(total), total - 1000);
        assert_eq!(QuorumFraction::new(1, 1).unwrap().threshold(total), total);
    }

    #[test]
    fn rejects_invalid_fractions() {
        assert!(QuorumFraction::new(0, 3).is_err());
        assert!(QuorumFraction::new(4, 3).is_err());
        assert!(QuorumFraction::new(3, 3).is_ok());
    }

    #[test]
    fn validates_widths() {
        assert!(CircuitConfig::new(4).validate().is_ok());
        assert_eq!(
            CircuitConfig::new(0).validate(),
            Err(ConfigError::NoValidators)
        );
        assert!(matches!(
            CircuitConfig::new(4).with_limb_bits(0).validate(),
            Err(ConfigError::InvalidLimbWidth { .. })
        ));
        assert!(matches!(
            CircuitConfig::new(4).with_limb_bits(257).validate(),
            Err(ConfigError::InvalidLimbWidth { .. })
        ));
        let mut wide = CircuitConfig::new(4);
        wide.message_bits = 377;
        assert!(matches!(
            wide.validate(),
            Err(ConfigError::MessageTooWide { .. })
        ));
    }
}
