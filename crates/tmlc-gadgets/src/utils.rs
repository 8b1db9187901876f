use ark_ff::PrimeField;
use ark_r1cs_std::{boolean::Boolean, uint8::UInt8};

/// Packs little-endian bits into little-endian bytes.
///
/// # Panics
/// If the number of bits is not a multiple of 8
pub fn bits_le_to_bytes_le<F: PrimeField>(bits: &[Boolean<F>]) -> Vec<UInt8<F>> {
    assert_eq!(bits.len() % 8, 0, "bits do not fill whole bytes");
    bits.chunks(8).map(UInt8::from_bits_le).collect()
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use ark_ff::Field;
    use ark_relations::r1cs::{ConstraintLayer, ConstraintSystemRef, TracingMode};
    use tracing_subscriber::layer::SubscriberExt;

    /// Prints the name of the first unsatisfied constraint, if any
    pub fn print_unsatisfied_constraints<F: Field>(cs: ConstraintSystemRef<F>) {
        if let Ok(Some(name)) = cs.which_is_unsatisfied() {
            println!("unsatisfied: {}", name);
        }
    }

    /// Runs `f` with a subscriber which records the namespaces of every
    /// constraint, so that unsatisfied constraints can be traced back to their gadget
    pub fn run_profile_constraints<T>(f: impl FnOnce() -> T) -> T {
        let mut layer = ConstraintLayer::default();
        layer.mode = TracingMode::OnlyConstraints;
        let subscriber = tracing_subscriber::Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, f)
    }
}
