use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, SynthesisMode};
use std::env;
use tmlc_snark::{CPField, CircuitConfig, LightClientCircuit};

fn main() {
    env_logger::init();

    let mut args = env::args();
    args.next().unwrap(); // discard the program name
    let num_validators = args
        .next()
        .expect("num validators was expected")
        .parse()
        .expect("NaN");

    let config = CircuitConfig::new(num_validators);
    config.validate().expect("invalid circuit config");

    let cs = ConstraintSystem::<CPField>::new_ref();
    cs.set_mode(SynthesisMode::Setup);
    LightClientCircuit::empty(config)
        .generate_constraints(cs.clone())
        .unwrap();

    println!(
        "Number of constraints for {} validators (quorum {}/{}): {}, public inputs: {}",
        num_validators,
        config.quorum.numerator(),
        config.quorum.denominator(),
        cs.num_constraints(),
        cs.num_instance_variables() - 1,
    );
}
