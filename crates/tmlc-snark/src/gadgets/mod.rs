mod validators;
pub use validators::{ValidatorSetVerifier, ValidatorVar, POWER_BITS};

mod quorum;
pub use quorum::QuorumSignatureVerifier;

mod light_client;
pub use light_client::{BlsGadget, LightClientCircuit, LightClientWitness};
