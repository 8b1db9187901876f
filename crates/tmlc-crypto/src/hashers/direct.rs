use super::Hasher;
use crate::BLSError;

use blake2s_simd::Params;

/// Blake2s for the CRH and a Blake2Xs construction for the XOF
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectHasher;

const BLAKE2S_OUT_LEN: usize = 32;

/// The node offset of each Blake2Xs chunk carries its index in the low 32 bits and the total
/// output length above them
fn xof_node_offset(index: u32, xof_digest_length: u16) -> u64 {
    u64::from(index) | (u64::from(xof_digest_length) << 32)
}

fn check_domain(domain: &[u8]) -> Result<(), BLSError> {
    if domain.len() > 8 {
        return Err(BLSError::DomainTooLarge(domain.len()));
    }
    Ok(())
}

impl Hasher for DirectHasher {
    type Error = BLSError;

    fn crh(&self, domain: &[u8], message: &[u8], _: usize) -> Result<Vec<u8>, Self::Error> {
        check_domain(domain)?;
        let hash = Params::new()
            .hash_length(BLAKE2S_OUT_LEN)
            .personal(domain)
            .to_state()
            .update(message)
            .finalize();
        Ok(hash.as_bytes().to_vec())
    }

    fn xof(
        &self,
        domain: &[u8],
        hashed_message: &[u8],
        xof_digest_length: usize,
    ) -> Result<Vec<u8>, Self::Error> {
        check_domain(domain)?;
        if xof_digest_length > u16::MAX as usize {
            return Err(BLSError::HashingError(format!(
                "xof output of {} bytes is too long",
                xof_digest_length
            )));
        }

        let num_hashes = (xof_digest_length + BLAKE2S_OUT_LEN - 1) / BLAKE2S_OUT_LEN;
        let mut result = Vec::with_capacity(xof_digest_length);
        for i in 0..num_hashes {
            let hash_length = if i == num_hashes - 1 && xof_digest_length % BLAKE2S_OUT_LEN != 0 {
                xof_digest_length % BLAKE2S_OUT_LEN
            } else {
                BLAKE2S_OUT_LEN
            };
            let hash = Params::new()
                .hash_length(hash_length)
                .max_leaf_length(BLAKE2S_OUT_LEN as u32)
                .inner_hash_length(BLAKE2S_OUT_LEN)
                .fanout(0)
                .max_depth(0)
                .personal(domain)
                .node_offset(xof_node_offset(i as u32, xof_digest_length as u16))
                .to_state()
                .update(hashed_message)
                .finalize();
            result.extend_from_slice(hash.as_bytes());
        }

        Ok(result)
    }
}
