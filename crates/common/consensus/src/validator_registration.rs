use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

use crate::pubkey::PubKey;

/// Registration message a validator signs for the external block builder
/// network.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, TreeHash)]
pub struct ValidatorRegistration {
    pub fee_recipient: Address,
    #[serde(with = "serde_utils::quoted_u64")]
    pub gas_limit: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub timestamp: u64,
    pub pubkey: PubKey,
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use tree_hash::TreeHash;

    use super::*;
    use crate::merkle;

    #[test]
    fn test_container_root_is_a_four_leaf_tree() {
        let registration: ValidatorRegistration = serde_json::from_str(
            r#"{
              "fee_recipient": "0x6d904aac9d4e19fd98e5eef1444f0f2b9b52b2b7",
              "gas_limit": "30000000",
              "timestamp": "1743491120",
              "pubkey": "0x85f6ca2ddc3981058bbe6c8ee489bda3c0d1cfd26aab7fe7ebd40d903e98c52d3589b9a2d8c4ffc305d53819f30c5f37"
            }"#,
        )
        .unwrap();

        let mut fee_chunk = [0u8; 32];
        fee_chunk[..20].copy_from_slice(registration.fee_recipient.as_slice());

        let expected = merkle::merkleize_chunks(&[
            B256::from(fee_chunk),
            merkle::uint64_root(registration.gas_limit),
            merkle::uint64_root(registration.timestamp),
            merkle::bytes_vector_root(&registration.pubkey.inner),
        ]);

        assert_eq!(expected, registration.tree_hash_root());
    }
}
