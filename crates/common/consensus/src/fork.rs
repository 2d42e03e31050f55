use alloy_primitives::{aliases::B32, B256};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Fork {
    pub previous_version: B32,
    pub current_version: B32,
    #[serde(with = "serde_utils::quoted_u64")]
    pub epoch: u64,
}

/// Fork schedule context supplied with every signing request that needs a
/// fork-aware domain.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct ForkInfo {
    pub fork: Fork,
    pub genesis_validators_root: B256,
}

impl ForkInfo {
    /// Fork version in force at ``epoch``.
    pub fn fork_version_at(&self, epoch: u64) -> B32 {
        if epoch < self.fork.epoch {
            self.fork.previous_version
        } else {
            self.fork.current_version
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_primitives::hex::FromHex;

    use super::*;

    #[test]
    fn test_fork_version_selection() {
        let fork_info = ForkInfo {
            fork: Fork {
                previous_version: B32::from_hex("0x00000001").unwrap(),
                current_version: B32::from_hex("0x00000002").unwrap(),
                epoch: 10,
            },
            genesis_validators_root: B256::ZERO,
        };

        assert_eq!(
            fork_info.fork_version_at(9),
            B32::from_hex("0x00000001").unwrap()
        );
        assert_eq!(
            fork_info.fork_version_at(10),
            B32::from_hex("0x00000002").unwrap()
        );
        assert_eq!(
            fork_info.fork_version_at(11),
            B32::from_hex("0x00000002").unwrap()
        );
    }

    #[test]
    fn test_fork_info_json() {
        let fork_info: ForkInfo = serde_json::from_str(
            r#"{
              "fork": {
                "previous_version": "0x00000001",
                "current_version": "0x00000001",
                "epoch": "1"
              },
              "genesis_validators_root": "0x04700007fabc8282644aed6d1c7c9e21d38a03a0c4ba193f3afe428824b3a673"
            }"#,
        )
        .unwrap();

        assert_eq!(fork_info.fork.epoch, 1);
        assert_eq!(
            fork_info.genesis_validators_root,
            B256::from_str("0x04700007fabc8282644aed6d1c7c9e21d38a03a0c4ba193f3afe428824b3a673")
                .unwrap()
        );
    }
}
