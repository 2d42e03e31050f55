use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

use crate::{
    attestation::{Attestation, ElectraAttestation},
    signature::BlsSignature,
};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct AggregateAndProof {
    #[serde(with = "serde_utils::quoted_u64")]
    pub aggregator_index: u64,
    pub aggregate: Attestation,
    pub selection_proof: BlsSignature,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ElectraAggregateAndProof {
    #[serde(with = "serde_utils::quoted_u64")]
    pub aggregator_index: u64,
    pub aggregate: ElectraAttestation,
    pub selection_proof: BlsSignature,
}

impl ElectraAggregateAndProof {
    /// The pre-Electra proof shape over the same aggregate: the object every
    /// aggregation-proof signature commits to, whatever the wire version.
    pub fn to_phase0(&self) -> anyhow::Result<AggregateAndProof> {
        Ok(AggregateAndProof {
            aggregator_index: self.aggregator_index,
            aggregate: self.aggregate.to_phase0()?,
            selection_proof: self.selection_proof.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tree_hash::TreeHash;

    use super::*;
    use crate::merkle;

    #[test]
    fn test_v1_container_root_matches_chunked_merkleization() {
        let aggregate_and_proof: AggregateAndProof = serde_json::from_str(
            r#"{
              "aggregator_index": "1",
              "aggregate": {
                "aggregation_bits": "0x00000101",
                "data": {
                  "slot": "0",
                  "index": "0",
                  "beacon_block_root": "0x100814c335d0ced5014cfa9d2e375e6d9b4e197381f8ce8af0473200fdc917fd",
                  "source": {"epoch": "0", "root": "0x0000000000000000000000000000000000000000000000000000000000000000"},
                  "target": {"epoch": "0", "root": "0x100814c335d0ced5014cfa9d2e375e6d9b4e197381f8ce8af0473200fdc917fd"}
                },
                "signature": "0xa627242e4a5853708f4ebf923960fb8192f93f2233cd347e05239d86dd9fb66b721ceec1baeae6647f498c9126074f1101a87854d674b6eebc220fd8c3d8405bdfd8e286b707975d9e00a56ec6cbbf762f23607d490f0bbb16c3e0e483d51875"
              },
              "selection_proof": "0xa63f73a03f1f42b1fd0a988b614d511eb346d0a91c809694ef76df5ae021f0f144d64e612d735bc8820950cf6f7f84cd0ae194bfe3d4242fe79688f83462e3f69d9d33de71aab0721b7dab9d6960875e5fdfd26b171a75fb51af822043820c47"
            }"#,
        )
        .unwrap();

        let expected = merkle::merkleize_chunks(&[
            merkle::uint64_root(aggregate_and_proof.aggregator_index),
            aggregate_and_proof.aggregate.tree_hash_root(),
            merkle::bytes_vector_root(&aggregate_and_proof.selection_proof.signature),
        ]);
        assert_eq!(expected, aggregate_and_proof.tree_hash_root());
    }
}
