//! The signing-request envelope: one artifact-type tag plus the sub-payload
//! that type requires.

use alloy_primitives::{aliases::B32, B256};
use remsig_consensus::{
    aggregate_and_proof::{AggregateAndProof, ElectraAggregateAndProof},
    attestation_data::AttestationData,
    beacon_block_header::{BeaconBlock, BeaconBlockHeader},
    deposit_message::DepositMessage,
    fork::ForkInfo,
    pubkey::PubKey,
    sync_committee::{ContributionAndProof, SyncAggregatorSelectionData},
    validator_registration::ValidatorRegistration,
    voluntary_exit::VoluntaryExit,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactType {
    Attestation,
    BlockV2,
    AggregationSlot,
    AggregateAndProof,
    AggregateAndProofV2,
    VoluntaryExit,
    RandaoReveal,
    SyncCommitteeMessage,
    SyncCommitteeSelectionProof,
    SyncCommitteeContributionAndProof,
    Deposit,
    ValidatorRegistration,
}

impl ArtifactType {
    /// Artifact tokens are matched exactly; anything else is unsupported.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "ATTESTATION" => Some(Self::Attestation),
            "BLOCK_V2" => Some(Self::BlockV2),
            "AGGREGATION_SLOT" => Some(Self::AggregationSlot),
            "AGGREGATE_AND_PROOF" => Some(Self::AggregateAndProof),
            "AGGREGATE_AND_PROOF_V2" => Some(Self::AggregateAndProofV2),
            "VOLUNTARY_EXIT" => Some(Self::VoluntaryExit),
            "RANDAO_REVEAL" => Some(Self::RandaoReveal),
            "SYNC_COMMITTEE_MESSAGE" => Some(Self::SyncCommitteeMessage),
            "SYNC_COMMITTEE_SELECTION_PROOF" => Some(Self::SyncCommitteeSelectionProof),
            "SYNC_COMMITTEE_CONTRIBUTION_AND_PROOF" => {
                Some(Self::SyncCommitteeContributionAndProof)
            }
            "DEPOSIT" => Some(Self::Deposit),
            "VALIDATOR_REGISTRATION" => Some(Self::ValidatorRegistration),
            _ => None,
        }
    }

    /// Deposits and builder registrations derive their domain without a fork
    /// schedule; everything else needs `fork_info`.
    pub fn requires_fork_info(&self) -> bool {
        !matches!(self, Self::Deposit | Self::ValidatorRegistration)
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(rename = "signingRoot", default)]
    pub signing_root: Option<B256>,
    #[serde(default, alias = "forkInfo")]
    pub fork_info: Option<ForkInfo>,
    #[serde(default)]
    pub attestation: Option<AttestationData>,
    #[serde(default)]
    pub beacon_block: Option<BlockRequest>,
    #[serde(default)]
    pub aggregation_slot: Option<AggregationSlot>,
    #[serde(default)]
    pub aggregate_and_proof: Option<AggregateAndProofRequest>,
    #[serde(default)]
    pub voluntary_exit: Option<VoluntaryExit>,
    #[serde(default)]
    pub randao_reveal: Option<RandaoReveal>,
    #[serde(default)]
    pub sync_committee_message: Option<SyncCommitteeMessage>,
    #[serde(default)]
    pub sync_aggregator_selection_data: Option<SyncAggregatorSelectionData>,
    #[serde(default)]
    pub contribution_and_proof: Option<ContributionAndProof>,
    #[serde(default)]
    pub deposit: Option<DepositRequest>,
    #[serde(default)]
    pub validator_registration: Option<ValidatorRegistration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationSlot {
    #[serde(with = "serde_utils::quoted_u64")]
    pub slot: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandaoReveal {
    #[serde(with = "serde_utils::quoted_u64")]
    pub epoch: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncCommitteeMessage {
    pub beacon_block_root: B256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub slot: u64,
}

/// Versioned block payload: phase0/altair requests carry the block itself,
/// Bellatrix and later carry the block header.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockRequest {
    pub version: String,
    #[serde(default)]
    pub block: Option<BeaconBlock>,
    #[serde(default)]
    pub block_header: Option<BeaconBlockHeader>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepositRequest {
    pub pubkey: PubKey,
    pub withdrawal_credentials: B256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
    pub genesis_fork_version: B32,
}

impl DepositRequest {
    pub fn message(&self) -> DepositMessage {
        DepositMessage {
            pubkey: self.pubkey,
            withdrawal_credentials: self.withdrawal_credentials,
            amount: self.amount,
        }
    }
}

/// The `aggregate_and_proof` field accepts the legacy flat payload as well
/// as the versioned `{version, data}` form used by V2 requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AggregateAndProofRequest {
    Versioned {
        version: String,
        data: ElectraAggregateAndProof,
    },
    Legacy(AggregateAndProof),
}
