use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use ssz::{Decode as _, Encode as _};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, BitList, BitVector};
use tree_hash_derive::TreeHash;

use crate::{attestation_data::AttestationData, signature::BlsSignature};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Attestation {
    pub aggregation_bits: BitList<typenum::U2048>,
    pub data: AttestationData,
    pub signature: BlsSignature,
}

/// Attestation shape introduced in Electra: ``committee_bits`` joins the
/// container and ``aggregation_bits`` spans every committee of the slot.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ElectraAttestation {
    pub aggregation_bits: BitList<typenum::U131072>,
    pub data: AttestationData,
    pub signature: BlsSignature,
    #[serde(default)]
    pub committee_bits: Option<BitVector<typenum::U64>>,
}

impl ElectraAttestation {
    /// Electra aggregates must carry their committee bitvector even though
    /// the aggregation proof signs the pre-Electra attestation shape.
    pub fn committee_bits(&self) -> anyhow::Result<&BitVector<typenum::U64>> {
        self.committee_bits
            .as_ref()
            .ok_or_else(|| anyhow!("attestation.committee_bits must be specified for ELECTRA/FULU"))
    }

    /// Reinterpret as the phase0 container, the form whose root every
    /// aggregation proof is computed over.
    pub fn to_phase0(&self) -> anyhow::Result<Attestation> {
        let aggregation_bits = BitList::from_ssz_bytes(&self.aggregation_bits.as_ssz_bytes())
            .map_err(|err| anyhow!("aggregation_bits do not fit a phase0 attestation: {err:?}"))?;
        Ok(Attestation {
            aggregation_bits,
            data: self.data.clone(),
            signature: self.signature.clone(),
        })
    }
}
