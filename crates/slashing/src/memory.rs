use std::collections::HashSet;

use parking_lot::RwLock;

use crate::{check_lengths, ProtectedKind, SlashingStore, StoreError};

type Record = (Vec<u8>, Vec<u8>);

/// In-memory store for tests and ephemeral runs. Records are lost on
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    attestations: RwLock<HashSet<Record>>,
    blocks: RwLock<HashSet<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self, kind: ProtectedKind) -> &RwLock<HashSet<Record>> {
        match kind {
            ProtectedKind::Attestation => &self.attestations,
            ProtectedKind::Block => &self.blocks,
        }
    }
}

impl SlashingStore for MemoryStore {
    fn can_sign(
        &self,
        kind: ProtectedKind,
        validator_pubkey: &[u8],
        signing_root: &[u8],
    ) -> Result<bool, StoreError> {
        check_lengths(validator_pubkey, signing_root)?;
        let record = (validator_pubkey.to_vec(), signing_root.to_vec());
        Ok(!self.records(kind).read().contains(&record))
    }

    fn try_insert(
        &self,
        kind: ProtectedKind,
        validator_pubkey: &[u8],
        signing_root: &[u8],
    ) -> Result<bool, StoreError> {
        check_lengths(validator_pubkey, signing_root)?;
        let record = (validator_pubkey.to_vec(), signing_root.to_vec());
        Ok(self.records(kind).write().insert(record))
    }
}
