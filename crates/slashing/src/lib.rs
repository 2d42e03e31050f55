//! At-most-once protection for proposer and attester signatures.
//!
//! The store records every `(validator_pubkey, signing_root)` pair that has
//! been signed; the pair is the unique constraint and the insert primitive
//! is atomic, so of two concurrent identical requests at most one observes
//! a fresh insert.

use thiserror::Error;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, SCHEMA};

pub const VALIDATOR_PUBKEY_LEN: usize = 48;
pub const SIGNING_ROOT_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectedKind {
    Attestation,
    Block,
}

impl ProtectedKind {
    pub fn table(&self) -> &'static str {
        match self {
            ProtectedKind::Attestation => "signed_attestations",
            ProtectedKind::Block => "signed_blocks",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProtectedKind::Attestation => "attestation",
            ProtectedKind::Block => "block",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid validator pubkey length: got {0}, want 48")]
    InvalidPubkeyLength(usize),
    #[error("invalid signing root length: got {0}, want 32")]
    InvalidRootLength(usize),
    #[error("slashing database: {0}")]
    Database(#[from] rusqlite::Error),
}

pub trait SlashingStore: Send + Sync {
    /// `true` iff no record exists for the pair.
    fn can_sign(
        &self,
        kind: ProtectedKind,
        validator_pubkey: &[u8],
        signing_root: &[u8],
    ) -> Result<bool, StoreError>;

    /// Record the pair. `true` iff the record is new; an existing record is
    /// left untouched.
    fn try_insert(
        &self,
        kind: ProtectedKind,
        validator_pubkey: &[u8],
        signing_root: &[u8],
    ) -> Result<bool, StoreError>;
}

pub(crate) fn check_lengths(
    validator_pubkey: &[u8],
    signing_root: &[u8],
) -> Result<(), StoreError> {
    if validator_pubkey.len() != VALIDATOR_PUBKEY_LEN {
        return Err(StoreError::InvalidPubkeyLength(validator_pubkey.len()));
    }
    if signing_root.len() != SIGNING_ROOT_LEN {
        return Err(StoreError::InvalidRootLength(signing_root.len()));
    }
    Ok(())
}
