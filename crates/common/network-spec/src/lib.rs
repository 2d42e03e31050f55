//! Named chain presets and the spec-file loader.
//!
//! A spec file is JSON with a `data` object whose values are strings (or
//! bare numbers) keyed by the upper-snake constant names used by the
//! consensus configs.

use std::{fs, path::Path};

use alloy_primitives::{aliases::B32, hex};
use serde::Deserialize;
use thiserror::Error;

const MAINNET_PRESET: &str = include_str!("../presets/mainnet.json");
const HOODI_PRESET: &str = include_str!("../presets/hoodi.json");

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("invalid chain {0:?} (allowed: mainnet|hoodi|custom)")]
    UnknownChain(String),
    #[error("custom network requires a spec path")]
    MissingSpecPath,
    #[error("read spec file {path:?}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parse spec json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing key {0:?} in spec file")]
    MissingKey(&'static str),
    #[error("key {key:?}: {message}")]
    InvalidValue {
        key: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSpec {
    pub domain_application_mask: B32,
    pub domain_beacon_attester: B32,
    pub domain_beacon_proposer: B32,
    pub domain_selection_proof: B32,
    pub domain_aggregate_and_proof: B32,
    pub domain_voluntary_exit: B32,
    pub domain_randao: B32,
    pub domain_sync_committee: B32,
    pub domain_sync_committee_selection_proof: B32,
    pub domain_contribution_and_proof: B32,
    pub domain_deposit: B32,
    pub slots_per_epoch: u64,
    pub genesis_fork_version: B32,
    pub electra_fork_epoch: u64,
}

#[derive(Deserialize)]
struct SpecFile {
    data: serde_json::Map<String, serde_json::Value>,
}

impl ChainSpec {
    /// Resolve a named chain, or a custom spec file when `chain` is
    /// `custom`. An empty name defaults to mainnet.
    pub fn load(chain: &str, custom_spec_path: Option<&Path>) -> Result<Self, SpecError> {
        match chain.trim().to_lowercase().as_str() {
            "" | "mainnet" => Self::from_json(MAINNET_PRESET),
            "hoodi" => Self::from_json(HOODI_PRESET),
            "custom" => {
                let path = custom_spec_path.ok_or(SpecError::MissingSpecPath)?;
                Self::from_file(path)
            }
            other => Err(SpecError::UnknownChain(other.to_string())),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SpecError> {
        let raw = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    fn from_json(raw: &str) -> Result<Self, SpecError> {
        let spec_file: SpecFile = serde_json::from_str(raw)?;
        let data = &spec_file.data;

        Ok(Self {
            domain_application_mask: spec_b32(data, "DOMAIN_APPLICATION_MASK")?,
            domain_beacon_attester: spec_b32(data, "DOMAIN_BEACON_ATTESTER")?,
            domain_beacon_proposer: spec_b32(data, "DOMAIN_BEACON_PROPOSER")?,
            domain_selection_proof: spec_b32(data, "DOMAIN_SELECTION_PROOF")?,
            domain_aggregate_and_proof: spec_b32(data, "DOMAIN_AGGREGATE_AND_PROOF")?,
            domain_voluntary_exit: spec_b32(data, "DOMAIN_VOLUNTARY_EXIT")?,
            domain_randao: spec_b32(data, "DOMAIN_RANDAO")?,
            domain_sync_committee: spec_b32(data, "DOMAIN_SYNC_COMMITTEE")?,
            domain_sync_committee_selection_proof: spec_b32(
                data,
                "DOMAIN_SYNC_COMMITTEE_SELECTION_PROOF",
            )?,
            domain_contribution_and_proof: spec_b32(data, "DOMAIN_CONTRIBUTION_AND_PROOF")?,
            domain_deposit: spec_b32(data, "DOMAIN_DEPOSIT")?,
            slots_per_epoch: spec_u64(data, "SLOTS_PER_EPOCH")?,
            genesis_fork_version: spec_b32(data, "GENESIS_FORK_VERSION")?,
            electra_fork_epoch: spec_u64(data, "ELECTRA_FORK_EPOCH")?,
        })
    }

    /// Return the epoch number at ``slot``.
    pub fn epoch_at_slot(&self, slot: u64) -> u64 {
        slot / self.slots_per_epoch
    }
}

fn spec_string(
    data: &serde_json::Map<String, serde_json::Value>,
    key: &'static str,
) -> Result<String, SpecError> {
    match data.get(key) {
        None => Err(SpecError::MissingKey(key)),
        Some(serde_json::Value::String(value)) => Ok(value.clone()),
        Some(value) => Ok(value.to_string()),
    }
}

fn spec_u64(
    data: &serde_json::Map<String, serde_json::Value>,
    key: &'static str,
) -> Result<u64, SpecError> {
    let value = spec_string(data, key)?;
    value
        .trim()
        .parse::<u64>()
        .map_err(|err| SpecError::InvalidValue {
            key,
            message: format!("parse uint from {value:?}: {err}"),
        })
}

/// Parse a 4-byte constant, tolerating a missing `0x` prefix and short
/// values, which are left-padded with zeroes.
fn spec_b32(
    data: &serde_json::Map<String, serde_json::Value>,
    key: &'static str,
) -> Result<B32, SpecError> {
    let value = spec_string(data, key)?;
    let nibbles = value
        .trim()
        .to_lowercase()
        .trim_start_matches("0x")
        .to_string();
    if nibbles.len() > 8 {
        return Err(SpecError::InvalidValue {
            key,
            message: format!("expected 4 bytes hex, got {value:?}"),
        });
    }
    let padded = format!("{nibbles:0>8}");
    let bytes = hex::decode(&padded).map_err(|err| SpecError::InvalidValue {
        key,
        message: format!("decode hex {value:?}: {err}"),
    })?;
    Ok(B32::from_slice(&bytes))
}
