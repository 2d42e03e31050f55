pub mod aggregate_and_proof;
pub mod attestation;
pub mod attestation_data;
pub mod beacon_block_header;
pub mod checkpoint;
pub mod deposit_message;
pub mod fork;
pub mod fork_data;
pub mod merkle;
pub mod misc;
pub mod primitives;
pub mod pubkey;
pub mod signature;
pub mod signing_data;
pub mod sync_committee;
pub mod validator_registration;
pub mod voluntary_exit;
