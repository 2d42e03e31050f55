use std::path::PathBuf;

use thiserror::Error;

pub mod key_config;
pub mod registry;

pub use registry::{KeyRegistry, ValidatorKey};

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path} as yaml/json: {source}")]
    KeyConfig {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("unsupported keystore type {kind:?} in {path}")]
    UnsupportedConfigType { kind: String, path: PathBuf },
    #[error("unsupported keyType {kind:?} in {path} (only BLS supported)")]
    UnsupportedKeyType { kind: String, path: PathBuf },
    #[error("invalid privateKey in {path}: {message}")]
    InvalidSecret { path: PathBuf, message: String },
    #[error("{field} is empty in file-keystore config {path}")]
    MissingConfigField {
        field: &'static str,
        path: PathBuf,
    },
    #[error("decrypting keystore {path}: {message}")]
    Decrypt { path: PathBuf, message: String },
    #[error("invalid BLS secret key: {0}")]
    InvalidKey(String),
}
