use std::{collections::HashMap, fmt, fs, path::Path, path::PathBuf};

use blst::min_pk::SecretKey;
use lighthouse_eth2_keystore::Keystore;
use remsig_consensus::{pubkey::PubKey, signature::BlsSignature};
use tracing::debug;

use crate::{key_config::KeyConfig, KeystoreError};

/// Domain separation tag for BLS signatures on G2, hash-to-curve draft 7.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// A validator's in-memory signing key. The secret never leaves this type.
pub struct ValidatorKey {
    public_key: PubKey,
    secret: SecretKey,
}

impl ValidatorKey {
    /// Build a key from the 32-byte big-endian secret scalar.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, KeystoreError> {
        if secret.len() != 32 {
            return Err(KeystoreError::InvalidKey(format!(
                "private key must be 32 bytes, got {}",
                secret.len()
            )));
        }
        let secret = SecretKey::from_bytes(secret)
            .map_err(|err| KeystoreError::InvalidKey(format!("{err:?}")))?;
        let public_key = PubKey::from(secret.sk_to_pk().to_bytes());
        Ok(Self { public_key, secret })
    }

    pub fn sign(&self, message: &[u8]) -> BlsSignature {
        BlsSignature {
            signature: self.secret.sign(message, DST, &[]).to_bytes(),
        }
    }

    pub fn public_key(&self) -> &PubKey {
        &self.public_key
    }
}

impl fmt::Debug for ValidatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorKey")
            .field("public_key", &self.public_key.to_hex())
            .finish_non_exhaustive()
    }
}

/// Process-lifetime map from lowercase pubkey hex to signing key. Built once
/// at startup, read-only afterwards.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: HashMap<String, ValidatorKey>,
}

impl KeyRegistry {
    /// Walk `keystore_dir` and load every key it describes. Plain `*.json`
    /// EIP-2335 keystores take their password from a sibling-named `*.txt`
    /// in `passwords_dir`; `KeyConfig` files carry their own material.
    pub fn load(keystore_dir: &Path, passwords_dir: &Path) -> Result<Self, KeystoreError> {
        let mut registry = Self::default();

        for path in walk_files(keystore_dir)? {
            let raw = fs::read_to_string(&path).map_err(|source| KeystoreError::Io {
                path: path.clone(),
                source,
            })?;

            let extension = path
                .extension()
                .and_then(|extension| extension.to_str())
                .unwrap_or_default()
                .to_lowercase();
            let key = match extension.as_str() {
                "yaml" | "yml" => {
                    let config = serde_yaml::from_str::<KeyConfig>(&raw).map_err(|source| {
                        KeystoreError::KeyConfig {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    Some(load_configured_key(&path, &config)?)
                }
                // A JSON file is either a key config or a bare EIP-2335
                // keystore; the `type` field tells them apart.
                "json" => match serde_yaml::from_str::<KeyConfig>(&raw) {
                    Ok(config) if !config.kind.is_empty() => {
                        Some(load_configured_key(&path, &config)?)
                    }
                    _ => Some(load_encrypted_key(&path, &raw, passwords_dir)?),
                },
                _ => None,
            };

            if let Some(key) = key {
                debug!(pubkey = %key.public_key().to_hex(), path = %path.display(), "validator key loaded");
                registry.insert(key);
            }
        }

        Ok(registry)
    }

    pub fn from_keys(keys: impl IntoIterator<Item = ValidatorKey>) -> Self {
        let mut registry = Self::default();
        for key in keys {
            registry.insert(key);
        }
        registry
    }

    fn insert(&mut self, key: ValidatorKey) {
        self.keys.insert(key.public_key().to_bare_hex(), key);
    }

    /// Look up a key by pubkey hex, tolerating a `0x` prefix and any case.
    pub fn get(&self, pubkey_hex: &str) -> Option<&ValidatorKey> {
        self.keys.get(&normalize_pubkey_hex(pubkey_hex))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub fn normalize_pubkey_hex(pubkey_hex: &str) -> String {
    let trimmed = pubkey_hex.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    trimmed.to_lowercase()
}

fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, KeystoreError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|source| KeystoreError::Io {
            path: current.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| KeystoreError::Io {
                path: current.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn load_configured_key(path: &Path, config: &KeyConfig) -> Result<ValidatorKey, KeystoreError> {
    match config.kind.to_lowercase().as_str() {
        "file-raw" => {
            ensure_bls_key_type(path, config)?;
            let secret_hex = config.private_key.trim();
            let secret_hex = secret_hex.strip_prefix("0x").unwrap_or(secret_hex);
            let secret = alloy_primitives::hex::decode(secret_hex).map_err(|err| {
                KeystoreError::InvalidSecret {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                }
            })?;
            ValidatorKey::from_secret_bytes(&secret)
        }
        "file-keystore" => {
            ensure_bls_key_type(path, config)?;
            if config.keystore_file.is_empty() {
                return Err(KeystoreError::MissingConfigField {
                    field: "keystoreFile",
                    path: path.to_path_buf(),
                });
            }
            if config.keystore_password_file.is_empty() {
                return Err(KeystoreError::MissingConfigField {
                    field: "keystorePasswordFile",
                    path: path.to_path_buf(),
                });
            }

            let keystore_path = PathBuf::from(&config.keystore_file);
            let raw = fs::read_to_string(&keystore_path).map_err(|source| KeystoreError::Io {
                path: keystore_path.clone(),
                source,
            })?;
            let password_path = PathBuf::from(&config.keystore_password_file);
            let password =
                fs::read_to_string(&password_path).map_err(|source| KeystoreError::Io {
                    path: password_path,
                    source,
                })?;

            decrypt_keystore(&keystore_path, &raw, password.trim())
        }
        other => Err(KeystoreError::UnsupportedConfigType {
            kind: other.to_string(),
            path: path.to_path_buf(),
        }),
    }
}

fn ensure_bls_key_type(path: &Path, config: &KeyConfig) -> Result<(), KeystoreError> {
    if config.key_type.to_uppercase() != "BLS" {
        return Err(KeystoreError::UnsupportedKeyType {
            kind: config.key_type.clone(),
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn load_encrypted_key(
    path: &Path,
    raw: &str,
    passwords_dir: &Path,
) -> Result<ValidatorKey, KeystoreError> {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let password_path = passwords_dir.join(format!("{stem}.txt"));
    let password = fs::read_to_string(&password_path).map_err(|source| KeystoreError::Io {
        path: password_path,
        source,
    })?;

    decrypt_keystore(path, raw, password.trim())
}

fn decrypt_keystore(
    path: &Path,
    raw: &str,
    password: &str,
) -> Result<ValidatorKey, KeystoreError> {
    let keystore = Keystore::from_json_str(raw).map_err(|err| KeystoreError::Decrypt {
        path: path.to_path_buf(),
        message: format!("{err:?}"),
    })?;
    let keypair =
        keystore
            .decrypt_keypair(password.as_bytes())
            .map_err(|err| KeystoreError::Decrypt {
                path: path.to_path_buf(),
                message: format!("{err:?}"),
            })?;

    let secret = keypair.sk.serialize();
    ValidatorKey::from_secret_bytes(secret.as_bytes())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use blst::min_pk::PublicKey;

    use super::*;

    // EIP-2335 test secret and its public key.
    const TEST_SECRET: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
    const TEST_PUBKEY: &str = "9612d7a727c9d0a22e185a1c768478dfe919cada9266988cb32359c11f2b7b27f4ae4040902382ae2910c15e2b420d07";

    #[test]
    fn test_pubkey_derivation_known_answer() {
        let secret = alloy_primitives::hex::decode(TEST_SECRET).unwrap();
        let key = ValidatorKey::from_secret_bytes(&secret).unwrap();
        assert_eq!(key.public_key().to_bare_hex(), TEST_PUBKEY);
    }

    #[test]
    fn test_sign_verifies_under_the_public_key() {
        let secret = alloy_primitives::hex::decode(TEST_SECRET).unwrap();
        let key = ValidatorKey::from_secret_bytes(&secret).unwrap();

        let message = [0x42u8; 32];
        let signature = key.sign(&message);

        let public_key = PublicKey::from_bytes(&key.public_key().inner).unwrap();
        let signature =
            blst::min_pk::Signature::from_bytes(&signature.signature).unwrap();
        assert_eq!(
            signature.verify(true, &message, DST, &[], &public_key, true),
            blst::BLST_ERROR::BLST_SUCCESS
        );
    }

    #[test]
    fn test_invalid_secret_lengths_rejected() {
        assert!(ValidatorKey::from_secret_bytes(&[0u8; 31]).is_err());
        assert!(ValidatorKey::from_secret_bytes(&[0u8; 33]).is_err());
    }

    #[test]
    fn test_load_file_raw_config() {
        let keystores = tempfile::tempdir().unwrap();
        let passwords = tempfile::tempdir().unwrap();

        fs::write(
            keystores.path().join("validator.yaml"),
            format!("type: file-raw\nkeyType: BLS\nprivateKey: \"0x{TEST_SECRET}\"\n"),
        )
        .unwrap();

        let registry = KeyRegistry::load(keystores.path(), passwords.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(TEST_PUBKEY).is_some());
        assert!(registry.get(&format!("0x{}", TEST_PUBKEY.to_uppercase())).is_some());
        assert!(registry.get("0xdeadbeef").is_none());
    }

    #[test]
    fn test_load_rejects_non_bls_file_raw() {
        let keystores = tempfile::tempdir().unwrap();
        let passwords = tempfile::tempdir().unwrap();

        fs::write(
            keystores.path().join("validator.yaml"),
            format!("type: file-raw\nkeyType: SECP256K1\nprivateKey: \"0x{TEST_SECRET}\"\n"),
        )
        .unwrap();

        let err = KeyRegistry::load(keystores.path(), passwords.path()).unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedKeyType { .. }));
    }

    // EIP-2335 PBKDF2 test vector; decrypts to TEST_SECRET.
    const TEST_KEYSTORE: &str = r#"{
        "crypto": {
            "kdf": {
                "function": "pbkdf2",
                "params": {
                    "dklen": 32,
                    "c": 262144,
                    "prf": "hmac-sha256",
                    "salt": "d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
                },
                "message": ""
            },
            "checksum": {
                "function": "sha256",
                "params": {},
                "message": "8a9f5d9912ed7e75ea794bc5a89bca5f193721d30868ade6f73043c6ea6febf1"
            },
            "cipher": {
                "function": "aes-128-ctr",
                "params": {
                    "iv": "264daa3f303d7259501c93d997d84fe6"
                },
                "message": "cee03fde2af33149775b7223e7845e4fb2c8ae1792e5f99fe9ecf474cc8c16ad"
            }
        },
        "description": "This is a test keystore that uses PBKDF2 to secure the secret.",
        "pubkey": "9612d7a727c9d0a22e185a1c768478dfe919cada9266988cb32359c11f2b7b27f4ae4040902382ae2910c15e2b420d07",
        "path": "m/12381/60/0/0",
        "uuid": "64625def-3331-4eea-ab6f-782f3ed16a83",
        "version": 4
    }"#;

    #[test]
    fn test_load_encrypted_keystore_with_sibling_password() {
        let keystores = tempfile::tempdir().unwrap();
        let passwords = tempfile::tempdir().unwrap();

        fs::write(keystores.path().join("validator.json"), TEST_KEYSTORE).unwrap();
        fs::write(passwords.path().join("validator.txt"), "testpassword🔑\n").unwrap();

        let registry = KeyRegistry::load(keystores.path(), passwords.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(TEST_PUBKEY).is_some());
    }

    #[test]
    fn test_missing_password_file_is_an_error() {
        let keystores = tempfile::tempdir().unwrap();
        let passwords = tempfile::tempdir().unwrap();

        fs::write(keystores.path().join("validator.json"), TEST_KEYSTORE).unwrap();

        let err = KeyRegistry::load(keystores.path(), passwords.path()).unwrap_err();
        assert!(matches!(err, KeystoreError::Io { .. }));
    }
}
