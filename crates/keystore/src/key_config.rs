use serde::Deserialize;

/// Alternative key-material descriptor accepted in the keystore directory,
/// in YAML or JSON form. Files without a `type` field are treated as plain
/// EIP-2335 keystores instead.
#[derive(Debug, Default, Deserialize)]
pub struct KeyConfig {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, rename = "keyType")]
    pub key_type: String,
    #[serde(default, rename = "privateKey")]
    pub private_key: String,
    #[serde(default, rename = "keystoreFile")]
    pub keystore_file: String,
    #[serde(default, rename = "keystorePasswordFile")]
    pub keystore_password_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_file_raw() {
        let config: KeyConfig = serde_yaml::from_str(
            "type: file-raw\nkeyType: BLS\nprivateKey: \"0x25295f0d1d592a90b333e26e85149708208e9f8e8bc18f6c77bd62f8ad7a6866\"\n",
        )
        .unwrap();
        assert_eq!(config.kind, "file-raw");
        assert_eq!(config.key_type, "BLS");
        assert!(config.private_key.starts_with("0x"));
    }

    #[test]
    fn test_json_file_keystore() {
        let config: KeyConfig = serde_yaml::from_str(
            r#"{"type": "file-keystore", "keyType": "BLS", "keystoreFile": "/keys/a.json", "keystorePasswordFile": "/keys/a.txt"}"#,
        )
        .unwrap();
        assert_eq!(config.kind, "file-keystore");
        assert_eq!(config.keystore_file, "/keys/a.json");
    }

    #[test]
    fn test_plain_keystore_json_has_no_type() {
        let config: KeyConfig = serde_yaml::from_str(
            r#"{"crypto": {}, "pubkey": "ab", "version": 4}"#,
        )
        .unwrap();
        assert!(config.kind.is_empty());
    }
}
