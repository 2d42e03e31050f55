use alloy_primitives::hex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ssz::{Decode, Encode};
use tree_hash::{merkle_root, Hash256, PackedEncoding, TreeHash, TreeHashType};

/// 48-byte BLS public key.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PubKey {
    pub inner: [u8; 48],
}

impl PubKey {
    /// Lowercase hex without the `0x` prefix, the form validator keys are
    /// indexed by.
    pub fn to_bare_hex(&self) -> String {
        hex::encode(self.inner)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(self.inner)
    }
}

impl From<[u8; 48]> for PubKey {
    fn from(inner: [u8; 48]) -> Self {
        Self { inner }
    }
}

impl Encode for PubKey {
    fn is_ssz_fixed_len() -> bool {
        true
    }
    fn ssz_append(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.inner);
    }
    fn ssz_bytes_len(&self) -> usize {
        48
    }
    fn ssz_fixed_len() -> usize {
        48
    }
}

impl Decode for PubKey {
    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        48
    }

    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::DecodeError> {
        if bytes.len() != 48 {
            return Err(ssz::DecodeError::InvalidByteLength {
                len: bytes.len(),
                expected: 48,
            });
        }
        let mut inner = [0u8; 48];
        inner.copy_from_slice(bytes);
        Ok(Self { inner })
    }
}

impl Serialize for PubKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PubKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let result: String = Deserialize::deserialize(deserializer)?;
        let result = hex::decode(&result).map_err(serde::de::Error::custom)?;
        if result.len() != 48 {
            return Err(serde::de::Error::custom(format!(
                "BLS public key must be 48 bytes, got {}",
                result.len()
            )));
        }
        let mut inner = [0u8; 48];
        inner.copy_from_slice(&result);
        Ok(Self { inner })
    }
}

impl TreeHash for PubKey {
    fn tree_hash_type() -> tree_hash::TreeHashType {
        TreeHashType::Vector
    }

    fn tree_hash_packed_encoding(&self) -> PackedEncoding {
        PackedEncoding::from_vec(self.inner.to_vec())
    }

    fn tree_hash_packing_factor() -> usize {
        1
    }

    fn tree_hash_root(&self) -> Hash256 {
        merkle_root(&self.inner, 1)
    }
}
